//! Severity classification for coordinator failures.

use std::error::Error;
use std::sync::Arc;

use crate::domain::Severity;

/// Decides the severity of a failure from its message.
///
/// Returning `None` leaves the decision to the coordinator, which treats it as
/// [`Severity::Critical`].
pub type SeverityClassifier = Arc<dyn Fn(&str) -> Option<Severity> + Send + Sync>;

/// Default classifier: messages containing "critical" or "layout" are critical,
/// anything else is a warning. Matching is case-sensitive. An empty message is
/// undecided.
///
/// ```
/// use layout_core::app::failure::keyword_severity;
/// use layout_core::Severity;
///
/// assert_eq!(keyword_severity("layout root missing"), Some(Severity::Critical));
/// assert_eq!(keyword_severity("chart failed to load"), Some(Severity::Warning));
/// assert_eq!(keyword_severity(""), None);
/// ```
#[must_use]
pub fn keyword_severity(message: &str) -> Option<Severity> {
    let message = message.trim();
    if message.is_empty() {
        return None;
    }

    if message.contains("critical") || message.contains("layout") {
        Some(Severity::Critical)
    } else {
        Some(Severity::Warning)
    }
}

/// Error message followed by its source chain, one cause per line.
#[must_use]
pub fn error_details(error: &(dyn Error + 'static)) -> String {
    let mut details = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        details.push_str("\ncaused by: ");
        details.push_str(&cause.to_string());
        source = cause.source();
    }
    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LayoutError;

    #[test]
    fn keyword_match_is_case_sensitive() {
        assert_eq!(keyword_severity("critical: store offline"), Some(Severity::Critical));
        assert_eq!(keyword_severity("CRITICAL: store offline"), Some(Severity::Warning));
        assert_eq!(keyword_severity("Layout root missing"), Some(Severity::Warning));
        assert_eq!(keyword_severity("   "), None);
    }

    #[test]
    fn details_include_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "layout.toml missing");
        let error = LayoutError::from(io);
        assert_eq!(error_details(&error), "IO error: layout.toml missing\ncaused by: layout.toml missing");
    }
}
