//! Filesystem locations used for trace output.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "layout-core";

/// Returns the directory relative trace files are written to.
///
/// Resolves to `$XDG_DATA_HOME/layout-core` when `XDG_DATA_HOME` is set,
/// otherwise `~/.local/share/layout-core`. Falls back to the system temp
/// directory when neither variable is available.
#[must_use]
pub fn get_data_dir() -> PathBuf {
    if let Some(data_home) = env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    home_dir().map_or_else(
        || env::temp_dir().join(APP_DIR),
        |home| home.join(".local").join("share").join(APP_DIR),
    )
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a leading tilde, or a tilde when `HOME` is unset, are
/// returned unchanged.
///
/// ```
/// use layout_core::infrastructure::expand_tilde;
///
/// assert_eq!(expand_tilde("/var/log/trace.jsonl"), "/var/log/trace.jsonl");
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> String {
    let Some(home) = home_dir() else {
        return path.to_string();
    };

    if path == "~" {
        home.to_string_lossy().into_owned()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest).to_string_lossy().into_owned()
    } else {
        path.to_string()
    }
}

/// Turns a configured `trace_file` value into an absolute path.
///
/// Tilde paths are expanded; other relative paths land in [`get_data_dir`].
#[must_use]
pub fn resolve_trace_file(file: &str) -> PathBuf {
    let expanded = PathBuf::from(expand_tilde(file));
    if expanded.is_absolute() {
        expanded
    } else {
        get_data_dir().join(expanded)
    }
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME").filter(|v| !v.is_empty()).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_trace_file_is_kept() {
        assert_eq!(resolve_trace_file("/tmp/spans.jsonl"), PathBuf::from("/tmp/spans.jsonl"));
    }

    #[test]
    fn relative_trace_file_lands_in_data_dir() {
        let resolved = resolve_trace_file("spans.jsonl");
        assert_eq!(resolved, get_data_dir().join("spans.jsonl"));
        assert!(resolved.ends_with("layout-core/spans.jsonl"));
    }
}
