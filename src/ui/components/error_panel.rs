//! Error panel component renderer.
//!
//! Produces the static markup that replaces the whole surface in degraded
//! mode: heading, explanation, a reload action, and a collapsed technical
//! details section.

use crate::ui::helpers::escape_markup;
use crate::ui::viewmodel::ErrorPanel;

/// Renders the error panel as markup.
///
/// # Layout
///
/// ```text
/// <div class="layout-error layout-error--{severity}" role="alert">
///   <h1>TITLE</h1>
///   <p>MESSAGE</p>
///   <button data-action="reload">RELOAD</button>
///   <details><summary>Technical details</summary><pre>DETAILS</pre></details>
/// </div>
/// ```
///
/// The details section is omitted when the panel has no details.
///
/// # Example
///
/// ```
/// use layout_core::domain::Severity;
/// use layout_core::ui::components::render_error_panel;
/// use layout_core::ui::ErrorPanel;
///
/// let panel = ErrorPanel::for_failure(Severity::Critical, Some("boom".to_string()));
/// let markup = render_error_panel(&panel);
/// assert!(markup.contains(r#"data-action="reload""#));
/// assert!(markup.contains("<pre>boom</pre>"));
/// ```
#[must_use]
pub fn render_error_panel(panel: &ErrorPanel) -> String {
    let mut markup = format!(
        "<div class=\"layout-error layout-error--{}\" role=\"alert\">",
        panel.severity.as_str()
    );
    markup.push_str(&format!("<h1>{}</h1>", escape_markup(&panel.title)));
    markup.push_str(&format!("<p>{}</p>", escape_markup(&panel.message)));
    markup.push_str(&format!(
        "<button type=\"button\" data-action=\"reload\">{}</button>",
        escape_markup(&panel.reload_label)
    ));

    if let Some(details) = &panel.details {
        markup.push_str("<details><summary>Technical details</summary>");
        markup.push_str(&format!("<pre>{}</pre>", escape_markup(details)));
        markup.push_str("</details>");
    }

    markup.push_str("</div>");
    markup
}
