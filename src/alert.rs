//! Notice banners for displaying success and error messages to users.

use maud::{Markup, html};

/// Alert message types for styling
#[derive(Debug, Clone, Copy)]
pub enum AlertKind {
    Success,
    Error,
}

/// Render a dismissable-looking notice banner.
pub fn alert(kind: AlertKind, message: &str) -> Markup {
    let class = match kind {
        AlertKind::Success => "alert alert-success",
        AlertKind::Error => "alert alert-error",
    };

    html! {
        div class=(class) role="alert" { (message) }
    }
}

/// Shortcut for a success banner.
pub fn success_alert(message: &str) -> Markup {
    alert(AlertKind::Success, message)
}

/// Shortcut for an error banner.
pub fn error_alert(message: &str) -> Markup {
    alert(AlertKind::Error, message)
}
