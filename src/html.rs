use maud::{DOCTYPE, Markup, html};

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};

// Link styles
pub const LINK_STYLE: &str = "link";
pub const DANGER_LINK_STYLE: &str = "link link-danger";

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "btn btn-primary";

// Form styles
pub const FORM_LABEL_STYLE: &str = "form-label";
pub const FORM_TEXT_INPUT_STYLE: &str = "form-control";
pub const FORM_SELECT_STYLE: &str = "form-control form-select";
pub const FORM_ERROR_STYLE: &str = "field-error";

// Table styles
pub const TABLE_STYLE: &str = "table";

pub fn base(title: &str, content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Spendlog" }
                link href="/static/main.css" rel="stylesheet";
            }

            body
            {
                (content)
            }
        }
    }
}

pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    let content = html!(
        section class="error-page"
        {
            h1 { (header) }

            p class="error-description" { (description) }

            p { (fix) }

            a href="/" class=(LINK_STYLE) { "Back to Homepage" }
        }
    );

    base(title, &content)
}

/// The card layout shared by the sign-up and sign-in pages.
pub fn auth_card(form_title: &str, form: &Markup) -> Markup {
    html! {
        div class="auth-card"
        {
            p class="brand" { "Spendlog" }

            h1 { (form_title) }

            (form)
        }
    }
}

/// A labelled text-like input with an optional error message below it.
pub fn text_input(
    label: &str,
    input_type: &str,
    name: &str,
    value: &str,
    error_message: Option<&str>,
) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                type=(input_type)
                name=(name)
                id=(name)
                class=(FORM_TEXT_INPUT_STYLE)
                value=(value);

            @if let Some(error_message) = error_message
            {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }
        }
    }
}

/// A labelled drop-down with an optional error message below it.
///
/// `options` holds (value, label) pairs; the option whose value equals
/// `selected` is pre-selected.
pub fn select_input(
    label: &str,
    name: &str,
    options: &[(&str, &str)],
    selected: &str,
    error_message: Option<&str>,
) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            select name=(name) id=(name) class=(FORM_SELECT_STYLE)
            {
                @for (value, option_label) in options
                {
                    option value=(value) selected[*value == selected] { (option_label) }
                }
            }

            @if let Some(error_message) = error_message
            {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }
        }
    }
}

pub fn format_currency(number: f64) -> String {
    static POSITIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| {
        Formatter::currency("$")
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    static NEGATIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let negative_fmt = NEGATIVE_FMT.get_or_init(|| {
        Formatter::currency("-$")
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    let mut formatted_string = if number < 0.0 {
        negative_fmt.fmt_string(number.abs())
    } else if number > 0.0 {
        positive_fmt.fmt_string(number)
    } else {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        "$0.00".to_owned()
    };

    // numfmt omits the last trailing zero, so we must add it ourselves
    // For example, "12.30" is rendered as "12.3" so we append "0".
    if formatted_string.as_bytes()[formatted_string.len() - 3] != b'.' {
        formatted_string = format!("{formatted_string}0");
    }

    formatted_string
}

/// A link with the app's standard link styling.
pub fn link(url: &str, text: &str) -> Markup {
    html! (
        a href=(url) class=(LINK_STYLE) { (text) }
    )
}
