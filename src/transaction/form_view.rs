//! The form markup shared by the create and edit transaction pages.

use maud::{Markup, html};

use crate::{
    html::{BUTTON_PRIMARY_STYLE, base, link, select_input, text_input},
    navigation::get_nav_bar,
};

use super::{
    core::{Category, TransactionKind},
    form::{TransactionFormData, TransactionFormErrors},
};

/// Render a full transaction form page.
///
/// `action` is the URL the form posts to, `page_title` doubles as the page
/// heading, and the form fields show the raw values from `form` alongside any
/// `errors` from validation.
pub(crate) fn transaction_form_page(
    page_title: &str,
    action: &str,
    active_endpoint: &str,
    form: &TransactionFormData,
    errors: &TransactionFormErrors,
) -> Markup {
    let kind_options = TransactionKind::ALL.map(|kind| (kind.as_str(), kind.as_str()));
    let category_options = Category::ALL.map(|category| (category.as_str(), category.as_str()));

    let content = html! {
        (get_nav_bar(active_endpoint))

        main class="page"
        {
            h1 { (page_title) }

            form method="post" action=(action)
            {
                (text_input("Title", "text", "title", &form.title, errors.title))
                (text_input("Amount", "text", "amount", &form.amount, errors.amount))
                (select_input("Type", "type", &kind_options, &form.kind, errors.kind))
                (select_input("Category", "category", &category_options, &form.category, errors.category))

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save" }
            }

            p { (link(crate::endpoints::TRANSACTIONS_VIEW, "Back to transactions")) }
        }
    };

    base(page_title, &content)
}
