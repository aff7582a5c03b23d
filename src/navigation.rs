//! This file defines the navigation bar shared by the signed-in pages.

use maud::{Markup, html};

use crate::endpoints;

/// A link in the navigation bar.
///
/// It will change appearance if `is_current` is set to `true`. Only one link
/// should be set as active at any one time.
struct Link<'a> {
    url: &'a str,
    title: &'a str,
    is_current: bool,
}

impl Link<'_> {
    fn into_html(self) -> Markup {
        let style = if self.is_current {
            "nav-link nav-link-active"
        } else {
            "nav-link"
        };

        html!( a href=(self.url) class=(style) { (self.title) } )
    }
}

/// Get the navigation bar.
///
/// If a link matches `active_endpoint`, then that link will be marked as
/// active and displayed differently in the HTML.
pub fn get_nav_bar(active_endpoint: &str) -> Markup {
    let links = [
        Link {
            url: endpoints::TRANSACTIONS_VIEW,
            title: "Transactions",
            is_current: active_endpoint == endpoints::TRANSACTIONS_VIEW,
        },
        Link {
            url: endpoints::NEW_TRANSACTION,
            title: "Add Transaction",
            is_current: active_endpoint == endpoints::NEW_TRANSACTION,
        },
        Link {
            url: endpoints::SIGN_OUT,
            title: "Sign out",
            is_current: false,
        },
    ];

    html! {
        nav class="nav-bar"
        {
            span class="brand" { "Spendlog" }

            div class="nav-links"
            {
                @for nav_link in links
                {
                    (nav_link.into_html())
                }
            }
        }
    }
}
