use maud::{html, Markup};

use crate::domain::money::format_cents;
use crate::domain::{OrderStatus, PriceDisplay};

pub mod card;
pub mod email_cta;
pub mod error;

pub use card::card;
pub use email_cta::email_cta_form;

pub fn price_tag(display: PriceDisplay, currency: &str) -> Markup {
    html! {
        @match display {
            PriceDisplay::Fixed { cents } => span class="price" { (format_cents(cents, currency)) },
            PriceDisplay::Negotiable { list_cents } => span class="price" {
                (format_cents(list_cents, currency)) " "
                span class="badge" { "negotiable" }
            },
            PriceDisplay::OnRequest => span class="price muted" { "Price on request" },
        }
    }
}

/// Amount or a placeholder while the line awaits a quote.
pub fn maybe_money(cents: Option<i64>, currency: &str) -> Markup {
    html! {
        @match cents {
            Some(c) => (format_cents(c, currency)),
            None => span class="muted" { "to be quoted" },
        }
    }
}

pub fn status_badge(status: OrderStatus) -> Markup {
    let color = match status {
        OrderStatus::Pending | OrderStatus::AdminPending => "#fef3c7",
        OrderStatus::CustomerPending => "#dbeafe",
        OrderStatus::Accepted | OrderStatus::Completed => "#d1fae5",
        OrderStatus::Cancelled | OrderStatus::Rejected => "#fee2e2",
    };
    html! {
        span class="badge" style=(format!("background: {color};")) title=(status.as_str()) { (status.label()) }
    }
}

/// Previous/next links keeping the other query parameters.
pub fn pagination(base: &str, query_without_page: &str, page: i64, page_count: i64) -> Markup {
    let href = |p: i64| {
        if query_without_page.is_empty() {
            format!("{base}?page={p}")
        } else {
            format!("{base}?{query_without_page}&page={p}")
        }
    };
    html! {
        @if page_count > 1 {
            nav class="pagination" style="display: flex; gap: 12px; margin-top: 1rem;" {
                @if page > 1 { a href=(href(page - 1)) { "← Previous" } }
                span class="muted" { "Page " (page) " of " (page_count) }
                @if page < page_count { a href=(href(page + 1)) { "Next →" } }
            }
        }
    }
}
