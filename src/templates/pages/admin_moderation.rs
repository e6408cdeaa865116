use crate::db::reviews::{Review, ReviewStatus};
use crate::db::users::UserWithStats;
use crate::templates::pages::admin::admin_nav;
use crate::templates::{desktop_layout, Chrome};
use crate::util::format_ts;
use maud::{html, Markup};

pub fn admin_reviews_page(chrome: &Chrome<'_>, reviews: &[Review], status: ReviewStatus) -> Markup {
    let base = format!("/s/{}/admin/reviews", chrome.store.slug);
    desktop_layout(
        "Reviews",
        Some(chrome),
        html! {
            main class="container" {
                h1 { "Reviews" }
                (admin_nav(&chrome.store.slug))

                nav style="display: flex; gap: 12px; margin-bottom: 1rem;" {
                    @for s in [ReviewStatus::Pending, ReviewStatus::Approved, ReviewStatus::Rejected] {
                        @if s == status {
                            strong { (s.as_str()) }
                        } @else {
                            a href=(format!("{base}?status={}", s.as_str())) { (s.as_str()) }
                        }
                    }
                }

                @if reviews.is_empty() {
                    p class="muted" { "Nothing here." }
                }
                @for r in reviews {
                    section class="card" {
                        p {
                            strong { (r.product_name) } " · " (r.rating) "/5 · "
                            span class="muted" { (r.author_email) " · " (format_ts(r.created_at)) }
                        }
                        @if !r.body.is_empty() { p { (r.body) } }
                        @for action in ["approve", "reject", "delete"] {
                            form class="inline" method="post" action=(format!("{base}/{}/{action}", r.id)) style="margin-right: 8px;" {
                                button type="submit" { (action) }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn admin_users_page(chrome: &Chrome<'_>, users: &[UserWithStats], me: i64) -> Markup {
    let base = format!("/s/{}/admin/users", chrome.store.slug);
    desktop_layout(
        "Users",
        Some(chrome),
        html! {
            main class="container" {
                h1 { "Users" }
                (admin_nav(&chrome.store.slug))

                table {
                    thead { tr { th { "Email" } th { "Orders" } th { "Role" } th { "Last login" } th { "Actions" } } }
                    tbody {
                        @for u in users {
                            tr {
                                td {
                                    (u.email)
                                    @if u.is_blocked { " " span class="badge" style="background: #fee2e2;" { "blocked" } }
                                }
                                td { (u.order_count) }
                                td { @if u.is_admin { span class="badge" style="background: #dbeafe;" { "Admin" } } @else { "Customer" } }
                                td class="muted" {
                                    @match u.last_login_at {
                                        Some(ts) => (format_ts(ts)),
                                        None => "Never",
                                    }
                                }
                                td {
                                    @if u.id == me {
                                        span class="muted" { "you" }
                                    } @else {
                                        @let block = if u.is_blocked { "unblock" } else { "block" };
                                        @let role = if u.is_admin { "revoke-admin" } else { "grant-admin" };
                                        @for action in [block, role] {
                                            form class="inline" method="post" action=(format!("{base}/{}/{action}", u.id)) style="margin-right: 8px;" {
                                                button type="submit" { (action) }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}
