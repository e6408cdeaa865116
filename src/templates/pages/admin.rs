use crate::domain::money::format_cents;
use crate::domain::OrderStatus;
use crate::templates::components::{card, status_badge};
use crate::templates::{desktop_layout, Chrome};
use maud::{html, Markup};

pub struct DashboardVm {
    pub status_counts: Vec<(OrderStatus, i64)>,
    pub awaiting_admin: i64,
    pub pending_reviews: i64,
    pub revenue_this_month_cents: i64,
}

/// Sub-navigation shared by every admin screen.
pub fn admin_nav(store_slug: &str) -> Markup {
    let base = format!("/s/{store_slug}/admin");
    html! {
        nav style="display: flex; gap: 16px; margin-bottom: 1.5rem;" {
            a href=(base) { "Dashboard" }
            a href=(format!("{base}/orders")) { "Orders" }
            a href=(format!("{base}/products")) { "Products" }
            a href=(format!("{base}/promos")) { "Promo codes" }
            a href=(format!("{base}/reviews")) { "Reviews" }
            a href=(format!("{base}/users")) { "Users" }
        }
    }
}

pub fn admin_dashboard_page(chrome: &Chrome<'_>, vm: &DashboardVm) -> Markup {
    let store = chrome.store;
    let base = format!("/s/{}/admin", store.slug);
    desktop_layout(
        "Admin",
        Some(chrome),
        html! {
            main class="container" {
                h1 { "Admin Dashboard" }
                (admin_nav(&store.slug))

                div class="grid" {
                    (card("Awaiting action", html! {
                        p style="font-size: 2rem; margin: 0;" {
                            a href=(format!("{base}/orders?status=ADMIN_PENDING")) { (vm.awaiting_admin) }
                        }
                    }))
                    (card("Pending reviews", html! {
                        p style="font-size: 2rem; margin: 0;" {
                            a href=(format!("{base}/reviews")) { (vm.pending_reviews) }
                        }
                    }))
                    (card("Revenue this month", html! {
                        p style="font-size: 2rem; margin: 0;" { (format_cents(vm.revenue_this_month_cents, &store.currency)) }
                    }))
                }

                (card("Orders by status", html! {
                    table {
                        tbody {
                            @for (status, n) in &vm.status_counts {
                                tr {
                                    td { a href=(format!("{base}/orders?status={}", status.as_str())) { (status_badge(*status)) } }
                                    td { (n) }
                                }
                            }
                        }
                    }
                }))

                (card("Store settings", html! {
                    form method="post" action=(format!("{base}/settings")) style="display: grid; gap: 8px; max-width: 420px;" {
                        label { "Store name " input name="name" value=(store.name) required; }
                        label {
                            input type="checkbox" name="auto_accept_orders" checked[store.auto_accept_orders];
                            " Accept standard orders automatically"
                        }
                        button type="submit" { "Save settings" }
                    }
                }))
            }
        },
    )
}
