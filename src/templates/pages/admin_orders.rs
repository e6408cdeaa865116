use crate::db::orders::OrderSummary;
use crate::domain::money::{cents_to_input, format_cents};
use crate::domain::OrderStatus;
use crate::templates::components::status_badge;
use crate::templates::pages::admin::admin_nav;
use crate::templates::pages::orders::{history, order_items, shipping, OrderVm};
use crate::templates::{desktop_layout, Chrome};
use crate::util::format_ts;
use maud::{html, Markup};

pub fn admin_orders_page(chrome: &Chrome<'_>, orders: &[OrderSummary], filter: Option<OrderStatus>) -> Markup {
    let base = format!("/s/{}/admin/orders", chrome.store.slug);
    let export = match filter {
        Some(s) => format!("{base}/export.xlsx?status={}", s.as_str()),
        None => format!("{base}/export.xlsx"),
    };
    desktop_layout(
        "Orders",
        Some(chrome),
        html! {
            main class="container" {
                h1 { "Orders" }
                (admin_nav(&chrome.store.slug))

                form method="get" action=(base) style="display: flex; gap: 8px; margin-bottom: 1rem;" {
                    select name="status" {
                        option value="" { "All statuses" }
                        @for s in OrderStatus::ALL {
                            option value=(s.as_str()) selected[filter == Some(s)] { (s.label()) }
                        }
                    }
                    button type="submit" { "Filter" }
                    a href=(export) { "Export XLSX" }
                }

                table {
                    thead { tr { th { "Order" } th { "Customer" } th { "Placed" } th { "Items" } th { "Status" } th { "Total" } } }
                    tbody {
                        @for s in orders {
                            tr {
                                td { a href=(format!("{base}/{}", s.order.id)) { "#" (s.order.id) } }
                                td { (s.customer_email) }
                                td { (format_ts(s.order.created_at)) }
                                td { (s.item_count) }
                                td { (status_badge(s.order.status)) }
                                td { (format_cents(s.order.total_cents, &chrome.store.currency)) }
                            }
                        }
                    }
                }
                @if orders.is_empty() {
                    p class="muted" { "No orders." }
                }
            }
        },
    )
}

pub fn admin_order_page(chrome: &Chrome<'_>, vm: &OrderVm) -> Markup {
    let o = &vm.order;
    let action_base = format!("/s/{}/admin/orders/{}", chrome.store.slug, o.id);
    let quotable = matches!(o.status, OrderStatus::AdminPending | OrderStatus::CustomerPending);

    desktop_layout(
        &format!("Order #{}", o.id),
        Some(chrome),
        html! {
            main class="container" {
                h1 { "Order #" (o.id) " " (status_badge(o.status)) }
                (admin_nav(&chrome.store.slug))
                p class="muted" { "Customer: " (vm.customer_email) " · placed " (format_ts(o.created_at)) }

                (order_items(vm, &chrome.store.currency))

                @if quotable {
                    section class="card" {
                        h3 { "Quote special items" }
                        form method="post" action=(format!("{action_base}/quote")) style="display: grid; gap: 8px; max-width: 480px;" {
                            @for item in vm.items.iter().filter(|i| i.is_special) {
                                label {
                                    (item.name) " × " (item.quantity)
                                    @if let Some(list) = item.list_price_cents {
                                        span class="muted" { " (list " (format_cents(list, &chrome.store.currency)) ")" }
                                    }
                                    " unit price "
                                    input name=(format!("price_{}", item.id)) required placeholder="0.00"
                                        value=(item.unit_price_cents.map(cents_to_input).unwrap_or_default());
                                }
                            }
                            textarea name="admin_note" rows="2" placeholder="Note for the customer (optional)" {
                                (o.admin_note.as_deref().unwrap_or(""))
                            }
                            button type="submit" { "Send quote" }
                        }
                    }
                }

                @if o.status.is_open() {
                    section class="card" {
                        h3 { "Promo code" }
                        form method="post" action=(format!("{action_base}/promo")) style="display: flex; gap: 8px;" {
                            input name="code" placeholder="blank removes the code" value=(vm.promo_code.as_deref().unwrap_or(""));
                            button type="submit" { "Apply" }
                        }
                    }
                }

                section class="card" {
                    h3 { "Actions" }
                    @for (action, label) in admin_actions(o.status) {
                        form class="inline" method="post" action=(format!("{action_base}/{action}")) style="margin-right: 8px;" {
                            input type="hidden" name="note" value="";
                            button type="submit" { (label) }
                        }
                    }
                    @if o.status.is_terminal() {
                        p class="muted" { "This order is closed." }
                    }
                }

                (shipping(o))
                (history(&vm.events))
            }
        },
    )
}

fn admin_actions(status: OrderStatus) -> Vec<(&'static str, &'static str)> {
    match status {
        OrderStatus::Pending => vec![("accept", "Accept"), ("reject", "Reject")],
        OrderStatus::AdminPending | OrderStatus::CustomerPending => vec![("reject", "Reject")],
        OrderStatus::Accepted => vec![("complete", "Mark completed"), ("cancel", "Cancel")],
        _ => Vec::new(),
    }
}
