// templates/pages/orders.rs
//
// Customer order pages, plus the order fragments the admin screens reuse.

use crate::db::orders::{Order, OrderEvent, OrderItem, OrderSummary};
use crate::domain::money::format_cents;
use crate::domain::OrderStatus;
use crate::templates::components::{maybe_money, status_badge};
use crate::templates::{desktop_layout, Chrome};
use crate::util::format_ts;
use maud::{html, Markup};

pub struct OrderVm {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub events: Vec<OrderEvent>,
    pub promo_code: Option<String>,
    pub customer_email: String,
}

pub fn orders_page(chrome: &Chrome<'_>, orders: &[OrderSummary]) -> Markup {
    let base = format!("/s/{}", chrome.store.slug);
    desktop_layout(
        "My orders",
        Some(chrome),
        html! {
            main class="container" {
                h1 { "My orders" }
                @if orders.is_empty() {
                    p { "You have not placed any orders yet." }
                } @else {
                    table {
                        thead { tr { th { "Order" } th { "Placed" } th { "Items" } th { "Status" } th { "Total" } } }
                        tbody {
                            @for s in orders {
                                tr {
                                    td { a href=(format!("{base}/orders/{}", s.order.id)) { "#" (s.order.id) } }
                                    td { (format_ts(s.order.created_at)) }
                                    td { (s.item_count) }
                                    td { (status_badge(s.order.status)) }
                                    td { (order_total(&s.order, &chrome.store.currency)) }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn order_page(chrome: &Chrome<'_>, vm: &OrderVm) -> Markup {
    let action_base = format!("/s/{}/orders/{}", chrome.store.slug, vm.order.id);
    desktop_layout(
        &format!("Order #{}", vm.order.id),
        Some(chrome),
        html! {
            main class="container" {
                h1 { "Order #" (vm.order.id) " " (status_badge(vm.order.status)) }
                p class="muted" { "Placed " (format_ts(vm.order.created_at)) }

                @if vm.order.status == OrderStatus::CustomerPending {
                    section class="card" {
                        h3 { "Your quote is ready" }
                        @if let Some(note) = &vm.order.admin_note {
                            p { (note) }
                        }
                        form class="inline" method="post" action=(format!("{action_base}/accept-quote")) {
                            button type="submit" { "Accept quote" }
                        }
                        form method="post" action=(format!("{action_base}/request-changes")) style="margin-top: 1rem;" {
                            textarea name="note" rows="2" cols="50" placeholder="What should change?" {}
                            br;
                            button type="submit" { "Request changes" }
                        }
                    }
                }

                (order_items(vm, &chrome.store.currency))
                (shipping(&vm.order))
                (history(&vm.events))

                @if vm.order.status.is_open() {
                    form method="post" action=(format!("{action_base}/cancel")) {
                        button type="submit" { "Cancel order" }
                    }
                }
            }
        },
    )
}

fn order_total(order: &Order, currency: &str) -> Markup {
    html! {
        @if order.status == OrderStatus::AdminPending {
            span class="muted" { "awaiting quote" }
        } @else {
            (format_cents(order.total_cents, currency))
        }
    }
}

pub fn order_items(vm: &OrderVm, currency: &str) -> Markup {
    let o = &vm.order;
    html! {
        section class="card" {
            h3 { "Items" }
            table {
                thead { tr { th { "Product" } th { "Quantity" } th { "Unit price" } th { "Total" } } }
                tbody {
                    @for item in &vm.items {
                        tr {
                            td {
                                (item.name)
                                @if item.is_special { " " span class="badge" { "special pricing" } }
                            }
                            td { (item.quantity) }
                            td { (maybe_money(item.unit_price_cents, currency)) }
                            td { (maybe_money(item.unit_price_cents.map(|p| p * item.quantity), currency)) }
                        }
                    }
                }
            }
            p { "Subtotal: " (format_cents(o.subtotal_cents, currency)) }
            @if o.discount_cents > 0 || vm.promo_code.is_some() {
                p {
                    "Discount"
                    @if let Some(code) = &vm.promo_code { " (" (code) ")" }
                    ": −" (format_cents(o.discount_cents, currency))
                }
            }
            p { strong { "Total: " (order_total(o, currency)) } }
        }
    }
}

pub fn shipping(order: &Order) -> Markup {
    html! {
        section class="card" {
            h3 { "Shipping" }
            p {
                (order.ship_name) br;
                (order.ship_address) br;
                (order.ship_postal) " " (order.ship_city) br;
                (order.ship_country)
            }
            @if let Some(note) = &order.customer_note {
                p class="muted" { "Note: " (note) }
            }
        }
    }
}

pub fn history(events: &[OrderEvent]) -> Markup {
    html! {
        section class="card" {
            h3 { "History" }
            ul {
                @for e in events {
                    li {
                        (format_ts(e.created_at)) " · "
                        @if let Some(from) = &e.from_status {
                            @if from != &e.to_status { (from) " → " }
                        }
                        (e.to_status) " by " (e.actor)
                        @if let Some(note) = &e.note { " · " em { (note) } }
                    }
                }
            }
        }
    }
}
