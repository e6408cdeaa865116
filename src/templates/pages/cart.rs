use crate::db::cart::CartLine;
use crate::domain::money::format_cents;
use crate::domain::validate::MAX_CART_QTY;
use crate::domain::OrderTotals;
use crate::templates::components::{maybe_money, price_tag};
use crate::templates::{desktop_layout, Chrome};
use maud::{html, Markup};

pub struct CartVm<'a> {
    pub lines: &'a [CartLine],
    pub totals: OrderTotals,
}

pub fn cart_page(chrome: &Chrome<'_>, vm: &CartVm<'_>) -> Markup {
    let base = format!("/s/{}", chrome.store.slug);
    let currency = chrome.store.currency.as_str();
    desktop_layout(
        "Cart",
        Some(chrome),
        html! {
            main class="container" {
                h1 { "Your cart" }

                @if vm.lines.is_empty() {
                    p { "Your cart is empty. " a href=(base) { "Browse the catalog" } }
                } @else {
                    table {
                        thead {
                            tr { th { "Product" } th { "Price" } th { "Quantity" } th { "Total" } th {} }
                        }
                        tbody {
                            @for line in vm.lines {
                                @let display = line.product.price_display();
                                tr {
                                    td { a href=(format!("{base}/products/{}", line.product.slug)) { (line.product.name) } }
                                    td { (price_tag(display, currency)) }
                                    td {
                                        form class="inline" method="post" action=(format!("{base}/cart/{}/update", line.id)) {
                                            input type="number" name="quantity" min="0" max=(MAX_CART_QTY) value=(line.quantity) style="width: 4em;";
                                            " "
                                            button type="submit" { "Update" }
                                        }
                                    }
                                    td { (maybe_money(display.checkout_price().map(|c| c * line.quantity), currency)) }
                                    td {
                                        form class="inline" method="post" action=(format!("{base}/cart/{}/remove", line.id)) {
                                            button type="submit" { "Remove" }
                                        }
                                    }
                                }
                            }
                        }
                    }

                    p { "Subtotal: " strong { (format_cents(vm.totals.subtotal_cents, currency)) } }
                    @if vm.totals.has_unpriced {
                        p class="muted" {
                            "Your cart contains special pricing items. The store will send you a quote "
                            "for them before the order is confirmed."
                        }
                    }

                    (checkout_form(&base))
                }
            }
        },
    )
}

fn checkout_form(base: &str) -> Markup {
    html! {
        section class="card" {
            h3 { "Checkout" }
            form method="post" action=(format!("{base}/checkout")) style="display: grid; gap: 8px; max-width: 420px;" {
                input name="ship_name" placeholder="Full name" required;
                input name="ship_address" placeholder="Address" required;
                input name="ship_city" placeholder="City" required;
                input name="ship_postal" placeholder="Postal code" required;
                input name="ship_country" placeholder="Country" required;
                textarea name="customer_note" rows="3" placeholder="Note for the store (optional)" {}
                input name="promo_code" placeholder="Promo code (optional)" autocomplete="off";
                button type="submit" { "Place order" }
            }
        }
    }
}
