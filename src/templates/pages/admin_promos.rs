use crate::db::products::Product;
use crate::db::promos::{PromoCode, PromoWithScope};
use crate::domain::money::format_cents;
use crate::templates::pages::admin::admin_nav;
use crate::templates::{desktop_layout, Chrome};
use crate::util::format_date;
use maud::{html, Markup};

fn describe(p: &PromoCode, currency: &str) -> String {
    match (p.percent_off, p.flat_off_cents) {
        (Some(pct), Some(flat)) => format!("{pct}% + {}", format_cents(flat, currency)),
        (Some(pct), None) => format!("{pct}%"),
        (None, Some(flat)) => format_cents(flat, currency),
        (None, None) => "-".to_string(),
    }
}

pub fn admin_promos_page(chrome: &Chrome<'_>, promos: &[PromoCode]) -> Markup {
    let base = format!("/s/{}/admin/promos", chrome.store.slug);
    let currency = chrome.store.currency.as_str();
    desktop_layout(
        "Promo codes",
        Some(chrome),
        html! {
            main class="container" {
                h1 { "Promo codes" }
                (admin_nav(&chrome.store.slug))

                table {
                    thead { tr { th { "Code" } th { "Discount" } th { "Uses" } th { "Valid" } th { "State" } } }
                    tbody {
                        @for p in promos {
                            tr {
                                td { a href=(format!("{base}/{}", p.id)) { code { (p.code) } } }
                                td { (describe(p, currency)) }
                                td {
                                    (p.uses)
                                    @if let Some(max) = p.max_uses { " / " (max) }
                                }
                                td class="muted" {
                                    (p.starts_at.map(format_date).unwrap_or_else(|| "any time".into()))
                                    " → "
                                    (p.expires_at.map(format_date).unwrap_or_else(|| "no expiry".into()))
                                }
                                td { @if p.is_active { "active" } @else { span class="badge" { "inactive" } } }
                            }
                        }
                    }
                }

                section class="card" style="margin-top: 2rem;" {
                    h3 { "New promo code" }
                    form method="post" action=(base) style="display: grid; gap: 8px; max-width: 420px;" {
                        input name="code" placeholder="CODE" required;
                        input name="percent_off" type="number" min="1" max="100" placeholder="Percent off";
                        input name="flat_off" placeholder="Flat amount off, e.g. 5.00";
                        input name="min_subtotal" placeholder="Minimum subtotal, e.g. 50.00";
                        input name="max_uses" type="number" min="1" placeholder="Maximum uses";
                        label { "Starts " input name="starts_at" type="date"; }
                        label { "Expires " input name="expires_at" type="date"; }
                        label { input type="checkbox" name="once_per_user"; " Once per customer" }
                        button type="submit" { "Create" }
                    }
                }
            }
        },
    )
}

pub fn admin_promo_page(chrome: &Chrome<'_>, scope: &PromoWithScope, products: &[Product]) -> Markup {
    let p = &scope.promo;
    let base = format!("/s/{}/admin/promos/{}", chrome.store.slug, p.id);
    let currency = chrome.store.currency.as_str();
    desktop_layout(
        &p.code,
        Some(chrome),
        html! {
            main class="container" {
                h1 { code { (p.code) } }
                (admin_nav(&chrome.store.slug))

                section class="card" {
                    p { "Discount: " (describe(p, currency)) }
                    @if p.min_subtotal_cents > 0 {
                        p { "Minimum subtotal: " (format_cents(p.min_subtotal_cents, currency)) }
                    }
                    p { "Uses: " (p.uses) @if let Some(max) = p.max_uses { " / " (max) } }
                    @if p.once_per_user { p { "Once per customer" } }
                    form method="post" action=(format!("{base}/toggle")) {
                        button type="submit" { @if p.is_active { "Deactivate" } @else { "Activate" } }
                    }
                }

                section class="card" {
                    h3 { "Allowed customers" }
                    @if scope.allowed_users.is_empty() {
                        p class="muted" { "Everyone may use this code." }
                    }
                    ul {
                        @for (id, email) in &scope.allowed_users {
                            li {
                                (email) " "
                                form class="inline" method="post" action=(format!("{base}/users/{id}/remove")) {
                                    button type="submit" { "remove" }
                                }
                            }
                        }
                    }
                    form method="post" action=(format!("{base}/users")) style="display: flex; gap: 8px;" {
                        input name="email" type="email" placeholder="customer@example.com" required;
                        button type="submit" { "Allow" }
                    }
                }

                section class="card" {
                    h3 { "Excluded products" }
                    ul {
                        @for (id, name) in &scope.excluded_products {
                            li {
                                (name) " "
                                form class="inline" method="post" action=(format!("{base}/exclusions/{id}/remove")) {
                                    button type="submit" { "remove" }
                                }
                            }
                        }
                    }
                    form method="post" action=(format!("{base}/exclusions")) style="display: flex; gap: 8px;" {
                        select name="product_id" {
                            @for prod in products {
                                option value=(prod.id) { (prod.name) }
                            }
                        }
                        button type="submit" { "Exclude" }
                    }
                }
            }
        },
    )
}
