use crate::db::products::{Category, Product};
use crate::domain::money::cents_to_input;
use crate::templates::components::price_tag;
use crate::templates::pages::admin::admin_nav;
use crate::templates::{desktop_layout, Chrome};
use maud::{html, Markup};

pub fn admin_products_page(chrome: &Chrome<'_>, products: &[Product], categories: &[Category]) -> Markup {
    let base = format!("/s/{}/admin", chrome.store.slug);
    desktop_layout(
        "Products",
        Some(chrome),
        html! {
            main class="container" {
                h1 { "Products" }
                (admin_nav(&chrome.store.slug))
                p { a href=(format!("{base}/products/new")) { "+ New product" } }

                table {
                    thead { tr { th { "Name" } th { "Price" } th { "Stock" } th { "State" } th {} } }
                    tbody {
                        @for p in products {
                            tr {
                                td { a href=(format!("{base}/products/{}/edit", p.id)) { (p.name) } }
                                td { (price_tag(p.price_display(), &chrome.store.currency)) }
                                td {
                                    @match p.stock {
                                        Some(n) => (n),
                                        None => span class="muted" { "untracked" },
                                    }
                                }
                                td {
                                    @if p.is_archived { span class="badge" { "archived" } } @else { "live" }
                                }
                                td {
                                    @let action = if p.is_archived { "unarchive" } else { "archive" };
                                    form class="inline" method="post" action=(format!("{base}/products/{}/{action}", p.id)) {
                                        button type="submit" { (action) }
                                    }
                                }
                            }
                        }
                    }
                }

                section class="card" style="margin-top: 2rem;" {
                    h3 { "Categories" }
                    ul {
                        @for c in categories {
                            li { (c.name) " " span class="muted" { "(" (c.slug) ")" } }
                        }
                    }
                    form method="post" action=(format!("{base}/categories")) style="display: flex; gap: 8px;" {
                        input name="name" placeholder="Category name" required;
                        input name="slug" placeholder="slug (optional)";
                        button type="submit" { "Add category" }
                    }
                }
            }
        },
    )
}

/// Create form when `product` is `None`, edit form otherwise.
pub fn product_form_page(chrome: &Chrome<'_>, product: Option<&Product>, categories: &[Category]) -> Markup {
    let base = format!("/s/{}/admin/products", chrome.store.slug);
    let (title, action) = match product {
        Some(p) => (format!("Edit {}", p.name), format!("{base}/{}", p.id)),
        None => ("New product".to_string(), base.clone()),
    };
    let category_id = product.and_then(|p| p.category_id);

    desktop_layout(
        &title,
        Some(chrome),
        html! {
            main class="container narrow" {
                h1 { (title) }
                (admin_nav(&chrome.store.slug))
                form method="post" action=(action) style="display: grid; gap: 10px;" {
                    label { "Name " input name="name" required value=(product.map(|p| p.name.as_str()).unwrap_or("")); }
                    label { "Slug " input name="slug" placeholder="derived from the name" value=(product.map(|p| p.slug.as_str()).unwrap_or("")); }
                    label {
                        "Category "
                        select name="category_id" {
                            option value="" { "None" }
                            @for c in categories {
                                option value=(c.id) selected[category_id == Some(c.id)] { (c.name) }
                            }
                        }
                    }
                    label { "Price " input name="price" required placeholder="12.34" value=(product.map(|p| cents_to_input(p.price_cents)).unwrap_or_default()); }
                    label { "Stock " input name="stock" type="number" min="0" placeholder="blank = untracked" value=(product.and_then(|p| p.stock).map(|s| s.to_string()).unwrap_or_default()); }
                    label { input type="checkbox" name="negotiable_price" checked[product.is_some_and(|p| p.negotiable_price)]; " Negotiable price" }
                    label { input type="checkbox" name="hide_price" checked[product.is_some_and(|p| p.hide_price)]; " Hide price (price on request)" }
                    label { "Image URL " input name="image_url" type="url" value=(product.and_then(|p| p.image_url.as_deref()).unwrap_or("")); }
                    label {
                        "Description"
                        textarea name="description" rows="6" { (product.map(|p| p.description.as_str()).unwrap_or("")) }
                    }
                    button type="submit" { "Save" }
                }
            }
        },
    )
}
