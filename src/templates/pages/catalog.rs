// templates/pages/catalog.rs

use crate::db::products::{Category, Product, ProductPage, ProductQuery, ProductSort};
use crate::db::reviews::{RatingSummary, Review};
use crate::domain::validate::MAX_REVIEW_LEN;
use crate::templates::components::{pagination, price_tag};
use crate::templates::{desktop_layout, Chrome};
use maud::{html, Markup};

pub struct CatalogVm<'a> {
    pub page: &'a ProductPage,
    pub categories: &'a [Category],
    pub query: &'a ProductQuery,
    /// Current filters as a query string, without `page`.
    pub filter_query: String,
}

const SORTS: [(ProductSort, &str); 4] = [
    (ProductSort::Newest, "Newest"),
    (ProductSort::Name, "Name"),
    (ProductSort::PriceAsc, "Price: low to high"),
    (ProductSort::PriceDesc, "Price: high to low"),
];

pub fn catalog_page(chrome: &Chrome<'_>, vm: &CatalogVm<'_>) -> Markup {
    let base = format!("/s/{}", chrome.store.slug);
    let selected_category = vm.query.category_slug.as_deref();
    desktop_layout(
        "Catalog",
        Some(chrome),
        html! {
            main class="container" {
                h1 { (chrome.store.name) }

                form method="get" action=(base) style="display: flex; gap: 8px; margin-bottom: 1.5rem;" {
                    input type="search" name="q" placeholder="Search products"
                        value=(vm.query.search.as_deref().unwrap_or(""));
                    select name="category" {
                        option value="" { "All categories" }
                        @for c in vm.categories {
                            option value=(c.slug) selected[selected_category == Some(c.slug.as_str())] { (c.name) }
                        }
                    }
                    select name="sort" {
                        @for (sort, label) in SORTS {
                            option value=(sort.as_str()) selected[vm.query.sort == sort] { (label) }
                        }
                    }
                    button type="submit" { "Filter" }
                }

                p class="muted" { (vm.page.total) " products" }

                div class="grid" {
                    @for p in &vm.page.products {
                        (product_card(&base, p, &chrome.store.currency))
                    }
                }

                (pagination(&base, &vm.filter_query, vm.page.page, vm.page.page_count))
            }
        },
    )
}

fn product_card(base: &str, p: &Product, currency: &str) -> Markup {
    html! {
        a class="card" href=(format!("{base}/products/{}", p.slug)) {
            @if let Some(img) = &p.image_url {
                img src=(img) alt=(p.name) style="width: 100%; height: 160px; object-fit: cover;";
            }
            h3 { (p.name) }
            (price_tag(p.price_display(), currency))
            @if p.stock == Some(0) {
                p class="error" { "Out of stock" }
            }
        }
    }
}

pub struct ProductVm<'a> {
    pub product: &'a Product,
    pub category: Option<&'a Category>,
    pub reviews: &'a [Review],
    pub summary: RatingSummary,
    /// The signed-in user bought this product and may review it.
    pub can_review: bool,
    pub own_review: Option<&'a Review>,
}

pub fn product_page(chrome: &Chrome<'_>, vm: &ProductVm<'_>) -> Markup {
    let base = format!("/s/{}", chrome.store.slug);
    let p = vm.product;
    desktop_layout(
        &p.name,
        Some(chrome),
        html! {
            main class="container" {
                p { a href=(base) { "← Back to catalog" } }
                h1 { (p.name) }
                @if let Some(c) = vm.category {
                    p class="muted" {
                        a href=(format!("{base}?category={}", c.slug)) { (c.name) }
                    }
                }
                @if let Some(img) = &p.image_url {
                    img src=(img) alt=(p.name) style="max-width: 480px; width: 100%;";
                }
                p { (price_tag(p.price_display(), &chrome.store.currency)) }
                @if p.is_special() {
                    p class="muted" { "The final price of this item is confirmed by the store after you order." }
                }
                p { (p.description) }

                @match (chrome.user, p.stock) {
                    (_, Some(0)) => p class="error" { "Out of stock" },
                    (Some(_), stock) => form method="post" action=(format!("{base}/cart/add")) {
                        input type="hidden" name="product_id" value=(p.id);
                        input type="number" name="quantity" value="1" min="1" max=(stock.unwrap_or(99).min(99));
                        " "
                        button type="submit" { "Add to cart" }
                    },
                    (None, _) => p { a href=(format!("{base}/login")) { "Sign in to order" } },
                }

                section class="card" {
                    h3 {
                        "Reviews "
                        @if let Some(avg) = vm.summary.average {
                            span class="muted" { (format!("{avg:.1}")) " / 5 from " (vm.summary.count) }
                        }
                    }
                    @if vm.reviews.is_empty() {
                        p class="muted" { "No reviews yet." }
                    }
                    @for r in vm.reviews {
                        div style="margin-bottom: 1rem;" {
                            strong { (stars(r.rating)) }
                            @if !r.body.is_empty() { p { (r.body) } }
                        }
                    }

                    @if vm.can_review {
                        (review_form(&base, p, vm.own_review))
                    }
                }
            }
        },
    )
}

fn stars(rating: i64) -> String {
    let r = rating.clamp(0, 5) as usize;
    format!("{}{}", "★".repeat(r), "☆".repeat(5 - r))
}

fn review_form(base: &str, p: &Product, own: Option<&Review>) -> Markup {
    let rating = own.map(|r| r.rating).unwrap_or(5);
    html! {
        h4 { @if own.is_some() { "Edit your review" } @else { "Write a review" } }
        @if let Some(r) = own {
            p class="muted" { "Status: " (r.status.as_str()) }
        }
        form method="post" action=(format!("{base}/products/{}/reviews", p.slug)) {
            select name="rating" {
                @for n in (1..=5).rev() {
                    option value=(n) selected[n == rating] { (stars(n)) }
                }
            }
            br;
            textarea name="body" rows="4" cols="60" maxlength=(MAX_REVIEW_LEN) {
                (own.map(|r| r.body.as_str()).unwrap_or(""))
            }
            br;
            button type="submit" { "Submit review" }
        }
    }
}
