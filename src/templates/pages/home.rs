// templates/pages/home.rs

use crate::db::stores::Store;
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub fn stores_page(stores: &[Store]) -> Markup {
    desktop_layout(
        "Stores",
        None,
        html! {
            main class="container" {
                h1 { "Stores" }
                @if stores.is_empty() {
                    p class="muted" { "No stores yet." }
                }
                div class="grid" {
                    @for store in stores {
                        a class="card" href=(format!("/s/{}", store.slug)) {
                            h3 { (store.name) }
                            p class="muted" { "/s/" (store.slug) }
                        }
                    }
                }
            }
        },
    )
}
