use crate::db::stores::Store;
use crate::db::users::User;
use maud::{html, Markup, PreEscaped, DOCTYPE};

/// Header context for pages rendered inside a store.
pub struct Chrome<'a> {
    pub store: &'a Store,
    pub user: Option<&'a User>,
    pub cart_count: i64,
}

const BASE_CSS: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #1f2937; }
header { display: flex; align-items: center; justify-content: space-between; padding: 12px 24px; box-shadow: 0 1px 3px rgba(0,0,0,.1); }
header nav ul { display: flex; gap: 16px; list-style: none; margin: 0; padding: 0; align-items: center; }
main.container { max-width: 1080px; margin: 2rem auto; padding: 0 1rem; }
main.narrow { max-width: 560px; }
.card { border: 1px solid #e5e7eb; border-radius: 8px; padding: 1rem 1.25rem; margin-bottom: 1.5rem; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 1rem; }
table { width: 100%; border-collapse: collapse; }
th, td { padding: 8px; border-bottom: 1px solid #f3f4f6; text-align: left; }
th { border-bottom: 2px solid #e5e7eb; }
.badge { padding: 2px 6px; border-radius: 4px; font-size: .85em; background: #e5e7eb; }
.muted { color: #6b7280; font-size: .9em; }
.error { color: #dc2626; }
form.inline { display: inline; margin: 0; }
"#;

pub fn desktop_layout(title: &str, chrome: Option<&Chrome<'_>>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title {
                    (title)
                    @if let Some(c) = chrome { " · " (c.store.name) }
                }
                style { (PreEscaped(BASE_CSS)) }
                script src="https://unpkg.com/htmx.org@1.9.12" defer {}
            }
            body {
                @match chrome {
                    Some(c) => (store_header(c)),
                    None => header { a href="/" { strong { "Storefront" } } },
                }
                (content)
            }
        }
    }
}

fn store_header(c: &Chrome<'_>) -> Markup {
    let base = format!("/s/{}", c.store.slug);
    html! {
        header {
            a href=(base) { strong { (c.store.name) } }
            nav {
                ul {
                    li { a href=(base) { "Catalog" } }
                    @if let Some(user) = c.user {
                        li { a href=(format!("{base}/cart")) { "Cart (" (c.cart_count) ")" } }
                        li { a href=(format!("{base}/orders")) { "My orders" } }
                        @if user.is_admin {
                            li { a href=(format!("{base}/admin")) { "Admin" } }
                        }
                        li class="muted" { (user.email) }
                        li {
                            form class="inline" method="post" action=(format!("{base}/logout")) {
                                button type="submit" { "Sign out" }
                            }
                        }
                    } @else {
                        li { a href=(format!("{base}/login")) { "Sign in" } }
                    }
                }
            }
        }
    }
}
