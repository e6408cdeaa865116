use maud::{html, Markup};

/// Partial swapped in place of the sign-in form.
pub fn check_email_content(email: &str, store_slug: &str) -> Markup {
    html! {
        div class="card" style="text-align: center;" {
            h3 { "Check your email" }
            p class="muted" {
                "We sent a sign-in link to "
                strong { (email) }
                "."
            }
            p class="muted" { "Click the link in the email to sign in." }
            a href=(format!("/s/{store_slug}/login")) { "Try with a different email" }
        }
    }
}
