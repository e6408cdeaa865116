use maud::{html, Markup};

pub fn email_cta_form(store_slug: &str) -> Markup {
    let action = format!("/s/{store_slug}/auth/request-link");
    html! {
        div class="email-cta-wrapper" {
            form
                method="post"
                action=(action)
                hx-post=(action)
                hx-target="#auth-result"
                hx-swap="innerHTML"
                hx-disabled-elt="button"
                class="email-cta"
            {
                label class="sr-only" for="email" { "Email address" }
                input
                    type="email"
                    id="email"
                    name="email"
                    placeholder="you@domain.com"
                    autocomplete="email"
                    required;

                button type="submit" class="primary" { "Email me a sign-in link" }

                p class="muted" {
                    "We’ll email you a secure sign-in link. No password needed."
                }
            }

            div id="auth-result" {}
        }
    }
}
