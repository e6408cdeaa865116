// src/domain/validate.rs
//
// Field rules shared by the storefront and admin forms.

use crate::errors::ServerError;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_REVIEW_LEN: usize = 2000;
pub const MAX_CART_QTY: i64 = 99;

/// Lowercase ASCII slug: letters, digits and single dashes.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_dash = true;
    for c in input.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 80
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Trimmed, non-empty, bounded text.
pub fn required_text(field: &str, value: &str, max: usize) -> Result<String, ServerError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ServerError::bad_request(format!("{field} is required")));
    }
    if v.chars().count() > max {
        return Err(ServerError::bad_request(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(v.to_string())
}

/// Trimmed optional text; blank becomes `None`.
pub fn optional_text(field: &str, value: &str, max: usize) -> Result<Option<String>, ServerError> {
    let v = value.trim();
    if v.is_empty() {
        return Ok(None);
    }
    if v.chars().count() > max {
        return Err(ServerError::bad_request(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(Some(v.to_string()))
}

/// Uppercased promo code, 3..=32 of `[A-Z0-9_-]`.
pub fn normalize_promo_code(raw: &str) -> Result<String, ServerError> {
    let code = raw.trim().to_ascii_uppercase();
    let len_ok = (3..=32).contains(&code.len());
    let chars_ok = code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if !len_ok || !chars_ok {
        return Err(ServerError::bad_request(
            "promo code must be 3-32 letters, digits, '-' or '_'",
        ));
    }
    Ok(code)
}

pub fn parse_quantity(raw: &str) -> Result<i64, ServerError> {
    let q: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ServerError::bad_request("quantity must be a whole number"))?;
    if !(0..=MAX_CART_QTY).contains(&q) {
        return Err(ServerError::bad_request(format!(
            "quantity must be between 0 and {MAX_CART_QTY}"
        )));
    }
    Ok(q)
}

pub fn parse_rating(raw: &str) -> Result<i64, ServerError> {
    match raw.trim().parse::<i64>() {
        Ok(r) if (1..=5).contains(&r) => Ok(r),
        _ => Err(ServerError::bad_request("rating must be between 1 and 5")),
    }
}

pub fn parse_id(raw: &str) -> Result<i64, ServerError> {
    raw.trim().parse().map_err(|_| ServerError::NotFound)
}
