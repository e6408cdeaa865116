// src/domain/money.rs

/// Formats minor units for display, e.g. `1234, "USD"` -> `$12.34`.
pub fn format_cents(cents: i64, currency: &str) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let amount = format!("{}.{:02}", abs / 100, abs % 100);
    match currency {
        "USD" | "CAD" | "AUD" => format!("{sign}${amount}"),
        "EUR" => format!("{sign}€{amount}"),
        "GBP" => format!("{sign}£{amount}"),
        other => format!("{sign}{amount} {other}"),
    }
}

/// Largest unit price or discount amount accepted from a form: 10 million in major units.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;

/// Parses a decimal price typed into a form (`12`, `12.5`, `12.34`, `$1,200.00`) into cents.
pub fn parse_price(input: &str) -> Result<i64, String> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();

    if cleaned.is_empty() {
        return Err("price is required".into());
    }
    if cleaned.starts_with('-') {
        return Err("price cannot be negative".into());
    }

    let (whole, frac) = match cleaned.split_once('.') {
        Some((w, f)) => (w, f),
        None => (cleaned.as_str(), ""),
    };

    if frac.len() > 2 {
        return Err("price has more than two decimals".into());
    }
    let whole = if whole.is_empty() { "0" } else { whole };
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("invalid price: {input}"));
    }

    let whole: i64 = whole
        .parse()
        .map_err(|_| format!("price too large: {input}"))?;
    let frac_cents: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().unwrap_or(0) * 10,
        _ => frac.parse::<i64>().unwrap_or(0),
    };

    whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(frac_cents))
        .filter(|&c| c <= MAX_PRICE_CENTS)
        .ok_or_else(|| format!("price too large: {input}"))
}

/// Renders cents back into the plain decimal form used by edit forms.
pub fn cents_to_input(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_known_and_unknown_currencies() {
        assert_eq!(format_cents(1234, "USD"), "$12.34");
        assert_eq!(format_cents(5, "EUR"), "€0.05");
        assert_eq!(format_cents(100000, "JPY"), "1000.00 JPY");
        assert_eq!(format_cents(-250, "USD"), "-$2.50");
    }

    #[test]
    fn parses_form_prices() {
        assert_eq!(parse_price("12").unwrap(), 1200);
        assert_eq!(parse_price("12.5").unwrap(), 1250);
        assert_eq!(parse_price(" $1,200.07 ").unwrap(), 120007);
        assert_eq!(parse_price(".99").unwrap(), 99);
    }

    #[test]
    fn rejects_bad_prices() {
        assert!(parse_price("").is_err());
        assert!(parse_price("-1").is_err());
        assert!(parse_price("1.234").is_err());
        assert!(parse_price("abc").is_err());
        assert!(parse_price("99999999999999999999").is_err());
        assert!(parse_price("1000000000000000").is_err());
    }

    #[test]
    fn price_cap_is_inclusive() {
        assert_eq!(parse_price("10000000").unwrap(), MAX_PRICE_CENTS);
        assert!(parse_price("10000000.01").is_err());
    }

    #[test]
    fn input_form_round_trips() {
        assert_eq!(parse_price(&cents_to_input(4099)).unwrap(), 4099);
    }
}
