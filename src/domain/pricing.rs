// src/domain/pricing.rs

use serde::Serialize;
use thiserror::Error;

/// What a customer is allowed to see about a product's price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceDisplay {
    Fixed { cents: i64 },
    Negotiable { list_cents: i64 },
    OnRequest,
}

impl PriceDisplay {
    pub fn for_product(price_cents: i64, negotiable: bool, hidden: bool) -> Self {
        if hidden {
            PriceDisplay::OnRequest
        } else if negotiable {
            PriceDisplay::Negotiable {
                list_cents: price_cents,
            }
        } else {
            PriceDisplay::Fixed { cents: price_cents }
        }
    }

    /// Price the customer pays without admin review, if any.
    pub fn checkout_price(&self) -> Option<i64> {
        match self {
            PriceDisplay::Fixed { cents } => Some(*cents),
            _ => None,
        }
    }

    /// Price that may be shown publicly.
    pub fn visible_cents(&self) -> Option<i64> {
        match self {
            PriceDisplay::Fixed { cents } => Some(*cents),
            PriceDisplay::Negotiable { list_cents } => Some(*list_cents),
            PriceDisplay::OnRequest => None,
        }
    }

    pub fn is_special(&self) -> bool {
        !matches!(self, PriceDisplay::Fixed { .. })
    }
}

/// One order or cart line as the pricing rules see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: Option<i64>,
    pub quantity: i64,
    /// `None` while the line awaits an admin quote.
    pub unit_price_cents: Option<i64>,
}

impl PricedLine {
    pub fn total(&self) -> Option<i64> {
        self.unit_price_cents.map(|p| p.saturating_mul(self.quantity))
    }
}

/// Promo code rules, detached from storage.
#[derive(Debug, Clone, Default)]
pub struct PromoRules {
    pub flat_off_cents: Option<i64>,
    pub percent_off: Option<i64>,
    pub min_subtotal_cents: i64,
    pub max_uses: Option<i64>,
    pub uses: i64,
    pub once_per_user: bool,
    pub starts_at: Option<i64>,
    pub expires_at: Option<i64>,
    pub is_active: bool,
    pub allowed_user_ids: Vec<i64>,
    pub excluded_product_ids: Vec<i64>,
}

/// Facts about the customer needed to decide eligibility.
#[derive(Debug, Clone, Copy)]
pub struct PromoContext {
    pub user_id: i64,
    pub now: i64,
    /// Live orders of this user already using the code (excluding the one being priced).
    pub prior_uses_by_user: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromoRejection {
    #[error("promo code not found")]
    Unknown,
    #[error("promo code is not active")]
    Inactive,
    #[error("promo code is not valid yet")]
    NotStarted,
    #[error("promo code has expired")]
    Expired,
    #[error("promo code has reached its usage limit")]
    Exhausted,
    #[error("promo code is not available for this account")]
    NotForUser,
    #[error("promo code has already been used on another order")]
    AlreadyUsed,
    #[error("order subtotal is below the promo minimum of {min_cents} cents")]
    BelowMinimum { min_cents: i64 },
    #[error("promo code does not apply to any item in this order")]
    NothingEligible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OrderTotals {
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub has_unpriced: bool,
}

pub fn subtotal(lines: &[PricedLine]) -> i64 {
    lines
        .iter()
        .filter_map(PricedLine::total)
        .fold(0i64, i64::saturating_add)
}

pub fn has_unpriced(lines: &[PricedLine]) -> bool {
    lines.iter().any(|l| l.unit_price_cents.is_none())
}

/// Checks everything about a code except the order amounts.
pub fn check_eligibility(rules: &PromoRules, ctx: &PromoContext) -> Result<(), PromoRejection> {
    if !rules.is_active {
        return Err(PromoRejection::Inactive);
    }
    if rules.starts_at.is_some_and(|s| ctx.now < s) {
        return Err(PromoRejection::NotStarted);
    }
    if rules.expires_at.is_some_and(|e| ctx.now >= e) {
        return Err(PromoRejection::Expired);
    }
    if rules.max_uses.is_some_and(|max| rules.uses >= max) {
        return Err(PromoRejection::Exhausted);
    }
    if !rules.allowed_user_ids.is_empty() && !rules.allowed_user_ids.contains(&ctx.user_id) {
        return Err(PromoRejection::NotForUser);
    }
    if rules.once_per_user && ctx.prior_uses_by_user > 0 {
        return Err(PromoRejection::AlreadyUsed);
    }
    Ok(())
}

/// Discount in cents for the priced lines. Percent applies first, the flat amount on top,
/// and the result never exceeds the eligible amount.
pub fn compute_discount(rules: &PromoRules, lines: &[PricedLine]) -> Result<i64, PromoRejection> {
    let order_subtotal = subtotal(lines);
    if order_subtotal < rules.min_subtotal_cents {
        return Err(PromoRejection::BelowMinimum {
            min_cents: rules.min_subtotal_cents,
        });
    }

    let eligible: i64 = lines
        .iter()
        .filter(|l| {
            l.product_id
                .map_or(true, |id| !rules.excluded_product_ids.contains(&id))
        })
        .filter_map(PricedLine::total)
        .fold(0i64, i64::saturating_add);

    if eligible <= 0 {
        return Err(PromoRejection::NothingEligible);
    }

    let percent_part = rules
        .percent_off
        .map(|pct| percent_of(eligible, pct.clamp(0, 100)))
        .unwrap_or(0);
    let flat_part = rules.flat_off_cents.unwrap_or(0).max(0);

    Ok(percent_part.saturating_add(flat_part).min(eligible))
}

/// Totals for a set of lines with an optional code. A code that no longer
/// yields a discount (minimum unmet, nothing eligible) prices at zero.
pub fn price_lines(lines: &[PricedLine], promo: Option<&PromoRules>) -> OrderTotals {
    let subtotal_cents = subtotal(lines);
    let discount_cents = promo
        .and_then(|rules| compute_discount(rules, lines).ok())
        .unwrap_or(0);

    OrderTotals {
        subtotal_cents,
        discount_cents,
        total_cents: subtotal_cents.saturating_sub(discount_cents).max(0),
        has_unpriced: has_unpriced(lines),
    }
}

/// `amount * pct / 100` rounded half up, widened so large amounts cannot overflow.
fn percent_of(amount: i64, pct: i64) -> i64 {
    let scaled = (i128::from(amount) * i128::from(pct) + 50) / 100;
    i64::try_from(scaled).unwrap_or(i64::MAX)
}
