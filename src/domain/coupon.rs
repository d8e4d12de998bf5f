use super::money::{Money, Rate};
use super::pricing::ReconciledTotals;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CouponError {
    #[error("Enter a code.")]
    EmptyCode,
    #[error("Invalid code.")]
    InvalidCode,
}

/// Promo codes and the fraction each takes off the subtotal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CouponBook {
    codes: HashMap<String, Rate>,
}

impl CouponBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: &str, rate: Rate) {
        self.codes.insert(normalize(code), rate);
    }

    pub fn rate(&self, code: &str) -> Option<Rate> {
        self.codes.get(&normalize(code)).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CouponOutcome {
    pub totals: ReconciledTotals,
    pub discount: Money,
}

impl CouponOutcome {
    pub fn message(&self) -> String {
        format!("Coupon applied! -{:.2}", self.discount.round_cents().value())
    }
}

/// Takes a coupon's rate off the already reconciled subtotal and re-derives
/// tax with the preview's ratio.
pub fn apply_coupon(
    totals: &ReconciledTotals,
    code: &str,
    book: &CouponBook,
) -> Result<CouponOutcome, CouponError> {
    if code.trim().is_empty() {
        return Err(CouponError::EmptyCode);
    }
    let rate = book.rate(code).ok_or(CouponError::InvalidCode)?;

    let discount = rate.of(totals.final_subtotal);
    let mut totals = totals.clone();
    totals.final_subtotal = (totals.final_subtotal - discount).clamp_non_negative();
    totals.final_tax = totals.final_subtotal * totals.tax_ratio;
    totals.final_total = totals.final_subtotal + totals.final_tax;

    Ok(CouponOutcome { totals, discount })
}
