//! Checkout pricing reconciliation.
//!
//! The POS prices the cart first and returns a [`PricingPreview`]. Loyalty
//! points, the premium-member discount and the staff discount are then layered
//! on top of that preview by [`reconcile`], in that order, each one working on
//! the subtotal left by the step before. Tax is never looked up again: the
//! preview's tax-to-subtotal ratio is reapplied to the discounted subtotal.

use super::money::{Money, Rate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Business constants used when reconciling totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Currency value of one loyalty point.
    pub point_value: Decimal,
    pub premium_rate: Rate,
    /// The premium discount applies only to subtotals strictly above this.
    pub premium_threshold: Money,
    pub employee_rate: Rate,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            point_value: dec!(0.05),
            premium_rate: Rate::new(dec!(0.10)).unwrap_or(Rate::ZERO),
            premium_threshold: Money::new(dec!(100)),
            employee_rate: Rate::new(dec!(0.15)).unwrap_or(Rate::ZERO),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Customer,
    Employee,
    Admin,
    Other(String),
}

impl Role {
    pub fn is_staff(&self) -> bool {
        matches!(self, Self::Employee | Self::Admin)
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "customer" | "user" => Self::Customer,
            "employee" => Self::Employee,
            "admin" => Self::Admin,
            _ => Self::Other(value.to_string()),
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Customer => "customer".to_string(),
            Role::Employee => "employee".to_string(),
            Role::Admin => "admin".to_string(),
            Role::Other(other) => other,
        }
    }
}

/// Account attributes that affect pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserFlags {
    pub premium: bool,
    pub role: Role,
}

impl Default for UserFlags {
    fn default() -> Self {
        Self {
            premium: false,
            role: Role::Customer,
        }
    }
}

/// Totals computed by the POS for the cart as it stands right now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPreview {
    pub subtotal: Money,
    pub tax_total: Money,
    #[serde(default)]
    pub discount_total: Money,
    pub total: Money,
}

impl PricingPreview {
    /// Tax as a fraction of the subtotal; zero for a zero subtotal and
    /// `Decimal::MAX` when the quotient is out of range.
    pub fn tax_ratio(&self) -> Decimal {
        let subtotal = self.subtotal.clamp_non_negative();
        if subtotal.is_zero() {
            return Decimal::ZERO;
        }
        self.tax_total
            .clamp_non_negative()
            .value()
            .checked_div(subtotal.value())
            .unwrap_or(Decimal::MAX)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileInput {
    pub preview: PricingPreview,
    /// Raw request from the shopper, before clamping.
    pub points_to_redeem: i64,
    /// Loyalty balance available to spend.
    pub user_points: u64,
    pub user: UserFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledTotals {
    pub final_subtotal: Money,
    pub final_tax: Money,
    pub final_total: Money,
    pub points_redeemed: u64,
    pub points_discount: Money,
    pub premium_discount_applied: bool,
    pub premium_discount_amount: Money,
    pub employee_discount_applied: bool,
    pub employee_discount_amount: Money,
    /// The preview's tax ratio, kept for re-deriving tax after coupons.
    pub tax_ratio: Decimal,
}

/// Upper bound on points redeemable against `preview_subtotal`: never more
/// than the shopper holds, and never more than it takes to cover the subtotal.
pub fn max_redeemable_points(user_points: u64, preview_subtotal: Money, point_value: Decimal) -> u64 {
    if point_value <= Decimal::ZERO {
        return 0;
    }
    let covering = preview_subtotal
        .clamp_non_negative()
        .value()
        .checked_div(point_value)
        .and_then(|points| points.ceil().to_u64())
        .unwrap_or(u64::MAX);
    user_points.min(covering)
}

/// Clamps a raw points request into `[0, max]`.
pub fn clamp_points(requested: i64, max: u64) -> u64 {
    u64::try_from(requested).unwrap_or(0).min(max)
}

/// Applies points, premium and staff discounts to a POS preview and
/// re-derives tax. Pure and infallible.
pub fn reconcile(input: &ReconcileInput, policy: &PricingPolicy) -> ReconciledTotals {
    let preview_subtotal = input.preview.subtotal.clamp_non_negative();
    let max_points = max_redeemable_points(input.user_points, preview_subtotal, policy.point_value);
    let points_redeemed = clamp_points(input.points_to_redeem, max_points);

    let mut subtotal = preview_subtotal;

    let points_discount = Money::new(Decimal::from(points_redeemed).saturating_mul(policy.point_value));
    subtotal = (subtotal - points_discount).clamp_non_negative();

    let mut premium_discount_applied = false;
    let mut premium_discount_amount = Money::ZERO;
    if input.user.premium && subtotal > policy.premium_threshold {
        premium_discount_amount = policy.premium_rate.of(subtotal);
        subtotal -= premium_discount_amount;
        premium_discount_applied = true;
    }

    let mut employee_discount_applied = false;
    let mut employee_discount_amount = Money::ZERO;
    if input.user.role.is_staff() {
        employee_discount_amount = policy.employee_rate.of(subtotal);
        subtotal -= employee_discount_amount;
        employee_discount_applied = true;
    }

    let tax_ratio = input.preview.tax_ratio();
    let final_tax = subtotal * tax_ratio;

    ReconciledTotals {
        final_subtotal: subtotal,
        final_tax,
        final_total: subtotal + final_tax,
        points_redeemed,
        points_discount,
        premium_discount_applied,
        premium_discount_amount,
        employee_discount_applied,
        employee_discount_amount,
        tax_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview(subtotal: Decimal, tax: Decimal) -> PricingPreview {
        PricingPreview {
            subtotal: Money::new(subtotal),
            tax_total: Money::new(tax),
            discount_total: Money::ZERO,
            total: Money::new(subtotal + tax),
        }
    }

    fn input(subtotal: Decimal, tax: Decimal, points: i64, user_points: u64, premium: bool, role: &str) -> ReconcileInput {
        ReconcileInput {
            preview: preview(subtotal, tax),
            points_to_redeem: points,
            user_points,
            user: UserFlags {
                premium,
                role: Role::from(role),
            },
        }
    }

    #[test]
    fn test_premium_customer_with_points() {
        let totals = reconcile(
            &input(dec!(200), dec!(20), 100, 1_000, true, "customer"),
            &PricingPolicy::default(),
        );

        assert_eq!(totals.points_redeemed, 100);
        assert_eq!(totals.points_discount, Money::new(dec!(5)));
        assert!(totals.premium_discount_applied);
        assert_eq!(totals.premium_discount_amount, Money::new(dec!(19.5)));
        assert!(!totals.employee_discount_applied);
        assert_eq!(totals.final_subtotal, Money::new(dec!(175.5)));
        assert_eq!(totals.final_tax, Money::new(dec!(17.55)));
        assert_eq!(totals.final_total, Money::new(dec!(193.05)));
    }

    #[test]
    fn test_employee_discount_without_points() {
        let totals = reconcile(
            &input(dec!(50), dec!(5), 0, 0, false, "employee"),
            &PricingPolicy::default(),
        );

        assert!(!totals.premium_discount_applied);
        assert_eq!(totals.premium_discount_amount, Money::ZERO);
        assert!(totals.employee_discount_applied);
        assert_eq!(totals.employee_discount_amount, Money::new(dec!(7.5)));
        assert_eq!(totals.final_subtotal, Money::new(dec!(42.5)));
        assert_eq!(totals.final_tax, Money::new(dec!(4.25)));
        assert_eq!(totals.final_total, Money::new(dec!(46.75)));
    }

    #[test]
    fn test_premium_and_staff_compound() {
        let totals = reconcile(
            &input(dec!(200), dec!(0), 0, 0, true, "admin"),
            &PricingPolicy::default(),
        );

        // 200 -> 180 after premium -> 153 after staff
        assert_eq!(totals.premium_discount_amount, Money::new(dec!(20)));
        assert_eq!(totals.employee_discount_amount, Money::new(dec!(27)));
        assert_eq!(totals.final_subtotal, Money::new(dec!(153)));
        assert_eq!(totals.final_total, Money::new(dec!(153)));
    }

    #[test]
    fn test_premium_threshold_is_strict_and_post_points() {
        let policy = PricingPolicy::default();

        let at_threshold = reconcile(&input(dec!(100), dec!(10), 0, 0, true, "customer"), &policy);
        assert!(!at_threshold.premium_discount_applied);
        assert_eq!(at_threshold.final_subtotal, Money::new(dec!(100)));

        // 110 - 20 points * 0.05 = 109 still above; 110 - 400 * 0.05 = 90 below
        let above = reconcile(&input(dec!(110), dec!(11), 20, 1_000, true, "customer"), &policy);
        assert!(above.premium_discount_applied);
        let below = reconcile(&input(dec!(110), dec!(11), 400, 1_000, true, "customer"), &policy);
        assert!(!below.premium_discount_applied);
        assert_eq!(below.final_subtotal, Money::new(dec!(90)));
    }

    #[test]
    fn test_points_clamped_to_balance_and_subtotal() {
        let policy = PricingPolicy::default();

        // 10 currency units need 200 points; shopper holds 150
        let limited = reconcile(&input(dec!(10), dec!(1), 10_000, 150, false, "customer"), &policy);
        assert_eq!(limited.points_redeemed, 150);
        assert_eq!(limited.final_subtotal, Money::new(dec!(2.5)));

        // plenty of points, bound by the subtotal
        let covered = reconcile(&input(dec!(10), dec!(1), 10_000, 50_000, false, "customer"), &policy);
        assert_eq!(covered.points_redeemed, 200);
        assert_eq!(covered.final_subtotal, Money::ZERO);
        assert_eq!(covered.final_total, Money::ZERO);
    }

    #[test]
    fn test_negative_points_request_is_zero() {
        let totals = reconcile(
            &input(dec!(40), dec!(4), -25, 500, false, "customer"),
            &PricingPolicy::default(),
        );
        assert_eq!(totals.points_redeemed, 0);
        assert_eq!(totals.final_subtotal, Money::new(dec!(40)));
    }

    #[test]
    fn test_zero_subtotal_has_zero_tax_ratio() {
        let totals = reconcile(
            &input(dec!(0), dec!(3), 10, 100, true, "employee"),
            &PricingPolicy::default(),
        );
        assert_eq!(totals.tax_ratio, Decimal::ZERO);
        assert_eq!(totals.points_redeemed, 0);
        assert_eq!(totals.final_tax, Money::ZERO);
        assert_eq!(totals.final_total, Money::ZERO);
    }

    #[test]
    fn test_ceil_on_fractional_subtotal() {
        // 10.01 / 0.05 = 200.2 -> 201 points
        assert_eq!(
            max_redeemable_points(1_000, Money::new(dec!(10.01)), dec!(0.05)),
            201
        );
        assert_eq!(max_redeemable_points(1_000, Money::new(dec!(10)), Decimal::ZERO), 0);
    }

    #[test]
    fn test_clamp_points() {
        assert_eq!(clamp_points(-1, 10), 0);
        assert_eq!(clamp_points(5, 10), 5);
        assert_eq!(clamp_points(i64::MAX, 10), 10);
    }

    #[test]
    fn test_tax_ratio_preserved() {
        let policy = PricingPolicy::default();
        for (subtotal, tax, points, premium, role) in [
            (dec!(123.45), dec!(11.11), 37, true, "customer"),
            (dec!(999.99), dec!(88.88), 0, true, "admin"),
            (dec!(17.3), dec!(2.07), 12, false, "employee"),
        ] {
            let totals = reconcile(&input(subtotal, tax, points, 10_000, premium, role), &policy);
            let expected = tax / subtotal;
            let actual = totals.final_tax.value() / totals.final_subtotal.value();
            assert!((actual - expected).abs() < dec!(0.0000000001));
            assert!(totals.final_total >= Money::ZERO);
        }
    }

    #[test]
    fn test_out_of_range_values_saturate() {
        let tiny_subtotal = ReconcileInput {
            preview: PricingPreview {
                subtotal: Money::new(dec!(0.0000000000000000000001)),
                tax_total: Money::new(dec!(100000000000)),
                discount_total: Money::ZERO,
                total: Money::new(dec!(100000000000)),
            },
            points_to_redeem: 0,
            user_points: 0,
            user: UserFlags::default(),
        };
        let totals = reconcile(&tiny_subtotal, &PricingPolicy::default());
        assert_eq!(totals.tax_ratio, Decimal::MAX);
        assert!(totals.final_total >= Money::ZERO);

        let huge_subtotal = ReconcileInput {
            preview: PricingPreview {
                subtotal: Money::new(Decimal::MAX),
                tax_total: Money::ZERO,
                discount_total: Money::ZERO,
                total: Money::new(Decimal::MAX),
            },
            points_to_redeem: i64::MAX,
            user_points: u64::MAX,
            user: UserFlags {
                premium: true,
                role: Role::Employee,
            },
        };
        let totals = reconcile(&huge_subtotal, &PricingPolicy::default());
        assert_eq!(totals.points_redeemed, i64::MAX as u64);
        assert!(totals.premium_discount_applied);
        assert!(totals.final_total > Money::ZERO);
    }

    #[test]
    fn test_other_role_gets_no_staff_discount() {
        let totals = reconcile(
            &input(dec!(60), dec!(6), 0, 0, false, "budtender"),
            &PricingPolicy::default(),
        );
        assert!(!totals.employee_discount_applied);
        assert_eq!(totals.final_total, Money::new(dec!(66)));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(Role::from("Employee"), Role::Employee);
        assert_eq!(Role::from(" admin "), Role::Admin);
        assert_eq!(Role::from("customer"), Role::Customer);
        assert_eq!(Role::from("vip"), Role::Other("vip".to_string()));
    }
}
