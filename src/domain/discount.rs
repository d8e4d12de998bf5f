use super::money::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A discount chosen by the shopper and forwarded to the POS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    pub id: String,
    /// Discount reference understood by the POS.
    pub pos_discount_id: String,
    #[serde(default)]
    pub dollar_value: Option<Money>,
    /// Whole percent, e.g. `20` for 20% off.
    #[serde(default)]
    pub percentage_value: Option<Decimal>,
    pub name: String,
}

/// What the shopper chose to spend against this order.
///
/// Point redemption and reward redemption are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DiscountSelection {
    #[default]
    None,
    /// Redeem loyalty points client-side. Negative or oversized requests are
    /// clamped by the reconciler.
    Points(i64),
    /// Redeem a tier reward; the POS applies it when pricing the preview.
    Reward(AppliedDiscount),
}

impl DiscountSelection {
    pub fn requested_points(&self) -> i64 {
        match self {
            Self::Points(points) => *points,
            Self::None | Self::Reward(_) => 0,
        }
    }

    pub fn reward(&self) -> Option<&AppliedDiscount> {
        match self {
            Self::Reward(discount) => Some(discount),
            Self::None | Self::Points(_) => None,
        }
    }
}

/// A discount as configured for the dispensary (tier rewards and promos).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub dollar_value: Decimal,
    #[serde(default)]
    pub percentage_value: Decimal,
    #[serde(default)]
    pub points_deduction: u64,
    #[serde(default)]
    pub reusable: bool,
    #[serde(default)]
    pub tier_discount: bool,
    #[serde(default)]
    pub available: bool,
    pub pos_discount_id: String,
}

impl Discount {
    fn is_tier(&self) -> bool {
        self.tier_discount && self.points_deduction > 0
    }

    fn has_value(&self) -> bool {
        self.dollar_value > Decimal::ZERO || self.percentage_value > Decimal::ZERO
    }

    pub fn to_applied(&self) -> AppliedDiscount {
        AppliedDiscount {
            id: self.id.clone(),
            pos_discount_id: self.pos_discount_id.clone(),
            dollar_value: (self.dollar_value > Decimal::ZERO).then(|| Money::new(self.dollar_value)),
            percentage_value: (self.percentage_value > Decimal::ZERO).then_some(self.percentage_value),
            name: self.name.clone(),
        }
    }
}

/// Tier rewards the shopper can afford right now, cheapest first.
pub fn available_rewards(discounts: &[Discount], user_points: u64) -> Vec<AppliedDiscount> {
    let mut eligible: Vec<&Discount> = discounts
        .iter()
        .filter(|d| d.is_tier() && d.has_value() && d.points_deduction <= user_points)
        .collect();
    eligible.sort_by_key(|d| d.points_deduction);
    eligible.into_iter().map(Discount::to_applied).collect()
}

/// How a reward is unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unlock {
    Points(u64),
    Available,
    Locked,
}

impl std::fmt::Display for Unlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Points(points) => write!(f, "{points} pts"),
            Self::Available => f.write_str("Available"),
            Self::Locked => f.write_str("Locked"),
        }
    }
}

/// A row of the rewards ladder shown to the shopper.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardTier {
    pub id: String,
    pub label: String,
    pub reward_text: String,
    pub unlock: Unlock,
    pub unlocked: bool,
}

fn reward_text(discount: &Discount) -> String {
    if discount.dollar_value > Decimal::ZERO {
        format!("${} off your order", discount.dollar_value.normalize())
    } else if discount.percentage_value > Decimal::ZERO {
        format!("{}% off your order", discount.percentage_value.normalize())
    } else {
        "Special reward".to_string()
    }
}

/// Builds the rewards ladder: point tiers ascending, then promos by label.
pub fn reward_tiers(discounts: &[Discount], user_points: u64) -> Vec<RewardTier> {
    let mut tiers: Vec<RewardTier> = discounts
        .iter()
        .map(|d| {
            let (unlock, unlocked) = if d.is_tier() {
                (Unlock::Points(d.points_deduction), user_points >= d.points_deduction)
            } else if d.available {
                (Unlock::Available, true)
            } else {
                (Unlock::Locked, false)
            };
            RewardTier {
                id: d.id.clone(),
                label: d.name.clone(),
                reward_text: reward_text(d),
                unlock,
                unlocked,
            }
        })
        .collect();

    tiers.sort_by(|a, b| match (a.unlock, b.unlock) {
        (Unlock::Points(pa), Unlock::Points(pb)) => pa.cmp(&pb),
        (Unlock::Points(_), _) => Ordering::Less,
        (_, Unlock::Points(_)) => Ordering::Greater,
        _ => a.label.cmp(&b.label),
    });
    tiers
}

/// Turns an unlocked ladder row back into the discount to apply.
pub fn redeem(tier: &RewardTier, discounts: &[Discount]) -> Option<AppliedDiscount> {
    if !tier.unlocked {
        return None;
    }
    discounts
        .iter()
        .find(|d| d.id == tier.id)
        .map(Discount::to_applied)
}
