use crate::domain::money::{Money, Rate};
use crate::domain::order::PreviewRequest;
use crate::domain::ports::PricingPreviewService;
use crate::domain::pricing::PricingPreview;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

/// Prices a cart locally at a single tax rate, standing in for the POS
/// preview when no POS is reachable.
///
/// Known POS discount ids take a fixed dollar amount off the subtotal;
/// unknown ids are ignored.
#[derive(Debug, Clone, Default)]
pub struct FlatRatePreview {
    tax_rate: Rate,
    rewards: HashMap<String, Money>,
}

impl FlatRatePreview {
    pub fn new(tax_rate: Rate) -> Self {
        Self {
            tax_rate,
            rewards: HashMap::new(),
        }
    }

    pub fn with_reward(mut self, pos_discount_id: impl Into<String>, amount: Money) -> Self {
        self.rewards.insert(pos_discount_id.into(), amount);
        self
    }
}

#[async_trait]
impl PricingPreviewService for FlatRatePreview {
    async fn preview(&self, request: &PreviewRequest) -> Result<PricingPreview> {
        let gross = request
            .lines
            .iter()
            .fold(Money::ZERO, |acc, line| acc + line.unit_price * line.quantity);

        let discount_total = request
            .discount_ids
            .iter()
            .filter_map(|id| self.rewards.get(id))
            .fold(Money::ZERO, |acc, amount| acc + *amount)
            .min(gross);

        let subtotal = gross - discount_total;
        let tax_total = self.tax_rate.of(subtotal);

        debug!(%subtotal, %tax_total, %discount_total, "Flat-rate preview");

        Ok(PricingPreview {
            subtotal,
            tax_total,
            discount_total,
            total: subtotal + tax_total,
        })
    }
}
