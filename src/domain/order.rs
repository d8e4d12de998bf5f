use super::cart::Cart;
use super::delivery::DeliveryAddress;
use super::money::Money;
use super::pricing::ReconciledTotals;
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    #[default]
    Pickup,
    Delivery,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub size_id: String,
    pub quantity: u32,
    pub apply_automatic_discounts: bool,
}

fn items_of(cart: &Cart) -> Vec<OrderItem> {
    cart.lines()
        .iter()
        .map(|line| OrderItem {
            size_id: line.id.clone(),
            quantity: line.quantity,
            apply_automatic_discounts: true,
        })
        .collect()
}

/// A cart line as sent for pricing, with the price the shopper was shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewLine {
    pub id: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub apply_automatic_discounts: bool,
}

/// What the POS is asked to price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewRequest {
    pub lines: Vec<PreviewLine>,
    pub delivery: bool,
    /// POS discount references to apply on top of automatic discounts.
    pub discount_ids: Vec<String>,
}

impl PreviewRequest {
    pub fn new(cart: &Cart, delivery: bool, discount_id: Option<&str>) -> Self {
        Self {
            lines: cart
                .lines()
                .iter()
                .map(|line| PreviewLine {
                    id: line.id.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price(),
                    apply_automatic_discounts: true,
                })
                .collect(),
            delivery,
            discount_ids: discount_id.map(str::to_string).into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryDetails {
    pub address: DeliveryAddress,
    pub date: NaiveDate,
    /// `HH:MM` start of the chosen slot.
    pub eta_start: String,
}

/// An order submitted to the POS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub order_type: OrderType,
    pub order_source: &'static str,
    pub order_status: &'static str,
    pub delivery: Option<DeliveryDetails>,
    pub customer_id: String,
    pub items: Vec<OrderItem>,
    pub discount_ids: Vec<String>,
    /// Loyalty points spent on this order.
    pub points_redeem: u64,
    /// Loyalty points earned: the final subtotal in whole dollars, and none
    /// when points were spent.
    pub points_add: u64,
}

impl OrderRequest {
    pub fn new(
        cart: &Cart,
        customer_id: impl Into<String>,
        delivery: Option<DeliveryDetails>,
        discount_id: Option<&str>,
    ) -> Self {
        Self {
            order_type: if delivery.is_some() {
                OrderType::Delivery
            } else {
                OrderType::Pickup
            },
            order_source: "ECOMMERCE",
            order_status: "AWAITING_PROCESSING",
            delivery,
            customer_id: customer_id.into(),
            items: items_of(cart),
            discount_ids: discount_id.map(str::to_string).into_iter().collect(),
            points_redeem: 0,
            points_add: 0,
        }
    }

    /// Records the loyalty points spent and earned with these totals.
    pub fn with_loyalty(mut self, totals: &ReconciledTotals) -> Self {
        self.points_redeem = totals.points_redeemed;
        self.points_add = if totals.points_redeemed > 0 {
            0
        } else {
            totals
                .final_subtotal
                .clamp_non_negative()
                .value()
                .floor()
                .to_u64()
                .unwrap_or(u64::MAX)
        };
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReceipt {
    pub order_number: String,
}
