use super::money::Money;
use crate::error::StorefrontError;
use serde::{Deserialize, Serialize};

/// A single product line in a shopper's cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// POS product (size) identifier.
    pub id: String,
    pub title: String,
    pub brand: String,
    pub category: String,
    /// Regular unit price.
    pub price: Money,
    /// Active sale price, overriding `price` while the sale runs.
    #[serde(default)]
    pub sale_price: Option<Money>,
    /// Always at least 1.
    pub quantity: u32,
}

impl CartLine {
    pub fn new(id: impl Into<String>, price: Money, quantity: u32) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            brand: String::new(),
            category: String::new(),
            price,
            sale_price: None,
            quantity,
        }
    }

    /// The price actually charged for one unit.
    pub fn unit_price(&self) -> Money {
        self.sale_price.unwrap_or(self.price)
    }

    pub fn line_total(&self) -> Money {
        self.unit_price() * self.quantity
    }
}

/// The contents of a cart. Lines are unique by product id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn get(&self, id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// Adds a line, or increases the quantity of the existing line for the
    /// same product.
    pub fn add(&mut self, line: CartLine) -> Result<(), StorefrontError> {
        if line.quantity == 0 {
            return Err(StorefrontError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }

        match self.lines.iter_mut().find(|existing| existing.id == line.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(line.quantity);
            }
            None => self.lines.push(line),
        }
        Ok(())
    }

    /// Sets the quantity of a line. Zero or negative removes the line.
    ///
    /// Returns `false` when no line matches `id`.
    pub fn set_quantity(&mut self, id: &str, quantity: i64) -> bool {
        let Some(index) = self.lines.iter().position(|line| line.id == id) else {
            return false;
        };

        if quantity <= 0 {
            self.lines.remove(index);
        } else {
            self.lines[index].quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
        true
    }

    /// Removes the line for `id`, returning whether one was present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.id != id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of line totals at current (sale-aware) unit prices.
    pub fn subtotal(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::ZERO, |acc, line| acc + line.line_total())
    }

    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }
}
