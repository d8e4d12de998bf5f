use crate::domain::cart::CartLine;
use crate::domain::money::Money;
use crate::error::{Result, StorefrontError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct CartRow {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    brand: String,
    #[serde(default)]
    category: String,
    price: Decimal,
    #[serde(default)]
    sale_price: Option<Decimal>,
    quantity: u32,
}

impl TryFrom<CartRow> for CartLine {
    type Error = StorefrontError;

    fn try_from(row: CartRow) -> Result<Self> {
        if row.id.is_empty() {
            return Err(StorefrontError::ValidationError("Missing product id".to_string()));
        }
        if row.price < Decimal::ZERO || row.sale_price.is_some_and(|p| p < Decimal::ZERO) {
            return Err(StorefrontError::ValidationError(format!(
                "Negative price for product {}",
                row.id
            )));
        }
        let unit_price = row.sale_price.unwrap_or(row.price);
        if unit_price.checked_mul(Decimal::from(row.quantity)).is_none() {
            return Err(StorefrontError::ValidationError(format!(
                "Line total out of range for product {}",
                row.id
            )));
        }
        if row.quantity == 0 {
            return Err(StorefrontError::ValidationError(format!(
                "Quantity must be at least 1 for product {}",
                row.id
            )));
        }
        Ok(CartLine {
            id: row.id,
            title: row.title,
            brand: row.brand,
            category: row.category,
            price: Money::new(row.price),
            sale_price: row.sale_price.map(Money::new),
            quantity: row.quantity,
        })
    }
}

/// Reads cart lines from a CSV source.
///
/// Whitespace is trimmed and short records are accepted, so optional trailing
/// columns such as `sale_price` may be left off.
pub struct CartReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CartReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and validates cart lines, one `Result` per record.
    pub fn lines(self) -> impl Iterator<Item = Result<CartLine>> {
        self.reader
            .into_deserialize::<CartRow>()
            .map(|result| result.map_err(StorefrontError::from).and_then(CartLine::try_from))
    }
}
