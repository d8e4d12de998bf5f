use crate::domain::pricing::ReconciledTotals;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct TotalsRow {
    subtotal: String,
    tax: String,
    total: String,
    premium_discount: String,
    employee_discount: String,
    points_redeemed: u64,
}

impl From<&ReconciledTotals> for TotalsRow {
    fn from(totals: &ReconciledTotals) -> Self {
        Self {
            subtotal: totals.final_subtotal.round_cents().to_string(),
            tax: totals.final_tax.round_cents().to_string(),
            total: totals.final_total.round_cents().to_string(),
            premium_discount: totals.premium_discount_amount.round_cents().to_string(),
            employee_discount: totals.employee_discount_amount.round_cents().to_string(),
            points_redeemed: totals.points_redeemed,
        }
    }
}

/// Writes reconciled totals as CSV, amounts rounded to cents.
pub struct TotalsWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> TotalsWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_totals(&mut self, totals: &ReconciledTotals) -> Result<()> {
        self.writer.serialize(TotalsRow::from(totals))?;
        self.writer.flush()?;
        Ok(())
    }
}
