use std::io::Write;
use tempfile::NamedTempFile;

pub const HEADER: &str = "id,title,brand,category,price,sale_price,quantity";
pub const TOTALS_HEADER: &str =
    "subtotal,tax,total,premium_discount,employee_discount,points_redeemed";

/// Writes a cart CSV with the standard header followed by `rows`.
pub fn cart_csv(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file.flush().unwrap();
    file
}
