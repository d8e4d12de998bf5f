//! File-based entry and exit points of the storefront.

pub mod csv;
