pub mod cart_reader;
pub mod totals_writer;
