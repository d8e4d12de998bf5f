//! Storefront domain: value objects, pricing rules and the ports through
//! which external services are reached. Nothing in here performs I/O.

pub mod cart;
pub mod catalog;
pub mod coupon;
pub mod delivery;
pub mod discount;
pub mod money;
pub mod order;
pub mod payment;
pub mod ports;
pub mod pricing;
