//! Application layer orchestrating the storefront use cases.
//!
//! `CartSession` owns the persisted cart, `CheckoutService` prices it and
//! places orders, and `PaymentOnboarding` links AeroPay bank accounts. All of
//! them talk to the outside world only through the ports in
//! [`crate::domain::ports`].

pub mod checkout;
pub mod onboarding;
pub mod session;
