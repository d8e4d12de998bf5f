use super::delivery::DeliveryAddress;
use super::order::{OrderReceipt, OrderRequest, PreviewRequest};
use super::payment::{
    BankLinkOutcome, BankLinkSession, CreateUserResponse, CustomerProfile, PaymentOutcome,
    PaymentRequest,
};
use super::pricing::PricingPreview;
use crate::error::Result;
use async_trait::async_trait;

/// Key-value storage scoped to one shopper session.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn put(&self, key: &str, value: String) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Prices a cart on the POS.
#[async_trait]
pub trait PricingPreviewService: Send + Sync {
    async fn preview(&self, request: &PreviewRequest) -> Result<PricingPreview>;
}

/// Charges a linked bank account.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentOutcome>;
}

/// Submits placed orders to the POS.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn submit(&self, order: &OrderRequest) -> Result<OrderReceipt>;
}

/// AeroPay account management.
#[async_trait]
pub trait AeroPayService: Send + Sync {
    async fn create_user(&self, profile: &CustomerProfile) -> Result<CreateUserResponse>;
    async fn verify_user(&self, user_id: &str, code: &str) -> Result<()>;
    async fn bank_link_session(&self, user_id: &str) -> Result<BankLinkSession>;
    async fn link_bank_account(&self, user_id: &str, password: &str) -> Result<bool>;
}

/// The interactive widget where the shopper connects a bank account.
#[async_trait]
pub trait BankLinkWidget: Send + Sync {
    async fn link(&self, session: &BankLinkSession) -> Result<BankLinkOutcome>;
}

/// Whether the dispensary delivers, and to which addresses.
#[async_trait]
pub trait DeliveryZoneService: Send + Sync {
    async fn delivery_available(&self) -> Result<bool>;
    async fn in_zone(&self, address: &DeliveryAddress) -> Result<bool>;
}

pub type SessionStorageBox = Box<dyn SessionStorage>;
pub type PricingPreviewServiceBox = Box<dyn PricingPreviewService>;
pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
pub type OrderGatewayBox = Box<dyn OrderGateway>;
pub type DeliveryZoneServiceBox = Box<dyn DeliveryZoneService>;
pub type SessionStorageFactory = Box<dyn Fn() -> SessionStorageBox + Send + Sync>;
