use super::money::Money;
use serde::{Deserialize, Serialize};

/// How the shopper pays for an order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PaymentChoice {
    /// Paid at pickup or on delivery; nothing is charged at checkout.
    #[default]
    Cash,
    AeroPay {
        user_id: String,
        bank_account_id: String,
    },
}

/// A charge against a linked bank account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRequest {
    /// Rounded to cents.
    pub amount: Money,
    pub user_id: String,
    pub bank_account_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Approved { transaction_id: String },
    Declined { reason: String },
    Cancelled,
}

/// The shopper details AeroPay needs to open an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerProfile {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BankAccount {
    pub bank_account_id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AeroPayUser {
    pub user_id: String,
    #[serde(default)]
    pub bank_accounts: Vec<BankAccount>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateUserResponse {
    Ready(AeroPayUser),
    /// The phone or email belongs to an existing AeroPay user who must
    /// confirm a code before the account can be used here.
    VerificationRequired { user_id: String, message: String },
}

/// Credentials for opening the bank-link widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankLinkSession {
    pub token: String,
    pub fastlink_url: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankLinkOutcome {
    Linked { user_id: String, user_password: String },
    Failed { reason: String },
    Cancelled,
}
