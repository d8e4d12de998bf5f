use crate::domain::payment::{BankLinkOutcome, CreateUserResponse, CustomerProfile};
use crate::domain::ports::{AeroPayService, BankLinkWidget};
use crate::error::{Result, StorefrontError};
use std::sync::Arc;
use tracing::{info, warn};

/// Where AeroPay onboarding stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnboardingState {
    /// The shopper can pay with this bank account.
    Ready {
        user_id: String,
        bank_account_id: String,
    },
    /// A code was sent to the shopper; call [`PaymentOnboarding::verify`].
    VerificationRequired { user_id: String, message: String },
    /// The shopper closed the bank-link widget.
    Cancelled,
}

/// Drives a shopper from "no AeroPay account" to "linked bank account".
pub struct PaymentOnboarding {
    aeropay: Arc<dyn AeroPayService>,
    widget: Arc<dyn BankLinkWidget>,
}

impl PaymentOnboarding {
    pub fn new(aeropay: Arc<dyn AeroPayService>, widget: Arc<dyn BankLinkWidget>) -> Self {
        Self { aeropay, widget }
    }

    /// Creates (or looks up) the AeroPay user and makes sure a bank account
    /// is linked, opening the widget when none is.
    pub async fn start(&self, profile: &CustomerProfile) -> Result<OnboardingState> {
        let user = match self.aeropay.create_user(profile).await? {
            CreateUserResponse::Ready(user) => user,
            CreateUserResponse::VerificationRequired { user_id, message } => {
                info!(user_id = %user_id, "AeroPay verification required");
                return Ok(OnboardingState::VerificationRequired { user_id, message });
            }
        };

        if let Some(bank) = user.bank_accounts.first() {
            return Ok(OnboardingState::Ready {
                user_id: user.user_id,
                bank_account_id: bank.bank_account_id.clone(),
            });
        }

        let session = self.aeropay.bank_link_session(&user.user_id).await?;
        match self.widget.link(&session).await? {
            BankLinkOutcome::Linked {
                user_id,
                user_password,
            } => {
                if !self.aeropay.link_bank_account(&user_id, &user_password).await? {
                    return Err(StorefrontError::PaymentError(
                        "Bank account could not be linked".to_string(),
                    ));
                }
                self.after_link(profile).await
            }
            BankLinkOutcome::Cancelled => Ok(OnboardingState::Cancelled),
            BankLinkOutcome::Failed { reason } => {
                warn!(reason = %reason, "Bank link failed");
                Err(StorefrontError::PaymentError(reason))
            }
        }
    }

    /// Confirms the verification code and resumes onboarding.
    pub async fn verify(
        &self,
        user_id: &str,
        code: &str,
        profile: &CustomerProfile,
    ) -> Result<OnboardingState> {
        if code.trim().is_empty() {
            return Err(StorefrontError::ValidationError(
                "Verification code is required".to_string(),
            ));
        }
        self.aeropay.verify_user(user_id, code.trim()).await?;
        self.start(profile).await
    }

    // Recreating the user returns the freshly linked accounts.
    async fn after_link(&self, profile: &CustomerProfile) -> Result<OnboardingState> {
        match self.aeropay.create_user(profile).await? {
            CreateUserResponse::Ready(user) => match user.bank_accounts.first() {
                Some(bank) => {
                    info!(user_id = %user.user_id, "Bank account linked");
                    Ok(OnboardingState::Ready {
                        user_id: user.user_id.clone(),
                        bank_account_id: bank.bank_account_id.clone(),
                    })
                }
                None => Err(StorefrontError::PaymentError(
                    "No bank account found after linking".to_string(),
                )),
            },
            CreateUserResponse::VerificationRequired { user_id, message } => {
                Ok(OnboardingState::VerificationRequired { user_id, message })
            }
        }
    }
}
