use crate::application::session::CartSession;
use crate::domain::coupon::{CouponBook, CouponError, CouponOutcome, apply_coupon};
use crate::domain::discount::DiscountSelection;
use crate::domain::order::{DeliveryDetails, OrderReceipt, OrderRequest, PreviewRequest};
use crate::domain::payment::{PaymentChoice, PaymentOutcome, PaymentRequest};
use crate::domain::ports::{
    DeliveryZoneServiceBox, OrderGatewayBox, PaymentGatewayBox, PricingPreviewServiceBox,
};
use crate::domain::pricing::{
    PricingPolicy, PricingPreview, ReconcileInput, ReconciledTotals, UserFlags, reconcile,
};
use crate::error::{Result, StorefrontError};
use tracing::{debug, info, warn};

/// The signed-in shopper as far as checkout is concerned.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Shopper {
    pub flags: UserFlags,
    /// Loyalty points balance.
    pub points: u64,
    /// Customer reference in the POS.
    pub pos_customer_id: String,
}

/// A priced cart: the POS preview, the discount it was priced with and the
/// totals reconciled on top of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub preview: PricingPreview,
    pub selection: DiscountSelection,
    /// Priced as a delivery order.
    pub delivery: bool,
    pub totals: ReconciledTotals,
}

impl Quote {
    /// The quote with a coupon's totals in place of the reconciled ones.
    pub fn with_coupon(mut self, outcome: &CouponOutcome) -> Self {
        self.totals = outcome.totals.clone();
        self
    }
}

/// Prices carts and places orders.
///
/// The POS preview is fetched once per quote; everything after that is
/// computed locally. Orders are only submitted after payment succeeds, and
/// the session cart is cleared only after the POS accepts the order.
pub struct CheckoutService {
    previews: PricingPreviewServiceBox,
    orders: Option<OrderGatewayBox>,
    payments: Option<PaymentGatewayBox>,
    zones: Option<DeliveryZoneServiceBox>,
    policy: PricingPolicy,
    coupons: CouponBook,
}

impl CheckoutService {
    /// Creates a checkout that can quote carts through `previews`.
    ///
    /// # Arguments
    ///
    /// * `previews` - The POS pricing preview port.
    /// * `policy` - Points value and discount rates.
    pub fn new(previews: PricingPreviewServiceBox, policy: PricingPolicy) -> Self {
        Self {
            previews,
            orders: None,
            payments: None,
            zones: None,
            policy,
            coupons: CouponBook::new(),
        }
    }

    pub fn with_orders(mut self, orders: OrderGatewayBox) -> Self {
        self.orders = Some(orders);
        self
    }

    pub fn with_payments(mut self, payments: PaymentGatewayBox) -> Self {
        self.payments = Some(payments);
        self
    }

    pub fn with_delivery_zones(mut self, zones: DeliveryZoneServiceBox) -> Self {
        self.zones = Some(zones);
        self
    }

    pub fn with_coupons(mut self, coupons: CouponBook) -> Self {
        self.coupons = coupons;
        self
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// Builds the discount selection from the session: an applied reward
    /// wins over a points request.
    pub async fn current_selection(
        &self,
        session: &CartSession,
        requested_points: i64,
    ) -> Result<DiscountSelection> {
        match session.applied_discount().await? {
            Some(reward) => {
                if requested_points > 0 {
                    warn!(
                        requested_points,
                        discount_id = %reward.id,
                        "Ignoring points request while a reward is applied"
                    );
                }
                Ok(DiscountSelection::Reward(reward))
            }
            None if requested_points != 0 => Ok(DiscountSelection::Points(requested_points)),
            None => Ok(DiscountSelection::None),
        }
    }

    /// Prices the session cart with the discount the session allows: the
    /// applied reward if there is one, otherwise `requested_points`.
    ///
    /// Returns `Ok(None)` for an empty cart without contacting the POS. A
    /// failed preview surfaces as [`StorefrontError::PreviewUnavailable`]
    /// and leaves the cart untouched, so the caller can retry.
    pub async fn quote(
        &self,
        session: &CartSession,
        shopper: &Shopper,
        requested_points: i64,
        delivery: bool,
    ) -> Result<Option<Quote>> {
        let cart = session.cart().await?;
        if cart.is_empty() {
            debug!("Cart is empty, skipping pricing preview");
            return Ok(None);
        }

        let selection = self.current_selection(session, requested_points).await?;
        let discount_id = selection.reward().map(|r| r.pos_discount_id.as_str());
        let request = PreviewRequest::new(&cart, delivery, discount_id);

        let preview = self.previews.preview(&request).await.map_err(|e| {
            warn!(error = %e, lines = cart.len(), "Pricing preview failed");
            match e {
                StorefrontError::PreviewUnavailable(_) => e,
                other => StorefrontError::PreviewUnavailable(Box::new(other)),
            }
        })?;

        let totals = reconcile(
            &ReconcileInput {
                preview: preview.clone(),
                points_to_redeem: selection.requested_points(),
                user_points: shopper.points,
                user: shopper.flags.clone(),
            },
            &self.policy,
        );

        debug!(
            subtotal = %totals.final_subtotal,
            tax = %totals.final_tax,
            total = %totals.final_total,
            points = totals.points_redeemed,
            "Reconciled checkout totals"
        );

        Ok(Some(Quote {
            preview,
            selection,
            delivery,
            totals,
        }))
    }

    /// Applies a coupon code to a quote.
    pub fn apply_coupon(
        &self,
        quote: &Quote,
        code: &str,
    ) -> std::result::Result<CouponOutcome, CouponError> {
        apply_coupon(&quote.totals, code, &self.coupons)
    }

    /// Checks the dispensary delivers and that `details` is inside its zone.
    async fn check_delivery(&self, details: &DeliveryDetails) -> Result<()> {
        if !details.address.is_complete() {
            return Err(StorefrontError::ValidationError(
                "Delivery address is incomplete".to_string(),
            ));
        }
        let zones = self.zones.as_ref().ok_or_else(|| {
            StorefrontError::OrderError("No delivery zone service configured".to_string())
        })?;

        let unable = |e: StorefrontError| {
            warn!(error = %e, "Delivery zone lookup failed");
            StorefrontError::ValidationError("Unable to validate address.".to_string())
        };
        if !zones.delivery_available().await.map_err(unable)? {
            return Err(StorefrontError::ValidationError(
                "Delivery is not available".to_string(),
            ));
        }
        if !zones.in_zone(&details.address).await.map_err(unable)? {
            debug!(address = %details.address.one_line(), "Address outside delivery zone");
            return Err(StorefrontError::ValidationError(
                "Outside delivery zone.".to_string(),
            ));
        }
        Ok(())
    }

    /// Charges the shopper (when paying by AeroPay), submits the order to the
    /// POS and empties the session cart.
    ///
    /// The order carries exactly the discount `quote` was priced with. A
    /// quote whose reward no longer matches the session, or that was priced
    /// for the other order type, is rejected.
    pub async fn place_order(
        &self,
        session: &CartSession,
        shopper: &Shopper,
        quote: &Quote,
        payment: &PaymentChoice,
        delivery: Option<DeliveryDetails>,
    ) -> Result<OrderReceipt> {
        let cart = session.cart().await?;
        if cart.is_empty() {
            return Err(StorefrontError::ValidationError("Cart is empty".to_string()));
        }
        if session.applied_discount().await?.as_ref() != quote.selection.reward() {
            return Err(StorefrontError::ValidationError(
                "Applied discount changed since the cart was priced".to_string(),
            ));
        }
        if quote.delivery != delivery.is_some() {
            return Err(StorefrontError::ValidationError(
                "Cart was priced for a different order type".to_string(),
            ));
        }
        if let Some(details) = &delivery {
            self.check_delivery(details).await?;
        }

        let orders = self
            .orders
            .as_ref()
            .ok_or_else(|| StorefrontError::OrderError("No order gateway configured".to_string()))?;

        let totals = &quote.totals;
        if let PaymentChoice::AeroPay {
            user_id,
            bank_account_id,
        } = payment
        {
            let payments = self.payments.as_ref().ok_or_else(|| {
                StorefrontError::PaymentError("No payment gateway configured".to_string())
            })?;
            let request = PaymentRequest {
                amount: totals.final_total.round_cents(),
                user_id: user_id.clone(),
                bank_account_id: bank_account_id.clone(),
            };
            match payments.charge(&request).await? {
                PaymentOutcome::Approved { transaction_id } => {
                    info!(transaction_id = %transaction_id, amount = %request.amount, "Payment approved");
                }
                PaymentOutcome::Declined { reason } => {
                    warn!(reason = %reason, "Payment declined");
                    return Err(StorefrontError::PaymentError(format!("Payment failed: {reason}")));
                }
                PaymentOutcome::Cancelled => {
                    return Err(StorefrontError::PaymentError("Payment cancelled".to_string()));
                }
            }
        }

        let order = OrderRequest::new(
            &cart,
            shopper.pos_customer_id.clone(),
            delivery,
            quote.selection.reward().map(|d| d.pos_discount_id.as_str()),
        )
        .with_loyalty(totals);

        let receipt = orders.submit(&order).await.map_err(|e| match e {
            StorefrontError::OrderError(_) => e,
            other => StorefrontError::OrderError(other.to_string()),
        })?;

        session.clear_cart().await?;
        session.set_discount(None).await?;

        info!(
            order_number = %receipt.order_number,
            order_type = ?order.order_type,
            items = order.items.len(),
            points_redeem = order.points_redeem,
            points_add = order.points_add,
            "Order placed"
        );
        Ok(receipt)
    }
}
