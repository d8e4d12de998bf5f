use crate::domain::cart::{Cart, CartLine};
use crate::domain::discount::AppliedDiscount;
use crate::domain::ports::SessionStorageBox;
use crate::error::Result;
use tokio::sync::Mutex;
use tracing::debug;

pub const CART_KEY: &str = "cart";
pub const DISCOUNT_KEY: &str = "applied_discount";

/// A shopper's cart and chosen discount, persisted through a session storage
/// port.
///
/// Every mutation loads the current value, changes it and writes the whole
/// value back. Mutations are serialized so concurrent callers never lose an
/// update.
pub struct CartSession {
    storage: SessionStorageBox,
    write_lock: Mutex<()>,
}

impl CartSession {
    pub fn new(storage: SessionStorageBox) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// The cart as last saved; empty when nothing has been saved yet.
    pub async fn cart(&self) -> Result<Cart> {
        match self.storage.get(CART_KEY).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Cart::new()),
        }
    }

    async fn save_cart(&self, cart: &Cart) -> Result<()> {
        self.storage.put(CART_KEY, serde_json::to_string(cart)?).await
    }

    pub async fn add_to_cart(&self, line: CartLine) -> Result<Cart> {
        let _guard = self.write_lock.lock().await;
        let mut cart = self.cart().await?;
        debug!(product_id = %line.id, quantity = line.quantity, "Adding to cart");
        cart.add(line)?;
        self.save_cart(&cart).await?;
        Ok(cart)
    }

    /// Sets a line's quantity; zero or below removes it. Unknown products
    /// leave the cart unchanged.
    pub async fn update_quantity(&self, product_id: &str, quantity: i64) -> Result<Cart> {
        let _guard = self.write_lock.lock().await;
        let mut cart = self.cart().await?;
        if cart.set_quantity(product_id, quantity) {
            debug!(product_id = %product_id, quantity, "Updated cart quantity");
            self.save_cart(&cart).await?;
        }
        Ok(cart)
    }

    pub async fn remove_from_cart(&self, product_id: &str) -> Result<Cart> {
        let _guard = self.write_lock.lock().await;
        let mut cart = self.cart().await?;
        if cart.remove(product_id) {
            debug!(product_id = %product_id, "Removed from cart");
            self.save_cart(&cart).await?;
        }
        Ok(cart)
    }

    pub async fn clear_cart(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.save_cart(&Cart::new()).await
    }

    /// Replaces the applied discount; `None` removes it.
    pub async fn set_discount(&self, discount: Option<AppliedDiscount>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        match discount {
            Some(discount) => {
                debug!(discount_id = %discount.id, "Applying discount");
                self.storage
                    .put(DISCOUNT_KEY, serde_json::to_string(&discount)?)
                    .await
            }
            None => self.storage.remove(DISCOUNT_KEY).await,
        }
    }

    pub async fn applied_discount(&self) -> Result<Option<AppliedDiscount>> {
        match self.storage.get(DISCOUNT_KEY).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Money;
    use crate::infrastructure::in_memory::InMemorySessionStorage;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn session() -> CartSession {
        CartSession::new(Box::new(InMemorySessionStorage::new()))
    }

    fn line(id: &str, quantity: u32) -> CartLine {
        CartLine::new(id, Money::new(dec!(12.5)), quantity)
    }

    #[tokio::test]
    async fn test_empty_session_has_empty_cart() {
        let session = session();
        assert!(session.cart().await.unwrap().is_empty());
        assert!(session.applied_discount().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cart_mutations_persist() {
        let session = session();
        session.add_to_cart(line("a", 1)).await.unwrap();
        session.add_to_cart(line("a", 2)).await.unwrap();
        session.add_to_cart(line("b", 1)).await.unwrap();

        let cart = session.cart().await.unwrap();
        assert_eq!(cart.get("a").unwrap().quantity, 3);
        assert_eq!(cart.len(), 2);

        session.update_quantity("a", 0).await.unwrap();
        session.remove_from_cart("b").await.unwrap();
        assert!(session.cart().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_quantity_add_leaves_cart_untouched() {
        let session = session();
        session.add_to_cart(line("a", 1)).await.unwrap();
        assert!(session.add_to_cart(line("b", 0)).await.is_err());
        assert_eq!(session.cart().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_discount_roundtrip_and_removal() {
        let session = session();
        let discount = AppliedDiscount {
            id: "d1".to_string(),
            pos_discount_id: "pos-1".to_string(),
            dollar_value: Some(Money::new(dec!(5))),
            percentage_value: None,
            name: "Five off".to_string(),
        };

        session.set_discount(Some(discount.clone())).await.unwrap();
        assert_eq!(session.applied_discount().await.unwrap(), Some(discount));

        session.set_discount(None).await.unwrap();
        assert!(session.applied_discount().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_adds_are_not_lost() {
        let session = Arc::new(session());
        let mut handles = Vec::new();
        for _ in 0..20 {
            let session = Arc::clone(&session);
            handles.push(tokio::spawn(async move {
                session.add_to_cart(line("a", 1)).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(session.cart().await.unwrap().get("a").unwrap().quantity, 20);
    }
}
