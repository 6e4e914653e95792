//! Shopping cart model.
//!
//! The cart is owned by the client session. Mutations go through
//! [`CartStore`], which recomputes the derived money fields after every
//! change and mirrors the full cart to durable storage. The server only
//! ever sees a snapshot of this state, at checkout.

pub mod pricing;
pub mod store;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

pub use pricing::{CartTotals, PricingPolicy};
pub use store::{CART_STORAGE_KEY, CartStorage, CartStore, FileStorage, MemoryStorage};

/// Errors from cart operations.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// Requested quantity is zero or exceeds the stock snapshot.
    #[error("invalid quantity {qty}: must be between 1 and {in_stock}")]
    InvalidQuantity {
        /// Requested quantity.
        qty: u32,
        /// Stock count at add-time.
        in_stock: u32,
    },

    /// Durable storage could not be written.
    #[error("cart storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// The cart could not be serialized for storage.
    #[error("cart serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One product entry in the cart, with display fields and the unit price
/// copied from the product at add-time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// The product this line refers to.
    pub product: ProductId,
    /// Product name at add-time.
    pub name: String,
    /// Product image URL at add-time.
    pub image: String,
    /// Unit price snapshot at add-time.
    pub price: Decimal,
    /// Requested quantity.
    pub qty: u32,
    /// Stock count at add-time, bounding `qty`.
    pub count_in_stock: u32,
}

/// Shipping destination collected during checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Supported payment methods.
///
/// A single gateway is supported today; the enum keeps the wire format
/// stable if another is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    Razorpay,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Razorpay => write!(f, "Razorpay"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Razorpay" => Ok(Self::Razorpay),
            _ => Err(format!("unsupported payment method: {s}")),
        }
    }
}

/// The cart: ordered line items plus checkout selections and the four
/// derived money fields.
///
/// The money fields are always consistent with `items` — every mutation
/// in [`CartStore`] recomputes them. Deserialized carts are recomputed on
/// load, so a tampered or stale stored copy cannot carry wrong totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Line items, in insertion order.
    pub items: Vec<CartItem>,
    /// Shipping address; set during checkout.
    pub shipping_address: Option<ShippingAddress>,
    /// Chosen payment method.
    pub payment_method: PaymentMethod,
    /// Derived money fields, recomputed on every mutation.
    #[serde(default)]
    pub totals: CartTotals,
}

impl Cart {
    /// Add a line item, replacing any existing line for the same product.
    ///
    /// Re-adding a product is how quantity changes are expressed: the new
    /// line wins wholesale, price snapshot included.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] if `qty` is zero or exceeds
    /// the item's stock snapshot.
    pub fn add_item(&mut self, item: CartItem, policy: &PricingPolicy) -> Result<(), CartError> {
        if item.qty == 0 || item.qty > item.count_in_stock {
            return Err(CartError::InvalidQuantity {
                qty: item.qty,
                in_stock: item.count_in_stock,
            });
        }

        match self.items.iter_mut().find(|x| x.product == item.product) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }

        self.recompute(policy);
        Ok(())
    }

    /// Remove the line for a product. Absent ids are a no-op.
    pub fn remove_item(&mut self, product: ProductId, policy: &PricingPolicy) {
        self.items.retain(|x| x.product != product);
        self.recompute(policy);
    }

    /// Set the shipping address.
    pub fn set_shipping_address(&mut self, address: ShippingAddress, policy: &PricingPolicy) {
        self.shipping_address = Some(address);
        self.recompute(policy);
    }

    /// Set the payment method.
    pub fn set_payment_method(&mut self, method: PaymentMethod, policy: &PricingPolicy) {
        self.payment_method = method;
        self.recompute(policy);
    }

    /// Empty the line items, keeping checkout selections.
    ///
    /// Called after successful order placement; the address and payment
    /// method survive for the next purchase.
    pub fn clear_items(&mut self, policy: &PricingPolicy) {
        self.items.clear();
        self.recompute(policy);
    }

    /// Recompute the four derived money fields from the line items.
    fn recompute(&mut self, policy: &PricingPolicy) {
        self.totals = policy.price_items(&self.items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> PricingPolicy {
        PricingPolicy::new(
            Decimal::new(15, 2),  // 15% tax
            Decimal::new(10, 0),  // flat shipping
            Decimal::new(100, 0), // free shipping threshold
        )
    }

    fn item(product: i32, price: Decimal, qty: u32) -> CartItem {
        CartItem {
            product: ProductId::new(product),
            name: format!("Product {product}"),
            image: format!("/images/{product}.jpg"),
            price,
            qty,
            count_in_stock: 10,
        }
    }

    #[test]
    fn test_add_same_product_replaces_line() {
        let policy = policy();
        let mut cart = Cart::default();

        cart.add_item(item(1, Decimal::new(100, 0), 2), &policy)
            .expect("add");
        cart.add_item(item(1, Decimal::new(100, 0), 5), &policy)
            .expect("re-add");

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items.first().map(|x| x.qty), Some(5));
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let policy = policy();
        let mut cart = Cart::default();

        cart.add_item(item(1, Decimal::new(10, 0), 1), &policy)
            .expect("add");
        cart.add_item(item(2, Decimal::new(20, 0), 1), &policy)
            .expect("add");
        cart.add_item(item(1, Decimal::new(10, 0), 3), &policy)
            .expect("re-add");

        let ids: Vec<i32> = cart.items.iter().map(|x| x.product.as_i32()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_add_rejects_zero_and_overstock_qty() {
        let policy = policy();
        let mut cart = Cart::default();

        let err = cart
            .add_item(item(1, Decimal::ONE, 0), &policy)
            .expect_err("zero qty");
        assert!(matches!(err, CartError::InvalidQuantity { qty: 0, .. }));

        let err = cart
            .add_item(item(1, Decimal::ONE, 11), &policy)
            .expect_err("over stock");
        assert!(matches!(err, CartError::InvalidQuantity { qty: 11, .. }));
        assert!(cart.items.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let policy = policy();
        let mut cart = Cart::default();

        cart.remove_item(ProductId::new(99), &policy);
        assert!(cart.items.is_empty());

        cart.add_item(item(1, Decimal::new(10, 0), 1), &policy)
            .expect("add");
        cart.remove_item(ProductId::new(99), &policy);
        assert_eq!(cart.items.len(), 1);
    }

    #[test]
    fn test_clear_items_keeps_checkout_selections() {
        let policy = policy();
        let mut cart = Cart::default();

        cart.add_item(item(1, Decimal::new(10, 0), 1), &policy)
            .expect("add");
        cart.set_shipping_address(
            ShippingAddress {
                address: "1 Main St".to_owned(),
                city: "Springfield".to_owned(),
                postal_code: "12345".to_owned(),
                country: "US".to_owned(),
            },
            &policy,
        );

        cart.clear_items(&policy);

        assert!(cart.items.is_empty());
        assert!(cart.shipping_address.is_some());
        assert_eq!(cart.totals.items_price, Decimal::new(0, 2));
        assert_eq!(cart.totals.tax_price, Decimal::new(0, 2));
    }

    #[test]
    fn test_mutations_keep_totals_consistent() {
        let policy = policy();
        let mut cart = Cart::default();

        cart.add_item(item(1, Decimal::new(100, 0), 2), &policy)
            .expect("add");

        // 200 items, free shipping over threshold, 15% tax
        assert_eq!(cart.totals.items_price, Decimal::new(20_000, 2));
        assert_eq!(cart.totals.shipping_price, Decimal::new(0, 2));
        assert_eq!(cart.totals.tax_price, Decimal::new(3000, 2));
        assert_eq!(cart.totals.total_price, Decimal::new(23_000, 2));
    }
}
