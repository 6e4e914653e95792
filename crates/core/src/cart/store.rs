//! Durable cart store.
//!
//! [`CartStore`] is the state-store object that owns the live cart: every
//! mutation recomputes totals and mirrors the full cart, JSON-serialized,
//! to a [`CartStorage`] backend under a fixed key. On open, an existing
//! entry becomes the initial state; missing or malformed data falls back
//! to the empty-cart default rather than failing.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::pricing::PricingPolicy;
use super::{Cart, CartError, CartItem, PaymentMethod, ShippingAddress};
use crate::types::id::ProductId;

/// Fixed key the cart is stored under.
pub const CART_STORAGE_KEY: &str = "cart";

/// A durable key-value backend for client-side state.
///
/// Implementations only need string round-tripping; the store handles
/// serialization and key management.
pub trait CartStorage {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, CartError>;

    /// Write `value` under `key`, replacing any existing entry.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the backend cannot be written.
    fn save(&mut self, key: &str, value: &str) -> Result<(), CartError>;
}

/// In-memory storage, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with one entry.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.entries.insert(key.to_owned(), value.to_owned());
        storage
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, CartError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), CartError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// File-backed storage: one JSON file per key inside a directory.
///
/// The directory is created lazily on first save.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a file-backed store rooted at `dir`.
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CartStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, CartError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CartError::Storage(e)),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), CartError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// The live cart plus its pricing policy and storage backend.
///
/// All mutations pass through here so the mirror-after-mutation invariant
/// cannot be bypassed.
pub struct CartStore<S: CartStorage> {
    cart: Cart,
    policy: PricingPolicy,
    storage: S,
}

impl<S: CartStorage> CartStore<S> {
    /// Open the store, loading any previously persisted cart.
    ///
    /// Malformed stored data is discarded in favor of the empty default:
    /// a corrupt cart entry must never take the application down. Loaded
    /// carts get their totals recomputed under the current policy, so a
    /// policy change between sessions is applied immediately.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the backend itself cannot be
    /// read (as opposed to holding bad data).
    pub fn open(storage: S, policy: PricingPolicy) -> Result<Self, CartError> {
        let mut cart = match storage.load(CART_STORAGE_KEY)? {
            Some(raw) => serde_json::from_str::<Cart>(&raw).unwrap_or_default(),
            None => Cart::default(),
        };
        cart.recompute(&policy);

        Ok(Self {
            cart,
            policy,
            storage,
        })
    }

    /// The current cart state.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Add a line item, replacing any existing line for the same product.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a zero or over-stock
    /// quantity, or [`CartError::Storage`] if the mirror write fails.
    pub fn add_item(&mut self, item: CartItem) -> Result<(), CartError> {
        self.cart.add_item(item, &self.policy)?;
        self.persist()
    }

    /// Remove the line for a product. Absent ids are a no-op (but still
    /// mirrored, keeping storage and state trivially in sync).
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the mirror write fails.
    pub fn remove_item(&mut self, product: ProductId) -> Result<(), CartError> {
        self.cart.remove_item(product, &self.policy);
        self.persist()
    }

    /// Set the shipping address.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the mirror write fails.
    pub fn set_shipping_address(&mut self, address: ShippingAddress) -> Result<(), CartError> {
        self.cart.set_shipping_address(address, &self.policy);
        self.persist()
    }

    /// Set the payment method.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the mirror write fails.
    pub fn set_payment_method(&mut self, method: PaymentMethod) -> Result<(), CartError> {
        self.cart.set_payment_method(method, &self.policy);
        self.persist()
    }

    /// Empty the line items after successful order placement.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the mirror write fails.
    pub fn clear_items(&mut self) -> Result<(), CartError> {
        self.cart.clear_items(&self.policy);
        self.persist()
    }

    /// Mirror the full cart to storage under the fixed key.
    fn persist(&mut self) -> Result<(), CartError> {
        let raw = serde_json::to_string(&self.cart)?;
        self.storage.save(CART_STORAGE_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn policy() -> PricingPolicy {
        PricingPolicy::new(
            Decimal::new(15, 2),
            Decimal::new(10, 0),
            Decimal::new(100, 0),
        )
    }

    fn item(product: i32, qty: u32) -> CartItem {
        CartItem {
            product: ProductId::new(product),
            name: format!("Product {product}"),
            image: String::new(),
            price: Decimal::new(2500, 2),
            qty,
            count_in_stock: 5,
        }
    }

    #[test]
    fn test_open_empty_storage_yields_default_cart() {
        let store = CartStore::open(MemoryStorage::new(), policy()).expect("open");
        assert!(store.cart().items.is_empty());
        assert!(store.cart().shipping_address.is_none());
        assert_eq!(store.cart().payment_method, PaymentMethod::Razorpay);
    }

    #[test]
    fn test_open_malformed_storage_falls_back_to_default() {
        let storage = MemoryStorage::with_entry(CART_STORAGE_KEY, "{not json at all");
        let store = CartStore::open(storage, policy()).expect("open");
        assert!(store.cart().items.is_empty());

        let storage = MemoryStorage::with_entry(CART_STORAGE_KEY, r#"{"items": 42}"#);
        let store = CartStore::open(storage, policy()).expect("open");
        assert!(store.cart().items.is_empty());
    }

    #[test]
    fn test_mutations_are_mirrored() {
        let mut store = CartStore::open(MemoryStorage::new(), policy()).expect("open");
        store.add_item(item(1, 2)).expect("add");

        let raw = store
            .storage
            .load(CART_STORAGE_KEY)
            .expect("load")
            .expect("entry exists");
        let persisted: Cart = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(&persisted, store.cart());
    }

    #[test]
    fn test_reopen_restores_cart() {
        let mut store = CartStore::open(MemoryStorage::new(), policy()).expect("open");
        store.add_item(item(1, 2)).expect("add");
        store.add_item(item(2, 1)).expect("add");
        let expected = store.cart().clone();

        let reopened = CartStore::open(store.storage, policy()).expect("reopen");
        assert_eq!(reopened.cart(), &expected);
    }

    #[test]
    fn test_reopen_reprices_under_new_policy() {
        let mut store = CartStore::open(MemoryStorage::new(), policy()).expect("open");
        store.add_item(item(1, 2)).expect("add"); // 50.00 of items

        let zero_tax = PricingPolicy::new(Decimal::ZERO, Decimal::new(10, 0), Decimal::new(100, 0));
        let reopened = CartStore::open(store.storage, zero_tax).expect("reopen");
        assert_eq!(reopened.cart().totals.tax_price, Decimal::new(0, 2));
    }

    #[test]
    fn test_clear_items_mirrors_empty_cart() {
        let mut store = CartStore::open(MemoryStorage::new(), policy()).expect("open");
        store.add_item(item(1, 2)).expect("add");
        store.clear_items().expect("clear");

        let raw = store
            .storage
            .load(CART_STORAGE_KEY)
            .expect("load")
            .expect("entry exists");
        let persisted: Cart = serde_json::from_str(&raw).expect("valid json");
        assert!(persisted.items.is_empty());
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = std::env::temp_dir().join(format!("bramble-cart-test-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        {
            let storage = FileStorage::new(dir.clone());
            let mut store = CartStore::open(storage, policy()).expect("open");
            store.add_item(item(1, 3)).expect("add");
        }

        let reopened =
            CartStore::open(FileStorage::new(dir.clone()), policy()).expect("reopen");
        assert_eq!(reopened.cart().items.len(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
