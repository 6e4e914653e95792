//! Pure cart pricing.
//!
//! Derives the four money fields from a line-item list. No I/O, no
//! hidden configuration: the policy constants arrive through
//! [`PricingPolicy`], loaded from the environment by the server and CLI.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::money::round_money;

use super::CartItem;

/// Pricing policy constants.
///
/// These are deployment configuration, not business logic — the engine
/// never hard-codes a tax rate or shipping price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingPolicy {
    /// Tax rate applied to the items subtotal (e.g. `0.15`).
    pub tax_rate: Decimal,
    /// Flat shipping price charged below the free-shipping threshold.
    pub shipping_price: Decimal,
    /// Items subtotal at which shipping becomes free.
    pub free_shipping_threshold: Decimal,
}

impl PricingPolicy {
    /// Create a pricing policy.
    #[must_use]
    pub const fn new(
        tax_rate: Decimal,
        shipping_price: Decimal,
        free_shipping_threshold: Decimal,
    ) -> Self {
        Self {
            tax_rate,
            shipping_price,
            free_shipping_threshold,
        }
    }

    /// Price a list of cart line items.
    ///
    /// - items subtotal: sum of `price × qty`, rounded to 2 decimals
    /// - shipping: the flat price below the free-shipping threshold,
    ///   zero at or above it
    /// - tax: subtotal × tax rate, rounded to 2 decimals
    /// - total: sum of the three, rounded to 2 decimals
    ///
    /// Pure and order-independent: summation is commutative, so any
    /// permutation of `items` yields identical totals.
    #[must_use]
    pub fn price_items(&self, items: &[CartItem]) -> CartTotals {
        self.price_lines(items.iter().map(|item| (item.price, item.qty)))
    }

    /// Price raw `(unit price, quantity)` pairs.
    ///
    /// Same contract as [`Self::price_items`]; used where the lines do
    /// not come from a [`CartItem`] (e.g. pricing an order snapshot
    /// server-side instead of trusting client-submitted totals).
    #[must_use]
    pub fn price_lines<I>(&self, lines: I) -> CartTotals
    where
        I: IntoIterator<Item = (Decimal, u32)>,
    {
        let items_price = round_money(
            lines
                .into_iter()
                .map(|(price, qty)| price * Decimal::from(qty))
                .sum(),
        );

        let shipping_price = if items_price < self.free_shipping_threshold {
            round_money(self.shipping_price)
        } else {
            round_money(Decimal::ZERO)
        };

        let tax_price = round_money(items_price * self.tax_rate);
        let total_price = round_money(items_price + shipping_price + tax_price);

        CartTotals {
            items_price,
            shipping_price,
            tax_price,
            total_price,
        }
    }
}

/// The four derived money fields of a cart or order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Sum of `price × qty` over the line items.
    pub items_price: Decimal,
    /// Flat shipping price, or zero above the free-shipping threshold.
    pub shipping_price: Decimal,
    /// Tax on the items subtotal.
    pub tax_price: Decimal,
    /// Grand total.
    pub total_price: Decimal,
}

impl Default for CartTotals {
    fn default() -> Self {
        let zero = round_money(Decimal::ZERO);
        Self {
            items_price: zero,
            shipping_price: zero,
            tax_price: zero,
            total_price: zero,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::id::ProductId;

    fn policy() -> PricingPolicy {
        PricingPolicy::new(
            Decimal::new(15, 2),
            Decimal::new(10, 0),
            Decimal::new(100, 0),
        )
    }

    fn item(product: i32, price: Decimal, qty: u32) -> CartItem {
        CartItem {
            product: ProductId::new(product),
            name: String::new(),
            image: String::new(),
            price,
            qty,
            count_in_stock: u32::MAX,
        }
    }

    #[test]
    fn test_empty_cart_prices_to_shipping_only() {
        // An empty cart is below the threshold, so the flat price applies.
        let totals = policy().price_items(&[]);
        assert_eq!(totals.items_price, Decimal::new(0, 2));
        assert_eq!(totals.shipping_price, Decimal::new(1000, 2));
        assert_eq!(totals.tax_price, Decimal::new(0, 2));
        assert_eq!(totals.total_price, Decimal::new(1000, 2));
    }

    #[test]
    fn test_items_price_is_sum_of_line_totals() {
        let totals = policy().price_items(&[
            item(1, Decimal::new(1999, 2), 2), // 39.98
            item(2, Decimal::new(500, 2), 3),  // 15.00
        ]);
        assert_eq!(totals.items_price, Decimal::new(5498, 2));
    }

    #[test]
    fn test_permutation_invariance() {
        let a = item(1, Decimal::new(1999, 2), 2);
        let b = item(2, Decimal::new(500, 2), 3);
        let c = item(3, Decimal::new(12_345, 2), 1);

        let policy = policy();
        let forward = policy.price_items(&[a.clone(), b.clone(), c.clone()]);
        let backward = policy.price_items(&[c, b, a]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_shipping_free_at_threshold() {
        let policy = policy();

        let below = policy.price_items(&[item(1, Decimal::new(9999, 2), 1)]);
        assert_eq!(below.shipping_price, Decimal::new(1000, 2));

        let at = policy.price_items(&[item(1, Decimal::new(100, 0), 1)]);
        assert_eq!(at.shipping_price, Decimal::new(0, 2));

        let above = policy.price_items(&[item(1, Decimal::new(100, 0), 2)]);
        assert_eq!(above.shipping_price, Decimal::new(0, 2));
    }

    #[test]
    fn test_tax_rounds_to_two_decimals() {
        // 33.33 * 0.15 = 4.9995 -> 5.00
        let totals = policy().price_items(&[item(1, Decimal::new(3333, 2), 1)]);
        assert_eq!(totals.tax_price, Decimal::new(500, 2));
    }

    #[test]
    fn test_total_is_sum_of_parts() {
        let totals = policy().price_items(&[item(1, Decimal::new(4500, 2), 1)]);
        assert_eq!(
            totals.total_price,
            totals.items_price + totals.shipping_price + totals.tax_price
        );
    }

    #[test]
    fn test_idempotent() {
        let items = [item(1, Decimal::new(1999, 2), 2)];
        let policy = policy();
        assert_eq!(policy.price_items(&items), policy.price_items(&items));
    }
}
