//! Order domain types and lifecycle rules.
//!
//! An order moves `Created → Paid → Delivered`, never skipping `Paid`.
//! The transition rules live here as pure decision functions so the
//! handlers and repository stay orchestration-only and the rules are
//! testable without a database.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bramble_core::{OrderId, PaymentMethod, ProductId, ShippingAddress, UserId};

/// One line of an order: a product snapshot frozen at placement time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// The product this line refers to.
    pub product: ProductId,
    /// Product name at placement time.
    pub name: String,
    /// Product image URL at placement time.
    pub image: String,
    /// Unit price at placement time.
    pub price: Decimal,
    /// Quantity ordered.
    pub qty: i32,
}

/// The gateway's record of a completed payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    /// Gateway transaction (payment) id.
    pub id: String,
    /// Gateway-reported status string.
    pub status: String,
    /// Gateway-reported update timestamp.
    pub update_time: DateTime<Utc>,
    /// Payer email, when the gateway reports one.
    pub email_address: Option<String>,
    /// Amount actually paid, in the currency's standard unit.
    pub amount: Decimal,
}

/// An order: immutable snapshot plus mutable payment/delivery status.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    /// The user the order is attributed to.
    pub user_id: UserId,
    /// Line items snapshotted from the cart.
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub items_price: Decimal,
    pub shipping_price: Decimal,
    pub tax_price: Decimal,
    pub total_price: Decimal,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub payment_result: Option<PaymentResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A rejected lifecycle transition.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransitionError {
    /// The payment amount does not match the order total.
    #[error("payment amount {received} does not match order total {expected}")]
    AmountMismatch {
        expected: Decimal,
        received: Decimal,
    },

    /// The order is already paid under a different gateway payment id.
    #[error("order already paid by payment {existing}")]
    ConflictingPayment { existing: String },

    /// Delivery requires the order to be paid first.
    #[error("order has not been paid")]
    NotPaid,
}

/// Outcome of an accepted transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The state change should be written.
    Apply,
    /// The order is already in the requested state; nothing to write.
    AlreadyApplied,
}

impl Order {
    /// Decide whether a payment result may be applied to this order.
    ///
    /// Rules:
    /// - the paid amount must equal the order total (a forged or
    ///   mismatched callback must not flip `is_paid`)
    /// - re-submitting the payment that already paid the order is
    ///   idempotent
    /// - a *different* payment for an already-paid order is a conflict
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::AmountMismatch`] or
    /// [`TransitionError::ConflictingPayment`] when rejected.
    pub fn decide_payment(&self, result: &PaymentResult) -> Result<Transition, TransitionError> {
        if result.amount != self.total_price {
            return Err(TransitionError::AmountMismatch {
                expected: self.total_price,
                received: result.amount,
            });
        }

        if self.is_paid {
            return match &self.payment_result {
                Some(existing) if existing.id == result.id => Ok(Transition::AlreadyApplied),
                Some(existing) => Err(TransitionError::ConflictingPayment {
                    existing: existing.id.clone(),
                }),
                // Paid without a stored result should not happen; treat the
                // incoming result as authoritative rather than lose it.
                None => Ok(Transition::Apply),
            };
        }

        Ok(Transition::Apply)
    }

    /// Decide whether the order may be marked delivered.
    ///
    /// Delivery strictly requires payment first; marking an already
    /// delivered order again is idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::NotPaid`] when the order is unpaid.
    pub fn decide_delivery(&self) -> Result<Transition, TransitionError> {
        if !self.is_paid {
            return Err(TransitionError::NotPaid);
        }

        if self.is_delivered {
            return Ok(Transition::AlreadyApplied);
        }

        Ok(Transition::Apply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(total: Decimal) -> Order {
        Order {
            id: OrderId::new(1),
            user_id: UserId::new(1),
            items: vec![OrderItem {
                product: ProductId::new(1),
                name: "Widget".to_owned(),
                image: "/images/widget.jpg".to_owned(),
                price: total,
                qty: 1,
            }],
            shipping_address: ShippingAddress {
                address: "1 Main St".to_owned(),
                city: "Springfield".to_owned(),
                postal_code: "12345".to_owned(),
                country: "US".to_owned(),
            },
            payment_method: PaymentMethod::Razorpay,
            items_price: total,
            shipping_price: Decimal::ZERO,
            tax_price: Decimal::ZERO,
            total_price: total,
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            delivered_at: None,
            payment_result: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn payment(id: &str, amount: Decimal) -> PaymentResult {
        PaymentResult {
            id: id.to_owned(),
            status: "captured".to_owned(),
            update_time: Utc::now(),
            email_address: Some("shopper@example.com".to_owned()),
            amount,
        }
    }

    #[test]
    fn test_new_order_accepts_matching_payment() {
        let order = order(Decimal::new(23_000, 2));
        let decision = order
            .decide_payment(&payment("pay_1", Decimal::new(23_000, 2)))
            .expect("accepted");
        assert_eq!(decision, Transition::Apply);
    }

    #[test]
    fn test_payment_amount_mismatch_rejected() {
        let order = order(Decimal::new(23_000, 2));
        let err = order
            .decide_payment(&payment("pay_1", Decimal::new(100, 2)))
            .expect_err("rejected");
        assert!(matches!(err, TransitionError::AmountMismatch { .. }));
    }

    #[test]
    fn test_repeated_payment_is_idempotent() {
        let total = Decimal::new(23_000, 2);
        let mut paid = order(total);
        paid.is_paid = true;
        paid.payment_result = Some(payment("pay_1", total));

        let decision = paid
            .decide_payment(&payment("pay_1", total))
            .expect("accepted");
        assert_eq!(decision, Transition::AlreadyApplied);
    }

    #[test]
    fn test_second_distinct_payment_conflicts() {
        let total = Decimal::new(23_000, 2);
        let mut paid = order(total);
        paid.is_paid = true;
        paid.payment_result = Some(payment("pay_1", total));

        let err = paid
            .decide_payment(&payment("pay_2", total))
            .expect_err("rejected");
        assert!(matches!(
            err,
            TransitionError::ConflictingPayment { existing } if existing == "pay_1"
        ));
    }

    #[test]
    fn test_delivery_requires_payment() {
        let unpaid = order(Decimal::new(100, 0));
        assert!(matches!(
            unpaid.decide_delivery(),
            Err(TransitionError::NotPaid)
        ));

        let mut paid = unpaid;
        paid.is_paid = true;
        assert_eq!(paid.decide_delivery().expect("accepted"), Transition::Apply);
    }

    #[test]
    fn test_repeated_delivery_is_idempotent() {
        let mut done = order(Decimal::new(100, 0));
        done.is_paid = true;
        done.is_delivered = true;
        assert_eq!(
            done.decide_delivery().expect("accepted"),
            Transition::AlreadyApplied
        );
    }
}
