//! Order lifecycle tests
//!
//! Tests for status changes and legacy projections including:
//! - Property 1: Status changes append history and tracking exactly once
//! - Property 2: Legacy pricing mirrors canonical pricing after persist
//! - Property 3: Cash on delivery never survives persist or shipment

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    LegacyOrderStatus, LegacyPaymentMethod, LineTotals, Order, OrderStatus, Payment,
    PaymentMethod, PaymentStatus, Pricing, ShipmentConfirmation, TransitionPolicy,
};

fn order_with(pricing: Pricing, method: PaymentMethod) -> Order {
    Order::new(
        "1760000000000ABC123".to_string(),
        None,
        Vec::new(),
        pricing,
        Payment::new(method),
        None,
        None,
        Utc::now(),
    )
}

fn status_strategy() -> impl Strategy<Value = OrderStatus> {
    prop::sample::select(OrderStatus::ALL.to_vec())
}

fn method_strategy() -> impl Strategy<Value = PaymentMethod> {
    prop::sample::select(vec![
        PaymentMethod::Card,
        PaymentMethod::Upi,
        PaymentMethod::Cod,
        PaymentMethod::BankTransfer,
        PaymentMethod::Wallet,
    ])
}

/// Amounts with paise precision, up to ten lakh rupees
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000).prop_map(|paise| Decimal::new(paise, 2))
}

fn lines_strategy() -> impl Strategy<Value = Vec<LineTotals>> {
    prop::collection::vec(
        (amount_strategy(), 1u32..5, 0u32..=28).prop_map(|(price, qty, rate)| {
            LineTotals::compute("INR", price, qty, Decimal::ZERO, Decimal::from(rate))
        }),
        1..6,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        /// Property 1: Exactly one history entry per status change, plus one
        /// tracking event only for shipped, delivered and cancelled
        #[test]
        fn prop_set_status_appends_history_and_tracking(
            steps in prop::collection::vec(status_strategy(), 1..10)
        ) {
            let mut order = order_with(Pricing::default(), PaymentMethod::Card);

            for status in steps {
                let history_before = order.status_history.len();
                let tracking_before = order.tracking.len();

                order.set_status(status, None, Some("admin-1".to_string()), Utc::now());

                prop_assert_eq!(order.status_history.len(), history_before + 1);
                let expected_events = match status {
                    OrderStatus::Shipped | OrderStatus::Delivered | OrderStatus::Cancelled => 1,
                    _ => 0,
                };
                prop_assert_eq!(order.tracking.len(), tracking_before + expected_events);
                prop_assert_eq!(order.status, status);
            }
        }

        /// Property 1 (continued): The legacy status is always the projection
        /// of the canonical status after persist
        #[test]
        fn prop_legacy_status_follows_canonical(status in status_strategy()) {
            let mut order = order_with(Pricing::default(), PaymentMethod::Card);
            order.set_status(status, None, None, Utc::now());
            order.sync_legacy_fields();

            prop_assert_eq!(order.legacy_status, Some(status.legacy()));
        }

        /// Property 2: Legacy flattened pricing equals canonical pricing exactly
        #[test]
        fn prop_legacy_pricing_matches_canonical(
            lines in lines_strategy(),
            shipping in amount_strategy(),
        ) {
            let pricing = Pricing::from_lines("INR", lines.iter(), shipping);
            let mut order = order_with(pricing.clone(), PaymentMethod::Upi);

            // Stale legacy values are overwritten on persist
            order.legacy_pricing.total_amount = Decimal::ONE;
            order.sync_legacy_fields();

            prop_assert_eq!(order.legacy_pricing.subtotal, pricing.subtotal);
            prop_assert_eq!(order.legacy_pricing.discount, pricing.discount);
            prop_assert_eq!(order.legacy_pricing.shipping_cost, pricing.shipping);
            prop_assert_eq!(order.legacy_pricing.tax, pricing.tax);
            prop_assert_eq!(order.legacy_pricing.total_amount, pricing.total);
        }

        /// Property 2 (continued): Order total is the sum of its parts
        #[test]
        fn prop_pricing_total_is_consistent(
            lines in lines_strategy(),
            shipping in amount_strategy(),
        ) {
            let pricing = Pricing::from_lines("INR", lines.iter(), shipping);
            prop_assert_eq!(
                pricing.total,
                pricing.subtotal - pricing.discount + pricing.tax + pricing.shipping
            );
        }

        /// Property 3: No payment method is cash on delivery after persist
        #[test]
        fn prop_cod_never_survives_persist(method in method_strategy()) {
            let mut order = order_with(Pricing::default(), PaymentMethod::Card);
            order.payment.method = method;
            order.sync_legacy_fields();

            prop_assert_ne!(order.payment.method, PaymentMethod::Cod);
            prop_assert_ne!(order.payment.legacy_method, Some(LegacyPaymentMethod::CashOnDelivery));
            if method == PaymentMethod::Cod {
                prop_assert_eq!(order.payment.method, PaymentMethod::DEFAULT_PREPAID);
            } else {
                prop_assert_eq!(order.payment.method, method);
            }
        }

        /// Property 3 (continued): A shipment always leaves the payment paid
        #[test]
        fn prop_shipment_marks_payment_paid(
            method in method_strategy(),
            status in status_strategy(),
        ) {
            let mut order = order_with(Pricing::default(), PaymentMethod::Card);
            order.payment.method = method;
            order.status = status;

            order.apply_shipment(
                &ShipmentConfirmation {
                    carrier: "sequel".to_string(),
                    docket_number: Some("9988776655".to_string()),
                    reference_number: None,
                    estimated_delivery: None,
                },
                None,
                Utc::now(),
            );

            prop_assert_eq!(order.payment.status, PaymentStatus::Paid);
            prop_assert_ne!(order.payment.method, PaymentMethod::Cod);
            prop_assert_eq!(order.existing_docket(), Some("9988776655"));
        }

        /// Forward-only policy lets a terminal status move only to refunded
        #[test]
        fn prop_forward_only_respects_terminal_states(
            from in status_strategy(),
            to in status_strategy(),
        ) {
            let policy = TransitionPolicy::ForwardOnly;
            if from.is_terminal() && to != OrderStatus::Refunded {
                prop_assert!(!policy.allows(from, to));
            }
            prop_assert!(TransitionPolicy::Unrestricted.allows(from, to));
        }
    }

    #[test]
    fn test_every_canonical_status_has_a_legacy_label() {
        for status in OrderStatus::ALL {
            let legacy = status.legacy();
            assert!(LegacyOrderStatus::ALL.contains(&legacy));
        }
    }

    #[test]
    fn test_new_order_starts_pending_with_one_history_entry() {
        let order = order_with(Pricing::default(), PaymentMethod::Upi);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.legacy_status, Some(LegacyOrderStatus::Pending));
        assert_eq!(order.status_history.len(), 1);
        assert!(order.tracking.is_empty());
        assert!(!order.has_shipment());
    }
}
