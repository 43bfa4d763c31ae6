//! Order and line-item pricing

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY: &str = "INR";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Canonical pricing record for an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Pricing {
    #[serde(default = "default_currency")]
    pub currency: String,
    pub subtotal: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub shipping: Decimal,
    #[serde(default)]
    pub tax: Decimal,
    pub total: Decimal,
}

impl Pricing {
    /// Build an order pricing record from its line totals
    pub fn from_lines<'a>(
        currency: &str,
        lines: impl IntoIterator<Item = &'a LineTotals>,
        shipping: Decimal,
    ) -> Self {
        let mut pricing = Pricing {
            currency: currency.to_string(),
            shipping,
            ..Default::default()
        };

        for line in lines {
            pricing.subtotal += line.subtotal;
            pricing.tax += line.tax;
            pricing.discount += line.discount;
        }

        pricing.total = pricing.subtotal - pricing.discount + pricing.tax + pricing.shipping;
        pricing
    }
}

/// Per-line computed totals
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LineTotals {
    #[serde(default = "default_currency")]
    pub currency: String,
    pub subtotal: Decimal,
    #[serde(default)]
    pub tax: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    pub total: Decimal,
}

impl LineTotals {
    /// Compute totals for `quantity` units at `unit_price`.
    ///
    /// `tax_rate_percent` applies to the discounted subtotal. The discount is
    /// capped at the subtotal, so `subtotal - discount + tax == total`.
    pub fn compute(
        currency: &str,
        unit_price: Decimal,
        quantity: u32,
        discount: Decimal,
        tax_rate_percent: Decimal,
    ) -> Self {
        let subtotal = unit_price * Decimal::from(quantity);
        let discount = discount.clamp(Decimal::ZERO, subtotal.max(Decimal::ZERO));
        let taxable = subtotal - discount;
        let tax = (taxable * tax_rate_percent / Decimal::from(100)).round_dp(2);

        LineTotals {
            currency: currency.to_string(),
            subtotal,
            tax,
            discount,
            total: taxable + tax,
        }
    }
}

/// Flattened pricing columns kept for older consumers.
///
/// Always a copy of the canonical [`Pricing`] record; never edited directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LegacyPricing {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping_cost: Decimal,
    pub tax: Decimal,
    pub total_amount: Decimal,
}

impl From<&Pricing> for LegacyPricing {
    fn from(pricing: &Pricing) -> Self {
        LegacyPricing {
            subtotal: pricing.subtotal,
            discount: pricing.discount,
            shipping_cost: pricing.shipping,
            tax: pricing.tax,
            total_amount: pricing.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_line_totals_with_tax_and_discount() {
        let line = LineTotals::compute("INR", dec("12500.00"), 2, dec("1000"), dec("3"));
        assert_eq!(line.subtotal, dec("25000.00"));
        assert_eq!(line.tax, dec("720.00"));
        assert_eq!(line.total, dec("24720.00"));
    }

    #[test]
    fn test_discount_larger_than_subtotal_does_not_go_negative() {
        let line = LineTotals::compute("INR", dec("100"), 1, dec("150"), dec("3"));
        assert_eq!(line.discount, dec("100"));
        assert_eq!(line.tax, Decimal::ZERO);
        assert_eq!(line.total, Decimal::ZERO);
    }

    #[test]
    fn test_order_total_is_sum_of_line_totals_with_oversized_discount() {
        let lines = vec![
            LineTotals::compute("INR", dec("100"), 1, dec("150"), dec("3")),
            LineTotals::compute("INR", dec("200"), 1, Decimal::ZERO, dec("3")),
        ];
        let pricing = Pricing::from_lines("INR", &lines, dec("50"));

        let line_sum: Decimal = lines.iter().map(|l| l.total).sum();
        assert_eq!(pricing.total, line_sum + dec("50"));
        assert_eq!(pricing.total, dec("256.00"));
        assert!(pricing.total >= Decimal::ZERO);
    }

    #[test]
    fn test_pricing_from_lines() {
        let lines = vec![
            LineTotals::compute("INR", dec("1000"), 1, Decimal::ZERO, dec("3")),
            LineTotals::compute("INR", dec("500"), 2, dec("100"), dec("3")),
        ];
        let pricing = Pricing::from_lines("INR", &lines, dec("99"));

        assert_eq!(pricing.subtotal, dec("2000"));
        assert_eq!(pricing.discount, dec("100"));
        assert_eq!(pricing.tax, dec("57.00"));
        assert_eq!(pricing.total, dec("2056.00"));
    }

    #[test]
    fn test_legacy_pricing_copies_exactly() {
        let pricing = Pricing {
            currency: "INR".to_string(),
            subtotal: dec("10.005"),
            discount: dec("0.001"),
            shipping: dec("1.10"),
            tax: dec("0.333"),
            total: dec("11.437"),
        };
        let legacy = LegacyPricing::from(&pricing);
        assert_eq!(legacy.subtotal, pricing.subtotal);
        assert_eq!(legacy.shipping_cost, pricing.shipping);
        assert_eq!(legacy.total_amount, pricing.total);
    }
}
