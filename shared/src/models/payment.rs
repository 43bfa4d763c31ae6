//! Payment details attached to an order

use serde::{Deserialize, Serialize};

/// Canonical payment method
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Card,
    Upi,
    Cod,
    BankTransfer,
    Wallet,
}

impl PaymentMethod {
    /// Card-based method substituted whenever cash on delivery is not accepted
    pub const DEFAULT_PREPAID: PaymentMethod = PaymentMethod::Card;

    /// Display label used by the legacy payment fields
    pub fn legacy_label(&self) -> LegacyPaymentMethod {
        match self {
            PaymentMethod::Card => LegacyPaymentMethod::CreditCard,
            PaymentMethod::Upi => LegacyPaymentMethod::Upi,
            PaymentMethod::Cod => LegacyPaymentMethod::CashOnDelivery,
            PaymentMethod::BankTransfer => LegacyPaymentMethod::NetBanking,
            PaymentMethod::Wallet => LegacyPaymentMethod::Wallet,
        }
    }
}

/// Display labels understood by older consumers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LegacyPaymentMethod {
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "UPI")]
    Upi,
    #[serde(rename = "Cash on Delivery")]
    CashOnDelivery,
    #[serde(rename = "Net Banking")]
    NetBanking,
    #[serde(rename = "Wallet")]
    Wallet,
}

/// Payment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Authorized,
    Paid,
    Refunded,
    Failed,
}

impl PaymentStatus {
    pub fn legacy_label(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Authorized => "Authorized",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Refunded => "Refunded",
            PaymentStatus::Failed => "Failed",
        }
    }
}

/// Payment record with its legacy display projection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Payment {
    pub method: PaymentMethod,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_method: Option<LegacyPaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_status: Option<String>,
}

impl Payment {
    pub fn new(method: PaymentMethod) -> Self {
        Payment {
            method,
            ..Default::default()
        }
    }

    /// Replace cash on delivery with the default prepaid method.
    ///
    /// Returns true if the method was changed.
    pub fn reject_cash_on_delivery(&mut self) -> bool {
        if self.method == PaymentMethod::Cod {
            self.method = PaymentMethod::DEFAULT_PREPAID;
            true
        } else {
            false
        }
    }

    /// Recompute the legacy display fields from the canonical ones
    pub fn sync_legacy(&mut self) {
        self.legacy_method = Some(self.method.legacy_label());
        self.legacy_status = Some(self.status.legacy_label().to_string());
    }
}
