//! Order status and its legacy projection

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Canonical order status, the single source of truth for order progression
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    InProduction,
    ReadyForDispatch,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 8] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::InProduction,
        OrderStatus::ReadyForDispatch,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::InProduction => "in_production",
            OrderStatus::ReadyForDispatch => "ready_for_dispatch",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Refunded
        )
    }

    /// Project onto the legacy status enumeration.
    ///
    /// Total over the canonical statuses. Several canonical statuses collapse
    /// onto `processing`, so the legacy value is always derived from the
    /// canonical one and never read back. The mapping is intentionally not
    /// injective: the legacy enumeration has fewer values than the canonical one.
    pub fn legacy(&self) -> LegacyOrderStatus {
        match self {
            OrderStatus::Pending => LegacyOrderStatus::Pending,
            OrderStatus::Confirmed => LegacyOrderStatus::Processing,
            OrderStatus::InProduction => LegacyOrderStatus::Processing,
            OrderStatus::ReadyForDispatch => LegacyOrderStatus::Processing,
            OrderStatus::Shipped => LegacyOrderStatus::Shipped,
            OrderStatus::Delivered => LegacyOrderStatus::Delivered,
            OrderStatus::Cancelled => LegacyOrderStatus::Cancelled,
            OrderStatus::Refunded => LegacyOrderStatus::Returned,
        }
    }

    /// Forward-only transition table, used when transition enforcement is on
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;

        if *self == next {
            return false;
        }

        match self {
            Pending => matches!(next, Confirmed | InProduction | Shipped | Cancelled),
            Confirmed => matches!(next, InProduction | ReadyForDispatch | Shipped | Cancelled),
            InProduction => matches!(next, ReadyForDispatch | Shipped | Cancelled),
            ReadyForDispatch => matches!(next, Shipped | Cancelled),
            Shipped => matches!(next, Delivered | Cancelled),
            Delivered => matches!(next, Refunded),
            Cancelled => matches!(next, Refunded),
            Refunded => false,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known status
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Status vocabulary understood by older consumers of the order API
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LegacyOrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
}

impl LegacyOrderStatus {
    pub const ALL: [LegacyOrderStatus; 6] = [
        LegacyOrderStatus::Pending,
        LegacyOrderStatus::Processing,
        LegacyOrderStatus::Shipped,
        LegacyOrderStatus::Delivered,
        LegacyOrderStatus::Cancelled,
        LegacyOrderStatus::Returned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LegacyOrderStatus::Pending => "pending",
            LegacyOrderStatus::Processing => "processing",
            LegacyOrderStatus::Shipped => "shipped",
            LegacyOrderStatus::Delivered => "delivered",
            LegacyOrderStatus::Cancelled => "cancelled",
            LegacyOrderStatus::Returned => "returned",
        }
    }
}

impl FromStr for LegacyOrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LegacyOrderStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// How strictly status changes are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Any status may follow any status
    #[default]
    Unrestricted,
    /// Only moves allowed by [`OrderStatus::can_transition_to`]
    ForwardOnly,
}

impl TransitionPolicy {
    pub fn from_enforced(enforce: bool) -> Self {
        if enforce {
            TransitionPolicy::ForwardOnly
        } else {
            TransitionPolicy::Unrestricted
        }
    }

    pub fn allows(&self, from: OrderStatus, to: OrderStatus) -> bool {
        match self {
            TransitionPolicy::Unrestricted => true,
            TransitionPolicy::ForwardOnly => from.can_transition_to(to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_projection_collapses_preparation_statuses() {
        let processing: Vec<OrderStatus> = OrderStatus::ALL
            .into_iter()
            .filter(|s| s.legacy() == LegacyOrderStatus::Processing)
            .collect();
        assert_eq!(
            processing,
            vec![
                OrderStatus::Confirmed,
                OrderStatus::InProduction,
                OrderStatus::ReadyForDispatch
            ]
        );
        assert_eq!(OrderStatus::Refunded.legacy(), LegacyOrderStatus::Returned);
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert!("processing".parse::<OrderStatus>().is_err());
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_legacy_projection() {
        assert_eq!(OrderStatus::Pending.legacy(), LegacyOrderStatus::Pending);
        assert_eq!(OrderStatus::Confirmed.legacy(), LegacyOrderStatus::Processing);
        assert_eq!(OrderStatus::InProduction.legacy(), LegacyOrderStatus::Processing);
        assert_eq!(
            OrderStatus::ReadyForDispatch.legacy(),
            LegacyOrderStatus::Processing
        );
        assert_eq!(OrderStatus::Refunded.legacy(), LegacyOrderStatus::Returned);
    }

    #[test]
    fn test_every_legacy_status_is_reachable() {
        for legacy in LegacyOrderStatus::ALL {
            assert!(OrderStatus::ALL.iter().any(|s| s.legacy() == legacy));
        }
    }

    #[test]
    fn test_terminal_states() {
        let terminal: Vec<_> = OrderStatus::ALL
            .iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(
            terminal,
            vec![
                &OrderStatus::Delivered,
                &OrderStatus::Cancelled,
                &OrderStatus::Refunded
            ]
        );
    }

    #[test]
    fn test_unrestricted_policy_allows_everything() {
        let policy = TransitionPolicy::Unrestricted;
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert!(policy.allows(from, to));
            }
        }
    }

    #[test]
    fn test_forward_only_policy() {
        let policy = TransitionPolicy::ForwardOnly;
        assert!(policy.allows(OrderStatus::Pending, OrderStatus::Confirmed));
        assert!(policy.allows(OrderStatus::Shipped, OrderStatus::Delivered));
        assert!(policy.allows(OrderStatus::Cancelled, OrderStatus::Refunded));
        assert!(!policy.allows(OrderStatus::Delivered, OrderStatus::Pending));
        assert!(!policy.allows(OrderStatus::Refunded, OrderStatus::Pending));
        assert!(!policy.allows(OrderStatus::Shipped, OrderStatus::Shipped));
    }
}
