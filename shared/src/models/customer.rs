//! Customer reference carried by an order

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Customer contact details
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Either a bare customer id or the resolved customer record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CustomerRef {
    Populated(Customer),
    Id(Uuid),
}

impl CustomerRef {
    pub fn id(&self) -> Uuid {
        match self {
            CustomerRef::Populated(customer) => customer.id,
            CustomerRef::Id(id) => *id,
        }
    }

    pub fn populated(&self) -> Option<&Customer> {
        match self {
            CustomerRef::Populated(customer) => Some(customer),
            CustomerRef::Id(_) => None,
        }
    }
}
