//! Product types

use serde::{Deserialize, Serialize};

/// Product as returned by the upstream catalog collaborator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogProduct {
    pub id: String,
    pub name: String,
    /// Product group (e.g. "Diamonds", "Weekly Pass")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Unit price in integer currency units
    pub price: i64,
    pub available: bool,
}

/// Product snapshot embedded in an order
///
/// Denormalized at order creation so the order stays readable even if the
/// catalog changes or disappears.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSnapshot {
    pub product_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Unit price at time of purchase
    pub unit_price: i64,
    pub quantity: i64,
}

impl ProductSnapshot {
    /// Subtotal before fees and deductions
    pub fn subtotal(&self) -> i64 {
        self.unit_price * self.quantity
    }
}

impl From<(&CatalogProduct, i64)> for ProductSnapshot {
    fn from((product, quantity): (&CatalogProduct, i64)) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            group: product.group.clone(),
            unit_price: product.price,
            quantity,
        }
    }
}
