//! Order line contract
//!
//! The order subsystem reports placed orders to the inventory engine as a
//! list of lines; the engine only needs product, condition and quantity.

use serde::{Deserialize, Serialize};

use super::Condition;

/// One line of a placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: i64,
    pub condition: Condition,
    pub quantity: i64,
}
