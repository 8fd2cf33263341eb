//! Supplier model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A supplier of raw-material inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub contact_info: Option<String>,
}
