//! Monitor device-state domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a monitor's location-reporting session is currently running.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceState {
    pub identity_id: String,
    pub active: bool,
    pub updated_at: DateTime<Utc>,
}
