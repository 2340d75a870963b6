use serde::{Deserialize, Serialize};

/// Cut-offs that turn a risk profile into alert bucket membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Minimum summed score for the high-risk bucket.
    pub high_risk_total: u8,
    /// Temperature (°F) at or above which a valid reading raises a fever alert.
    pub fever_alert_f: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            high_risk_total: 4,
            fever_alert_f: 99.6,
        }
    }
}
