use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a running vitalwatch service, reported by `/info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub instance_id: Uuid,
    /// Base URL of the clinical API the service reads from and submits to.
    pub upstream: String,
}

impl ServiceInfo {
    pub fn new(name: &str, upstream: &str) -> Self {
        Self {
            name: name.to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            instance_id: Uuid::new_v4(),
            upstream: upstream.trim_end_matches('/').to_owned(),
        }
    }
}
