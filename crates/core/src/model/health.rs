use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Health {
    pub status: String,
    pub service: String,
    pub timestamp: String,
}

impl Health {
    pub fn healthy(service: impl Into<String>, timestamp: String) -> Self {
        Self {
            status: "healthy".to_string(),
            service: service.into(),
            timestamp,
        }
    }
}
