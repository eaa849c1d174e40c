use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub status: String,
}

/// Tier A body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserList {
    pub users: Vec<User>,
    pub profile_data: Value,
    pub total_count: usize,
}

/// Tier B body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileSummary {
    pub active_profiles: u32,
    pub inactive_profiles: u32,
    pub settings: Value,
    pub last_sync: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureFlags {
    pub beta_features: bool,
    pub analytics: bool,
}

/// Tier C body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub theme: String,
    pub notifications: bool,
    pub language: String,
    pub timezone: String,
    pub features: FeatureFlags,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

pub fn sample_users() -> Vec<User> {
    vec![
        User {
            id: 1,
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            status: "active".to_string(),
        },
        User {
            id: 2,
            name: "Jane Smith".to_string(),
            email: "jane@example.com".to_string(),
            status: "inactive".to_string(),
        },
    ]
}

impl UserList {
    pub fn with_profiles(profile_data: Value) -> Self {
        let users = sample_users();
        let total_count = users.len();
        Self {
            users,
            profile_data,
            total_count,
        }
    }
}

impl ProfileSummary {
    pub fn with_settings(settings: Value, last_sync: String) -> Self {
        Self {
            active_profiles: 45,
            inactive_profiles: 12,
            settings,
            last_sync,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            notifications: true,
            language: "en".to_string(),
            timezone: "UTC".to_string(),
            features: FeatureFlags {
                beta_features: false,
                analytics: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn user_list_counts_fixed_users() {
        let list = UserList::with_profiles(json!({"active_profiles": 45}));
        assert_eq!(list.total_count, 2);
        assert_eq!(list.users[1].name, "Jane Smith");
    }

    #[test]
    fn settings_shape() {
        let value = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "theme": "dark",
                "notifications": true,
                "language": "en",
                "timezone": "UTC",
                "features": {"beta_features": false, "analytics": true}
            })
        );
    }

    #[test]
    fn error_body_shape() {
        let value = serde_json::to_value(ErrorBody::new("Bad request")).unwrap();
        assert_eq!(value, json!({"error": "Bad request"}));
    }
}
