//! The three traced endpoints of the call chain. Each is a table of names,
//! messages and a body composer fed to [`crate::handler::handle`].

use serde_json::{Value, json};
use tierchain_core::config::Role;
use tierchain_core::model::payload::{ProfileSummary, Settings, UserList};
use tierchain_core::time::now_timestamp;

/// Log line and span/body message for a simulated failure.
#[derive(Debug, Clone, Copy)]
pub struct Rejection {
    pub log: &'static str,
    pub message: &'static str,
}

/// Next hop of the chain.
#[derive(Debug, Clone, Copy)]
pub struct Downstream {
    pub tier: Role,
    pub path: &'static str,
    /// Prefix of the error log line; the transport error follows it.
    pub failure_log: &'static str,
    pub unavailable: &'static str,
}

/// Successful response body plus the info line logged alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub body: Value,
    pub summary: String,
}

#[derive(Debug)]
pub struct Endpoint {
    pub operation: &'static str,
    pub route: &'static str,
    pub started: &'static str,
    pub server_error: Rejection,
    pub client_error: Rejection,
    pub downstream: Option<Downstream>,
    /// Builds the body from the downstream result, `None` for the last tier.
    pub compose: fn(Option<Value>) -> Reply,
}

pub const USERS: Endpoint = Endpoint {
    operation: "get_users",
    route: "/api/users",
    started: "Processing user request",
    server_error: Rejection {
        log: "Internal server error occurred",
        message: "Internal server error",
    },
    client_error: Rejection {
        log: "Bad request received",
        message: "Bad request",
    },
    downstream: Some(Downstream {
        tier: Role::B,
        path: "/api/profiles",
        failure_log: "Error calling profile service",
        unavailable: "Service unavailable",
    }),
    compose: compose_users,
};

pub const PROFILES: Endpoint = Endpoint {
    operation: "get_profiles",
    route: "/api/profiles",
    started: "Processing profile request",
    server_error: Rejection {
        log: "Profile service error",
        message: "Profile service error",
    },
    client_error: Rejection {
        log: "Invalid profile request",
        message: "Invalid request",
    },
    downstream: Some(Downstream {
        tier: Role::C,
        path: "/api/settings",
        failure_log: "Error calling settings service",
        unavailable: "Settings service unavailable",
    }),
    compose: compose_profiles,
};

pub const SETTINGS: Endpoint = Endpoint {
    operation: "get_settings",
    route: "/api/settings",
    started: "Processing settings request",
    server_error: Rejection {
        log: "Settings service database error",
        message: "Database error",
    },
    client_error: Rejection {
        log: "Invalid settings query",
        message: "Invalid query",
    },
    downstream: None,
    compose: compose_settings,
};

fn compose_users(profiles: Option<Value>) -> Reply {
    let list = UserList::with_profiles(profiles.unwrap_or(Value::Null));
    let summary = format!("Successfully processed {} users", list.users.len());
    Reply {
        body: json!(list),
        summary,
    }
}

fn compose_profiles(settings: Option<Value>) -> Reply {
    let summary = ProfileSummary::with_settings(settings.unwrap_or(Value::Null), now_timestamp());
    Reply {
        body: json!(summary),
        summary: "Successfully retrieved profile data".to_string(),
    }
}

fn compose_settings(_: Option<Value>) -> Reply {
    Reply {
        body: json!(Settings::default()),
        summary: "Successfully retrieved settings data".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_points_downward() {
        assert_eq!(USERS.downstream.map(|d| d.tier), Some(Role::B));
        assert_eq!(PROFILES.downstream.map(|d| d.tier), Some(Role::C));
        assert!(SETTINGS.downstream.is_none());
    }

    #[test]
    fn users_body_embeds_profiles() {
        let reply = (USERS.compose)(Some(json!({"active_profiles": 45})));
        assert_eq!(reply.body["profile_data"], json!({"active_profiles": 45}));
        assert_eq!(reply.body["total_count"], 2);
        assert_eq!(reply.summary, "Successfully processed 2 users");
    }

    #[test]
    fn profiles_body_embeds_settings() {
        let reply = (PROFILES.compose)(Some(json!({"theme": "dark"})));
        assert_eq!(reply.body["active_profiles"], 45);
        assert_eq!(reply.body["inactive_profiles"], 12);
        assert_eq!(reply.body["settings"], json!({"theme": "dark"}));
        assert!(reply.body["last_sync"].as_str().unwrap().ends_with('Z'));
    }
}
