use serde::{Deserialize, Serialize};

/// Identity of an authenticated caller
///
/// Produced by the identity provider during token verification and
/// injected into request extensions by the server's auth middleware.
/// Handlers read it to scope data access to the calling user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedUser {
    /// Stable user identifier from the identity provider
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Access role, defaults to `user` when the provider omits it
    #[serde(default)]
    pub role: Role,
    /// Subscription plan, defaults to `free` when the provider omits it
    #[serde(default)]
    pub plan: Plan,
    #[serde(default)]
    pub email_verified: bool,
}

impl VerifiedUser {
    /// Document id of this user's profile (`user_<uid>`)
    pub fn profile_id(&self) -> String {
        crate::ids::user_doc_id(&self.uid)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Access role claim
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
    Moderator,
}

/// Subscription plan claim
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
    Enterprise,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_and_plan_default_when_absent() {
        let user: VerifiedUser = serde_json::from_value(serde_json::json!({
            "uid": "abc123"
        }))
        .unwrap();

        assert_eq!(user.role, Role::User);
        assert_eq!(user.plan, Plan::Free);
        assert!(!user.email_verified);
        assert_eq!(user.profile_id(), "user_abc123");
    }

    #[test]
    fn claims_deserialize_lowercase() {
        let user: VerifiedUser = serde_json::from_value(serde_json::json!({
            "uid": "abc123",
            "role": "moderator",
            "plan": "enterprise",
            "emailVerified": true
        }))
        .unwrap();

        assert_eq!(user.role, Role::Moderator);
        assert_eq!(user.plan, Plan::Enterprise);
        assert!(user.email_verified);
    }
}
