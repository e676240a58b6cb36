//! Resolves the caller of a request to a [`User`].
//!
//! Users are provisioned up front (from config) and identified by an API key;
//! there is no login or registration flow.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{info, warn};

use configs::UserConfig;
use models::{Role, User};

use crate::errors::ServiceError;

/// API key used by the development teacher seeded when no users are configured.
pub const DEV_TEACHER_KEY: &str = "teacher-dev-key";

/// Trait abstraction for identity lookup so the router does not care where
/// users come from.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, api_key: &str) -> Option<User>;
}

/// Fixed set of users keyed by API key.
#[derive(Debug, Default)]
pub struct StaticIdentityStore {
    by_key: HashMap<String, User>,
}

impl StaticIdentityStore {
    pub fn from_config(users: &[UserConfig]) -> Result<Self, ServiceError> {
        if users.is_empty() {
            warn!(api_key = DEV_TEACHER_KEY, "no users configured; seeding a development teacher");
            return Ok(Self::dev_default());
        }
        let mut store = Self::default();
        for u in users {
            let role: Role = u.role.parse()?;
            store.insert(&u.api_key, &u.username, &u.full_name, role, u.student_code.clone())?;
        }
        info!(users = store.by_key.len(), "identity store loaded");
        Ok(store)
    }

    pub fn dev_default() -> Self {
        let mut store = Self::default();
        store.by_key.insert(
            DEV_TEACHER_KEY.to_string(),
            User {
                id: 1,
                username: "teacher".into(),
                full_name: "Development Teacher".into(),
                role: Role::Teacher,
                student_code: None,
            },
        );
        store
    }

    /// Add a user; ids follow insertion order.
    pub fn insert(
        &mut self,
        api_key: &str,
        username: &str,
        full_name: &str,
        role: Role,
        student_code: Option<String>,
    ) -> Result<User, ServiceError> {
        if self.by_key.contains_key(api_key) {
            return Err(ServiceError::Conflict(format!("duplicate api key for user `{username}`")));
        }
        if role == Role::Student && student_code.as_deref().map_or(true, |c| c.trim().is_empty()) {
            return Err(ServiceError::Validation(format!("student user `{username}` needs a student code")));
        }
        let user = User {
            id: self.by_key.len() as u64 + 1,
            username: username.to_string(),
            full_name: full_name.to_string(),
            role,
            student_code: student_code.map(|c| c.trim().to_string()),
        };
        self.by_key.insert(api_key.to_string(), user.clone());
        Ok(user)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityStore {
    async fn resolve(&self, api_key: &str) -> Option<User> {
        self.by_key.get(api_key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_cfg(username: &str, role: &str, key: &str, code: Option<&str>) -> UserConfig {
        UserConfig {
            username: username.into(),
            full_name: username.to_uppercase(),
            role: role.into(),
            api_key: key.into(),
            student_code: code.map(String::from),
        }
    }

    #[tokio::test]
    async fn empty_config_seeds_dev_teacher() {
        let store = StaticIdentityStore::from_config(&[]).unwrap();
        let user = store.resolve(DEV_TEACHER_KEY).await.unwrap();
        assert!(user.is_teacher());
        assert!(store.resolve("nope").await.is_none());
    }

    #[tokio::test]
    async fn resolves_configured_users() {
        let store = StaticIdentityStore::from_config(&[
            user_cfg("mrs.k", "teacher", "k1", None),
            user_cfg("sam", "student", "k2", Some("ST-1001")),
        ])
        .unwrap();
        assert_eq!(store.len(), 2);
        let sam = store.resolve("k2").await.unwrap();
        assert_eq!(sam.role, Role::Student);
        assert_eq!(sam.student_code.as_deref(), Some("ST-1001"));
        assert!(store.resolve(DEV_TEACHER_KEY).await.is_none());
    }

    #[test]
    fn rejects_bad_entries() {
        let dup = StaticIdentityStore::from_config(&[
            user_cfg("a", "teacher", "same", None),
            user_cfg("b", "teacher", "same", None),
        ]);
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));

        let no_code = StaticIdentityStore::from_config(&[user_cfg("s", "student", "k", None)]);
        assert!(matches!(no_code, Err(ServiceError::Validation(_))));

        let bad_role = StaticIdentityStore::from_config(&[user_cfg("x", "admin", "k", None)]);
        assert!(matches!(bad_role, Err(ServiceError::Model(_))));
    }
}
