//! User model and in-memory user store.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Anonymous user UUID (nil UUID).
pub const ANONYMOUS_USER_ID: Uuid = Uuid::nil();

/// User record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Superuser: holds every permission while active.
    pub is_admin: bool,
    /// Staff users may be granted access to individual sites.
    pub is_staff: bool,
    pub status: i16,
    /// Granted permissions, e.g. `content.change_item`.
    #[serde(default)]
    pub permissions: HashSet<String>,
}

impl User {
    /// The anonymous user.
    pub fn anonymous() -> Self {
        Self {
            id: ANONYMOUS_USER_ID,
            name: String::new(),
            is_admin: false,
            is_staff: false,
            status: 1,
            permissions: HashSet::new(),
        }
    }

    /// Create an active, non-staff user with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            is_admin: false,
            is_staff: false,
            status: 1,
            permissions: HashSet::new(),
        }
    }

    /// Mark the user as staff.
    pub fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }

    /// Mark the user as a superuser.
    pub fn admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    /// Block the user.
    pub fn blocked(mut self) -> Self {
        self.status = 0;
        self
    }

    /// Grant a permission.
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    /// Check if this is the anonymous user.
    pub fn is_anonymous(&self) -> bool {
        self.id == ANONYMOUS_USER_ID
    }

    pub fn is_authenticated(&self) -> bool {
        !self.is_anonymous()
    }

    /// Check if this user is active.
    pub fn is_active(&self) -> bool {
        self.status == 1
    }

    /// Check a permission. Inactive users have none; active admins have all.
    pub fn has_perm(&self, permission: &str) -> bool {
        if !self.is_active() {
            return false;
        }
        self.is_admin || self.permissions.contains(permission)
    }
}

/// Concurrent in-memory user store.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: Arc<DashMap<Uuid, User>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user.
    pub fn insert(&self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Find a user by ID.
    pub fn find_by_id(&self, id: Uuid) -> Option<User> {
        self.users.get(&id).map(|u| u.clone())
    }

    /// Resolve an optional session user id, falling back to anonymous.
    pub fn current(&self, id: Option<Uuid>) -> User {
        id.and_then(|id| self.find_by_id(id))
            .unwrap_or_else(User::anonymous)
    }
}
