//! The user record and the shapes used to create and patch it.

use crate::{Email, UserId};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Current time truncated to microseconds, the precision Postgres keeps.
///
/// A record cached straight after a write must equal the same record read
/// back from the store, so every timestamp goes through here.
#[must_use]
pub fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct User {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = Uuid))]
    pub id: UserId,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub email: Email,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Builds a fresh active record from a draft.
    #[must_use]
    pub fn from_draft(draft: UserDraft) -> Self {
        let now = now_micros();
        Self {
            id: UserId::new(),
            email: draft.email,
            username: draft.username,
            first_name: draft.first_name,
            last_name: draft.last_name,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a patch in place and bumps `updated_at`.
    pub fn apply(&mut self, patch: &UserPatch, now: DateTime<Utc>) {
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(username) = &patch.username {
            self.username.clone_from(username);
        }
        if let Some(first_name) = &patch.first_name {
            self.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &patch.last_name {
            self.last_name.clone_from(last_name);
        }
        self.updated_at = now;
    }
}

/// Input for creating a user. The id, timestamps and active flag are
/// assigned by the store adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub email: Email,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// A column that may be changed by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserColumn {
    Email,
    Username,
    FirstName,
    LastName,
}

impl UserColumn {
    /// The SQL column name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Username => "username",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
        }
    }
}

/// A sparse update: one optional slot per updatable column.
///
/// `is_active` has no slot; deactivation goes through a delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub email: Option<Email>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserPatch {
    /// Returns true when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.username.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
    }

    /// The set fields as `(column, value)` pairs, in a fixed column order.
    #[must_use]
    pub fn columns(&self) -> Vec<(UserColumn, &str)> {
        [
            (UserColumn::Email, self.email.as_ref().map(Email::as_str)),
            (UserColumn::Username, self.username.as_deref()),
            (UserColumn::FirstName, self.first_name.as_deref()),
            (UserColumn::LastName, self.last_name.as_deref()),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.map(|v| (column, v)))
        .collect()
    }
}
