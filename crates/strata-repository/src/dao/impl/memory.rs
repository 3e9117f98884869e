//! In-memory user DAO for development and tests.

use crate::dao::UserDao;
use async_trait::async_trait;
use shaku::Component;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use strata_core::{now_micros, Email, StrataError, StrataResult, User, UserDraft, UserId, UserPatch};
use tokio::sync::RwLock;

/// In-memory user store.
///
/// Behaves like the Postgres table: rows are only ever soft-deleted, and
/// email uniqueness among active rows is enforced on write the same way
/// the partial unique index does. Data is lost when the store is dropped.
#[derive(Component, Debug, Clone, Default)]
#[shaku(interface = UserDao)]
pub struct InMemoryUserDao {
    #[shaku(default)]
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserDao {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a row whether or not it is active.
    pub async fn find_any_by_id(&self, id: UserId) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }

    fn email_taken(users: &HashMap<UserId, User>, email: &Email, except: Option<UserId>) -> bool {
        users
            .values()
            .any(|u| u.is_active && &u.email == email && Some(u.id) != except)
    }
}

#[async_trait]
impl UserDao for InMemoryUserDao {
    async fn insert(&self, draft: &UserDraft) -> StrataResult<User> {
        let mut users = self.users.write().await;
        if Self::email_taken(&users, &draft.email, None) {
            return Err(StrataError::conflict(format!(
                "duplicate key value violates unique constraint \"users_active_email_key\": {}",
                draft.email
            )));
        }
        let user = User::from_draft(draft.clone());
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_active_by_id(&self, id: UserId) -> StrataResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).filter(|u| u.is_active).cloned())
    }

    async fn find_active_by_email(&self, email: &Email) -> StrataResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.is_active && &u.email == email)
            .cloned())
    }

    async fn find_active_page(&self, limit: i64, offset: i64) -> StrataResult<Vec<User>> {
        let users = self.users.read().await;
        let mut active: Vec<&User> = users.values().filter(|u| u.is_active).collect();
        active.sort_by_key(|u| Reverse((u.created_at, u.id)));

        let offset = usize::try_from(offset).unwrap_or(0);
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(active.into_iter().skip(offset).take(limit).cloned().collect())
    }

    async fn update_active(&self, id: UserId, patch: &UserPatch) -> StrataResult<u64> {
        if patch.is_empty() {
            return Ok(0);
        }
        let mut users = self.users.write().await;
        if let Some(email) = &patch.email {
            if Self::email_taken(&users, email, Some(id)) {
                return Err(StrataError::conflict(format!(
                    "duplicate key value violates unique constraint \"users_active_email_key\": {email}"
                )));
            }
        }
        match users.get_mut(&id).filter(|u| u.is_active) {
            Some(user) => {
                user.apply(patch, now_micros());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn soft_delete(&self, id: UserId) -> StrataResult<u64> {
        let mut users = self.users.write().await;
        match users.get_mut(&id).filter(|u| u.is_active) {
            Some(user) => {
                user.is_active = false;
                user.updated_at = now_micros();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn count_active(&self) -> StrataResult<u64> {
        let users = self.users.read().await;
        Ok(users.values().filter(|u| u.is_active).count() as u64)
    }

    async fn ping(&self) -> StrataResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(email: &str) -> UserDraft {
        UserDraft {
            email: Email::parse(email).unwrap(),
            username: "tester".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let dao = InMemoryUserDao::new();
        let user = dao.insert(&draft("a@x.io")).await.unwrap();

        let found = dao.find_active_by_id(user.id).await.unwrap();
        assert_eq!(found, Some(user.clone()));

        let by_email = dao
            .find_active_by_email(&Email::parse("A@X.IO").unwrap())
            .await
            .unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_duplicate_active_email_conflicts() {
        let dao = InMemoryUserDao::new();
        dao.insert(&draft("a@x.io")).await.unwrap();
        let err = dao.insert(&draft("a@x.io")).await.unwrap_err();
        assert!(matches!(err, StrataError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_soft_delete_keeps_row() {
        let dao = InMemoryUserDao::new();
        let user = dao.insert(&draft("a@x.io")).await.unwrap();

        assert_eq!(dao.soft_delete(user.id).await.unwrap(), 1);
        assert_eq!(dao.soft_delete(user.id).await.unwrap(), 0);
        assert!(dao.find_active_by_id(user.id).await.unwrap().is_none());

        let raw = dao.find_any_by_id(user.id).await.unwrap();
        assert!(!raw.is_active);
        assert_eq!(dao.count_active().await.unwrap(), 0);

        // The address is free again once its owner is inactive.
        assert!(dao.insert(&draft("a@x.io")).await.is_ok());
    }

    #[tokio::test]
    async fn test_page_is_newest_first() {
        let dao = InMemoryUserDao::new();
        let a = dao.insert(&draft("a@x.io")).await.unwrap();
        let b = dao.insert(&draft("b@x.io")).await.unwrap();
        let c = dao.insert(&draft("c@x.io")).await.unwrap();

        let first = dao.find_active_page(2, 0).await.unwrap();
        assert_eq!(first.iter().map(|u| u.id).collect::<Vec<_>>(), vec![c.id, b.id]);

        let second = dao.find_active_page(2, 2).await.unwrap();
        assert_eq!(second.iter().map(|u| u.id).collect::<Vec<_>>(), vec![a.id]);
    }

    #[tokio::test]
    async fn test_update_only_touches_active_rows() {
        let dao = InMemoryUserDao::new();
        let user = dao.insert(&draft("a@x.io")).await.unwrap();
        let patch = UserPatch {
            first_name: Some("Grace".to_string()),
            ..UserPatch::default()
        };

        assert_eq!(dao.update_active(user.id, &patch).await.unwrap(), 1);
        let updated = dao.find_active_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(updated.first_name, "Grace");
        assert!(updated.updated_at >= user.updated_at);

        dao.soft_delete(user.id).await.unwrap();
        assert_eq!(dao.update_active(user.id, &patch).await.unwrap(), 0);
        assert_eq!(dao.update_active(UserId::new(), &patch).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_to_taken_email_conflicts() {
        let dao = InMemoryUserDao::new();
        dao.insert(&draft("a@x.io")).await.unwrap();
        let b = dao.insert(&draft("b@x.io")).await.unwrap();

        let patch = UserPatch {
            email: Some(Email::parse("a@x.io").unwrap()),
            ..UserPatch::default()
        };
        let err = dao.update_active(b.id, &patch).await.unwrap_err();
        assert!(matches!(err, StrataError::Conflict(_)));

        // Re-setting one's own address is fine.
        let own = UserPatch {
            email: Some(Email::parse("b@x.io").unwrap()),
            ..UserPatch::default()
        };
        assert_eq!(dao.update_active(b.id, &own).await.unwrap(), 1);
    }
}
