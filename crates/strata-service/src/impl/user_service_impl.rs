//! User service implementations.

use crate::dto::{CreateUserRequest, PaginationQuery, UpdateUserRequest, UserListResponse, UserResponse};
use crate::user_service::UserService;
use async_trait::async_trait;
use shaku::Component;
use std::sync::Arc;
use strata_core::{HealthReport, PageRequest, StrataResult, UserDraft, UserId, UserPatch, ValidateExt};
use strata_repository::{Outcome, UserRepository};
use strata_resilience::Deadline;
use tracing::{debug, info, warn};

/// Unwraps an outcome, logging any cache warnings it carries.
fn settle<T>(operation: &'static str, outcome: Outcome<T>) -> T {
    if outcome.is_degraded() {
        warn!(
            operation,
            warnings = outcome.warnings.len(),
            "Request served with degraded cache"
        );
    }
    outcome.into_value()
}

/// Concrete user service component for Shaku DI.
#[derive(Component)]
#[shaku(interface = UserService)]
pub struct UserServiceComponent {
    #[shaku(inject)]
    user_repository: Arc<dyn UserRepository>,
}

impl UserServiceComponent {
    /// Creates a service over the given repository.
    #[must_use]
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }
}

#[async_trait]
impl UserService for UserServiceComponent {
    async fn list_users(&self, query: PaginationQuery, deadline: Deadline) -> StrataResult<UserListResponse> {
        let page = PageRequest::from(query);
        debug!("Listing users, page: {}, limit: {}", page.page(), page.size());

        let outcome = self.user_repository.fetch_page(page, deadline).await?;
        let users = settle("list_users", outcome);

        Ok(UserListResponse {
            users: users.into_iter().map(UserResponse::from).collect(),
            page: page.page(),
            limit: page.size(),
        })
    }

    async fn get_user(&self, id: UserId, deadline: Deadline) -> StrataResult<UserResponse> {
        debug!("Getting user: {}", id);

        let outcome = self.user_repository.fetch_one(id, deadline).await?;
        Ok(settle("get_user", outcome).into())
    }

    async fn create_user(&self, request: CreateUserRequest, deadline: Deadline) -> StrataResult<UserResponse> {
        debug!("Creating user: {}", request.username);

        request.validate_request()?;
        let draft = UserDraft::try_from(request)?;

        let outcome = self.user_repository.create_one(draft, deadline).await?;
        let user = settle("create_user", outcome);

        info!("User created: {}", user.id);
        Ok(user.into())
    }

    async fn update_user(
        &self,
        id: UserId,
        request: UpdateUserRequest,
        deadline: Deadline,
    ) -> StrataResult<UserResponse> {
        debug!("Updating user: {}", id);

        request.validate_request()?;
        let patch = UserPatch::try_from(request)?;

        let outcome = self.user_repository.update_one(id, patch, deadline).await?;
        let user = settle("update_user", outcome);

        info!("User updated: {}", id);
        Ok(user.into())
    }

    async fn delete_user(&self, id: UserId, deadline: Deadline) -> StrataResult<()> {
        debug!("Deleting user: {}", id);

        let outcome = self.user_repository.delete_one(id, deadline).await?;
        settle("delete_user", outcome);

        info!("User deleted: {}", id);
        Ok(())
    }

    async fn count_users(&self, deadline: Deadline) -> StrataResult<u64> {
        self.user_repository.count_active(deadline).await
    }

    async fn health(&self) -> HealthReport {
        self.user_repository.health().await
    }
}

impl std::fmt::Debug for UserServiceComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserServiceComponent").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use mockall::predicate::eq;
    use strata_core::{Email, HealthStatus, StrataError, User};
    use strata_repository::{CacheOp, CacheWarning};

    mock! {
        pub Repository {}

        #[async_trait]
        impl UserRepository for Repository {
            async fn fetch_one(&self, id: UserId, deadline: Deadline) -> StrataResult<Outcome<User>>;
            async fn fetch_page(&self, page: PageRequest, deadline: Deadline) -> StrataResult<Outcome<Vec<User>>>;
            async fn create_one(&self, draft: UserDraft, deadline: Deadline) -> StrataResult<Outcome<User>>;
            async fn update_one(&self, id: UserId, patch: UserPatch, deadline: Deadline) -> StrataResult<Outcome<User>>;
            async fn delete_one(&self, id: UserId, deadline: Deadline) -> StrataResult<Outcome<()>>;
            async fn count_active(&self, deadline: Deadline) -> StrataResult<u64>;
            async fn health(&self) -> HealthReport;
        }
    }

    fn test_user() -> User {
        User::from_draft(UserDraft {
            email: Email::parse("test@example.com").unwrap(),
            username: "testuser".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        })
    }

    fn service(repo: MockRepository) -> UserServiceComponent {
        UserServiceComponent::new(Arc::new(repo))
    }

    fn create_request() -> CreateUserRequest {
        CreateUserRequest {
            email: "New@Example.com".to_string(),
            username: "newuser".to_string(),
            first_name: "New".to_string(),
            last_name: "User".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_user_success() {
        let mut repo = MockRepository::new();
        repo.expect_create_one()
            .withf(|draft, _| draft.email.as_str() == "new@example.com" && draft.username == "newuser")
            .times(1)
            .returning(|draft, _| Ok(Outcome::clean(User::from_draft(draft))));

        let user = service(repo)
            .create_user(create_request(), Deadline::none())
            .await
            .unwrap();
        assert_eq!(user.username, "newuser");
        assert_eq!(user.email, "new@example.com");
        assert!(user.is_active);
    }

    #[tokio::test]
    async fn test_create_user_invalid_request_skips_repository() {
        let mut repo = MockRepository::new();
        repo.expect_create_one().never();

        let request = CreateUserRequest {
            email: "not-an-email".to_string(),
            ..create_request()
        };
        let err = service(repo).create_user(request, Deadline::none()).await.unwrap_err();
        assert!(matches!(err, StrataError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_user_conflict_passes_through() {
        let mut repo = MockRepository::new();
        repo.expect_create_one()
            .returning(|_, _| Err(StrataError::conflict("User with email new@example.com already exists")));

        let err = service(repo)
            .create_user(create_request(), Deadline::none())
            .await
            .unwrap_err();
        assert!(matches!(err, StrataError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_degraded_outcome_still_succeeds() {
        let user = test_user();
        let id = user.id;
        let mut repo = MockRepository::new();
        repo.expect_fetch_one().with(eq(id), mockall::predicate::always()).returning(move |_, _| {
            Ok(Outcome {
                value: user.clone(),
                warnings: vec![CacheWarning {
                    op: CacheOp::Read,
                    key: format!("user:{id}"),
                    message: "connection refused".to_string(),
                }],
            })
        });

        let response = service(repo).get_user(id, Deadline::none()).await.unwrap();
        assert_eq!(response.id, id.into_inner());
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_fetch_one()
            .returning(|id, _| Err(StrataError::not_found("User", id)));

        let err = service(repo).get_user(UserId::new(), Deadline::none()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_users_normalizes_paging() {
        let mut repo = MockRepository::new();
        repo.expect_fetch_page()
            .withf(|page, _| page.page() == 1 && page.size() == 10)
            .returning(|_, _| Ok(Outcome::clean(vec![test_user()])));

        let response = service(repo)
            .list_users(PaginationQuery::new(-4, 1000), Deadline::none())
            .await
            .unwrap();
        assert_eq!(response.page, 1);
        assert_eq!(response.limit, 10);
        assert_eq!(response.users.len(), 1);
    }

    #[tokio::test]
    async fn test_update_user_maps_patch() {
        let user = test_user();
        let id = user.id;
        let mut repo = MockRepository::new();
        repo.expect_update_one()
            .withf(move |got, patch, _| {
                *got == id
                    && patch.first_name.as_deref() == Some("Renamed")
                    && patch.email.is_none()
                    && patch.username.is_none()
            })
            .returning(move |_, patch, _| {
                let mut updated = user.clone();
                updated.apply(&patch, strata_core::now_micros());
                Ok(Outcome::clean(updated))
            });

        let request = UpdateUserRequest {
            first_name: Some("Renamed".to_string()),
            ..UpdateUserRequest::default()
        };
        let response = service(repo).update_user(id, request, Deadline::none()).await.unwrap();
        assert_eq!(response.first_name, "Renamed");
    }

    #[tokio::test]
    async fn test_update_user_invalid_field() {
        let mut repo = MockRepository::new();
        repo.expect_update_one().never();

        let request = UpdateUserRequest {
            email: Some("nope".to_string()),
            ..UpdateUserRequest::default()
        };
        let err = service(repo)
            .update_user(UserId::new(), request, Deadline::none())
            .await
            .unwrap_err();
        assert!(matches!(err, StrataError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let id = UserId::new();
        let mut repo = MockRepository::new();
        repo.expect_delete_one()
            .with(eq(id), mockall::predicate::always())
            .times(1)
            .returning(|_, _| Ok(Outcome::clean(())));

        assert!(service(repo).delete_user(id, Deadline::none()).await.is_ok());
    }

    #[tokio::test]
    async fn test_health_passes_through() {
        let mut repo = MockRepository::new();
        repo.expect_health().returning(|| HealthReport {
            store: HealthStatus::Healthy,
            cache: HealthStatus::Degraded("cache disabled".to_string()),
        });

        let report = service(repo).health().await;
        assert!(report.is_serving());
    }
}
