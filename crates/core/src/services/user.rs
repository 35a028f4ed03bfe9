//! User service.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use challan_common::{AppError, AppResult, IdGenerator};
use challan_db::{
    entities::{user, user::UserRole},
    repositories::UserRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// User service for registration, login and moderation.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for registering a new user.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,

    #[serde(default)]
    pub role: Option<UserRole>,

    #[validate(length(max = 64))]
    pub specialization: Option<String>,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user and issue its token.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let role = input.role.unwrap_or_default();
        let specialization = match role {
            UserRole::ServiceProvider => input
                .specialization
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            UserRole::Citizen | UserRole::Reviewer => None,
        };

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name.trim().to_string()),
            email: Set(email),
            password_hash: Set(password_hash),
            token: Set(Some(self.id_gen.generate_token())),
            role: Set(role),
            specialization: Set(specialization),
            is_blacklisted: Set(false),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, role = user.role.as_str(), "Registered user");

        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Authenticate a user by email and password.
    ///
    /// Users without a token (e.g. seeded directly into the database) get
    /// one issued on first login.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_email(email.trim())
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        if user.token.is_some() {
            return Ok(user);
        }

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(self.id_gen.generate_token()));
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        self.user_repo.update(active).await
    }

    /// Set or clear a user's blacklist flag.
    ///
    /// Only reviewers may do this, and never to themselves or to another
    /// reviewer.
    pub async fn set_blacklisted(
        &self,
        actor: &user::Model,
        target_id: &str,
        blacklisted: bool,
    ) -> AppResult<user::Model> {
        if actor.role != UserRole::Reviewer {
            return Err(AppError::Forbidden(
                "Only reviewers can manage the blacklist".to_string(),
            ));
        }
        if actor.id == target_id {
            return Err(AppError::BadRequest(
                "You cannot blacklist yourself".to_string(),
            ));
        }

        let target = self.user_repo.get_by_id(target_id).await?;
        if target.role == UserRole::Reviewer {
            return Err(AppError::Forbidden(
                "Reviewers cannot be blacklisted".to_string(),
            ));
        }
        if target.is_blacklisted == blacklisted {
            return Ok(target);
        }

        let mut active: user::ActiveModel = target.into();
        active.is_blacklisted = Set(blacklisted);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let updated = self.user_repo.update(active).await?;
        tracing::info!(
            user_id = %updated.id,
            by = %actor.id,
            blacklisted,
            "Updated blacklist flag"
        );

        Ok(updated)
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_user(id: &str, role: UserRole) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: "Test User".to_string(),
            email: format!("{id}@example.com"),
            password_hash: hash_password("secret123").unwrap(),
            token: Some(format!("token-{id}")),
            role,
            specialization: None,
            is_blacklisted: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: MockDatabase) -> UserService {
        UserService::new(UserRepository::new(Arc::new(db.into_connection())))
    }

    fn register_input(email: &str) -> RegisterInput {
        RegisterInput {
            name: "Asha".to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            role: None,
            specialization: None,
        }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("secret123").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret123", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("secret123", "not-a-hash").is_err());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let existing = test_user("u1", UserRole::Citizen);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]),
        );

        let result = service.register(register_input("u1@example.com")).await;

        assert!(matches!(result, Err(AppError::Conflict(msg)) if msg == "User already exists"));
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_email() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service.register(register_input("not-an-email")).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_creates_citizen_by_default() {
        let created = test_user("u2", UserRole::Citizen);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[created.clone()]]),
        );

        let user = service
            .register(register_input("u2@example.com"))
            .await
            .unwrap();

        assert_eq!(user.role, UserRole::Citizen);
        assert_eq!(user.id, "u2");
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let user = test_user("u1", UserRole::Citizen);
        let service =
            service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[user]]));

        let result = service.authenticate("u1@example.com", "wrong").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_email() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
        );

        let result = service.authenticate("nobody@example.com", "secret123").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_authenticate_success_keeps_token() {
        let user = test_user("u1", UserRole::Citizen);
        let service =
            service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[user]]));

        let authed = service
            .authenticate("u1@example.com", "secret123")
            .await
            .unwrap();

        assert_eq!(authed.token.as_deref(), Some("token-u1"));
    }

    #[tokio::test]
    async fn test_authenticate_by_token_missing() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
        );

        let result = service.authenticate_by_token("bogus").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_blacklist_requires_reviewer() {
        let actor = test_user("u1", UserRole::Citizen);
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service.set_blacklisted(&actor, "u2", true).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_blacklist_self_rejected() {
        let actor = test_user("p1", UserRole::Reviewer);
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service.set_blacklisted(&actor, "p1", true).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_blacklist_other_reviewer_rejected() {
        let actor = test_user("p1", UserRole::Reviewer);
        let target = test_user("p2", UserRole::Reviewer);
        let service =
            service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[target]]));

        let result = service.set_blacklisted(&actor, "p2", true).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_blacklist_citizen() {
        let actor = test_user("p1", UserRole::Reviewer);
        let target = test_user("u1", UserRole::Citizen);
        let mut blacklisted = target.clone();
        blacklisted.is_blacklisted = true;

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[target]])
                .append_query_results([[blacklisted]]),
        );

        let updated = service.set_blacklisted(&actor, "u1", true).await.unwrap();

        assert!(updated.is_blacklisted);
    }
}
