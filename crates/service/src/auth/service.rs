use std::sync::Arc;

use argon2::{password_hash::{PasswordHasher, PasswordVerifier, SaltString}, Argon2, PasswordHash};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use common::metrics::record_auth_event;
use models::user;

use super::domain::{AuthSession, AuthUser, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;
use super::tokens::TokenIssuer;

/// Auth business service independent of web framework.
///
/// Session state lives in the stored refresh-token hash: `None` means
/// logged out, and every register/login/refresh overwrites it so only the
/// most recently issued refresh token is accepted.
pub struct AuthService<R: AuthRepository + ?Sized> {
    repo: Arc<R>,
    tokens: Arc<TokenIssuer>,
    hasher: Argon2<'static>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl<R: AuthRepository + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>, tokens: Arc<TokenIssuer>) -> Self {
        Self { repo, tokens, hasher: Argon2::default() }
    }

    /// Replace the argon2 instance, e.g. with cheaper params in tests.
    pub fn with_hasher(mut self, hasher: Argon2<'static>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    fn hash(&self, secret: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.hasher
            .hash_password(secret.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::HashError(e.to_string()))
    }

    fn matches(&self, secret: &str, stored: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(stored).map_err(|e| AuthError::HashError(e.to_string()))?;
        Ok(self.hasher.verify_password(secret.as_bytes(), &parsed).is_ok())
    }

    /// Issue a fresh pair and make its refresh token the only valid one.
    async fn start_session(&self, user: AuthUser) -> Result<AuthSession, AuthError> {
        let tokens = self.tokens.issue_pair(&user)?;
        let hash = self.hash(&tokens.refresh_token)?;
        self.repo.set_refresh_token_hash(user.id, Some(hash)).await?;
        Ok(AuthSession { user, tokens })
    }

    /// Register a new STAFF user and open a session.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, TokenIssuer, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let tokens = Arc::new(TokenIssuer::new("access", 900, "refresh", 604_800));
    /// let svc = AuthService::new(repo, tokens);
    /// let input = RegisterInput { email: "user@example.com".into(), password: "Secret123".into(), name: "Test".into() };
    /// let session = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(session.user.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError> {
        user::validate_email(&input.email)?;
        user::validate_name(&input.name)?;
        user::validate_password(&input.password)?;
        let email = normalize_email(&input.email);
        if let Some(existing) = self.repo.find_user_by_email(&email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let password_hash = self.hash(&input.password)?;
        let user = self.repo.create_user(&email, input.name.trim(), password_hash).await?;
        let session = self.start_session(user).await?;
        record_auth_event("register");
        info!(user_id = %session.user.id, email = %session.user.email, "user_registered");
        Ok(session)
    }

    /// Authenticate and open a session. Unknown email and wrong password
    /// fail identically.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let email = normalize_email(&input.email);
        let Some(user) = self.repo.find_user_by_email(&email).await? else {
            // spend one argon2 derivation so the response time matches a wrong password
            let _ = self.hash(&input.password);
            record_auth_event("login_denied");
            return Err(AuthError::AccessDenied);
        };
        let cred = self.repo.get_credentials(user.id).await?.ok_or(AuthError::AccessDenied)?;
        if !self.matches(&input.password, &cred.password_hash)? {
            record_auth_event("login_denied");
            return Err(AuthError::AccessDenied);
        }

        let session = self.start_session(user).await?;
        record_auth_event("login");
        info!(user_id = %session.user.id, "user_logged_in");
        Ok(session)
    }

    /// Rotate: the presented token must match the stored hash. The new hash
    /// replaces it only while the old one is still stored, so concurrent
    /// replays of one token yield a single session.
    #[instrument(skip(self, presented), fields(user_id = %user_id))]
    pub async fn refresh_tokens(&self, user_id: Uuid, presented: &str) -> Result<AuthSession, AuthError> {
        let cred = self.repo.get_credentials(user_id).await?.ok_or(AuthError::AccessDenied)?;
        let Some(stored) = cred.refresh_token_hash else {
            record_auth_event("refresh_denied");
            return Err(AuthError::AccessDenied);
        };
        if !self.matches(presented, &stored)? {
            record_auth_event("refresh_denied");
            warn!("refresh token mismatch");
            return Err(AuthError::AccessDenied);
        }
        let user = self.repo.find_user_by_id(user_id).await?.ok_or(AuthError::AccessDenied)?;
        let tokens = self.tokens.issue_pair(&user)?;
        let next = self.hash(&tokens.refresh_token)?;
        if !self.repo.rotate_refresh_token_hash(user_id, &stored, next).await? {
            record_auth_event("refresh_denied");
            warn!("refresh token already rotated");
            return Err(AuthError::AccessDenied);
        }
        let session = AuthSession { user, tokens };
        record_auth_event("refresh");
        info!("tokens_rotated");
        Ok(session)
    }

    /// Verify the refresh JWT itself, then rotate for its subject.
    pub async fn refresh_with_token(&self, presented: &str) -> Result<AuthSession, AuthError> {
        let claims = self.tokens.verify_refresh(presented).map_err(|_| AuthError::AccessDenied)?;
        self.refresh_tokens(claims.sub, presented).await
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn logout(&self, user_id: Uuid) -> Result<(), AuthError> {
        match self.repo.set_refresh_token_hash(user_id, None).await {
            Ok(()) | Err(AuthError::NotFound) => {}
            Err(e) => return Err(e),
        }
        record_auth_event("logout");
        info!("user_logged_out");
        Ok(())
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<AuthUser, AuthError> {
        self.repo.find_user_by_id(user_id).await?.ok_or(AuthError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;
    use argon2::{Algorithm, Params, Version};

    fn service() -> AuthService<MockAuthRepository> {
        let tokens = Arc::new(TokenIssuer::new("access-secret", 900, "refresh-secret", 604_800));
        let fast = Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::new(1024, 1, 1, None).unwrap());
        AuthService::new(Arc::new(MockAuthRepository::default()), tokens).with_hasher(fast)
    }

    fn register_input(email: &str) -> RegisterInput {
        RegisterInput { email: email.into(), password: "Passw0rd!".into(), name: "Pat".into() }
    }

    #[tokio::test]
    async fn register_creates_staff_with_active_session() {
        let svc = service();
        let session = svc.register(register_input("pat@office.test")).await.unwrap();
        assert_eq!(session.user.role, user::Role::Staff);
        let claims = svc.tokens().verify_access(&session.tokens.access_token).unwrap();
        assert_eq!(claims.sub, session.user.id);
        assert_eq!(claims.email, "pat@office.test");
        // the session is live: its refresh token rotates
        svc.refresh_tokens(session.user.id, &session.tokens.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn register_validates_and_rejects_duplicates() {
        let svc = service();
        svc.register(register_input("dup@office.test")).await.unwrap();
        assert!(matches!(svc.register(register_input("DUP@office.test")).await, Err(AuthError::Conflict)));

        let mut short = register_input("s@office.test");
        short.password = "short".into();
        assert!(matches!(svc.register(short).await, Err(AuthError::Validation(_))));
        assert!(matches!(svc.register(register_input("no-at-sign")).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let svc = service();
        svc.register(register_input("kim@office.test")).await.unwrap();

        let wrong = svc
            .login(LoginInput { email: "kim@office.test".into(), password: "nope-nope".into() })
            .await
            .unwrap_err();
        let unknown = svc
            .login(LoginInput { email: "ghost@office.test".into(), password: "Passw0rd!".into() })
            .await
            .unwrap_err();
        assert!(matches!(wrong, AuthError::AccessDenied));
        assert!(matches!(unknown, AuthError::AccessDenied));
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert_eq!(wrong.code(), unknown.code());
    }

    async fn fastest_denial(svc: &AuthService<MockAuthRepository>, email: &str) -> std::time::Duration {
        let mut best = std::time::Duration::MAX;
        for _ in 0..3 {
            let started = std::time::Instant::now();
            let input = LoginInput { email: email.into(), password: "wrong-password".into() };
            assert!(matches!(svc.login(input).await, Err(AuthError::AccessDenied)));
            best = best.min(started.elapsed());
        }
        best
    }

    #[tokio::test]
    async fn unknown_email_costs_a_password_derivation() {
        let tokens = Arc::new(TokenIssuer::new("access-secret", 900, "refresh-secret", 604_800));
        let slow = Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::new(16 * 1024, 2, 1, None).unwrap());
        let svc = AuthService::new(Arc::new(MockAuthRepository::default()), tokens).with_hasher(slow);
        svc.register(register_input("timed@office.test")).await.unwrap();

        let wrong_password = fastest_denial(&svc, "timed@office.test").await;
        let unknown_email = fastest_denial(&svc, "nobody@office.test").await;
        assert!(unknown_email * 4 >= wrong_password, "unknown {unknown_email:?} vs wrong {wrong_password:?}");
    }

    #[tokio::test]
    async fn refresh_rotation_invalidates_previous_token() {
        let svc = service();
        let first = svc.register(register_input("rot@office.test")).await.unwrap();
        let second = svc.refresh_with_token(&first.tokens.refresh_token).await.unwrap();
        assert_ne!(first.tokens.refresh_token, second.tokens.refresh_token);

        assert!(matches!(svc.refresh_with_token(&first.tokens.refresh_token).await, Err(AuthError::AccessDenied)));
        svc.refresh_with_token(&second.tokens.refresh_token).await.unwrap();
    }

    async fn replay_concurrently<R: AuthRepository + ?Sized + 'static>(svc: Arc<AuthService<R>>, token: &str) -> usize {
        let mut handles = Vec::new();
        for _ in 0..4 {
            let svc = svc.clone();
            let token = token.to_string();
            handles.push(tokio::spawn(async move { svc.refresh_with_token(&token).await }));
        }
        let mut accepted = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(e) => assert!(matches!(e, AuthError::AccessDenied), "{e}"),
            }
        }
        accepted
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_replays_of_one_refresh_token_yield_one_session() {
        let svc = Arc::new(service());
        let first = svc.register(register_input("race@office.test")).await.unwrap();
        assert_eq!(replay_concurrently(svc.clone(), &first.tokens.refresh_token).await, 1);
        assert!(matches!(svc.refresh_with_token(&first.tokens.refresh_token).await, Err(AuthError::AccessDenied)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_replays_against_database_yield_one_session() -> anyhow::Result<()> {
        let Some(db) = crate::test_support::get_db().await else { return Ok(()) };
        let tokens = Arc::new(TokenIssuer::new("access-secret", 900, "refresh-secret", 604_800));
        let fast = Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::new(1024, 1, 1, None).unwrap());
        let repo = Arc::new(crate::auth::repo::SeaOrmAuthRepository::new(db.clone()));
        let svc = Arc::new(AuthService::new(repo, tokens).with_hasher(fast));

        let email = format!("race-{}@office.test", Uuid::new_v4().simple());
        let first = svc.register(register_input(&email)).await?;
        assert_eq!(replay_concurrently(svc.clone(), &first.tokens.refresh_token).await, 1);

        use sea_orm::EntityTrait;
        user::Entity::delete_by_id(first.user.id).exec(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn login_replaces_the_previous_session() {
        let svc = service();
        let registered = svc.register(register_input("two@office.test")).await.unwrap();
        svc.login(LoginInput { email: "two@office.test".into(), password: "Passw0rd!".into() }).await.unwrap();
        assert!(matches!(
            svc.refresh_tokens(registered.user.id, &registered.tokens.refresh_token).await,
            Err(AuthError::AccessDenied)
        ));
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let svc = service();
        let session = svc.register(register_input("bye@office.test")).await.unwrap();
        svc.logout(session.user.id).await.unwrap();
        assert!(matches!(
            svc.refresh_tokens(session.user.id, &session.tokens.refresh_token).await,
            Err(AuthError::AccessDenied)
        ));
        // logging out twice is harmless
        svc.logout(session.user.id).await.unwrap();
    }

    #[tokio::test]
    async fn access_token_is_not_a_refresh_token() {
        let svc = service();
        let session = svc.register(register_input("mix@office.test")).await.unwrap();
        assert!(matches!(svc.refresh_with_token(&session.tokens.access_token).await, Err(AuthError::AccessDenied)));
        assert_eq!(svc.profile(session.user.id).await.unwrap().name, "Pat");
        assert!(matches!(svc.profile(Uuid::new_v4()).await, Err(AuthError::NotFound)));
    }
}
