use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::config::AdminUserConfig;
use crate::model::timestamp::rfc3339_millis;
use crate::model::user::{AdminUser, ADMIN_ROLE};
use crate::repository::user_repo::UserRepository;
use crate::util::error::ServiceError;
use crate::util::jwt::{Claims, JwtTokenUtils, JwtTokenUtilsImpl, TokenPair};
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};
use crate::util::session_store::SessionStore;

#[derive(Debug, Clone, Serialize)]
pub struct UserWithoutPassword {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    #[serde(with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    pub updated_at: DateTime<Utc>,
}

impl From<AdminUser> for UserWithoutPassword {
    fn from(user: AdminUser) -> Self {
        UserWithoutPassword {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignInResponse {
    pub user: UserWithoutPassword,
    pub tokens: TokenPair,
}

/// The identity behind a valid, unrevoked admin access token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub role: String,
    /// `jti` of the access token.
    pub token_id: String,
    #[serde(with = "rfc3339_millis")]
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse, ServiceError>;
    /// `None` for anything that is not a live admin session.
    async fn current_session(&self, access_token: &str) -> Option<Session>;
    async fn sign_out(&self, session: &Session, refresh_token: Option<String>) -> Result<(), ServiceError>;
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ServiceError>;
    /// Creates the configured admin account unless its email is already taken.
    /// Returns whether an account was created.
    async fn ensure_admin(&self, config: &AdminUserConfig) -> Result<bool, ServiceError>;
}

pub struct AuthServiceImpl {
    pub user_repo: Arc<dyn UserRepository>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
    pub session_store: Arc<dyn SessionStore>,
}

fn invalid_credentials() -> ServiceError {
    ServiceError::Unauthorized("Invalid credentials".to_string())
}

fn seconds_left(exp: i64) -> u64 {
    (exp - Utc::now().timestamp()).max(1) as u64
}

impl AuthServiceImpl {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        jwt_utils: Arc<JwtTokenUtilsImpl>,
        session_store: Arc<dyn SessionStore>,
    ) -> Self {
        Self { user_repo, jwt_utils, session_store }
    }

    async fn is_revoked(&self, claims: &Claims) -> Result<bool, ServiceError> {
        self.session_store.is_revoked(&claims.jti).await.map_err(|e| {
            error!("Session store lookup failed: {e}");
            ServiceError::InternalError(format!("Session store error: {}", e))
        })
    }

    async fn revoke(&self, claims: &Claims) -> Result<(), ServiceError> {
        self.session_store
            .revoke(&claims.jti, seconds_left(claims.exp))
            .await
            .map_err(|e| {
                error!("Failed to revoke token: {e}");
                ServiceError::InternalError(format!("Session store error: {}", e))
            })
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse, ServiceError> {
        info!("Admin login attempt");
        let user = match self.user_repo.find_by_email(email).await? {
            Some(user) => user,
            None => {
                warn!("Login for unknown email");
                return Err(invalid_credentials());
            }
        };
        let valid = PasswordUtilsImpl::verify_password(password, &user.password_hash)
            .map_err(|e| ServiceError::InternalError(format!("Password verify error: {}", e)))?;
        if !valid {
            warn!("Invalid password");
            return Err(invalid_credentials());
        }
        if !user.is_admin() {
            warn!(role = %user.role, "Login refused for non-admin account");
            return Err(ServiceError::Unauthorized("Admin access required".to_string()));
        }
        let tokens = self
            .jwt_utils
            .generate_token_pair(&user.id, &user.email, &user.role)
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))?;
        info!("Admin logged in");
        Ok(SignInResponse { user: user.into(), tokens })
    }

    async fn current_session(&self, access_token: &str) -> Option<Session> {
        let claims = match self.jwt_utils.validate_access_token(access_token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!("Rejected access token: {e}");
                return None;
            }
        };
        if claims.role != ADMIN_ROLE {
            warn!(user = %claims.sub, "Access token without admin role");
            return None;
        }
        match self.is_revoked(&claims).await {
            Ok(false) => {}
            Ok(true) => {
                debug!(user = %claims.sub, "Access token was revoked");
                return None;
            }
            // an unreachable store must not let revoked tokens through
            Err(_) => return None,
        }
        let expires_at = Utc.timestamp_opt(claims.exp, 0).single()?;
        Some(Session {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
            token_id: claims.jti,
            expires_at,
        })
    }

    #[instrument(skip(self, session, refresh_token), fields(user = %session.user_id))]
    async fn sign_out(&self, session: &Session, refresh_token: Option<String>) -> Result<(), ServiceError> {
        let ttl = seconds_left(session.expires_at.timestamp());
        self.session_store.revoke(&session.token_id, ttl).await.map_err(|e| {
            error!("Failed to revoke access token: {e}");
            ServiceError::InternalError(format!("Session store error: {}", e))
        })?;
        if let Some(token) = refresh_token {
            match self.jwt_utils.validate_refresh_token(&token) {
                Ok(claims) if claims.sub == session.user_id => self.revoke(&claims).await?,
                Ok(_) => warn!("Refresh token belongs to another user; ignored"),
                Err(e) => debug!("Ignoring unusable refresh token on logout: {e}"),
            }
        }
        info!("Admin logged out");
        Ok(())
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ServiceError> {
        info!("Refreshing token");
        let claims = self
            .jwt_utils
            .validate_refresh_token(refresh_token)
            .map_err(|e| ServiceError::Unauthorized(format!("Invalid refresh token: {}", e)))?;
        if self.is_revoked(&claims).await? {
            warn!(user = %claims.sub, "Revoked refresh token presented");
            return Err(ServiceError::Unauthorized("Refresh token has been revoked".to_string()));
        }
        let user = self
            .user_repo
            .find_by_id(&claims.sub)
            .await?
            .filter(AdminUser::is_admin)
            .ok_or_else(|| ServiceError::Unauthorized("Account is no longer active".to_string()))?;
        let tokens = self
            .jwt_utils
            .generate_token_pair(&user.id, &user.email, &user.role)
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))?;
        // rotation: the old refresh token is single-use
        self.revoke(&claims).await?;
        info!("Token refreshed successfully");
        Ok(tokens)
    }

    #[instrument(skip(self, config), fields(email = %config.email))]
    async fn ensure_admin(&self, config: &AdminUserConfig) -> Result<bool, ServiceError> {
        if self.user_repo.find_by_email(&config.email).await?.is_some() {
            info!("Admin user already exists, skipping creation.");
            return Ok(false);
        }
        let password_hash = PasswordUtilsImpl::hash_password(&config.password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;
        let now = Utc::now();
        let user = AdminUser {
            id: Uuid::new_v4().to_string(),
            username: config.username.clone(),
            first_name: config.first_name.clone(),
            last_name: config.last_name.clone(),
            email: config.email.clone(),
            password_hash,
            role: ADMIN_ROLE.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.user_repo.insert(user).await?;
        info!("First admin user created.");
        Ok(true)
    }
}
