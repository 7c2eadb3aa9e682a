use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::JwtConfig;

/// JWT token claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    pub role: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// `access` or `refresh`
    pub token_type: String,
    /// Unique token id, the key used when a token is revoked
    pub jti: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

#[derive(Debug, Clone, Copy)]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to encode JWT token: {0}")]
    EncodingFailed(String),
    #[error("Failed to decode JWT token: {0}")]
    DecodingFailed(String),
    #[error("Token has expired")]
    TokenExpired,
    #[error("Invalid token format")]
    InvalidToken,
    #[error("Invalid token type: expected {expected}, got {actual}")]
    InvalidTokenType { expected: String, actual: String },
}

pub trait JwtTokenUtils {
    fn generate_access_token(&self, user_id: &str, email: &str, role: &str) -> Result<String, JwtError>;
    fn generate_refresh_token(&self, user_id: &str, email: &str, role: &str) -> Result<String, JwtError>;
    fn generate_token_pair(&self, user_id: &str, email: &str, role: &str) -> Result<TokenPair, JwtError>;
    fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError>;
    fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError>;
    fn extract_token_from_header(&self, auth_header: &str) -> Result<String, JwtError>;
}

#[derive(Debug, Clone)]
pub struct JwtTokenUtilsImpl {
    pub jwt_config: JwtConfig,
}

impl JwtTokenUtilsImpl {
    pub fn new(jwt_config: JwtConfig) -> Self {
        JwtTokenUtilsImpl { jwt_config }
    }

    fn generate_token(
        &self,
        user_id: &str,
        email: &str,
        role: &str,
        token_type: TokenType,
        expires_in_minutes: i64,
    ) -> Result<String, JwtError> {
        debug!("Generating {} token for user: {}", token_type.as_str(), user_id);

        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(expires_in_minutes)).timestamp(),
            token_type: token_type.as_str().to_string(),
            jti: Uuid::new_v4().to_string(),
            iss: self.jwt_config.jwt_issuer.clone(),
            aud: self.jwt_config.jwt_audience.clone(),
        };

        let encoding_key = EncodingKey::from_secret(self.jwt_config.jwt_secret.as_bytes());
        encode(&Header::new(Algorithm::HS256), &claims, &encoding_key).map_err(|err| {
            error!("Failed to encode JWT token: {}", err);
            JwtError::EncodingFailed(err.to_string())
        })
    }

    pub fn validate_token(&self, token: &str, expected_token_type: Option<TokenType>) -> Result<Claims, JwtError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_config.jwt_secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &self.jwt_config.jwt_issuer {
            validation.set_issuer(&[issuer]);
        }
        match &self.jwt_config.jwt_audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        let claims = match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(token_data) => token_data.claims,
            Err(err) => {
                if matches!(err.kind(), jsonwebtoken::errors::ErrorKind::ExpiredSignature) {
                    warn!("Token has expired");
                    return Err(JwtError::TokenExpired);
                }
                warn!("Failed to decode JWT token: {}", err);
                return Err(JwtError::DecodingFailed(err.to_string()));
            }
        };

        // the library allows a leeway; sessions end exactly at `exp`
        if claims.exp < Utc::now().timestamp() {
            warn!("Token has expired for user: {}", claims.sub);
            return Err(JwtError::TokenExpired);
        }

        if let Some(expected) = expected_token_type {
            if claims.token_type != expected.as_str() {
                warn!("Invalid token type: expected {}, got {}", expected.as_str(), claims.token_type);
                return Err(JwtError::InvalidTokenType {
                    expected: expected.as_str().to_string(),
                    actual: claims.token_type.clone(),
                });
            }
        }

        Ok(claims)
    }
}

impl JwtTokenUtils for JwtTokenUtilsImpl {
    fn generate_access_token(&self, user_id: &str, email: &str, role: &str) -> Result<String, JwtError> {
        self.generate_token(user_id, email, role, TokenType::Access, self.jwt_config.access_token_expiration)
    }

    fn generate_refresh_token(&self, user_id: &str, email: &str, role: &str) -> Result<String, JwtError> {
        self.generate_token(user_id, email, role, TokenType::Refresh, self.jwt_config.refresh_token_expiration)
    }

    fn generate_token_pair(&self, user_id: &str, email: &str, role: &str) -> Result<TokenPair, JwtError> {
        let token_pair = TokenPair {
            access_token: self.generate_access_token(user_id, email, role)?,
            refresh_token: self.generate_refresh_token(user_id, email, role)?,
            expires_in: self.jwt_config.access_token_expiration * 60,
            token_type: "Bearer".to_string(),
        };
        info!("Generated token pair for user: {}", user_id);
        Ok(token_pair)
    }

    fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_token(token, Some(TokenType::Access))
    }

    fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_token(token, Some(TokenType::Refresh))
    }

    fn extract_token_from_header(&self, auth_header: &str) -> Result<String, JwtError> {
        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or(JwtError::InvalidToken)?;
        if token.is_empty() {
            debug!("Empty token in authorization header");
            return Err(JwtError::InvalidToken);
        }
        Ok(token.to_string())
    }
}
