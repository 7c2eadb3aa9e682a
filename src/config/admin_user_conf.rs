use std::env;
use serde::{Serialize, Deserialize};
use crate::config::ConfigError;
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};

/// Credentials of the admin account created on first start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserConfig {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

fn required(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::EnvVarNotFound(name.to_string()))
}

impl AdminUserConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = AdminUserConfig {
            username: required("ADMIN_USERNAME")?,
            first_name: required("ADMIN_FIRST_NAME")?,
            last_name: required("ADMIN_LAST_NAME")?,
            email: required("ADMIN_EMAIL")?,
            password: required("ADMIN_PASSWORD")?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.email.contains('@') {
            return Err(ConfigError::ValidationError("ADMIN_EMAIL must be an email address".to_string()));
        }
        PasswordUtilsImpl::validate_password_strength(&self.password)
            .map_err(|rules| ConfigError::ValidationError(format!("ADMIN_PASSWORD: {}", rules.join("; "))))
    }
}

impl Default for AdminUserConfig {
    fn default() -> Self {
        AdminUserConfig {
            username: "admin".to_string(),
            first_name: "Store".to_string(),
            last_name: "Admin".to_string(),
            email: "admin@example.com".to_string(),
            password: "Admin#Pass123".to_string(),
        }
    }
}
