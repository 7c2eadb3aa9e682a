use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::timestamp::rfc3339_millis;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    #[serde(with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    pub updated_at: DateTime<Utc>,
}

impl AdminUser {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}
