use async_trait::async_trait;
use bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::model::user::AdminUser;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: AdminUser) -> RepositoryResult<AdminUser>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<AdminUser>>;
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<AdminUser>>;
}

pub struct MongoUserRepository {
    collection: Collection<AdminUser>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        MongoUserRepository { collection: db.collection::<AdminUser>("users") }
    }

    pub async fn ensure_indexes(&self) -> RepositoryResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index, None).await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[tracing::instrument(skip(self, user), fields(email = %user.email))]
    async fn insert(&self, user: AdminUser) -> RepositoryResult<AdminUser> {
        match self.collection.insert_one(&user, None).await {
            Ok(_) => {
                info!("User inserted");
                Ok(user)
            }
            Err(e) => {
                error!("Failed to insert user: {}", e);
                Err(e.into())
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<AdminUser>> {
        self.collection
            .find_one(doc! { "email": email }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find user by email: {}", e)))
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<AdminUser>> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find user by id: {}", e)))
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<AdminUser>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: AdminUser) -> RepositoryResult<AdminUser> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::already_exists(format!("Duplicate key: email {}", user.email)));
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<AdminUser>> {
        Ok(self.users.read().await.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<AdminUser>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }
}
