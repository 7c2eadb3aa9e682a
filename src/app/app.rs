use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tracing::{error, info, warn};

use crate::config::{AdminUserConfig, AppConfig, JwtConfig, MinioConfig, MongoConfig, RedisConfig, StorageBackend};
use crate::handler::not_found_handler;
use crate::middlewares::session_gate::{session_gate, SessionGateState};
use crate::repository::catalog_repo::{CatalogRepository, InMemoryCatalogRepository, MongoCatalogRepository};
use crate::repository::product_repo::{InMemoryProductRepository, MongoProductRepository, ProductRepository};
use crate::repository::quote_repo::{InMemoryQuoteRepository, MongoQuoteRepository, QuoteRepository};
use crate::repository::supplier_repo::{InMemorySupplierRepository, MongoSupplierRepository, SupplierRepository};
use crate::repository::user_repo::{InMemoryUserRepository, MongoUserRepository, UserRepository};
use crate::router::auth_router::auth_router;
use crate::router::catalog_router::catalog_router;
use crate::router::dashboard_router::dashboard_router;
use crate::router::product_router::product_router;
use crate::router::quote_router::quote_router;
use crate::router::supplier_router::supplier_router;
use crate::service::auth_service::{AuthService, AuthServiceImpl};
use crate::service::catalog_service::{CatalogService, CatalogServiceImpl};
use crate::service::dashboard_service::{DashboardService, DashboardServiceImpl};
use crate::service::product_service::{ProductService, ProductServiceImpl};
use crate::service::quote_service::{QuoteService, QuoteServiceImpl};
use crate::service::supplier_service::{SupplierService, SupplierServiceImpl};
use crate::util::jwt::JwtTokenUtilsImpl;
use crate::util::minio::MinioService;
use crate::util::session_store::{InMemorySessionStore, RedisSessionStore, SessionStore};
use crate::util::storage::{InMemoryObjectStorage, ObjectStorage};

/// Every service the router needs, behind its trait.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub quotes: Arc<dyn QuoteService>,
    pub catalog: Arc<dyn CatalogService>,
    pub products: Arc<dyn ProductService>,
    pub suppliers: Arc<dyn SupplierService>,
    pub dashboard: Arc<dyn DashboardService>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
}

impl Services {
    pub fn from_parts(
        quote_repo: Arc<dyn QuoteRepository>,
        catalog_repo: Arc<dyn CatalogRepository>,
        product_repo: Arc<dyn ProductRepository>,
        supplier_repo: Arc<dyn SupplierRepository>,
        user_repo: Arc<dyn UserRepository>,
        storage: Arc<dyn ObjectStorage>,
        session_store: Arc<dyn SessionStore>,
        jwt_config: JwtConfig,
    ) -> Self {
        let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(jwt_config));
        Services {
            auth: Arc::new(AuthServiceImpl::new(user_repo, jwt_utils.clone(), session_store)),
            quotes: Arc::new(QuoteServiceImpl::new(quote_repo.clone())),
            catalog: Arc::new(CatalogServiceImpl::new(catalog_repo.clone(), storage)),
            products: Arc::new(ProductServiceImpl::new(
                product_repo.clone(),
                catalog_repo.clone(),
                supplier_repo.clone(),
            )),
            suppliers: Arc::new(SupplierServiceImpl::new(supplier_repo, product_repo)),
            dashboard: Arc::new(DashboardServiceImpl::new(quote_repo, catalog_repo)),
            jwt_utils,
        }
    }

    /// No external collaborators; state lives for the process only.
    pub fn in_memory(jwt_config: JwtConfig) -> Self {
        Self::from_parts(
            Arc::new(InMemoryQuoteRepository::new()),
            Arc::new(InMemoryCatalogRepository::new()),
            Arc::new(InMemoryProductRepository::new()),
            Arc::new(InMemorySupplierRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryObjectStorage::default()),
            Arc::new(InMemorySessionStore::new()),
            jwt_config,
        )
    }

    pub async fn connect(
        mongo_config: &MongoConfig,
        minio_config: MinioConfig,
        redis_config: RedisConfig,
        jwt_config: JwtConfig,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let db = crate::repository::connect(mongo_config).await?;

        let quote_repo = MongoQuoteRepository::new(&db, mongo_config);
        quote_repo.ensure_indexes().await?;
        let catalog_repo = MongoCatalogRepository::new(&db);
        catalog_repo.ensure_indexes().await?;
        let product_repo = MongoProductRepository::new(&db);
        product_repo.ensure_indexes().await?;
        let supplier_repo = MongoSupplierRepository::new(&db);
        supplier_repo.ensure_indexes().await?;
        let user_repo = MongoUserRepository::new(&db);
        user_repo.ensure_indexes().await?;

        let storage = MinioService::new(minio_config).await?;
        let session_store = RedisSessionStore::new(redis_config).await?;

        Ok(Self::from_parts(
            Arc::new(quote_repo),
            Arc::new(catalog_repo),
            Arc::new(product_repo),
            Arc::new(supplier_repo),
            Arc::new(user_repo),
            Arc::new(storage),
            Arc::new(session_store),
            jwt_config,
        ))
    }
}

pub fn build_router(services: &Services, login_path: &str) -> Router {
    let gate = Arc::new(SessionGateState {
        jwt_utils: services.jwt_utils.clone(),
        auth_service: services.auth.clone(),
        login_path: login_path.to_string(),
    });
    Router::new()
        .merge(auth_router(services.auth.clone(), gate.clone()))
        .merge(quote_router(services.quotes.clone(), gate.clone()))
        .merge(catalog_router(services.catalog.clone(), gate.clone()))
        .merge(product_router(services.products.clone(), gate.clone()))
        .merge(supplier_router(services.suppliers.clone(), gate.clone()))
        .merge(dashboard_router(services.dashboard.clone(), gate.clone()))
        .route("/health", get(|| async { "OK" }))
        .fallback_service(gated_fallback(gate))
}

/// Unmatched paths go through the session gate too.
fn gated_fallback(gate: Arc<SessionGateState>) -> Router {
    Router::new()
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(gate, session_gate))
}

pub struct App {
    config: AppConfig,
    router: Router,
    pub services: Services,
}

impl App {
    pub async fn new() -> Self {
        let config = AppConfig::from_env().expect("App config error");
        let jwt_config = JwtConfig::from_env().expect("JWT config error");

        let services = match config.backend {
            StorageBackend::Memory => {
                warn!("Running with in-memory storage; nothing survives a restart");
                Services::in_memory(jwt_config)
            }
            StorageBackend::Mongo => {
                let mongo_config = MongoConfig::from_env().expect("Mongo config error");
                let minio_config = MinioConfig::from_env().expect("Minio config error");
                let redis_config = RedisConfig::from_env().expect("Redis config error");
                Services::connect(&mongo_config, minio_config, redis_config, jwt_config)
                    .await
                    .expect("Failed to connect backing services")
            }
        };

        let router = build_router(&services, &config.login_path);
        let app = App { config, router, services };
        app.create_first_admin_user().await;
        app
    }

    pub async fn start(self) {
        let addr = SocketAddr::new(self.config.host.parse().expect("Invalid host"), self.config.port);
        info!("🚀 Server running at http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await.expect("Failed to bind address");
        axum::serve(listener, self.router).await.expect("Failed to start server");
    }

    async fn create_first_admin_user(&self) {
        let admin_conf = match AdminUserConfig::from_env() {
            Ok(c) => c,
            Err(e) if self.config.backend == StorageBackend::Memory => {
                warn!("Admin user config not loaded ({e}); using development defaults");
                AdminUserConfig::default()
            }
            Err(e) => {
                warn!("Admin user config not loaded: {e}");
                return;
            }
        };
        if let Err(e) = admin_conf.validate() {
            error!("Admin user config is invalid: {e}");
            return;
        }
        match self.services.auth.ensure_admin(&admin_conf).await {
            Ok(_) => {}
            Err(e) => error!("Failed to create admin user: {e}"),
        }
    }
}
