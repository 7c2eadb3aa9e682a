#![allow(dead_code)]

use std::sync::Arc;

use admin_panel_backend::app::{build_router, Services};
use admin_panel_backend::config::{AdminUserConfig, JwtConfig};
use admin_panel_backend::model::quote::{BasketItem, Quote};
use admin_panel_backend::model::quote_status::{QuoteStatus, StatusValue};
use admin_panel_backend::repository::catalog_repo::InMemoryCatalogRepository;
use admin_panel_backend::repository::product_repo::InMemoryProductRepository;
use admin_panel_backend::repository::quote_repo::InMemoryQuoteRepository;
use admin_panel_backend::repository::supplier_repo::InMemorySupplierRepository;
use admin_panel_backend::repository::user_repo::InMemoryUserRepository;
use admin_panel_backend::util::session_store::InMemorySessionStore;
use admin_panel_backend::util::storage::InMemoryObjectStorage;
use axum::response::Response;
use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn item(product_id: &str, name: &str, price: f64, quantity: u32, category: Option<&str>) -> BasketItem {
    BasketItem {
        product_id: product_id.to_string(),
        quantity,
        selected_size: Some("M".to_string()),
        selected_color: Some("Oak".to_string()),
        price,
        product_name: name.to_string(),
        variant_name: String::new(),
        category: category.map(str::to_string),
    }
}

pub fn quote(id: &str, status: QuoteStatus, created_at: DateTime<Utc>) -> Quote {
    Quote {
        id: id.to_string(),
        case_id: 1000,
        status: StatusValue::Known(status),
        company_name: None,
        customer_first_name: "Jane".to_string(),
        customer_last_name: "Doe".to_string(),
        customer_email: format!("{}@example.com", id),
        customer_phone: "+44 20 7946 0000".to_string(),
        delivery_address: None,
        is_delivery: true,
        is_installation: false,
        is_rubbish_removal: false,
        notes: None,
        basket: vec![item("p-chair", "Chair", 50.0, 2, Some("Seating"))],
        created_at,
        updated_at: created_at,
    }
}

/// `count` quotes one minute apart, newest last; statuses cycle through `statuses`.
pub fn quotes(count: usize, statuses: &[QuoteStatus]) -> Vec<Quote> {
    let start = at(2025, 1, 1, 9, 0);
    (0..count)
        .map(|i| {
            let mut q = quote(&format!("q{:02}", i), statuses[i % statuses.len()], start + Duration::minutes(i as i64));
            q.case_id = 1000 + i as i64;
            q
        })
        .collect()
}

/// In-memory services seeded with `quotes`, the default admin account and a signed-in token.
pub async fn admin_app(quotes: Vec<Quote>) -> (Router, Services, String) {
    let services = Services::from_parts(
        Arc::new(InMemoryQuoteRepository::with_quotes(quotes)),
        Arc::new(InMemoryCatalogRepository::new()),
        Arc::new(InMemoryProductRepository::new()),
        Arc::new(InMemorySupplierRepository::new()),
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(InMemoryObjectStorage::default()),
        Arc::new(InMemorySessionStore::new()),
        JwtConfig::default(),
    );
    let admin = AdminUserConfig::default();
    services.auth.ensure_admin(&admin).await.unwrap();
    let signed_in = services.auth.sign_in(&admin.email, &admin.password).await.unwrap();
    let router = build_router(&services, "/login");
    (router, services, signed_in.tokens.access_token)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
