mod common;

use std::sync::Arc;

use admin_panel_backend::model::catalog::Category;
use admin_panel_backend::model::quote::Quote;
use admin_panel_backend::model::quote_status::QuoteStatus;
use admin_panel_backend::repository::catalog_repo::{CatalogRepository, InMemoryCatalogRepository};
use admin_panel_backend::repository::quote_repo::InMemoryQuoteRepository;
use admin_panel_backend::service::dashboard_service::{DashboardService, DashboardServiceImpl, UNCATEGORIZED};
use admin_panel_backend::util::error::ServiceError;
use chrono::{Days, Duration, Utc};
use common::{at, item, quote, quotes};

fn service(quotes: Vec<Quote>) -> (DashboardServiceImpl, Arc<InMemoryCatalogRepository>) {
    let catalog = Arc::new(InMemoryCatalogRepository::new());
    let service = DashboardServiceImpl::new(Arc::new(InMemoryQuoteRepository::with_quotes(quotes)), catalog.clone());
    (service, catalog)
}

/// Two billable quotes and one cancelled one with a large basket.
fn sales_quotes() -> Vec<Quote> {
    let mut a = quote("a", QuoteStatus::Pending, at(2025, 3, 1, 10, 0));
    a.basket = vec![
        item("p-chair", "Chair", 50.0, 2, Some("Seating")),
        item("p-desk", "Desk", 200.0, 1, Some("Office")),
    ];
    let mut b = quote("b", QuoteStatus::Approved, at(2025, 3, 2, 10, 0));
    b.basket = vec![item("p-chair", "Chair", 50.0, 3, Some("Seating")), item("p-lamp", "Lamp", 20.0, 1, None)];
    let mut c = quote("c", QuoteStatus::Cancelled, at(2025, 3, 3, 10, 0));
    c.basket = vec![item("p-desk", "Desk", 200.0, 10, Some("Office"))];
    vec![a, b, c]
}

#[tokio::test]
async fn test_stats_combine_quote_counts_and_catalog_size() {
    let (service, catalog) = service(sales_quotes());
    catalog
        .insert_category(Category {
            id: "c1".to_string(),
            name: "Office".to_string(),
            slug: "office".to_string(),
            image: None,
            created_at: Utc::now(),
        })
        .await
        .unwrap();

    let stats = service.stats().await.unwrap();
    assert_eq!(stats.quotes.total(), 3);
    assert_eq!(stats.quotes.get(QuoteStatus::Cancelled), 1);
    assert_eq!(stats.categories, 1);
    assert_eq!(stats.subcategories, 0);
}

#[tokio::test]
async fn test_top_products_skip_cancelled_quotes() {
    let (service, _) = service(sales_quotes());
    let top = service.top_products(2).await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].id, "p-chair");
    assert_eq!(top[0].total_sales, 5);
    assert_eq!(top[0].total_revenue, 250.0);
    assert_eq!(top[1].id, "p-desk");
    assert_eq!(top[1].total_sales, 1);

    let all = service.top_products(10).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[2].category, UNCATEGORIZED);

    assert!(matches!(service.top_products(0).await, Err(ServiceError::InvalidInput(_))));
}

#[tokio::test]
async fn test_category_sales_sorted_by_revenue() {
    let (service, _) = service(sales_quotes());
    let sales = service.category_sales().await.unwrap();
    let names: Vec<&str> = sales.iter().map(|s| s.category.as_str()).collect();
    assert_eq!(names, vec!["Seating", "Office", UNCATEGORIZED]);
    assert_eq!(sales[0].sales, 5);
    assert_eq!(sales[1].revenue, 200.0);
}

#[tokio::test]
async fn test_order_trends_fill_every_day() {
    let now = Utc::now();
    let (service, _) = service(vec![
        quote("today", QuoteStatus::Pending, now),
        quote("earlier", QuoteStatus::Approved, now - Duration::days(2)),
        quote("old", QuoteStatus::Approved, now - Duration::days(40)),
    ]);

    let trends = service.order_trends(7).await.unwrap();
    assert_eq!(trends.len(), 7);
    let today = now.date_naive();
    assert_eq!(trends[6].date, today.format("%Y-%m-%d").to_string());
    assert_eq!(trends[6].orders, 1);
    assert_eq!(trends[6].revenue, 100.0);
    let two_days_ago = today.checked_sub_days(Days::new(2)).unwrap();
    assert_eq!(trends[4].date, two_days_ago.format("%Y-%m-%d").to_string());
    assert_eq!(trends[4].orders, 1);
    assert_eq!(trends.iter().map(|t| t.orders).sum::<u64>(), 2);
    assert!(trends.windows(2).all(|w| w[0].date < w[1].date));
}

#[tokio::test]
async fn test_order_trends_range_is_bounded() {
    let (service, _) = service(Vec::new());
    assert!(matches!(service.order_trends(0).await, Err(ServiceError::InvalidInput(_))));
    assert!(matches!(service.order_trends(366).await, Err(ServiceError::InvalidInput(_))));
    assert_eq!(service.order_trends(365).await.unwrap().len(), 365);
}

#[tokio::test]
async fn test_recent_orders_are_the_newest_page() {
    let (service, _) = service(quotes(12, &[QuoteStatus::Pending]));
    let recent = service.recent_orders().await.unwrap();
    assert_eq!(recent.len(), 10);
    assert_eq!(recent[0].id, "q11");
    assert_eq!(recent[0].case_id, 1011);
    assert_eq!(recent[0].customer_name, "Jane Doe");
    assert_eq!(recent[0].items_count, 2);
    assert_eq!(recent[0].total_amount, 100.0);
}
