use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, Utc};
use tracing::{error, info, instrument};

use crate::dto::quote_dto::QuoteQuery;
use crate::model::dashboard::{CategorySales, DashboardStats, OrderTrend, RecentOrder, TopProduct};
use crate::model::quote::Quote;
use crate::model::quote_status::{QuoteStatus, StatusCounts};
use crate::model::timestamp::start_of_day;
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::quote_repo::QuoteRepository;
use crate::util::error::ServiceError;

pub const UNCATEGORIZED: &str = "Uncategorized";
pub const MAX_TREND_DAYS: u32 = 365;
pub const DEFAULT_TOP_PRODUCTS: usize = 5;

#[async_trait]
pub trait DashboardService: Send + Sync {
    async fn stats(&self) -> Result<DashboardStats, ServiceError>;
    /// One entry per day over the last `days` days, oldest first.
    async fn order_trends(&self, days: u32) -> Result<Vec<OrderTrend>, ServiceError>;
    async fn top_products(&self, limit: usize) -> Result<Vec<TopProduct>, ServiceError>;
    async fn category_sales(&self) -> Result<Vec<CategorySales>, ServiceError>;
    async fn recent_orders(&self) -> Result<Vec<RecentOrder>, ServiceError>;
}

pub struct DashboardServiceImpl {
    pub quote_repo: Arc<dyn QuoteRepository>,
    pub catalog_repo: Arc<dyn CatalogRepository>,
}

impl DashboardServiceImpl {
    pub fn new(quote_repo: Arc<dyn QuoteRepository>, catalog_repo: Arc<dyn CatalogRepository>) -> Self {
        DashboardServiceImpl { quote_repo, catalog_repo }
    }

    async fn billable_quotes(&self) -> Result<Vec<Quote>, ServiceError> {
        self.quote_repo
            .find_excluding_status(QuoteStatus::Cancelled)
            .await
            .map_err(|e| {
                error!("Failed to load quotes for sales figures: {e}");
                ServiceError::from(e)
            })
    }
}

struct ProductTally {
    name: String,
    category: String,
    sales: u64,
    revenue: f64,
}

fn tally_products(quotes: &[Quote]) -> Vec<TopProduct> {
    let mut tallies: HashMap<&str, ProductTally> = HashMap::new();
    for item in quotes.iter().flat_map(|q| q.basket.iter()) {
        let tally = tallies.entry(item.product_id.as_str()).or_insert_with(|| ProductTally {
            name: item.product_name.clone(),
            category: item.category.clone().unwrap_or_else(|| UNCATEGORIZED.to_string()),
            sales: 0,
            revenue: 0.0,
        });
        tally.sales += u64::from(item.quantity);
        tally.revenue += item.line_total();
    }
    let mut products: Vec<TopProduct> = tallies
        .into_iter()
        .map(|(id, t)| TopProduct {
            id: id.to_string(),
            name: t.name,
            category: t.category,
            total_sales: t.sales,
            total_revenue: t.revenue,
        })
        .collect();
    products.sort_by(|a, b| b.total_sales.cmp(&a.total_sales).then_with(|| a.id.cmp(&b.id)));
    products
}

#[async_trait]
impl DashboardService for DashboardServiceImpl {
    #[instrument(skip(self))]
    async fn stats(&self) -> Result<DashboardStats, ServiceError> {
        let statuses = self.quote_repo.list_statuses().await?;
        let categories = self.catalog_repo.count_categories().await?;
        let subcategories = self.catalog_repo.count_subcategories(None).await?;
        Ok(DashboardStats {
            quotes: StatusCounts::from_statuses(&statuses),
            categories,
            subcategories,
        })
    }

    #[instrument(skip(self))]
    async fn order_trends(&self, days: u32) -> Result<Vec<OrderTrend>, ServiceError> {
        if days == 0 || days > MAX_TREND_DAYS {
            return Err(ServiceError::InvalidInput(format!(
                "days must be between 1 and {}",
                MAX_TREND_DAYS
            )));
        }
        let today = Utc::now().date_naive();
        let first_day = today
            .checked_sub_days(Days::new(u64::from(days - 1)))
            .ok_or_else(|| ServiceError::InvalidInput("days reaches before the calendar start".to_string()))?;

        let mut buckets: BTreeMap<String, (u64, f64)> = first_day
            .iter_days()
            .take(days as usize)
            .map(|day| (day.format("%Y-%m-%d").to_string(), (0, 0.0)))
            .collect();

        let quotes = self.quote_repo.find_created_since(start_of_day(first_day)).await?;
        for quote in &quotes {
            let key = quote.created_at.format("%Y-%m-%d").to_string();
            if let Some((orders, revenue)) = buckets.get_mut(&key) {
                *orders += 1;
                *revenue += quote.total_amount();
            }
        }
        info!(days, quotes = quotes.len(), "Order trends computed");
        Ok(buckets
            .into_iter()
            .map(|(date, (orders, revenue))| OrderTrend { date, orders, revenue })
            .collect())
    }

    #[instrument(skip(self))]
    async fn top_products(&self, limit: usize) -> Result<Vec<TopProduct>, ServiceError> {
        if limit == 0 {
            return Err(ServiceError::InvalidInput("limit must be at least 1".to_string()));
        }
        let quotes = self.billable_quotes().await?;
        let mut products = tally_products(&quotes);
        products.truncate(limit);
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn category_sales(&self) -> Result<Vec<CategorySales>, ServiceError> {
        let quotes = self.billable_quotes().await?;
        let mut by_category: BTreeMap<String, (u64, f64)> = BTreeMap::new();
        for item in quotes.iter().flat_map(|q| q.basket.iter()) {
            let key = item.category.clone().unwrap_or_else(|| UNCATEGORIZED.to_string());
            let entry = by_category.entry(key).or_insert((0, 0.0));
            entry.0 += u64::from(item.quantity);
            entry.1 += item.line_total();
        }
        let mut sales: Vec<CategorySales> = by_category
            .into_iter()
            .map(|(category, (sales, revenue))| CategorySales { category, sales, revenue })
            .collect();
        sales.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
        Ok(sales)
    }

    #[instrument(skip(self))]
    async fn recent_orders(&self) -> Result<Vec<RecentOrder>, ServiceError> {
        let (quotes, _) = self.quote_repo.find_page(&QuoteQuery::first_page()).await?;
        Ok(quotes
            .into_iter()
            .map(|quote| RecentOrder {
                total_amount: quote.total_amount(),
                items_count: quote.items_count(),
                customer_name: quote.customer_name(),
                id: quote.id,
                case_id: quote.case_id,
                status: quote.status,
                created_at: quote.created_at,
            })
            .collect())
    }
}
