use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::quote_status::{StatusCounts, StatusValue};
use crate::model::timestamp::rfc3339_millis;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub quotes: StatusCounts,
    pub categories: u64,
    pub subcategories: u64,
}

/// Orders placed on one calendar day (`YYYY-MM-DD`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderTrend {
    pub date: String,
    pub orders: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopProduct {
    pub id: String,
    pub name: String,
    pub category: String,
    pub total_sales: u64,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySales {
    pub category: String,
    pub sales: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentOrder {
    pub id: String,
    pub case_id: i64,
    pub customer_name: String,
    pub status: StatusValue,
    pub total_amount: f64,
    pub items_count: u64,
    #[serde(with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
}
