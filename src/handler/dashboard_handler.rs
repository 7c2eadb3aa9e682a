use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::dto::dashboard_dto::{TopProductsParams, TrendParams};
use crate::service::dashboard_service::{DashboardService, DEFAULT_TOP_PRODUCTS};
use crate::util::error::HandlerError;

const DEFAULT_TREND_DAYS: u32 = 30;

pub async fn dashboard_stats_handler(
    State(service): State<Arc<dyn DashboardService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.stats().await?))
}

pub async fn order_trends_handler(
    State(service): State<Arc<dyn DashboardService>>,
    Query(params): Query<TrendParams>,
) -> Result<impl IntoResponse, HandlerError> {
    let days = params.days.unwrap_or(DEFAULT_TREND_DAYS);
    Ok(Json(service.order_trends(days).await?))
}

pub async fn top_products_handler(
    State(service): State<Arc<dyn DashboardService>>,
    Query(params): Query<TopProductsParams>,
) -> Result<impl IntoResponse, HandlerError> {
    let limit = params.limit.unwrap_or(DEFAULT_TOP_PRODUCTS);
    Ok(Json(service.top_products(limit).await?))
}

pub async fn category_sales_handler(
    State(service): State<Arc<dyn DashboardService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.category_sales().await?))
}

pub async fn recent_orders_handler(
    State(service): State<Arc<dyn DashboardService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.recent_orders().await?))
}
