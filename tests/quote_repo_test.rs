mod common;

use admin_panel_backend::dto::quote_dto::{QuoteFilter, QuoteQuery, StatusFilter, PAGE_SIZE};
use admin_panel_backend::model::quote::NewQuote;
use admin_panel_backend::model::quote_status::{QuoteStatus, StatusValue};
use admin_panel_backend::repository::quote_repo::{InMemoryQuoteRepository, QuoteRepository};
use admin_panel_backend::repository::repository_error::RepositoryError;
use chrono::{NaiveDate, Utc};
use common::{at, quote, quotes};

fn query(page: u64, filter: QuoteFilter) -> QuoteQuery {
    QuoteQuery { page, filter }
}

#[tokio::test]
async fn test_pages_are_windows_of_ten_newest_first() {
    let repo = InMemoryQuoteRepository::with_quotes(quotes(23, &[QuoteStatus::Pending]));

    let mut seen = Vec::new();
    for page in 1..=3 {
        let (rows, total) = repo.find_page(&query(page, QuoteFilter::default())).await.unwrap();
        assert_eq!(total, 23);
        let expected = (23 - (page - 1) * PAGE_SIZE).min(PAGE_SIZE) as usize;
        assert_eq!(rows.len(), expected);
        assert!(rows.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        seen.extend(rows.into_iter().map(|q| q.id));
    }
    assert_eq!(seen.first().map(String::as_str), Some("q22"));
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 23);

    let (beyond, total) = repo.find_page(&query(4, QuoteFilter::default())).await.unwrap();
    assert!(beyond.is_empty());
    assert_eq!(total, 23);
}

#[tokio::test]
async fn test_status_filter_counts_only_matching_rows() {
    // 15 quotes, 6 of them pending
    let mut rows = quotes(15, &[QuoteStatus::Approved]);
    for q in rows.iter_mut().step_by(2).take(6) {
        q.status = StatusValue::Known(QuoteStatus::Pending);
    }
    let repo = InMemoryQuoteRepository::with_quotes(rows);
    let filter = QuoteFilter { status: StatusFilter::Only(QuoteStatus::Pending), ..QuoteFilter::default() };

    let (page, total) = repo.find_page(&query(1, filter)).await.unwrap();
    assert_eq!(total, 6);
    assert_eq!(page.len(), 6);
    assert!(page.iter().all(|q| q.status == StatusValue::Known(QuoteStatus::Pending)));
}

#[tokio::test]
async fn test_search_is_case_insensitive_across_contact_fields() {
    let mut smith = quote("smith", QuoteStatus::Pending, at(2025, 1, 2, 10, 0));
    smith.customer_last_name = "Smith".to_string();
    let mut by_phone = quote("phone", QuoteStatus::Pending, at(2025, 1, 3, 10, 0));
    by_phone.customer_phone = "07700 900123".to_string();
    let other = quote("other", QuoteStatus::Pending, at(2025, 1, 4, 10, 0));
    let repo = InMemoryQuoteRepository::with_quotes(vec![smith, by_phone, other]);

    for term in ["SMITH", "smith", "mIt"] {
        let filter = QuoteFilter { search: Some(term.to_string()), ..QuoteFilter::default() };
        let (rows, total) = repo.find_page(&query(1, filter)).await.unwrap();
        assert_eq!(total, 1, "term {}", term);
        assert_eq!(rows[0].id, "smith");
    }

    let filter = QuoteFilter { search: Some("900123".to_string()), ..QuoteFilter::default() };
    let (rows, _) = repo.find_page(&query(1, filter)).await.unwrap();
    assert_eq!(rows[0].id, "phone");

    let filter = QuoteFilter { search: Some("PHONE@EXAMPLE".to_string()), ..QuoteFilter::default() };
    let (rows, _) = repo.find_page(&query(1, filter)).await.unwrap();
    assert_eq!(rows[0].id, "phone");
}

#[tokio::test]
async fn test_date_range_is_inclusive_of_both_days() {
    let repo = InMemoryQuoteRepository::with_quotes(vec![
        quote("before", QuoteStatus::Pending, at(2024, 12, 31, 23, 59)),
        quote("first", QuoteStatus::Pending, at(2025, 1, 1, 0, 0)),
        quote("last", QuoteStatus::Pending, at(2025, 1, 31, 23, 59)),
        quote("after", QuoteStatus::Pending, at(2025, 2, 1, 0, 0)),
    ]);
    let filter = QuoteFilter {
        date_start: NaiveDate::from_ymd_opt(2025, 1, 1),
        date_end: NaiveDate::from_ymd_opt(2025, 1, 31),
        ..QuoteFilter::default()
    };
    let (rows, total) = repo.find_page(&query(1, filter)).await.unwrap();
    assert_eq!(total, 2);
    let ids: Vec<&str> = rows.iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids, vec!["last", "first"]);
}

#[tokio::test]
async fn test_filters_combine_with_and() {
    let mut a = quote("a", QuoteStatus::Approved, at(2025, 3, 1, 12, 0));
    a.customer_first_name = "Alice".to_string();
    let mut b = quote("b", QuoteStatus::Pending, at(2025, 3, 1, 12, 0));
    b.customer_first_name = "Alice".to_string();
    let repo = InMemoryQuoteRepository::with_quotes(vec![a, b]);
    let filter = QuoteFilter {
        status: StatusFilter::Only(QuoteStatus::Approved),
        search: Some("alice".to_string()),
        ..QuoteFilter::default()
    };
    let (rows, total) = repo.find_page(&query(1, filter)).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].id, "a");
}

#[tokio::test]
async fn test_update_and_delete_report_missing_rows() {
    let repo = InMemoryQuoteRepository::with_quotes(vec![quote("a", QuoteStatus::Pending, at(2025, 1, 1, 0, 0))]);

    let now = Utc::now();
    repo.update_status("a", QuoteStatus::OnHold, now).await.unwrap();
    let updated = repo.get_by_id("a").await.unwrap();
    assert_eq!(updated.status, StatusValue::Known(QuoteStatus::OnHold));
    assert_eq!(updated.updated_at, now);

    assert!(matches!(
        repo.update_status("missing", QuoteStatus::OnHold, now).await,
        Err(RepositoryError::NotFound(_))
    ));

    let deleted = repo.delete_returning("a").await.unwrap();
    assert_eq!(deleted.status, StatusValue::Known(QuoteStatus::OnHold));
    assert!(matches!(repo.delete_returning("a").await, Err(RepositoryError::NotFound(_))));
    assert!(repo.list_statuses().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_insert_assigns_ids_and_increasing_case_ids() {
    let repo = InMemoryQuoteRepository::new();
    let first = repo.insert(NewQuote::default()).await.unwrap();
    let second = repo.insert(NewQuote::default()).await.unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(second.case_id, first.case_id + 1);
    assert_eq!(first.status, StatusValue::Known(QuoteStatus::Pending));
}
