mod common;

use std::io::{Cursor, Read};

use admin_panel_backend::export::workbook::quote_workbook;
use admin_panel_backend::export::{export_quote, export_quotes, ARCHIVE_CONTENT_TYPE};
use admin_panel_backend::model::quote::DeliveryAddress;
use admin_panel_backend::model::quote_status::QuoteStatus;
use common::{at, item, quote};
use zip::ZipArchive;

/// Entry names and contents of an archive, in archive order.
fn unzip(bytes: &[u8]) -> Vec<(String, String)> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).unwrap();
            let mut text = String::new();
            entry.read_to_string(&mut text).unwrap();
            (entry.name().to_string(), text)
        })
        .collect()
}

#[test]
fn test_single_quote_archive_layout() {
    let mut q = quote("q7", QuoteStatus::InProgress, at(2025, 1, 5, 14, 30));
    q.case_id = 1042;
    q.basket.push(item("p-desk", "Desk", 1250.0, 1, Some("Office")));

    let file = export_quote(&q, at(2025, 2, 1, 8, 0)).unwrap();
    assert_eq!(file.file_name, "Quote_q7_2025-02-01.zip");
    assert_eq!(file.content_type, ARCHIVE_CONTENT_TYPE);

    let entries = unzip(&file.bytes);
    let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["01-quote-overview.csv", "02-customer-info.csv", "03-products.csv"]);

    let overview = &entries[0].1;
    assert!(overview.starts_with("Quote Overview\n"));
    assert!(overview.contains("Case ID,1042\n"));
    assert!(overview.contains("Status,IN_PROGRESS\n"));
    assert!(overview.contains("Created At,\"January 5, 2025, 02:30 PM\"\n"));
    assert!(overview.contains("Total Amount,\"$1,350.00\"\n"));

    let products = &entries[2].1;
    assert!(products.contains("Chair,M,Oak,2,$50.00,$100.00\n"));
    assert!(products.contains("Desk,M,Oak,1,\"$1,250.00\",\"$1,250.00\"\n"));
    assert!(products.ends_with("Subtotal,,,,,\"$1,350.00\"\n"));
}

#[test]
fn test_customer_sheet_marks_missing_values() {
    let mut q = quote("q1", QuoteStatus::Pending, at(2025, 1, 5, 9, 0));
    let workbook = quote_workbook(&q);
    let customer = workbook.sheet("Customer Info").unwrap();
    assert_eq!(customer.find_row("Full Name").unwrap()[1], "Jane Doe");
    assert_eq!(customer.find_row("Company").unwrap()[1], "-");
    assert_eq!(customer.find_row("Street").unwrap()[1], "-");
    assert_eq!(customer.find_row("Delivery").unwrap()[1], "Yes");
    assert_eq!(customer.find_row("Installation").unwrap()[1], "No");

    q.company_name = Some("Acme Ltd".to_string());
    q.delivery_address = Some(DeliveryAddress {
        street: "1 High St".to_string(),
        city: "Leeds".to_string(),
        state: "West Yorkshire".to_string(),
        postcode: "LS1 1AA".to_string(),
    });
    let workbook = quote_workbook(&q);
    let customer = workbook.sheet("Customer Info").unwrap();
    assert_eq!(customer.find_row("Company").unwrap()[1], "Acme Ltd");
    assert_eq!(customer.find_row("Postal Code").unwrap()[1], "LS1 1AA");
}

#[test]
fn test_list_archive_has_one_row_per_quote() {
    let mut first = quote("a", QuoteStatus::Approved, at(2025, 3, 2, 9, 0));
    first.basket.push(item("p-lamp", "Lamp", 20.0, 1, None));
    let second = quote("b", QuoteStatus::Pending, at(2025, 3, 1, 9, 0));

    let file = export_quotes(&[first, second], at(2025, 3, 3, 0, 0)).unwrap();
    assert_eq!(file.file_name, "quotes_2025-03-03.zip");

    let entries = unzip(&file.bytes);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "01-quotes.csv");
    let lines: Vec<&str> = entries[0].1.lines().collect();
    assert_eq!(lines[0], "Date,Customer,Email,Phone,Status,Total Amount,Products");
    assert_eq!(
        lines[1],
        "2025-03-02,Jane Doe,a@example.com,+44 20 7946 0000,approved,$120.00,\"Chair, Lamp\""
    );
    assert!(lines[2].starts_with("2025-03-01,Jane Doe,b@example.com"));
    assert_eq!(lines.len(), 3);
}

#[test]
fn test_empty_list_still_has_header() {
    let file = export_quotes(&[], at(2025, 3, 3, 0, 0)).unwrap();
    let entries = unzip(&file.bytes);
    assert_eq!(entries[0].1, "Date,Customer,Email,Phone,Status,Total Amount,Products\n");
}
