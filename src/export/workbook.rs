use chrono::{DateTime, Utc};

use crate::model::quote::Quote;

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Sheet { name: name.into(), rows: Vec::new() }
    }

    pub fn row<I, S>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.rows.push(Vec::new());
        self
    }

    /// First row whose first cell equals `label`.
    pub fn find_row(&self, label: &str) -> Option<&[String]> {
        self.rows
            .iter()
            .find(|row| row.first().is_some_and(|cell| cell == label))
            .map(Vec::as_slice)
    }
}

/// Ordered collection of named sheets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }
}

/// US dollar amount with thousands separators, e.g. `$1,234.50`.
pub fn format_price(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// `January 5, 2025, 02:30 PM`
pub fn format_long_date(dt: &DateTime<Utc>) -> String {
    dt.format("%B %-d, %Y, %I:%M %p").to_string()
}

pub fn format_short_date(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

fn or_dash(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

pub fn quote_workbook(quote: &Quote) -> Workbook {
    let total = format_price(quote.total_amount());

    let mut overview = Sheet::new("Quote Overview");
    overview
        .row(["Quote Overview"])
        .row(["Case ID".to_string(), quote.case_id.to_string()])
        .row(["Status".to_string(), quote.status.as_str().to_uppercase()])
        .row(["Created At".to_string(), format_long_date(&quote.created_at)])
        .row(["Updated At".to_string(), format_long_date(&quote.updated_at)])
        .blank()
        .row(["Total Amount".to_string(), total.clone()]);

    let address = quote.delivery_address.as_ref();
    let mut customer = Sheet::new("Customer Info");
    customer
        .row(["Customer Information"])
        .row(["Full Name".to_string(), quote.customer_name()])
        .row(["Email", quote.customer_email.as_str()])
        .row(["Phone", quote.customer_phone.as_str()])
        .row(["Company".to_string(), or_dash(quote.company_name.as_deref())])
        .blank()
        .row(["Delivery Address"])
        .row(["Street".to_string(), or_dash(address.map(|a| a.street.as_str()))])
        .row(["City".to_string(), or_dash(address.map(|a| a.city.as_str()))])
        .row(["State".to_string(), or_dash(address.map(|a| a.state.as_str()))])
        .row(["Postal Code".to_string(), or_dash(address.map(|a| a.postcode.as_str()))])
        .blank()
        .row(["Additional Services"])
        .row(["Delivery", yes_no(quote.is_delivery)])
        .row(["Installation", yes_no(quote.is_installation)])
        .row(["Rubbish Removal", yes_no(quote.is_rubbish_removal)])
        .blank()
        .row(["Notes"])
        .row([or_dash(quote.notes.as_deref())]);

    let mut products = Sheet::new("Products");
    products
        .row(["Product Details"])
        .row(["Product", "Size", "Color", "Quantity", "Unit Price", "Total Price"]);
    for item in &quote.basket {
        products.row([
            item.product_name.clone(),
            item.selected_size.clone().unwrap_or_default(),
            item.selected_color.clone().unwrap_or_default(),
            item.quantity.to_string(),
            format_price(item.price),
            format_price(item.line_total()),
        ]);
    }
    products.blank().row([
        "Subtotal".to_string(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        total,
    ]);

    Workbook { sheets: vec![overview, customer, products] }
}

/// One `Quotes` sheet listing every given quote in order.
pub fn quotes_workbook(quotes: &[Quote]) -> Workbook {
    let mut sheet = Sheet::new("Quotes");
    sheet.row(["Date", "Customer", "Email", "Phone", "Status", "Total Amount", "Products"]);
    for quote in quotes {
        let product_names = quote
            .basket
            .iter()
            .map(|item| item.product_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        sheet.row([
            format_short_date(&quote.created_at),
            quote.customer_name(),
            quote.customer_email.clone(),
            quote.customer_phone.clone(),
            quote.status.as_str().to_string(),
            format_price(quote.total_amount()),
            product_names,
        ]);
    }
    Workbook { sheets: vec![sheet] }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0.0), "$0.00");
        assert_eq!(format_price(12.5), "$12.50");
        assert_eq!(format_price(1234.5), "$1,234.50");
        assert_eq!(format_price(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_price(999.999), "$1,000.00");
    }

    #[test]
    fn test_format_long_date() {
        let dt = Utc.with_ymd_and_hms(2025, 1, 5, 14, 30, 0).unwrap();
        assert_eq!(format_long_date(&dt), "January 5, 2025, 02:30 PM");
        assert_eq!(format_short_date(&dt), "2025-01-05");
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(None), "-");
        assert_eq!(or_dash(Some("  ")), "-");
        assert_eq!(or_dash(Some("Acme")), "Acme");
    }
}
