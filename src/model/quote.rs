use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::quote_status::StatusValue;
use crate::model::timestamp::rfc3339_millis;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
}

/// One line of a customer's basket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketItem {
    pub product_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub selected_size: Option<String>,
    #[serde(default)]
    pub selected_color: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub variant_name: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl BasketItem {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(rename = "_id")]
    pub id: String,
    pub case_id: i64,
    pub status: StatusValue,
    #[serde(default)]
    pub company_name: Option<String>,
    pub customer_first_name: String,
    pub customer_last_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    #[serde(default)]
    pub delivery_address: Option<DeliveryAddress>,
    #[serde(default)]
    pub is_delivery: bool,
    #[serde(default)]
    pub is_installation: bool,
    #[serde(default)]
    pub is_rubbish_removal: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub basket: Vec<BasketItem>,
    #[serde(with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// Always derived from the basket; never stored.
    pub fn total_amount(&self) -> f64 {
        self.basket.iter().map(BasketItem::line_total).sum()
    }

    pub fn items_count(&self) -> u64 {
        self.basket.iter().map(|item| u64::from(item.quantity)).sum()
    }

    pub fn customer_name(&self) -> String {
        format!("{} {}", self.customer_first_name, self.customer_last_name)
            .trim()
            .to_string()
    }
}

/// Fields supplied when a quote is recorded. The store assigns id, case id and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewQuote {
    pub status: Option<StatusValue>,
    pub company_name: Option<String>,
    pub customer_first_name: String,
    pub customer_last_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: Option<DeliveryAddress>,
    pub is_delivery: bool,
    pub is_installation: bool,
    pub is_rubbish_removal: bool,
    pub notes: Option<String>,
    pub basket: Vec<BasketItem>,
    /// Overrides the creation time, used when importing historical quotes.
    pub created_at: Option<DateTime<Utc>>,
}

impl NewQuote {
    pub fn into_quote(self, id: String, case_id: i64, now: DateTime<Utc>) -> Quote {
        let created_at = self.created_at.unwrap_or(now);
        Quote {
            id,
            case_id,
            status: self
                .status
                .unwrap_or(StatusValue::Known(crate::model::quote_status::QuoteStatus::Pending)),
            company_name: self.company_name,
            customer_first_name: self.customer_first_name,
            customer_last_name: self.customer_last_name,
            customer_email: self.customer_email,
            customer_phone: self.customer_phone,
            delivery_address: self.delivery_address,
            is_delivery: self.is_delivery,
            is_installation: self.is_installation,
            is_rubbish_removal: self.is_rubbish_removal,
            notes: self.notes,
            basket: self.basket,
            created_at,
            updated_at: created_at,
        }
    }
}

/// A quote as shown to the admin: the stored row plus its derived total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteView {
    #[serde(flatten)]
    pub quote: Quote,
    pub total_amount: f64,
}

impl From<Quote> for QuoteView {
    fn from(quote: Quote) -> Self {
        let total_amount = quote.total_amount();
        QuoteView { quote, total_amount }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::quote_status::QuoteStatus;

    fn item(price: f64, quantity: u32) -> BasketItem {
        BasketItem {
            product_id: "p".to_string(),
            quantity,
            selected_size: None,
            selected_color: None,
            price,
            product_name: "Chair".to_string(),
            variant_name: String::new(),
            category: None,
        }
    }

    #[test]
    fn test_total_amount_is_derived_from_basket() {
        let new_quote = NewQuote {
            customer_first_name: "Ada".to_string(),
            customer_last_name: "Lovelace".to_string(),
            basket: vec![item(12.5, 2), item(100.0, 1)],
            ..NewQuote::default()
        };
        let quote = new_quote.into_quote("q1".to_string(), 1, Utc::now());
        assert_eq!(quote.total_amount(), 125.0);
        assert_eq!(quote.items_count(), 3);
        assert_eq!(quote.status, StatusValue::Known(QuoteStatus::Pending));
        assert_eq!(QuoteView::from(quote).total_amount, 125.0);
    }

    #[test]
    fn test_view_serializes_flat_with_total() {
        let quote = NewQuote {
            basket: vec![item(3.0, 3)],
            ..NewQuote::default()
        }
        .into_quote("q2".to_string(), 7, Utc::now());
        let json = serde_json::to_value(QuoteView::from(quote)).unwrap();
        assert_eq!(json["_id"], "q2");
        assert_eq!(json["case_id"], 7);
        assert_eq!(json["total_amount"], 9.0);
    }
}
