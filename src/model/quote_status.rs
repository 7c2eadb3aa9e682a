use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Lifecycle stage of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Pending,
    Approved,
    InProgress,
    OnHold,
    OnDelivery,
    Delivered,
    Completed,
    Cancelled,
}

const STATUS_COUNT: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown quote status: {0}")]
pub struct UnknownStatus(pub String);

impl QuoteStatus {
    pub const ALL: [QuoteStatus; STATUS_COUNT] = [
        QuoteStatus::Pending,
        QuoteStatus::Approved,
        QuoteStatus::InProgress,
        QuoteStatus::OnHold,
        QuoteStatus::OnDelivery,
        QuoteStatus::Delivered,
        QuoteStatus::Completed,
        QuoteStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "pending",
            QuoteStatus::Approved => "approved",
            QuoteStatus::InProgress => "in_progress",
            QuoteStatus::OnHold => "on_hold",
            QuoteStatus::OnDelivery => "on_delivery",
            QuoteStatus::Delivered => "delivered",
            QuoteStatus::Completed => "completed",
            QuoteStatus::Cancelled => "cancelled",
        }
    }

    /// Human label, e.g. `In Progress`.
    pub fn label(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "Pending",
            QuoteStatus::Approved => "Approved",
            QuoteStatus::InProgress => "In Progress",
            QuoteStatus::OnHold => "On Hold",
            QuoteStatus::OnDelivery => "On Delivery",
            QuoteStatus::Delivered => "Delivered",
            QuoteStatus::Completed => "Completed",
            QuoteStatus::Cancelled => "Cancelled",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuoteStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A status as read back from the store.
///
/// Rows written by other clients may carry values outside [`QuoteStatus`]; those are kept
/// verbatim as `Unrecognized` instead of failing the whole page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StatusValue {
    Known(QuoteStatus),
    Unrecognized(String),
}

impl StatusValue {
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<QuoteStatus>() {
            Ok(status) => StatusValue::Known(status),
            Err(_) => StatusValue::Unrecognized(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StatusValue::Known(status) => status.as_str(),
            StatusValue::Unrecognized(raw) => raw.as_str(),
        }
    }

    pub fn known(&self) -> Option<QuoteStatus> {
        match self {
            StatusValue::Known(status) => Some(*status),
            StatusValue::Unrecognized(_) => None,
        }
    }
}

impl From<QuoteStatus> for StatusValue {
    fn from(status: QuoteStatus) -> Self {
        StatusValue::Known(status)
    }
}

impl fmt::Display for StatusValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StatusValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StatusValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(StatusValue::parse(&raw))
    }
}

/// Number of quotes per status over the whole table.
///
/// Every known status has a bucket (zero when empty); values outside the known set land in
/// `unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    buckets: [u64; STATUS_COUNT],
    unknown: u64,
}

impl StatusCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_statuses<'a, I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = &'a StatusValue>,
    {
        let mut counts = Self::new();
        for status in statuses {
            counts.increment(status);
        }
        counts
    }

    pub fn get(&self, status: QuoteStatus) -> u64 {
        self.buckets[status.index()]
    }

    pub fn unknown(&self) -> u64 {
        self.unknown
    }

    pub fn increment(&mut self, status: &StatusValue) {
        match status {
            StatusValue::Known(known) => self.buckets[known.index()] += 1,
            StatusValue::Unrecognized(_) => self.unknown += 1,
        }
    }

    /// Removes one from the bucket; never goes below zero.
    pub fn decrement(&mut self, status: &StatusValue) {
        let slot = match status {
            StatusValue::Known(known) => &mut self.buckets[known.index()],
            StatusValue::Unrecognized(_) => &mut self.unknown,
        };
        *slot = slot.saturating_sub(1);
    }

    pub fn total(&self) -> u64 {
        self.buckets.iter().sum::<u64>() + self.unknown
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuoteStatus, u64)> + '_ {
        QuoteStatus::ALL.iter().map(move |status| (*status, self.get(*status)))
    }
}

impl Serialize for StatusCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(STATUS_COUNT + 2))?;
        for (status, count) in self.iter() {
            map.serialize_entry(status.as_str(), &count)?;
        }
        map.serialize_entry("unknown", &self.unknown)?;
        map.serialize_entry("total", &self.total())?;
        map.end()
    }
}
