//! The transaction record model — one row of the sales export.

use crate::types::{CustomerId, OrderId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Completed,
    Cancelled,
    Refunded,
    Pending,
}

impl OrderStatus {
    /// Parse the raw status column. Real exports are inconsistent about
    /// spelling, so common variants map onto the canonical four.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "completed" | "complete" | "delivered" | "shipped" => Some(Self::Completed),
            "cancelled" | "canceled" | "order_cancelled" => Some(Self::Cancelled),
            "refunded" | "refund" => Some(Self::Refunded),
            "pending" | "processing" | "paid" => Some(Self::Pending),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Pending => "pending",
        }
    }
}

/// One transaction, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub customer_id: CustomerId,
    pub order_id: OrderId,
    pub order_date: NaiveDate,
    pub revenue_amount: f64,
    pub category: String,
    pub payment_method: String,
    pub region: String,
    pub status: OrderStatus,
}

/// The whole dataset, loaded once per run. Never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub transactions: Vec<Transaction>,
}

impl Dataset {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }
}
