use crate::booking::BookingStatus;
use crate::catalog::Item;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 주문 상태
///
/// ```text
/// pending --(판매자 수락)--> accepted --(소비자 완료)--> completed
/// pending --(판매자 거절)--> rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Completed => "completed",
        }
    }

    /// 상태 전이 가능 여부
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (*self, next),
            (OrderStatus::Pending, OrderStatus::Accepted)
                | (OrderStatus::Pending, OrderStatus::Rejected)
                | (OrderStatus::Accepted, OrderStatus::Completed)
        )
    }
}

impl From<BookingStatus> for OrderStatus {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Pending => OrderStatus::Pending,
            BookingStatus::Accepted => OrderStatus::Accepted,
            BookingStatus::Rejected => OrderStatus::Rejected,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// 주문 모델 (소비자에게 보이는 예약 사본)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub item: Item,
    pub status: OrderStatus,
    pub booking_date: DateTime<Utc>,
    #[serde(default)]
    pub pickup_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
}

impl Order {
    /// 예약 후 경과 일수
    pub fn days_since_booking(&self, now: DateTime<Utc>) -> i64 {
        (now - self.booking_date).num_days().abs()
    }
}
