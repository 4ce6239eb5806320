use crate::storage::null_as_default;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// 예약 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Rejected => "rejected",
        }
    }

    pub fn is_decided(&self) -> bool {
        !matches!(self, BookingStatus::Pending)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// 예약 모델 (판매자에게 보이는 구매 요청)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub item_id: String,
    pub item_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub consumer_email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub consumer_name: String,
    pub status: BookingStatus,
    pub booking_date: DateTime<Utc>,
}

/// 대기 중인 예약 수 (판매자 메뉴 배지)
pub fn pending_count(bookings: &[Booking]) -> usize {
    bookings
        .iter()
        .filter(|booking| booking.status == BookingStatus::Pending)
        .count()
}
