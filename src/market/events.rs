use crate::booking::BookingStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum MarketEvent {
    // 체크아웃 이벤트
    CheckedOut {
        consumer_email: String,
        order_ids: Vec<String>,
        booking_ids: Vec<String>,
        timestamp: DateTime<Utc>,
    },
    // 판매자 예약 결정 이벤트
    BookingDecided {
        booking_id: String,
        item_id: String,
        status: BookingStatus,
        order_id: Option<String>,
        timestamp: DateTime<Utc>,
    },
    // 주문 완료 이벤트
    OrderCompleted {
        order_id: String,
        timestamp: DateTime<Utc>,
    },
}

impl MarketEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            MarketEvent::CheckedOut { .. } => "CheckedOut",
            MarketEvent::BookingDecided { .. } => "BookingDecided",
            MarketEvent::OrderCompleted { .. } => "OrderCompleted",
        }
    }
}
