/// 프로필 통계 조회
// region:    --- Imports
use crate::booking::{BookingRepository, BookingStatus};
use crate::catalog::ItemRepository;
use crate::order::{Order, OrderRepository, OrderStatus};
use crate::storage::StoreError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

// endregion: --- Imports

/// 최근 주문으로 보는 기간 (일)
const RECENT_ORDER_DAYS: i64 = 30;

// region:    --- Stats
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerStats {
    pub total_items: usize,
    pub available_items: usize,
    pub total_bookings: usize,
    pub accepted_bookings: usize,
    pub pending_bookings: usize,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerStats {
    pub total_orders: usize,
    pub completed_orders: usize,
    pub pending_orders: usize,
    pub accepted_orders: usize,
    pub total_spent: f64,
    pub recent_completed_orders: usize,
}

/// 판매자 통계
/// 매출은 상품 가격 x 수락된 예약 수의 합
pub async fn seller_stats(
    catalog: &ItemRepository,
    bookings: &BookingRepository,
    seller_email: &str,
) -> Result<SellerStats, StoreError> {
    info!("{:<12} --> 판매자 통계 조회: {}", "Query", seller_email);
    let items = catalog.list_for_seller(seller_email).await?;
    let bookings = bookings.list_for_seller(catalog, seller_email).await?;

    let count = |status: BookingStatus| bookings.iter().filter(|b| b.status == status).count();
    let total_revenue: f64 = items
        .iter()
        .map(|item| {
            let accepted = bookings
                .iter()
                .filter(|b| b.item_id == item.id && b.status == BookingStatus::Accepted)
                .count();
            item.price * accepted as f64
        })
        .sum();

    Ok(SellerStats {
        total_items: items.len(),
        available_items: items.iter().filter(|item| item.available).count(),
        total_bookings: bookings.len(),
        accepted_bookings: count(BookingStatus::Accepted),
        pending_bookings: count(BookingStatus::Pending),
        total_revenue,
    })
}

/// 소비자 통계
pub async fn consumer_stats(
    orders: &OrderRepository,
    now: DateTime<Utc>,
) -> Result<ConsumerStats, StoreError> {
    info!("{:<12} --> 소비자 통계 조회", "Query");
    Ok(summarize_orders(&orders.list().await?, now))
}

fn summarize_orders(orders: &[Order], now: DateTime<Utc>) -> ConsumerStats {
    ConsumerStats {
        total_orders: orders.len(),
        completed_orders: orders.iter().filter(|o| o.completed).count(),
        pending_orders: orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .count(),
        accepted_orders: orders
            .iter()
            .filter(|o| o.status == OrderStatus::Accepted && !o.completed)
            .count(),
        // 거절된 주문도 포함한 전체 금액
        total_spent: orders.iter().map(|o| o.item.price).sum(),
        recent_completed_orders: orders
            .iter()
            .filter(|o| o.completed && o.days_since_booking(now) <= RECENT_ORDER_DAYS)
            .count(),
    }
}

// endregion: --- Stats

// endregion: --- Tests
