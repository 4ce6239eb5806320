/// 마켓 커맨드 처리
/// 1. 체크아웃 (주문 + 예약 생성, 장바구니 비우기)
/// 2. 예약 수락/거절 (예약 원장 + 주문 원장 동시 기록)
/// 3. 주문 완료
// region:    --- Imports
use super::events::MarketEvent;
use super::Repositories;
use crate::booking::{Booking, BookingStatus};
use crate::error::MarketError;
use crate::order::{Order, OrderStatus};
use crate::session::{Role, Session};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Commands
/// 판매자 결정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
}

impl From<Decision> for BookingStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Accept => BookingStatus::Accepted,
            Decision::Reject => BookingStatus::Rejected,
        }
    }
}

/// 예약 결정 명령
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecideBookingCommand {
    pub booking_id: String,
    pub decision: Decision,
}

/// 주문 완료 명령
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteOrderCommand {
    pub order_id: String,
}

/// 체크아웃 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    pub orders: Vec<Order>,
    pub bookings: Vec<Booking>,
    pub total: f64,
}

/// 예약 결정 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionOutcome {
    pub booking: Booking,
    pub order: Option<Order>,
}

/// 1. 체크아웃
pub async fn handle_checkout(
    session: &Session,
    repos: &Repositories,
) -> Result<CheckoutReceipt, MarketError> {
    info!("{:<12} --> 체크아웃 처리 시작: {}", "Command", session.email);
    session.require(Role::Consumer)?;

    let cart = repos.cart.list().await?;
    if cart.is_empty() {
        return Err(MarketError::EmptyCart);
    }

    let orders = repos.orders.create(&cart).await?;
    let bookings = repos.bookings.create(&cart, session).await?;
    repos.cart.clear().await?;

    repos.feed.publish(MarketEvent::CheckedOut {
        consumer_email: session.email.clone(),
        order_ids: orders.iter().map(|order| order.id.clone()).collect(),
        booking_ids: bookings.iter().map(|booking| booking.id.clone()).collect(),
        timestamp: Utc::now(),
    });

    let total: f64 = cart.iter().map(|item| item.price).sum();
    info!(
        "{:<12} --> 체크아웃 완료: 주문 {}건, 합계 {}",
        "Command",
        orders.len(),
        total
    );
    Ok(CheckoutReceipt {
        orders,
        bookings,
        total,
    })
}

/// 2. 예약 수락/거절
/// 판매자 소유 상품의 pending 예약만 처리하고, 그 외에는 None (no-op)
pub async fn handle_booking_decision(
    cmd: DecideBookingCommand,
    session: &Session,
    repos: &Repositories,
) -> Result<Option<DecisionOutcome>, MarketError> {
    info!("{:<12} --> 예약 결정 처리 시작: {:?}", "Command", cmd);
    session.require(Role::Seller)?;

    let owned = repos
        .bookings
        .list_for_seller(&repos.catalog, &session.email)
        .await?;
    let Some(current) = owned.into_iter().find(|booking| booking.id == cmd.booking_id) else {
        info!(
            "{:<12} --> 판매자 소유가 아닌 예약 무시: {}",
            "Command", cmd.booking_id
        );
        return Ok(None);
    };
    if current.status.is_decided() {
        warn!(
            "{:<12} --> 이미 결정된 예약: {} ({})",
            "Command", current.id, current.status
        );
        return Ok(None);
    }

    let status = BookingStatus::from(cmd.decision);
    let Some(booking) = repos.bookings.set_status(&cmd.booking_id, status).await? else {
        return Ok(None);
    };
    let order = repos
        .orders
        .reconcile(&repos.bookings, &booking.id, status)
        .await?;

    repos.feed.publish(MarketEvent::BookingDecided {
        booking_id: booking.id.clone(),
        item_id: booking.item_id.clone(),
        status,
        order_id: order.as_ref().map(|order| order.id.clone()),
        timestamp: Utc::now(),
    });

    Ok(Some(DecisionOutcome { booking, order }))
}

/// 3. 주문 완료
/// 수락된 주문만 완료할 수 있다. 이미 완료된 주문은 그대로 돌려준다.
pub async fn handle_complete_order(
    cmd: CompleteOrderCommand,
    session: &Session,
    repos: &Repositories,
) -> Result<Option<Order>, MarketError> {
    info!("{:<12} --> 주문 완료 처리 시작: {:?}", "Command", cmd);
    session.require(Role::Consumer)?;

    let Some(order) = repos.orders.find(&cmd.order_id).await? else {
        return Ok(None);
    };
    if order.status == OrderStatus::Completed {
        return Ok(Some(order));
    }
    if !order.status.can_transition_to(OrderStatus::Completed) {
        return Err(MarketError::OrderNotAccepted);
    }

    let completed = repos.orders.mark_completed(&cmd.order_id).await?;
    if completed.is_some() {
        repos.feed.publish(MarketEvent::OrderCompleted {
            order_id: cmd.order_id,
            timestamp: Utc::now(),
        });
    }
    Ok(completed)
}

// endregion: --- Commands

// endregion: --- Tests
