// region:    --- Imports
use crate::catalog::ItemDraft;
use crate::error::MarketError;
use crate::market::commands::{
    handle_booking_decision, handle_checkout as command_handle_checkout, handle_complete_order,
    CompleteOrderCommand, Decision, DecideBookingCommand,
};
use crate::market::Repositories;
use crate::selection::move_to_cart;
use crate::session::{Role, Session};
use crate::stats;
use crate::sync::{EventLog, SyncSnapshot};
use axum::async_trait;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{error, info};

// endregion: --- Imports

// region:    --- App State
#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub snapshot: watch::Receiver<SyncSnapshot>,
    pub events: EventLog,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        snapshot: watch::Receiver<SyncSnapshot>,
        events: EventLog,
    ) -> Self {
        Self {
            repos,
            snapshot,
            events,
        }
    }
}

/// 라우터 설정
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/session",
            post(handle_login)
                .get(handle_get_session)
                .delete(handle_logout),
        )
        .route("/items", get(handle_get_items))
        .route(
            "/seller/items",
            get(handle_get_seller_items).post(handle_add_item),
        )
        .route(
            "/seller/items/:id",
            put(handle_update_item).delete(handle_delete_item),
        )
        .route("/seller/items/:id/toggle", post(handle_toggle_item))
        .route("/cart", get(handle_get_cart).post(handle_add_to_cart))
        .route("/cart/checkout", post(handle_checkout))
        .route("/cart/:id", delete(handle_remove_from_cart))
        .route(
            "/wishlist",
            get(handle_get_wishlist).post(handle_add_to_wishlist),
        )
        .route("/wishlist/:id", delete(handle_remove_from_wishlist))
        .route("/wishlist/:id/cart", post(handle_move_to_cart))
        .route("/orders", get(handle_get_orders))
        .route("/orders/:id/complete", post(handle_complete))
        .route("/seller/bookings", get(handle_get_seller_bookings))
        .route("/seller/bookings/:id/accept", post(handle_accept_booking))
        .route("/seller/bookings/:id/reject", post(handle_reject_booking))
        .route("/seller/stats", get(handle_get_seller_stats))
        .route("/consumer/stats", get(handle_get_consumer_stats))
        .route("/sync", get(handle_get_sync))
        .route("/events", get(handle_get_events))
        .with_state(state)
}

// endregion: --- App State

// region:    --- Error Response
impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = match &self {
            MarketError::EmptyCart
            | MarketError::MissingField(_)
            | MarketError::InvalidField(_) => StatusCode::BAD_REQUEST,
            MarketError::Unauthenticated => StatusCode::UNAUTHORIZED,
            MarketError::Forbidden(_) => StatusCode::FORBIDDEN,
            MarketError::OrderNotAccepted => StatusCode::CONFLICT,
            MarketError::ItemNotFound(_) => StatusCode::NOT_FOUND,
            MarketError::Store(e) => {
                error!("{:<12} --> 저장소 오류: {:?}", "Handler", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (
            status,
            Json(serde_json::json!({
                "error": self.to_string(),
                "code": self.code(),
            })),
        )
            .into_response()
    }
}

/// 갱신 결과 응답 (알 수 없는 id 는 updated=false)
#[derive(Serialize)]
struct UpdateResponse<T> {
    updated: bool,
    result: Option<T>,
}

fn update_response<T: Serialize>(result: Option<T>) -> Response {
    Json(UpdateResponse {
        updated: result.is_some(),
        result,
    })
    .into_response()
}

// endregion: --- Error Response

// region:    --- Session Extractor
/// 요청 헤더의 세션 정보
/// x-user-email, x-user-role 필수, x-user-name 선택
pub struct CurrentSession(pub Session);

const HEADER_EMAIL: &str = "x-user-email";
const HEADER_NAME: &str = "x-user-name";
const HEADER_ROLE: &str = "x-user-role";

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = MarketError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let email = header_value(&parts.headers, HEADER_EMAIL).ok_or(MarketError::Unauthenticated)?;
        let role = header_value(&parts.headers, HEADER_ROLE)
            .ok_or(MarketError::Unauthenticated)?
            .parse::<Role>()?;
        let name = header_value(&parts.headers, HEADER_NAME).unwrap_or_default();
        Ok(CurrentSession(Session::new(email, name, role)))
    }
}

// endregion: --- Session Extractor

// region:    --- Session Handlers

/// 로그인
pub async fn handle_login(
    State(state): State<AppState>,
    Json(session): Json<Session>,
) -> Response {
    match state.repos.sessions.login(&session).await {
        Ok(()) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 현재 세션 조회
pub async fn handle_get_session(State(state): State<AppState>) -> Response {
    match state.repos.sessions.current().await {
        Ok(Some(session)) => Json(session).into_response(),
        Ok(None) => MarketError::Unauthenticated.into_response(),
        Err(e) => MarketError::from(e).into_response(),
    }
}

/// 로그아웃
pub async fn handle_logout(State(state): State<AppState>) -> Response {
    match state.repos.sessions.logout().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => MarketError::from(e).into_response(),
    }
}

// endregion: --- Session Handlers

// region:    --- Catalog Handlers

/// 구매 가능한 상품 조회
pub async fn handle_get_items(State(state): State<AppState>) -> Response {
    info!("{:<12} --> 구매 가능한 상품 조회", "HandlerQuery");
    match state.repos.catalog.list_available().await {
        Ok(items) => Json(items).into_response(),
        Err(e) => MarketError::from(e).into_response(),
    }
}

/// 판매자 상품 조회
pub async fn handle_get_seller_items(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Response {
    info!(
        "{:<12} --> 판매자 상품 조회: {}",
        "HandlerQuery", session.email
    );
    if let Err(e) = session.require(Role::Seller) {
        return e.into_response();
    }
    match state.repos.catalog.list_for_seller(&session.email).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => MarketError::from(e).into_response(),
    }
}

/// 상품 등록
pub async fn handle_add_item(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(draft): Json<ItemDraft>,
) -> Response {
    match state.repos.catalog.add(&session, draft).await {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 상품 수정
pub async fn handle_update_item(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(item_id): Path<String>,
    Json(draft): Json<ItemDraft>,
) -> Response {
    match state.repos.catalog.update(&session, &item_id, draft).await {
        Ok(item) => update_response(item),
        Err(e) => e.into_response(),
    }
}

/// 상품 삭제
pub async fn handle_delete_item(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(item_id): Path<String>,
) -> Response {
    match state.repos.catalog.delete(&session, &item_id).await {
        Ok(deleted) => update_response(deleted.then(|| item_id.clone())),
        Err(e) => e.into_response(),
    }
}

/// 판매 상태 토글
pub async fn handle_toggle_item(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(item_id): Path<String>,
) -> Response {
    match state
        .repos
        .catalog
        .toggle_availability(&session, &item_id)
        .await
    {
        Ok(item) => update_response(item),
        Err(e) => e.into_response(),
    }
}

// endregion: --- Catalog Handlers

// region:    --- Selection Handlers

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectItemRequest {
    pub item_id: String,
}

#[derive(Serialize)]
struct SelectResponse {
    added: bool,
}

/// 장바구니 조회
pub async fn handle_get_cart(State(state): State<AppState>) -> Response {
    match state.repos.cart.list().await {
        Ok(items) => Json(items).into_response(),
        Err(e) => MarketError::from(e).into_response(),
    }
}

/// 위시리스트 조회
pub async fn handle_get_wishlist(State(state): State<AppState>) -> Response {
    match state.repos.wishlist.list().await {
        Ok(items) => Json(items).into_response(),
        Err(e) => MarketError::from(e).into_response(),
    }
}

/// 장바구니 담기
pub async fn handle_add_to_cart(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(req): Json<SelectItemRequest>,
) -> Response {
    select_item(&state, &session, &req.item_id, SelectTarget::Cart).await
}

/// 위시리스트 담기
pub async fn handle_add_to_wishlist(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(req): Json<SelectItemRequest>,
) -> Response {
    select_item(&state, &session, &req.item_id, SelectTarget::Wishlist).await
}

enum SelectTarget {
    Cart,
    Wishlist,
}

/// 구매 가능한 상품의 스냅샷을 담는다
async fn select_item(
    state: &AppState,
    session: &Session,
    item_id: &str,
    target: SelectTarget,
) -> Response {
    if let Err(e) = session.require(Role::Consumer) {
        return e.into_response();
    }
    let item = match state.repos.catalog.find_available(item_id).await {
        Ok(Some(item)) => item,
        Ok(None) => return MarketError::ItemNotFound(item_id.to_string()).into_response(),
        Err(e) => return MarketError::from(e).into_response(),
    };
    let list = match target {
        SelectTarget::Cart => &state.repos.cart,
        SelectTarget::Wishlist => &state.repos.wishlist,
    };
    match list.add(item).await {
        Ok(added) => Json(SelectResponse { added }).into_response(),
        Err(e) => MarketError::from(e).into_response(),
    }
}

/// 장바구니에서 빼기
pub async fn handle_remove_from_cart(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Response {
    match state.repos.cart.remove(&item_id).await {
        Ok(removed) => update_response(removed.then(|| item_id.clone())),
        Err(e) => MarketError::from(e).into_response(),
    }
}

/// 위시리스트에서 빼기
pub async fn handle_remove_from_wishlist(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Response {
    match state.repos.wishlist.remove(&item_id).await {
        Ok(removed) => update_response(removed.then(|| item_id.clone())),
        Err(e) => MarketError::from(e).into_response(),
    }
}

/// 위시리스트 상품을 장바구니로
pub async fn handle_move_to_cart(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Response {
    match move_to_cart(&state.repos.wishlist, &state.repos.cart, &item_id).await {
        Ok(added) => Json(SelectResponse { added }).into_response(),
        Err(e) => MarketError::from(e).into_response(),
    }
}

// endregion: --- Selection Handlers

// region:    --- Command Handlers

/// 체크아웃 요청 처리
pub async fn handle_checkout(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Response {
    info!("{:<12} --> 체크아웃 요청: {}", "Handler", session.email);
    match command_handle_checkout(&session, &state.repos).await {
        Ok(receipt) => (StatusCode::CREATED, Json(receipt)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 예약 수락
pub async fn handle_accept_booking(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(booking_id): Path<String>,
) -> Response {
    decide(&state, &session, booking_id, Decision::Accept).await
}

/// 예약 거절
pub async fn handle_reject_booking(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(booking_id): Path<String>,
) -> Response {
    decide(&state, &session, booking_id, Decision::Reject).await
}

async fn decide(
    state: &AppState,
    session: &Session,
    booking_id: String,
    decision: Decision,
) -> Response {
    let cmd = DecideBookingCommand {
        booking_id,
        decision,
    };
    match handle_booking_decision(cmd, session, &state.repos).await {
        Ok(outcome) => update_response(outcome),
        Err(e) => e.into_response(),
    }
}

/// 주문 완료
pub async fn handle_complete(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(order_id): Path<String>,
) -> Response {
    match handle_complete_order(CompleteOrderCommand { order_id }, &session, &state.repos).await {
        Ok(order) => update_response(order),
        Err(e) => e.into_response(),
    }
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// 주문 조회
pub async fn handle_get_orders(State(state): State<AppState>) -> Response {
    info!("{:<12} --> 주문 조회", "HandlerQuery");
    match state.repos.orders.list().await {
        Ok(orders) => Json(orders).into_response(),
        Err(e) => MarketError::from(e).into_response(),
    }
}

/// 판매자 예약 조회
pub async fn handle_get_seller_bookings(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Response {
    info!(
        "{:<12} --> 판매자 예약 조회: {}",
        "HandlerQuery", session.email
    );
    if let Err(e) = session.require(Role::Seller) {
        return e.into_response();
    }
    match state
        .repos
        .bookings
        .list_for_seller(&state.repos.catalog, &session.email)
        .await
    {
        Ok(bookings) => Json(bookings).into_response(),
        Err(e) => MarketError::from(e).into_response(),
    }
}

/// 판매자 통계
pub async fn handle_get_seller_stats(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Response {
    if let Err(e) = session.require(Role::Seller) {
        return e.into_response();
    }
    match stats::seller_stats(&state.repos.catalog, &state.repos.bookings, &session.email).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => MarketError::from(e).into_response(),
    }
}

/// 소비자 통계
pub async fn handle_get_consumer_stats(State(state): State<AppState>) -> Response {
    match stats::consumer_stats(&state.repos.orders, Utc::now()).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => MarketError::from(e).into_response(),
    }
}

/// 마지막 동기화 스냅샷
pub async fn handle_get_sync(State(state): State<AppState>) -> Response {
    let snapshot = state.snapshot.borrow().clone();
    Json(snapshot).into_response()
}

/// 최근 마켓 이벤트
pub async fn handle_get_events(State(state): State<AppState>) -> Response {
    Json(state.events.recent().await).into_response()
}

// endregion: --- Query Handlers
