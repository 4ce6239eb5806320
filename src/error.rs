// region:    --- Imports
use crate::session::Role;
use crate::storage::StoreError;

// endregion: --- Imports

// region:    --- Market Error
/// 마켓 명령/조회 오류
/// 알 수 없는 id 에 대한 갱신은 오류가 아니라 no-op 으로 처리한다.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("장바구니가 비어 있습니다.")]
    EmptyCart,

    #[error("필수 항목이 누락되었습니다: {0}")]
    MissingField(&'static str),

    #[error("잘못된 값입니다: {0}")]
    InvalidField(String),

    #[error("로그인이 필요합니다.")]
    Unauthenticated,

    #[error("{0} 역할이 필요합니다.")]
    Forbidden(Role),

    #[error("수락된 주문만 완료할 수 있습니다.")]
    OrderNotAccepted,

    #[error("상품을 찾을 수 없습니다: {0}")]
    ItemNotFound(String),

    #[error("저장소 오류: {0}")]
    Store(#[from] StoreError),
}

impl MarketError {
    /// 응답용 오류 코드
    pub fn code(&self) -> &'static str {
        match self {
            MarketError::EmptyCart => "EMPTY_CART",
            MarketError::MissingField(_) => "MISSING_FIELD",
            MarketError::InvalidField(_) => "INVALID_FIELD",
            MarketError::Unauthenticated => "UNAUTHENTICATED",
            MarketError::Forbidden(_) => "FORBIDDEN",
            MarketError::OrderNotAccepted => "NOT_ACCEPTED",
            MarketError::ItemNotFound(_) => "ITEM_NOT_FOUND",
            MarketError::Store(_) => "STORE_ERROR",
        }
    }
}

// endregion: --- Market Error
