/// 공유 키-값 저장소
/// 모든 상태는 문자열 키 아래 JSON 텍스트로 저장된다.
/// 컬렉션은 항상 배열 전체를 읽고 전체를 다시 쓴다 (마지막 쓰기가 이긴다).
// region:    --- Imports
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tracing::warn;

// endregion: --- Imports

// region:    --- Modules
pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

// endregion: --- Modules

// region:    --- Keys
/// 저장소 키
pub mod keys {
    pub const SELLER_ITEMS: &str = "sellerItems";
    pub const CONSUMER_CART: &str = "consumerCart";
    pub const CONSUMER_WISHLIST: &str = "consumerWishlist";
    pub const CONSUMER_ORDERS: &str = "consumerOrders";
    pub const SELLER_BOOKINGS: &str = "sellerBookings";
    pub const USER_EMAIL: &str = "userEmail";
    pub const USER_NAME: &str = "userName";
    pub const USER_ROLE: &str = "userRole";
}

// endregion: --- Keys

// region:    --- Store Error
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("데이터베이스 오류: {0}")]
    Database(#[from] sqlx::Error),

    #[error("직렬화 오류: {0}")]
    Serialization(#[from] serde_json::Error),
}

// endregion: --- Store Error

// region:    --- Key Value Store Trait
/// 키-값 저장소 트레이트
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;

// endregion: --- Key Value Store Trait

// region:    --- Collection Helpers
/// 컬렉션 읽기
/// 값이 없거나 배열이 아니면 빈 배열로 취급한다.
/// 해석할 수 없는 레코드만 건너뛰고 나머지는 유지한다.
pub async fn load_collection<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Vec<T>, StoreError> {
    let Some(raw) = store.get(key).await? else {
        return Ok(Vec::new());
    };

    let records = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
        Ok(records) => records,
        Err(e) => {
            warn!(
                "{:<12} --> 손상된 컬렉션, 빈 배열로 대체: key={}, {}",
                "Storage", key, e
            );
            return Ok(Vec::new());
        }
    };

    let mut items = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<T>(record) {
            Ok(item) => items.push(item),
            Err(e) => warn!(
                "{:<12} --> 손상된 레코드 건너뜀: key={}[{}], {}",
                "Storage", key, index, e
            ),
        }
    }
    Ok(items)
}

/// null 을 기본값으로 읽는다
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 컬렉션 전체 쓰기
pub async fn save_collection<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    items: &[T],
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(items)?;
    store.set(key, raw).await
}

// endregion: --- Collection Helpers

// endregion: --- Tests
