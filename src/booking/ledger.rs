/// 예약 원장 (sellerBookings)
/// 1. 체크아웃 시 장바구니 상품마다 pending 예약 생성
/// 2. 예약 상태 변경 (컬렉션 전체 재기록)
/// 3. 판매자별 예약 조회 (카탈로그 소유 상품 id 로 조인)
// region:    --- Imports
use super::model::{Booking, BookingStatus};
use crate::catalog::{Item, ItemRepository};
use crate::ids::timestamp_id;
use crate::session::Session;
use crate::storage::{keys, load_collection, save_collection, SharedStore, StoreError};
use chrono::Utc;
use std::collections::HashSet;
use tracing::{debug, info};

// endregion: --- Imports

// region:    --- Booking Repository
#[derive(Clone)]
pub struct BookingRepository {
    store: SharedStore,
}

impl BookingRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// 모든 예약 조회
    pub async fn list(&self) -> Result<Vec<Booking>, StoreError> {
        load_collection(&*self.store, keys::SELLER_BOOKINGS).await
    }

    /// 예약 조회
    pub async fn find(&self, booking_id: &str) -> Result<Option<Booking>, StoreError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|booking| booking.id == booking_id))
    }

    /// 1. 예약 생성
    pub async fn create(
        &self,
        items: &[Item],
        consumer: &Session,
    ) -> Result<Vec<Booking>, StoreError> {
        let now = Utc::now();
        let created: Vec<Booking> = items
            .iter()
            .map(|item| Booking {
                id: timestamp_id("booking", &item.id),
                item_id: item.id.clone(),
                item_name: item.name.clone(),
                consumer_email: consumer.email.clone(),
                consumer_name: consumer.display_name().to_string(),
                status: BookingStatus::Pending,
                booking_date: now,
            })
            .collect();

        let mut bookings = self.list().await?;
        bookings.extend(created.iter().cloned());
        save_collection(&*self.store, keys::SELLER_BOOKINGS, &bookings).await?;

        info!(
            "{:<12} --> 예약 생성: {}건 ({})",
            "Booking",
            created.len(),
            consumer.email
        );
        Ok(created)
    }

    /// 2. 예약 상태 변경
    /// 알 수 없는 id 면 아무것도 쓰지 않고 None
    pub async fn set_status(
        &self,
        booking_id: &str,
        status: BookingStatus,
    ) -> Result<Option<Booking>, StoreError> {
        let mut bookings = self.list().await?;
        let Some(booking) = bookings.iter_mut().find(|booking| booking.id == booking_id) else {
            debug!("{:<12} --> 알 수 없는 예약 id: {}", "Booking", booking_id);
            return Ok(None);
        };
        booking.status = status;
        let updated = booking.clone();

        save_collection(&*self.store, keys::SELLER_BOOKINGS, &bookings).await?;
        info!(
            "{:<12} --> 예약 상태 변경: {} -> {}",
            "Booking", booking_id, status
        );
        Ok(Some(updated))
    }

    /// 3. 판매자별 예약 조회
    pub async fn list_for_seller(
        &self,
        catalog: &ItemRepository,
        seller_email: &str,
    ) -> Result<Vec<Booking>, StoreError> {
        let owned: HashSet<String> = catalog
            .list_for_seller(seller_email)
            .await?
            .into_iter()
            .map(|item| item.id)
            .collect();

        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|booking| owned.contains(&booking.item_id))
            .collect())
    }
}

// endregion: --- Booking Repository

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::model::pending_count;
    use crate::catalog::model::demo_items;
    use crate::session::Role;
    use crate::storage::InMemoryStore;
    use std::sync::Arc;

    fn consumer() -> Session {
        Session::new("consumer@test.com", "", Role::Consumer)
    }

    fn owned_item(id: &str, seller_email: &str) -> Item {
        let mut item = demo_items().remove(0);
        item.id = id.to_string();
        item.seller_email = seller_email.to_string();
        item
    }

    #[tokio::test]
    async fn test_create_one_pending_booking_per_item() {
        let bookings = BookingRepository::new(Arc::new(InMemoryStore::new()));
        let items = demo_items();

        let created = bookings.create(&items[..3], &consumer()).await.unwrap();
        assert_eq!(created.len(), 3);
        for (booking, item) in created.iter().zip(&items[..3]) {
            assert_eq!(booking.item_id, item.id);
            assert_eq!(booking.item_name, item.name);
            assert_eq!(booking.status, BookingStatus::Pending);
            assert_eq!(booking.consumer_name, "Consumer");
        }
        assert_eq!(bookings.list().await.unwrap().len(), 3);
        assert_eq!(pending_count(&bookings.list().await.unwrap()), 3);
    }

    #[tokio::test]
    async fn test_set_status_unknown_id_is_noop() {
        let bookings = BookingRepository::new(Arc::new(InMemoryStore::new()));
        let created = bookings.create(&demo_items()[..1], &consumer()).await.unwrap();

        assert!(bookings
            .set_status("booking-missing", BookingStatus::Accepted)
            .await
            .unwrap()
            .is_none());
        assert_eq!(bookings.list().await.unwrap(), created);

        let updated = bookings
            .set_status(&created[0].id, BookingStatus::Rejected)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, BookingStatus::Rejected);
        assert_eq!(pending_count(&bookings.list().await.unwrap()), 0);
    }

    #[tokio::test]
    async fn test_create_keeps_existing_records_next_to_bad_ones() {
        let store: SharedStore = Arc::new(InMemoryStore::new());
        let bookings = BookingRepository::new(Arc::clone(&store));
        store
            .set(
                keys::SELLER_BOOKINGS,
                r#"[
                    {"id":"booking-a","itemId":"1","itemName":"Vintage Camera",
                     "consumerEmail":"c@test.com","consumerName":"Kim",
                     "status":"accepted","bookingDate":"2024-05-01T10:00:00Z"},
                    {"id":"booking-b","itemId":"2","itemName":"Designer Watch",
                     "consumerEmail":null,"consumerName":null,
                     "status":"pending","bookingDate":"2024-05-02T10:00:00Z"},
                    {"id":"booking-c","itemId":"3","itemName":"Laptop Stand",
                     "status":"cancelled","bookingDate":"2024-05-03T10:00:00Z"}
                ]"#
                .to_string(),
            )
            .await
            .unwrap();

        let existing = bookings.list().await.unwrap();
        assert_eq!(existing.len(), 2);
        assert_eq!(existing[1].consumer_email, "");

        bookings.create(&demo_items()[3..4], &consumer()).await.unwrap();
        let ids: Vec<String> = bookings
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[0], "booking-a");
        assert_eq!(ids[1], "booking-b");
        assert!(ids[2].starts_with("booking-"));
    }

    #[tokio::test]
    async fn test_list_for_seller_excludes_other_sellers() {
        let store: SharedStore = Arc::new(InMemoryStore::new());
        let catalog = ItemRepository::new(Arc::clone(&store));
        let bookings = BookingRepository::new(Arc::clone(&store));

        let items = vec![
            owned_item("a-1", "alice@test.com"),
            owned_item("a-2", "alice@test.com"),
            owned_item("b-1", "bob@test.com"),
        ];
        save_collection(&*store, keys::SELLER_ITEMS, &items)
            .await
            .unwrap();
        bookings.create(&items, &consumer()).await.unwrap();

        let alice = bookings
            .list_for_seller(&catalog, "alice@test.com")
            .await
            .unwrap();
        let ids: Vec<&str> = alice.iter().map(|b| b.item_id.as_str()).collect();
        assert_eq!(ids, vec!["a-1", "a-2"]);

        let bob = bookings
            .list_for_seller(&catalog, "bob@test.com")
            .await
            .unwrap();
        assert_eq!(bob.len(), 1);
        assert_eq!(bob[0].item_id, "b-1");

        assert!(bookings
            .list_for_seller(&catalog, "nobody@test.com")
            .await
            .unwrap()
            .is_empty());
    }
}
// endregion: --- Tests
