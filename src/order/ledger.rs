/// 주문 원장 (consumerOrders)
/// 1. 체크아웃 시 상품마다 pending 주문 생성
/// 2. 주문 완료 처리
/// 3. 예약 결정 반영 (reconcile)
// region:    --- Imports
use super::model::{Order, OrderStatus};
use crate::booking::{BookingRepository, BookingStatus};
use crate::catalog::Item;
use crate::ids::timestamp_id;
use crate::storage::{keys, load_collection, save_collection, SharedStore, StoreError};
use chrono::Utc;
use tracing::{debug, info, warn};

// endregion: --- Imports

// region:    --- Order Repository
#[derive(Clone)]
pub struct OrderRepository {
    store: SharedStore,
}

impl OrderRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// 모든 주문 조회
    pub async fn list(&self) -> Result<Vec<Order>, StoreError> {
        load_collection(&*self.store, keys::CONSUMER_ORDERS).await
    }

    async fn save_all(&self, orders: &[Order]) -> Result<(), StoreError> {
        save_collection(&*self.store, keys::CONSUMER_ORDERS, orders).await
    }

    /// 주문 조회
    pub async fn find(&self, order_id: &str) -> Result<Option<Order>, StoreError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|order| order.id == order_id))
    }

    /// 1. 주문 생성
    pub async fn create(&self, items: &[Item]) -> Result<Vec<Order>, StoreError> {
        let now = Utc::now();
        let created: Vec<Order> = items
            .iter()
            .enumerate()
            .map(|(index, item)| Order {
                id: timestamp_id("order", index),
                item: item.clone(),
                status: OrderStatus::Pending,
                booking_date: now,
                pickup_date: None,
                completed: false,
            })
            .collect();

        let mut orders = self.list().await?;
        orders.extend(created.iter().cloned());
        self.save_all(&orders).await?;

        info!("{:<12} --> 주문 생성: {}건", "Order", created.len());
        Ok(created)
    }

    /// 2. 주문 완료 처리
    /// 이전 상태는 검사하지 않는다. 여러 번 호출해도 결과는 같다.
    pub async fn mark_completed(&self, order_id: &str) -> Result<Option<Order>, StoreError> {
        let mut orders = self.list().await?;
        let Some(order) = orders.iter_mut().find(|order| order.id == order_id) else {
            debug!("{:<12} --> 알 수 없는 주문 id: {}", "Order", order_id);
            return Ok(None);
        };

        if order.status != OrderStatus::Accepted && order.status != OrderStatus::Completed {
            warn!(
                "{:<12} --> 수락되지 않은 주문 완료 처리: {} ({})",
                "Order", order_id, order.status
            );
        }
        order.completed = true;
        order.status = OrderStatus::Completed;
        let updated = order.clone();

        self.save_all(&orders).await?;
        info!("{:<12} --> 주문 완료: {}", "Order", order_id);
        Ok(Some(updated))
    }

    /// 3. 예약 결정 반영
    /// 예약의 상품 id 와 같은 상품을 가진 pending 주문 중 첫 번째만 갱신한다.
    /// 같은 상품의 pending 주문이 여러 개면 어느 예약에서 왔는지 구분하지 못한다.
    pub async fn reconcile(
        &self,
        bookings: &BookingRepository,
        booking_id: &str,
        new_status: BookingStatus,
    ) -> Result<Option<Order>, StoreError> {
        let Some(booking) = bookings.find(booking_id).await? else {
            debug!("{:<12} --> 알 수 없는 예약 id: {}", "Order", booking_id);
            return Ok(None);
        };

        let mut orders = self.list().await?;
        let Some(order) = orders
            .iter_mut()
            .find(|order| order.item.id == booking.item_id && order.status == OrderStatus::Pending)
        else {
            debug!(
                "{:<12} --> 반영할 pending 주문 없음: item={}",
                "Order", booking.item_id
            );
            return Ok(None);
        };
        order.status = OrderStatus::from(new_status);
        let updated = order.clone();

        self.save_all(&orders).await?;
        info!(
            "{:<12} --> 주문 상태 반영: {} -> {} (booking={})",
            "Order", updated.id, updated.status, booking_id
        );
        Ok(Some(updated))
    }
}

// endregion: --- Order Repository

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::model::demo_items;
    use crate::session::{Role, Session};
    use crate::storage::InMemoryStore;
    use std::sync::Arc;

    fn repositories() -> (OrderRepository, BookingRepository) {
        let store: SharedStore = Arc::new(InMemoryStore::new());
        (
            OrderRepository::new(Arc::clone(&store)),
            BookingRepository::new(store),
        )
    }

    fn consumer() -> Session {
        Session::new("consumer@test.com", "Park", Role::Consumer)
    }

    #[tokio::test]
    async fn test_create_appends_pending_orders() {
        let (orders, _) = repositories();
        let items = demo_items();

        orders.create(&items[..1]).await.unwrap();
        let created = orders.create(&items[1..3]).await.unwrap();
        assert_eq!(created.len(), 2);

        let all = orders.list().await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|o| o.status == OrderStatus::Pending && !o.completed));
        assert!(all.iter().all(|o| o.pickup_date.is_none()));
    }

    #[tokio::test]
    async fn test_reconcile_moves_matching_pending_order() {
        let (orders, bookings) = repositories();
        let items = demo_items();
        orders.create(&items[..2]).await.unwrap();
        let created = bookings.create(&items[..2], &consumer()).await.unwrap();

        let updated = orders
            .reconcile(&bookings, &created[1].id, BookingStatus::Rejected)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.item.id, items[1].id);
        assert_eq!(updated.status, OrderStatus::Rejected);

        let all = orders.list().await.unwrap();
        assert_eq!(all[0].status, OrderStatus::Pending);
        assert_eq!(all[1].status, OrderStatus::Rejected);
    }

    #[tokio::test]
    async fn test_reconcile_ambiguous_item_updates_first_match_only() {
        let (orders, bookings) = repositories();
        let items = demo_items();
        let camera = &items[..1];

        // 같은 상품을 두 번 체크아웃
        orders.create(camera).await.unwrap();
        let first = bookings.create(camera, &consumer()).await.unwrap();
        orders.create(camera).await.unwrap();
        let second = bookings.create(camera, &consumer()).await.unwrap();

        // 두 번째 예약을 수락해도 첫 번째 pending 주문이 갱신된다
        orders
            .reconcile(&bookings, &second[0].id, BookingStatus::Accepted)
            .await
            .unwrap();
        let all = orders.list().await.unwrap();
        assert_eq!(all[0].status, OrderStatus::Accepted);
        assert_eq!(all[1].status, OrderStatus::Pending);

        orders
            .reconcile(&bookings, &first[0].id, BookingStatus::Rejected)
            .await
            .unwrap();
        let all = orders.list().await.unwrap();
        assert_eq!(all[0].status, OrderStatus::Accepted);
        assert_eq!(all[1].status, OrderStatus::Rejected);
    }

    #[tokio::test]
    async fn test_reconcile_unknown_booking_is_noop() {
        let (orders, bookings) = repositories();
        orders.create(&demo_items()[..1]).await.unwrap();

        assert!(orders
            .reconcile(&bookings, "booking-missing", BookingStatus::Accepted)
            .await
            .unwrap()
            .is_none());
        assert_eq!(orders.list().await.unwrap()[0].status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_mark_completed_is_idempotent() {
        let (orders, bookings) = repositories();
        let catalog = demo_items();
        let items = &catalog[..1];
        let order = orders.create(items).await.unwrap().remove(0);
        let booking = bookings.create(items, &consumer()).await.unwrap().remove(0);
        orders
            .reconcile(&bookings, &booking.id, BookingStatus::Accepted)
            .await
            .unwrap();

        let once = orders.mark_completed(&order.id).await.unwrap().unwrap();
        let snapshot = orders.list().await.unwrap();
        let twice = orders.mark_completed(&order.id).await.unwrap().unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.status, OrderStatus::Completed);
        assert!(twice.completed);
        assert_eq!(orders.list().await.unwrap(), snapshot);
        assert!(orders.mark_completed("order-missing").await.unwrap().is_none());
    }
}
// endregion: --- Tests
