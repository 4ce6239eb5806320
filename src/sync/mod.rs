/// 원장 동기화
/// 다른 사용자(판매자/소비자)가 기록한 결정을 관찰하기 위해
/// 일정 주기로 예약 원장과 주문 원장을 다시 읽어 스냅샷을 발행한다.
/// 폴링 사이에 여러 번 바뀌면 마지막 상태만 관찰된다.
// region:    --- Imports
use crate::booking::{pending_count, Booking, BookingRepository};
use crate::market::events::MarketEvent;
use crate::order::{Order, OrderRepository};
use crate::storage::{SharedStore, StoreError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use std::collections::VecDeque;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

// endregion: --- Imports

const DEFAULT_FEED_CAPACITY: usize = 256;
const DEFAULT_EVENT_LOG_CAPACITY: usize = 100;
const MIN_SYNC_PERIOD: Duration = Duration::from_millis(1);

// region:    --- Change Feed
/// 마켓 이벤트 발행 채널
/// 구독자가 뒤처지면 오래된 이벤트는 버려진다.
#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<MarketEvent>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// 이벤트 발행
    pub fn publish(&self, event: MarketEvent) {
        let event_type = event.event_type();
        match self.sender.send(event) {
            Ok(receivers) => debug!(
                "{:<12} --> 이벤트 발행: {} (구독자 {})",
                "Feed", event_type, receivers
            ),
            Err(_) => debug!("{:<12} --> 구독자 없음: {}", "Feed", event_type),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
        self.sender.subscribe()
    }
}

// endregion: --- Change Feed

// region:    --- Event Consumer
/// 최근 마켓 이벤트 기록 (오래된 것부터 버린다)
#[derive(Clone)]
pub struct EventLog {
    entries: Arc<RwLock<VecDeque<MarketEvent>>>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_LOG_CAPACITY)
    }
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }

    pub async fn record(&self, event: MarketEvent) {
        let mut entries = self.entries.write().await;
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(event);
    }

    /// 기록된 순서대로
    pub async fn recent(&self) -> Vec<MarketEvent> {
        self.entries.read().await.iter().cloned().collect()
    }
}

/// 변경 피드 소비자
/// 발행된 이벤트를 로그로 남기고 EventLog 에 기록한다.
pub struct EventConsumer {
    receiver: broadcast::Receiver<MarketEvent>,
    log: EventLog,
}

impl EventConsumer {
    /// 생성 시점부터 구독하므로 이후 발행되는 이벤트는 놓치지 않는다
    pub fn new(feed: &ChangeFeed, log: EventLog) -> Self {
        Self {
            receiver: feed.subscribe(),
            log,
        }
    }

    /// 이벤트 소비 시작 (피드가 닫히면 종료)
    pub async fn start(mut self) {
        info!("{:<12} --> 이벤트 소비 시작", "EventConsume");
        loop {
            match self.receiver.recv().await {
                Ok(event) => self.process_event(event).await,
                Err(RecvError::Lagged(skipped)) => warn!(
                    "{:<12} --> 소비 지연으로 이벤트 {}건 유실",
                    "EventConsume", skipped
                ),
                Err(RecvError::Closed) => break,
            }
        }
        info!("{:<12} --> 이벤트 소비 종료", "EventConsume");
    }

    async fn process_event(&self, event: MarketEvent) {
        match &event {
            MarketEvent::CheckedOut {
                consumer_email,
                order_ids,
                ..
            } => info!(
                "{:<12} --> 체크아웃(CheckedOut): {} 주문 {}건",
                "EventConsume",
                consumer_email,
                order_ids.len()
            ),
            MarketEvent::BookingDecided {
                booking_id, status, ..
            } => info!(
                "{:<12} --> 예약 결정(BookingDecided): {} -> {}",
                "EventConsume", booking_id, status
            ),
            MarketEvent::OrderCompleted { order_id, .. } => info!(
                "{:<12} --> 주문 완료(OrderCompleted): {}",
                "EventConsume", order_id
            ),
        }
        self.log.record(event).await;
    }
}

// endregion: --- Event Consumer

// region:    --- Sync Snapshot
/// 동기화 스냅샷
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSnapshot {
    pub revision: u64,
    pub orders: Vec<Order>,
    pub bookings: Vec<Booking>,
    pub pending_bookings: usize,
    pub refreshed_at: Option<DateTime<Utc>>,
}

// endregion: --- Sync Snapshot

// region:    --- Sync Loop
/// 원장 동기화 루프
pub struct SyncLoop {
    orders: OrderRepository,
    bookings: BookingRepository,
    period: Duration,
    sender: watch::Sender<SyncSnapshot>,
}

impl SyncLoop {
    /// 주기가 0 이면 최소 주기(1ms)로 올린다
    pub fn new(store: SharedStore, period: Duration) -> Self {
        let period = if period < MIN_SYNC_PERIOD {
            warn!(
                "{:<12} --> 동기화 주기가 너무 짧음: {:?}, {:?} 사용",
                "Sync", period, MIN_SYNC_PERIOD
            );
            MIN_SYNC_PERIOD
        } else {
            period
        };
        let (sender, _) = watch::channel(SyncSnapshot::default());
        Self {
            orders: OrderRepository::new(Arc::clone(&store)),
            bookings: BookingRepository::new(store),
            period,
            sender,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncSnapshot> {
        self.sender.subscribe()
    }

    /// 원장을 한 번 다시 읽어 변경이 있으면 스냅샷 발행
    /// 발행했으면 true
    pub async fn refresh(&self) -> Result<bool, StoreError> {
        let orders = self.orders.list().await?;
        let bookings = self.bookings.list().await?;

        let published = self.sender.send_if_modified(|snapshot| {
            if snapshot.refreshed_at.is_some()
                && snapshot.orders == orders
                && snapshot.bookings == bookings
            {
                return false;
            }
            snapshot.revision += 1;
            snapshot.pending_bookings = pending_count(&bookings);
            snapshot.orders = orders;
            snapshot.bookings = bookings;
            snapshot.refreshed_at = Some(Utc::now());
            true
        });

        if published {
            debug!(
                "{:<12} --> 스냅샷 갱신: revision={}",
                "Sync",
                self.sender.borrow().revision
            );
        }
        Ok(published)
    }

    /// 동기화 루프 시작
    pub fn start(self) -> SyncHandle {
        let receiver = self.subscribe();
        info!(
            "{:<12} --> 동기화 루프 시작: {}ms 주기",
            "Sync",
            self.period.as_millis()
        );
        let task = tokio::spawn(async move {
            let mut interval = interval(self.period);
            loop {
                interval.tick().await;
                if let Err(e) = self.refresh().await {
                    error!("{:<12} --> 원장 동기화 중 오류 발생: {:?}", "Sync", e);
                }
            }
        });
        SyncHandle { task, receiver }
    }
}

/// 실행 중인 동기화 루프 핸들
/// 중지하거나 drop 하면 루프가 멈춘다.
pub struct SyncHandle {
    task: JoinHandle<()>,
    receiver: watch::Receiver<SyncSnapshot>,
}

impl SyncHandle {
    pub fn subscribe(&self) -> watch::Receiver<SyncSnapshot> {
        self.receiver.clone()
    }

    pub fn latest(&self) -> SyncSnapshot {
        self.receiver.borrow().clone()
    }

    pub fn stop(self) {
        info!("{:<12} --> 동기화 루프 중지", "Sync");
        self.task.abort();
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// endregion: --- Sync Loop

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::BookingStatus;
    use crate::catalog::model::demo_items;
    use crate::session::{Role, Session};
    use crate::storage::InMemoryStore;

    fn consumer() -> Session {
        Session::new("consumer@test.com", "Jung", Role::Consumer)
    }

    #[tokio::test]
    async fn test_refresh_publishes_only_on_change() {
        let store: SharedStore = Arc::new(InMemoryStore::new());
        let sync = SyncLoop::new(Arc::clone(&store), Duration::from_secs(1));
        let receiver = sync.subscribe();

        // 첫 폴링은 빈 원장이어도 발행
        assert!(sync.refresh().await.unwrap());
        assert!(!sync.refresh().await.unwrap());
        assert_eq!(receiver.borrow().revision, 1);

        let bookings = BookingRepository::new(Arc::clone(&store));
        bookings
            .create(&demo_items()[..2], &consumer())
            .await
            .unwrap();

        assert!(sync.refresh().await.unwrap());
        let snapshot = receiver.borrow().clone();
        assert_eq!(snapshot.revision, 2);
        assert_eq!(snapshot.bookings.len(), 2);
        assert_eq!(snapshot.pending_bookings, 2);
    }

    #[tokio::test]
    async fn test_refresh_drops_intermediate_states() {
        let store: SharedStore = Arc::new(InMemoryStore::new());
        let sync = SyncLoop::new(Arc::clone(&store), Duration::from_secs(1));
        let receiver = sync.subscribe();
        sync.refresh().await.unwrap();

        let bookings = BookingRepository::new(Arc::clone(&store));
        let created = bookings
            .create(&demo_items()[..1], &consumer())
            .await
            .unwrap();
        bookings
            .set_status(&created[0].id, BookingStatus::Accepted)
            .await
            .unwrap();

        // pending 상태는 관찰되지 않고 마지막 상태만 보인다
        sync.refresh().await.unwrap();
        let snapshot = receiver.borrow().clone();
        assert_eq!(snapshot.revision, 2);
        assert_eq!(snapshot.bookings[0].status, BookingStatus::Accepted);
        assert_eq!(snapshot.pending_bookings, 0);
    }

    #[tokio::test]
    async fn test_running_loop_observes_external_write() {
        let store: SharedStore = Arc::new(InMemoryStore::new());
        let handle = SyncLoop::new(Arc::clone(&store), Duration::from_millis(20)).start();
        let mut receiver = handle.subscribe();

        let orders = OrderRepository::new(Arc::clone(&store));
        orders.create(&demo_items()[..1]).await.unwrap();

        let observed = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if receiver.borrow_and_update().orders.len() == 1 {
                    return;
                }
                receiver.changed().await.unwrap();
            }
        })
        .await;
        assert!(observed.is_ok());
        assert_eq!(handle.latest().orders.len(), 1);
        handle.stop();
    }

    #[tokio::test]
    async fn test_zero_period_is_clamped() {
        let store: SharedStore = Arc::new(InMemoryStore::new());
        let handle = SyncLoop::new(Arc::clone(&store), Duration::ZERO).start();
        let mut receiver = handle.subscribe();

        OrderRepository::new(Arc::clone(&store))
            .create(&demo_items()[..2])
            .await
            .unwrap();

        // 루프 태스크가 살아서 스냅샷을 계속 발행한다
        let observed = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if receiver.borrow_and_update().orders.len() == 2 {
                    return;
                }
                receiver.changed().await.unwrap();
            }
        })
        .await;
        assert!(observed.is_ok());
        handle.stop();
    }

    #[tokio::test]
    async fn test_consumer_records_published_events() {
        let feed = ChangeFeed::default();
        let log = EventLog::new(2);
        let consumer = EventConsumer::new(&feed, log.clone());
        let task = tokio::spawn(consumer.start());

        for order_id in ["order-1", "order-2", "order-3"] {
            feed.publish(MarketEvent::OrderCompleted {
                order_id: order_id.to_string(),
                timestamp: Utc::now(),
            });
        }

        let recorded = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let events = log.recent().await;
                if let Some(MarketEvent::OrderCompleted { order_id, .. }) = events.last() {
                    if order_id == "order-3" {
                        return events;
                    }
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        // 용량을 넘으면 가장 오래된 이벤트부터 버린다
        assert_eq!(recorded.len(), 2);
        match &recorded[0] {
            MarketEvent::OrderCompleted { order_id, .. } => assert_eq!(order_id, "order-2"),
            other => panic!("unexpected event: {:?}", other),
        }

        // 피드가 닫히면 소비자도 끝난다
        drop(feed);
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_feed_delivers_events_to_subscribers() {
        let feed = ChangeFeed::default();
        // 구독자 없이 발행해도 실패하지 않는다
        feed.publish(MarketEvent::OrderCompleted {
            order_id: "order-0".to_string(),
            timestamp: Utc::now(),
        });

        let mut receiver = feed.subscribe();
        feed.publish(MarketEvent::OrderCompleted {
            order_id: "order-1".to_string(),
            timestamp: Utc::now(),
        });
        match receiver.recv().await.unwrap() {
            MarketEvent::OrderCompleted { order_id, .. } => assert_eq!(order_id, "order-1"),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
// endregion: --- Tests
