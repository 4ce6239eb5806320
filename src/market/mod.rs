pub mod commands;
pub mod events;

// region:    --- Imports
use crate::booking::BookingRepository;
use crate::catalog::ItemRepository;
use crate::order::OrderRepository;
use crate::selection::SelectionList;
use crate::session::SessionStore;
use crate::storage::SharedStore;
use crate::sync::ChangeFeed;
use std::sync::Arc;

// endregion: --- Imports

// region:    --- Repositories
/// 하나의 저장소를 공유하는 저장소 묶음
#[derive(Clone)]
pub struct Repositories {
    pub catalog: ItemRepository,
    pub cart: SelectionList,
    pub wishlist: SelectionList,
    pub bookings: BookingRepository,
    pub orders: OrderRepository,
    pub sessions: SessionStore,
    pub feed: ChangeFeed,
}

impl Repositories {
    pub fn new(store: SharedStore) -> Self {
        Self::with_feed(store, ChangeFeed::default())
    }

    pub fn with_feed(store: SharedStore, feed: ChangeFeed) -> Self {
        Self {
            catalog: ItemRepository::new(Arc::clone(&store)),
            cart: SelectionList::cart(Arc::clone(&store)),
            wishlist: SelectionList::wishlist(Arc::clone(&store)),
            bookings: BookingRepository::new(Arc::clone(&store)),
            orders: OrderRepository::new(Arc::clone(&store)),
            sessions: SessionStore::new(store),
            feed,
        }
    }
}

// endregion: --- Repositories
