#![allow(dead_code)]

pub mod racing;

use chrono::Utc;

use spectr_auth::Actor;
use spectr_cart::CartItem;
use spectr_core::{Money, ProductId, UserId};
use spectr_engine::CheckoutEngine;
use spectr_infra::{CommerceStore, InMemoryStore};
use spectr_inventory::Product;
use spectr_stats::AppStats;

use racing::{RacingStore, Rival};

/// An engine over a fresh in-memory store, plus seeding helpers that play the
/// role of the external catalog and cart collaborators.
#[derive(Clone)]
pub struct TestShop {
    pub engine: CheckoutEngine<InMemoryStore>,
    pub store: InMemoryStore,
}

impl TestShop {
    pub fn new() -> Self {
        spectr_observability::init_for_tests();
        let store = InMemoryStore::new();
        Self {
            engine: CheckoutEngine::new(store.clone()),
            store,
        }
    }

    /// An engine over the same data whose store lets `rival` win one race.
    pub fn racing(&self, rival: Option<Rival>) -> (CheckoutEngine<RacingStore>, RacingStore) {
        let store = RacingStore::new(self.store.clone(), rival);
        (CheckoutEngine::new(store.clone()), store)
    }

    pub async fn product(&self, price_minor: i64, stock: i64) -> ProductId {
        let product = Product::new(
            ProductId::new(),
            "Widget",
            Money::from_minor(price_minor),
            stock,
            Utc::now(),
        )
        .unwrap();
        let mut tx = self.store.begin().await.unwrap();
        tx.insert_product(&product).await.unwrap();
        tx.commit().await.unwrap();
        product.id
    }

    /// Put a line in the user's cart at an explicit unit price.
    pub async fn add_to_cart(&self, user: UserId, product_id: ProductId, quantity: i64, unit_price_minor: i64) {
        let item = CartItem::new(
            user,
            product_id,
            quantity,
            Money::from_minor(unit_price_minor),
            Utc::now(),
        )
        .unwrap();
        let mut tx = self.store.begin().await.unwrap();
        tx.upsert_cart_item(&item).await.unwrap();
        tx.commit().await.unwrap();
    }

    pub async fn stock(&self, product_id: ProductId) -> i64 {
        let mut tx = self.store.begin().await.unwrap();
        let product = tx.product(product_id).await.unwrap().unwrap();
        tx.rollback().await.unwrap();
        product.stock_quantity
    }

    pub async fn cart_len(&self, user: UserId) -> usize {
        let mut tx = self.store.begin().await.unwrap();
        let items = tx.cart_items(user).await.unwrap();
        tx.rollback().await.unwrap();
        items.len()
    }

    pub async fn stats(&self) -> AppStats {
        self.engine.stats_aggregator().snapshot().await.unwrap()
    }
}

pub fn test_user() -> Actor {
    Actor::user(UserId::new())
}

pub fn test_admin() -> Actor {
    Actor::admin(UserId::new())
}
