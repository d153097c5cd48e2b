mod common;

use proptest::prelude::*;
use tokio::task::JoinSet;

use spectr_engine::{ConfirmOutcome, EngineError};

use common::{test_user, TestShop};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_checkouts_never_oversell() {
    let shop = TestShop::new();
    let initial_stock = 10;
    let product = shop.product(10, initial_stock).await;

    let mut buyers = Vec::new();
    for i in 0..24 {
        let buyer = test_user();
        let quantity = i % 3 + 1;
        shop.add_to_cart(buyer.user_id, product, quantity, 10).await;
        buyers.push(buyer);
    }

    let mut tasks = JoinSet::new();
    for buyer in buyers {
        let shop = shop.clone();
        tasks.spawn(async move { shop.engine.place_order(&buyer, "addr").await });
    }

    let mut reserved = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap() {
            Ok(order) => reserved += order.items.iter().map(|i| i.quantity).sum::<i64>(),
            Err(EngineError::InsufficientStock { product_id }) => assert_eq!(product_id, product),
            Err(other) => panic!("Expected success or InsufficientStock, got {other:?}"),
        }
    }

    let remaining = shop.stock(product).await;
    assert!(remaining >= 0);
    assert!(reserved <= initial_stock);
    assert_eq!(remaining, initial_stock - reserved);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_confirms_record_one_sale() {
    let shop = TestShop::new();
    let user = test_user();
    let product = shop.product(25, 10).await;
    shop.add_to_cart(user.user_id, product, 2, 25).await;
    let order = shop.engine.place_order(&user, "addr").await.unwrap();
    let payment = shop.engine.create_payment(&user, order.id).await.unwrap();

    let mut tasks = JoinSet::new();
    for _ in 0..8 {
        let shop = shop.clone();
        tasks.spawn(async move { shop.engine.confirm_payment(&user, payment.id).await });
    }

    let mut completed = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap().unwrap() {
            ConfirmOutcome::Completed { .. } => completed += 1,
            ConfirmOutcome::AlreadyCompleted => {}
        }
    }

    assert_eq!(completed, 1);
    let stats = shop.stats().await;
    assert_eq!(stats.total_sales, 1);
    assert_eq!(stats.total_revenue, order.total_amount);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_cancels_restock_once() {
    let shop = TestShop::new();
    let user = test_user();
    let product = shop.product(10, 10).await;
    shop.add_to_cart(user.user_id, product, 4, 10).await;
    let order = shop.engine.place_order(&user, "addr").await.unwrap();

    let mut tasks = JoinSet::new();
    for _ in 0..6 {
        let shop = shop.clone();
        tasks.spawn(async move { shop.engine.cancel_order(&user, order.id).await });
    }

    let mut cancelled = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap() {
            Ok(_) => cancelled += 1,
            Err(EngineError::NotPending { .. }) => {}
            Err(other) => panic!("Expected NotPending, got {other:?}"),
        }
    }

    assert_eq!(cancelled, 1);
    assert_eq!(shop.stock(product).await, 10);
}

mod proptest_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig { cases: 32, ..ProptestConfig::default() })]

        #[test]
        fn sequential_checkouts_conserve_stock(
            initial_stock in 0i64..30,
            quantities in proptest::collection::vec(1i64..6, 1..12),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let (reserved, remaining) = rt.block_on(async {
                let shop = TestShop::new();
                let product = shop.product(3, initial_stock).await;
                let mut reserved = 0;
                for quantity in &quantities {
                    let buyer = test_user();
                    shop.add_to_cart(buyer.user_id, product, *quantity, 3).await;
                    if shop.engine.place_order(&buyer, "addr").await.is_ok() {
                        reserved += quantity;
                    }
                }
                (reserved, shop.stock(product).await)
            });

            prop_assert!(remaining >= 0);
            prop_assert!(reserved <= initial_stock);
            prop_assert_eq!(remaining, initial_stock - reserved);
        }
    }
}
