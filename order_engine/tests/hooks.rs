use std::{
    sync::{
        atomic::{AtomicI32, Ordering},
        Arc,
        Mutex,
    },
    time::Duration,
};

use log::*;
use order_engine::{
    db_types::{OrderStatusType, PaymentMethod},
    events::{EventHandlers, EventHooks, DEFAULT_EVENT_BUFFER_SIZE},
    test_utils::{
        prepare_env::tear_down,
        stub_provider::{StubNotification, StubProvider},
    },
    OrderFlowApi,
    PaymentFlowApi,
    VerifiedCallback,
};

mod support;
use support::{seed_user, seed_variant, setup, shipping};

#[derive(Default, Clone)]
struct HookCalled {
    called: Arc<AtomicI32>,
}

impl HookCalled {
    pub fn called(&self) {
        let _ = self.called.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> i32 {
        self.called.load(Ordering::SeqCst)
    }
}

async fn wait_for(hook: &HookCalled, expected: i32) {
    for _ in 0..50 {
        if hook.count() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn order_lifecycle_hooks_fire() {
    let created = HookCalled::default();
    let annulled = HookCalled::default();
    let changed = HookCalled::default();
    let transitions = Arc::new(Mutex::new(Vec::new()));

    let mut hooks = EventHooks::default();
    let c = created.clone();
    hooks.on_order_created(move |ev| {
        info!("🚀️ Order created hook: #{}", ev.order.order.id);
        c.called();
        Box::pin(async {})
    });
    let a = annulled.clone();
    hooks.on_order_annulled(move |ev| {
        assert_eq!(ev.order.status, OrderStatusType::Cancelled);
        a.called();
        Box::pin(async {})
    });
    let s = changed.clone();
    let log = Arc::clone(&transitions);
    hooks.on_order_status_changed(move |ev| {
        if let Ok(mut log) = log.lock() {
            log.push((ev.old_status, ev.order.status));
        }
        s.called();
        Box::pin(async {})
    });
    let handlers = EventHandlers::new(DEFAULT_EVENT_BUFFER_SIZE, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;

    let db = setup().await;
    let user = seed_user(&db, "alice").await;
    let v = seed_variant(&db, "MUG", 90_000, 10).await;
    let api = OrderFlowApi::new(db.clone(), producers);

    let first = api.buy_now(user.id, v.id, 1, shipping()).await.unwrap();
    let second = api.buy_now(user.id, v.id, 1, shipping()).await.unwrap();
    wait_for(&created, 2).await;
    assert_eq!(created.count(), 2);

    api.update_order_status(first.order.id, OrderStatusType::Confirmed).await.unwrap();
    api.cancel_order(second.order.id).await.unwrap();
    wait_for(&annulled, 1).await;
    wait_for(&changed, 2).await;
    assert_eq!(annulled.count(), 1);
    assert_eq!(changed.count(), 2);
    let mut seen = transitions.lock().unwrap().clone();
    seen.sort_by_key(|(_, to)| to.to_string());
    assert_eq!(seen, vec![
        (OrderStatusType::Pending, OrderStatusType::Cancelled),
        (OrderStatusType::Pending, OrderStatusType::Confirmed),
    ]);

    // Failed operations do not fire hooks
    assert!(api.update_order_status(second.order.id, OrderStatusType::Confirmed).await.is_err());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(changed.count(), 2);
    tear_down(db).await;
}

#[tokio::test]
async fn order_paid_hook_fires_once() {
    let paid = HookCalled::default();
    let mut hooks = EventHooks::default();
    let p = paid.clone();
    hooks.on_order_paid(move |ev| {
        assert_eq!(ev.order.status, OrderStatusType::Paid);
        assert_eq!(ev.payment.order_id, ev.order.id);
        p.called();
        Box::pin(async {})
    });
    let handlers = EventHandlers::new(DEFAULT_EVENT_BUFFER_SIZE, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;

    let db = setup().await;
    let user = seed_user(&db, "bob").await;
    let v = seed_variant(&db, "CAP", 150_000, 3).await;
    let orders = OrderFlowApi::new(db.clone(), producers.clone());
    let payments = PaymentFlowApi::new(db.clone(), StubProvider::default(), producers);
    let order = orders.buy_now(user.id, v.id, 1, shipping()).await.unwrap().order;
    let created = payments.create_payment(order.id, order.total_amount, PaymentMethod::ExternalWallet).await.unwrap();
    let notification = StubNotification::genuine(VerifiedCallback {
        txid: created.txid().to_string(),
        amount: order.total_amount,
        result_code: 0,
        provider_ref: Some("2024080100001".to_string()),
        message: Some("Successful.".to_string()),
    });
    payments.handle_payment_callback(&notification).await.unwrap();
    payments.handle_payment_callback(&notification).await.unwrap();
    wait_for(&paid, 1).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(paid.count(), 1);
    tear_down(db).await;
}
