//! Property tests for the consumed-nutrition aggregate
//!
//! Any sequence of toggles, confirmed or failed in any order, must leave
//! `consumed` equal to the sum over completed entries at every step.

use async_trait::async_trait;
use auth::TokenSource;
use common::{BearerToken, ClientError, ClientResult};
use dashboard::models::{GroceryList, MealCategory, MealEntry, MealPlan, Nutrition, TodayPlan};
use dashboard::state::consumed_totals;
use dashboard::{Dashboard, DashboardState, MealPlanApi, PendingToggle};
use parking_lot::Mutex;
use proptest::prelude::*;
use proptest::sample::Index;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::oneshot;

const MEAL_IDS: [&str; 3] = ["breakfast", "lunch", "dinner"];

fn plan() -> TodayPlan {
    let meals = MEAL_IDS
        .iter()
        .zip([(320.0, 12.0), (610.0, 35.0), (540.0, 28.0)])
        .map(|(id, (calories, protein))| MealEntry {
            id: id.to_string(),
            title: id.to_string(),
            category: MealCategory::Other,
            nutrition: Nutrition::new(calories, protein, calories / 10.0, protein / 2.0),
            is_completed: false,
        })
        .collect();
    TodayPlan {
        meal_plan: MealPlan { meals },
        week_info: None,
    }
}

/// Backend double queueing every completion request in arrival order
#[derive(Default)]
struct QueuedBackend {
    parked: Mutex<Vec<oneshot::Sender<ClientResult<()>>>>,
}

#[async_trait]
impl MealPlanApi for QueuedBackend {
    async fn today(&self, _: &BearerToken) -> ClientResult<TodayPlan> {
        Ok(plan())
    }

    async fn set_completion(&self, _: &BearerToken, _: &str, _: bool) -> ClientResult<()> {
        let (tx, rx) = oneshot::channel();
        self.parked.lock().push(tx);
        rx.await
            .unwrap_or_else(|_| Err(ClientError::Network("dropped".into())))
    }

    async fn grocery_list(&self, _: &BearerToken) -> ClientResult<GroceryList> {
        Ok(GroceryList::default())
    }

    async fn insights(&self, _: &BearerToken, _: &Value) -> ClientResult<Value> {
        Ok(Value::Null)
    }

    async fn generate_from_agent(&self, _: &BearerToken, _: &Value) -> ClientResult<Value> {
        Ok(Value::Null)
    }
}

struct SignedIn;

impl TokenSource for SignedIn {
    fn valid_token(&self) -> Option<BearerToken> {
        Some(BearerToken::new("header.payload.signature"))
    }

    fn invalidate(&self) {}
}

fn assert_aggregate(state: &DashboardState) {
    assert_eq!(state.consumed, consumed_totals(&state.entries));
}

fn finished(pending: &[PendingToggle]) -> usize {
    pending.iter().filter(|p| p.is_finished()).count()
}

async fn run(toggles: Vec<usize>, failures: Vec<bool>, order: Vec<Index>) {
    let backend = Arc::new(QueuedBackend::default());
    let dashboard = Dashboard::new(backend.clone(), Arc::new(SignedIn));
    dashboard.load_today().await.expect("plan loads");
    let mut updates = dashboard.subscribe();

    let mut pending = Vec::new();
    for &meal in &toggles {
        pending.push(dashboard.toggle_completion(MEAL_IDS[meal]));
        assert!(updates.has_changed().expect("sender alive"));
        assert_aggregate(&updates.borrow_and_update());
    }

    while backend.parked.lock().len() < toggles.len() {
        tokio::task::yield_now().await;
    }

    for step in 0..toggles.len() {
        let sender = {
            let mut parked = backend.parked.lock();
            let at = order[step].index(parked.len());
            parked.remove(at)
        };
        let result = if failures[step] {
            Err(ClientError::Network("connection reset".into()))
        } else {
            Ok(())
        };
        sender.send(result).expect("request still waiting");

        while finished(&pending) < step + 1 {
            tokio::task::yield_now().await;
        }
        assert_aggregate(&updates.borrow_and_update());
    }

    let state = dashboard.snapshot();
    assert_aggregate(&state);
    if failures[..toggles.len()].iter().all(|failed| !failed) {
        for (index, id) in MEAL_IDS.iter().enumerate() {
            let flips = toggles.iter().filter(|&&meal| meal == index).count();
            assert_eq!(state.entry(id).expect("entry").is_completed, flips % 2 == 1);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_aggregate_matches_entries_after_every_step(
        toggles in prop::collection::vec(0usize..MEAL_IDS.len(), 1..12),
        failures in prop::collection::vec(any::<bool>(), 12),
        order in prop::collection::vec(any::<Index>(), 12),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime builds");
        runtime.block_on(run(toggles, failures, order));
    }
}
