//! Optimistic meal-completion coordinator
//!
//! [`Dashboard`] owns today's meals and the consumed-nutrition aggregate.
//! A toggle is applied and published synchronously; the backend
//! confirmation runs on a spawned task and only ever undoes the change made
//! by its own toggle.
//!
//! Each toggle bumps a per-entry revision. A failed confirmation restores
//! the entry only while that revision is still current, then hands the
//! entry back the revision it had before. Later toggles on the same or
//! other entries are therefore never clobbered by an earlier failure.

use auth::interceptor::{guard, require_token};
use auth::{PreferencesUpdate, SessionManager, TokenSource, UserProfile};
use common::{BearerToken, ClientError, ClientResult};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api::MealPlanApi;
use crate::models::GroceryList;
use crate::state::{DashboardState, Notice};

/// How a toggle ended
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    /// No entry with that id, or the outcome arrived after a reload or
    /// close and was dropped
    Ignored,
    /// The backend saved the new value
    Confirmed,
    /// Rolled back; the session was cleared and the user must log in again
    ReauthRequired,
    /// Rolled back; the session is intact and the toggle can be retried
    Retryable(ClientError),
}

impl ToggleOutcome {
    pub fn is_rolled_back(&self) -> bool {
        matches!(
            self,
            ToggleOutcome::ReauthRequired | ToggleOutcome::Retryable(_)
        )
    }
}

enum Pending {
    Ready(Option<ToggleOutcome>),
    Spawned(JoinHandle<ToggleOutcome>),
}

/// Handle on an in-flight confirmation
///
/// Awaiting it yields the [`ToggleOutcome`]; dropping it leaves the
/// confirmation running in the background.
pub struct PendingToggle {
    inner: Pending,
}

impl PendingToggle {
    fn ready(outcome: ToggleOutcome) -> Self {
        Self {
            inner: Pending::Ready(Some(outcome)),
        }
    }

    /// True once the outcome is known and awaiting will not block
    pub fn is_finished(&self) -> bool {
        match &self.inner {
            Pending::Ready(_) => true,
            Pending::Spawned(handle) => handle.is_finished(),
        }
    }
}

impl Future for PendingToggle {
    type Output = ToggleOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<ToggleOutcome> {
        match &mut self.get_mut().inner {
            Pending::Ready(outcome) => {
                Poll::Ready(outcome.take().unwrap_or(ToggleOutcome::Ignored))
            }
            Pending::Spawned(handle) => Pin::new(handle).poll(cx).map(|joined| {
                joined.unwrap_or_else(|e| {
                    error!("Confirmation task failed: {}", e);
                    ToggleOutcome::Retryable(ClientError::Network(e.to_string()))
                })
            }),
        }
    }
}

/// What a toggle needs to undo itself
struct Ticket {
    entry_id: String,
    previous: bool,
    completed: bool,
    revision: u64,
    prior_revision: Option<u64>,
    epoch: u64,
}

#[derive(Default)]
struct Book {
    epoch: u64,
    next_revision: u64,
    revisions: HashMap<String, u64>,
    closed: bool,
}

struct Inner {
    api: Arc<dyn MealPlanApi>,
    tokens: Arc<dyn TokenSource>,
    book: Mutex<Book>,
    state: watch::Sender<DashboardState>,
}

/// Today's meals with optimistic completion toggling
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<Inner>,
}

impl Dashboard {
    /// Create an empty dashboard; call [`Dashboard::load_today`] to seed it
    pub fn new(api: Arc<dyn MealPlanApi>, tokens: Arc<dyn TokenSource>) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        Self {
            inner: Arc::new(Inner {
                api,
                tokens,
                book: Mutex::new(Book::default()),
                state,
            }),
        }
    }

    /// Receiver notified on every published change
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.inner.state.subscribe()
    }

    /// Current published state
    pub fn snapshot(&self) -> DashboardState {
        self.inner.state.borrow().clone()
    }

    /// Fetch today's plan and replace the published state
    ///
    /// Confirmations still in flight from before the fetch are ignored
    /// when they resolve.
    pub async fn load_today(&self) -> ClientResult<()> {
        let plan = self
            .inner
            .authed(|api, token| async move { api.today(&token).await })
            .await?;

        let mut book = self.inner.book.lock();
        if book.closed {
            return Ok(());
        }
        book.epoch += 1;
        book.revisions.clear();

        let state = DashboardState::from_plan(plan);
        info!(
            "Loaded {} meals ({} completed)",
            state.entries.len(),
            state.completed_count()
        );
        self.inner.state.send_replace(state);
        Ok(())
    }

    /// Same as [`Dashboard::load_today`]
    pub async fn reload(&self) -> ClientResult<()> {
        self.load_today().await
    }

    /// Flip an entry's completion flag and confirm it with the backend
    ///
    /// The new flag and the recomputed aggregate are published before this
    /// returns. Must be called from within a Tokio runtime.
    pub fn toggle_completion(&self, entry_id: &str) -> PendingToggle {
        let mut book = self.inner.book.lock();
        if book.closed {
            return PendingToggle::ready(ToggleOutcome::Ignored);
        }

        let mut flipped = None;
        self.inner.state.send_if_modified(|state| {
            let Some(entry) = state.entries.iter_mut().find(|e| e.id == entry_id) else {
                return false;
            };
            let previous = entry.is_completed;
            entry.is_completed = !previous;
            state.notice = None;
            state.recompute();
            flipped = Some(previous);
            true
        });

        let Some(previous) = flipped else {
            debug!("Toggle ignored, no meal with id {}", entry_id);
            return PendingToggle::ready(ToggleOutcome::Ignored);
        };

        book.next_revision += 1;
        let revision = book.next_revision;
        let prior_revision = book.revisions.insert(entry_id.to_string(), revision);
        let ticket = Ticket {
            entry_id: entry_id.to_string(),
            previous,
            completed: !previous,
            revision,
            prior_revision,
            epoch: book.epoch,
        };
        drop(book);

        debug!(
            "Meal {} marked {} optimistically",
            ticket.entry_id,
            if ticket.completed { "complete" } else { "incomplete" }
        );

        let inner = self.inner.clone();
        PendingToggle {
            inner: Pending::Spawned(tokio::spawn(async move { inner.confirm(ticket).await })),
        }
    }

    /// Clear the published notice
    pub fn dismiss_notice(&self) {
        self.inner.state.send_if_modified(|state| state.notice.take().is_some());
    }

    /// Detach the dashboard; late confirmations no longer touch its state
    pub fn close(&self) {
        self.inner.book.lock().closed = true;
        debug!("Dashboard closed");
    }

    /// `GET /meal-plans/today/grocery`
    pub async fn grocery_list(&self) -> ClientResult<GroceryList> {
        self.inner
            .authed(|api, token| async move { api.grocery_list(&token).await })
            .await
    }

    /// `POST /meal-plans/insights`
    pub async fn insights(&self, request: &Value) -> ClientResult<Value> {
        self.inner
            .authed(|api, token| async move { api.insights(&token, request).await })
            .await
    }

    /// Ask the planning agent for a new plan, then show it
    pub async fn generate_from_agent(&self, request: &Value) -> ClientResult<Value> {
        let generated = self
            .inner
            .authed(|api, token| async move { api.generate_from_agent(&token, request).await })
            .await?;
        self.reload().await?;
        Ok(generated)
    }

    /// Save preferences, then refetch the plan once the backend confirmed them
    pub async fn update_preferences(
        &self,
        session: &SessionManager,
        update: &PreferencesUpdate,
    ) -> ClientResult<UserProfile> {
        let user = session.update_preferences(update).await?;
        self.reload().await?;
        Ok(user)
    }
}

impl Inner {
    async fn authed<'a, T, F, Fut>(&'a self, call: F) -> ClientResult<T>
    where
        F: FnOnce(&'a dyn MealPlanApi, BearerToken) -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let result = match require_token(self.tokens.as_ref()) {
            Ok(token) => call(self.api.as_ref(), token).await,
            Err(e) => Err(e),
        };
        guard(self.tokens.as_ref(), result)
    }

    async fn confirm(&self, ticket: Ticket) -> ToggleOutcome {
        let entry_id = ticket.entry_id.clone();
        let completed = ticket.completed;
        let result = self
            .authed(|api, token| async move {
                api.set_completion(&token, &entry_id, completed).await
            })
            .await;

        match result {
            Ok(()) => {
                debug!("Meal {} completion confirmed", ticket.entry_id);
                ToggleOutcome::Confirmed
            }
            Err(err) => {
                warn!(
                    "Failed to save completion for meal {}: {}",
                    ticket.entry_id, err
                );
                if !self.roll_back(&ticket, &err) {
                    return ToggleOutcome::Ignored;
                }
                if err.is_auth_failure() {
                    ToggleOutcome::ReauthRequired
                } else {
                    ToggleOutcome::Retryable(err)
                }
            }
        }
    }

    /// Undo the ticket's change if it still owns the entry and show the
    /// notice; `false` when the state it applied to is gone
    fn roll_back(&self, ticket: &Ticket, err: &ClientError) -> bool {
        let mut book = self.book.lock();
        if book.closed || book.epoch != ticket.epoch {
            debug!("Skipping rollback for meal {}, state is stale", ticket.entry_id);
            return false;
        }

        let current = book.revisions.get(&ticket.entry_id).copied();
        let owns_entry = current == Some(ticket.revision);
        if owns_entry {
            match ticket.prior_revision {
                Some(prior) => book.revisions.insert(ticket.entry_id.clone(), prior),
                None => book.revisions.remove(&ticket.entry_id),
            };
        }

        self.state.send_modify(|state| {
            if owns_entry {
                if let Some(entry) = state.entries.iter_mut().find(|e| e.id == ticket.entry_id) {
                    entry.is_completed = ticket.previous;
                }
                state.recompute();
            }
            state.notice = Some(Notice::for_error(err));
        });

        if owns_entry {
            info!("Rolled back meal {}", ticket.entry_id);
        } else {
            debug!(
                "Meal {} was toggled again since, keeping the newer value",
                ticket.entry_id
            );
        }
        true
    }
}
