// ── Reactive store infrastructure ──
//
// Each store keeps one immutable-snapshot `watch` channel. Actions go
// through `StateCell::begin`, which bumps an in-flight counter and
// projects it onto the snapshot's `loading` flag; the returned guard
// releases the slot on drop, so a cancelled action never leaves the
// store stuck in `loading`.
//
// Fetches that fill a slot (a list, a detail) take a ticket from the
// `Sequencer`. A response is applied only while its ticket is the
// latest one issued for that slot.

mod applications;
mod coworkings;

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;

use crate::error::StoreError;
use crate::stream::StateStream;

pub use applications::{ApplicationsState, ApplicationsStore};
pub use coworkings::{CoworkingsState, CoworkingsStore};

/// Snapshot types the store machinery can drive.
pub trait StoreState: Clone + Default + Send + Sync + 'static {
    fn set_loading(&mut self, loading: bool);
    fn set_error(&mut self, error: Option<String>);
}

// ── StateCell ────────────────────────────────────────────────────

pub(crate) struct StateCell<S: StoreState, K> {
    tx: watch::Sender<S>,
    /// Only touched inside `send_modify`, so it moves in lockstep with
    /// the `loading` flag it projects onto.
    in_flight: AtomicU64,
    sequencer: Sequencer<K>,
}

impl<S: StoreState, K: Copy + Eq + Hash> StateCell<S, K> {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(S::default());
        Self {
            tx,
            in_flight: AtomicU64::new(0),
            sequencer: Sequencer::new(),
        }
    }

    pub(crate) fn snapshot(&self) -> S {
        self.tx.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> StateStream<S> {
        StateStream::new(self.tx.subscribe())
    }

    /// Enter the loading state: count the action and clear the error.
    pub(crate) fn begin(&self) -> InFlight<'_, S, K> {
        self.tx.send_modify(|state| {
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            state.set_loading(true);
            state.set_error(None);
        });
        InFlight { cell: self }
    }

    /// Issue a ticket for `slot`, superseding any earlier one.
    pub(crate) fn ticket(&self, slot: K) -> Ticket<K> {
        self.sequencer.issue(slot)
    }

    /// Apply `f` to the state unconditionally and notify subscribers.
    pub(crate) fn update(&self, f: impl FnOnce(&mut S)) {
        self.tx.send_modify(f);
    }

    /// Apply `f` only if `ticket` is still the latest for its slot.
    /// Returns whether the update happened.
    pub(crate) fn apply(&self, ticket: &Ticket<K>, f: impl FnOnce(&mut S)) -> bool {
        self.tx.send_if_modified(|state| {
            if !self.sequencer.is_current(ticket) {
                return false;
            }
            f(state);
            true
        })
    }

    /// Record a failure on the snapshot and build the error to return.
    pub(crate) fn fail(&self, err: dormdesk_api::Error) -> StoreError {
        let err = StoreError::from(err);
        let message = err.message.clone();
        self.tx.send_modify(|state| state.set_error(Some(message)));
        err
    }

    /// Like [`fail`](Self::fail), but a superseded fetch only reports
    /// to its caller and leaves the snapshot alone.
    pub(crate) fn fail_if_current(
        &self,
        ticket: &Ticket<K>,
        err: dormdesk_api::Error,
    ) -> StoreError {
        let err = StoreError::from(err);
        let message = err.message.clone();
        self.tx.send_if_modified(|state| {
            if !self.sequencer.is_current(ticket) {
                return false;
            }
            state.set_error(Some(message));
            true
        });
        err
    }

    /// Restore defaults and invalidate every outstanding ticket.
    /// `loading` keeps reflecting actions that are still running.
    pub(crate) fn reset(&self) {
        self.tx.send_modify(|state| {
            self.sequencer.invalidate_all();
            *state = S::default();
            state.set_loading(self.in_flight.load(Ordering::SeqCst) > 0);
        });
    }

    fn finish(&self) {
        self.tx.send_modify(|state| {
            let remaining = self.in_flight.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
            state.set_loading(remaining > 0);
        });
    }
}

/// Guard for one running action. Dropping it releases the loading slot.
pub(crate) struct InFlight<'a, S: StoreState, K: Copy + Eq + Hash> {
    cell: &'a StateCell<S, K>,
}

impl<S: StoreState, K: Copy + Eq + Hash> Drop for InFlight<'_, S, K> {
    fn drop(&mut self) {
        self.cell.finish();
    }
}

// ── Sequencer ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ticket<K> {
    slot: K,
    seq: u64,
}

pub(crate) struct Sequencer<K> {
    next: AtomicU64,
    latest: Mutex<HashMap<K, u64>>,
}

impl<K: Copy + Eq + Hash> Sequencer<K> {
    pub(crate) fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
            latest: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn issue(&self, slot: K) -> Ticket<K> {
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        let seq = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        latest.insert(slot, seq);
        Ticket { slot, seq }
    }

    pub(crate) fn is_current(&self, ticket: &Ticket<K>) -> bool {
        let latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        latest.get(&ticket.slot) == Some(&ticket.seq)
    }

    pub(crate) fn invalidate_all(&self) {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
