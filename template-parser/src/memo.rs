//! Per-node memoization keyed by template identity.
//!
//! Every parse call with caching on owns a [`MemoSession`] holding an
//! ordinal counter. Each invocation of a cache-enabled recognizer takes the
//! next ordinal. The first time a template is parsed the recognizer runs
//! and records its outcome under that ordinal ("build"); on later parses of
//! the same template from the same root it returns the recorded outcome
//! without running at all ("replay").
//!
//! Ordinals stay aligned between the two modes because a recognizer that
//! finishes building restores the counter to one past its own ordinal and
//! drops whatever its descendants recorded in between: a replaying
//! recognizer never reaches its descendants, so their ordinals must not
//! count. The committed trace therefore holds exactly the outermost cached
//! calls of the successful derivation, in call order, including calls made
//! by alternatives that were tried and abandoned at that level (they are
//! tried again, and replayed, on every later parse).
//!
//! Replay only happens while no enclosing cached recognizer is building.
//! Under a building ancestor the ordinals belong to a nested numbering that
//! is never committed, so replaying there could pick up an outcome recorded
//! for a different call.

use crate::context::{Checkpoint, ParseContext};
use crate::parser::{ExecFn, ExecResult, Match, ParserId};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use template_common::{Fingerprint, Position};
use tracing::{debug, trace};

/// Which trace a recorded outcome belongs to: the grammar root the parse
/// started from and the static template it parsed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TraceKey {
    root: ParserId,
    fingerprint: Fingerprint,
}

impl TraceKey {
    pub fn new(root: ParserId, fingerprint: Fingerprint) -> Self {
        Self { root, fingerprint }
    }

    pub fn root(&self) -> ParserId {
        self.root
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct SessionId(u64);

impl SessionId {
    fn fresh() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

type Outcome<T> = Option<Match<T>>;

/// Outcomes recorded by one cache-enabled recognizer.
pub(crate) struct MemoStore<T> {
    /// Replayable outcomes, by trace and ordinal.
    traces: FxHashMap<TraceKey, FxHashMap<usize, Outcome<T>>>,
    /// Outcomes recorded by parses still in flight.
    pending: FxHashMap<(SessionId, usize), Outcome<T>>,
}

impl<T> Default for MemoStore<T> {
    fn default() -> Self {
        Self {
            traces: FxHashMap::default(),
            pending: FxHashMap::default(),
        }
    }
}

impl<T> MemoStore<T> {
    fn record(&mut self, session: SessionId, ordinal: usize, outcome: Outcome<T>) {
        self.pending.insert((session, ordinal), outcome);
    }

    pub(crate) fn clear(&mut self) {
        self.traces.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.traces.values().map(|trace| trace.len()).sum()
    }
}

impl<T: Clone> MemoStore<T> {
    fn replay(&self, key: &TraceKey, ordinal: usize) -> Option<Outcome<T>> {
        self.traces.get(key)?.get(&ordinal).cloned()
    }
}

/// Type-erased view of a store with pending outcomes, so one session can
/// settle stores of different result types.
pub(crate) trait PendingTrace {
    /// Drops the pending outcome at `ordinal`.
    fn forget(&self, session: SessionId, ordinal: usize);

    /// Makes the session's pending outcomes replayable under `key`.
    fn commit(&self, session: SessionId, key: &TraceKey);

    /// Drops all of the session's pending outcomes.
    fn discard(&self, session: SessionId);
}

impl<T> PendingTrace for RefCell<MemoStore<T>> {
    fn forget(&self, session: SessionId, ordinal: usize) {
        self.borrow_mut().pending.remove(&(session, ordinal));
    }

    fn commit(&self, session: SessionId, key: &TraceKey) {
        let mut store = self.borrow_mut();
        let (mine, others): (Vec<_>, Vec<_>) = std::mem::take(&mut store.pending)
            .into_iter()
            .partition(|((owner, _), _)| *owner == session);
        store.pending = others.into_iter().collect();
        if mine.is_empty() {
            return;
        }
        store
            .traces
            .entry(key.clone())
            .or_default()
            .extend(mine.into_iter().map(|((_, ordinal), outcome)| (ordinal, outcome)));
    }

    fn discard(&self, session: SessionId) {
        self.borrow_mut()
            .pending
            .retain(|(owner, _), _| *owner != session);
    }
}

/// Memo state of one in-flight parse call.
pub(crate) struct MemoSession {
    id: SessionId,
    key: TraceKey,
    /// One slot per reserved ordinal; the length is the ordinal counter.
    /// A slot names the store holding a pending outcome for that ordinal.
    journal: Vec<Option<Rc<dyn PendingTrace>>>,
    /// Number of enclosing cached recognizers currently building.
    building: usize,
}

impl MemoSession {
    pub(crate) fn new(key: TraceKey) -> Self {
        Self {
            id: SessionId::fresh(),
            key,
            journal: Vec::new(),
            building: 0,
        }
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint::new(self.journal.len())
    }

    fn reserve(&mut self) -> Checkpoint {
        let checkpoint = self.checkpoint();
        self.journal.push(None);
        checkpoint
    }

    /// Resets the counter to `checkpoint`, dropping the pending outcomes of
    /// every ordinal reserved since.
    fn restore(&mut self, checkpoint: Checkpoint) {
        let keep = checkpoint.ordinal();
        if self.journal.len() <= keep {
            return;
        }
        for (ordinal, slot) in self.journal.drain(keep..).enumerate() {
            if let Some(store) = slot {
                store.forget(self.id, keep + ordinal);
            }
        }
    }

    fn track(&mut self, checkpoint: Checkpoint, store: Rc<dyn PendingTrace>) {
        if let Some(slot) = self.journal.get_mut(checkpoint.ordinal()) {
            *slot = Some(store);
        }
    }

    pub(crate) fn finish(self, matched: bool) {
        let stores = self.journal.iter().flatten();
        if matched {
            for store in stores {
                store.commit(self.id, &self.key);
            }
            debug!(
                root = %self.key.root(),
                ordinals = self.journal.len(),
                "memo trace committed"
            );
        } else {
            for store in stores {
                store.discard(self.id);
            }
            debug!(root = %self.key.root(), "memo trace discarded");
        }
    }
}

/// Wraps `exec` in the caching variant used while memoization is on.
pub(crate) fn caching<T, V>(
    id: ParserId,
    store: Rc<RefCell<MemoStore<T>>>,
    exec: Rc<ExecFn<T, V>>,
) -> Rc<ExecFn<T, V>>
where
    T: Clone + 'static,
    V: 'static,
{
    Rc::new(
        move |ctx: &mut ParseContext<'_, V>, pos: Position| -> ExecResult<T> {
            let checkpoint = match ctx.memo_mut() {
                Some(session) => {
                    let checkpoint = session.reserve();
                    if session.building == 0 {
                        let recorded = store.borrow().replay(&session.key, checkpoint.ordinal());
                        if let Some(outcome) = recorded {
                            trace!(parser = %id, ordinal = checkpoint.ordinal(), "memo replay");
                            return Ok(outcome);
                        }
                    }
                    session.building += 1;
                    checkpoint
                }
                None => return exec(ctx, pos),
            };

            let outcome = exec(ctx, pos);

            let Some(session) = ctx.memo_mut() else {
                return outcome;
            };
            session.building -= 1;
            let outcome = outcome?;

            session.restore(checkpoint.next());
            store
                .borrow_mut()
                .record(session.id, checkpoint.ordinal(), outcome.clone());
            let pending: Rc<dyn PendingTrace> = store.clone();
            session.track(checkpoint, pending);
            trace!(
                parser = %id,
                ordinal = checkpoint.ordinal(),
                matched = outcome.is_some(),
                "memo record"
            );
            Ok(outcome)
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use template_common::Fragments;

    fn key(input: &str) -> TraceKey {
        let root = Parser::<(), ()>::new(|_, _| Ok(None));
        TraceKey::new(root.id(), Fragments::from(input).fingerprint().clone())
    }

    #[test]
    fn test_restore_forgets_descendant_outcomes() {
        let store: Rc<RefCell<MemoStore<u8>>> = Rc::default();
        let mut session = MemoSession::new(key("abc"));

        let outer = session.reserve();
        let inner = session.reserve();
        store.borrow_mut().record(session.id, inner.ordinal(), None);
        session.track(inner, store.clone());
        assert_eq!(session.checkpoint().ordinal(), 2);

        session.restore(outer.next());
        assert_eq!(session.checkpoint().ordinal(), 1);
        assert!(store.borrow().pending.is_empty());
    }

    #[test]
    fn test_commit_moves_pending_into_trace() {
        let store: Rc<RefCell<MemoStore<u8>>> = Rc::default();
        let trace_key = key("abc");
        let mut session = MemoSession::new(trace_key.clone());

        let first = session.reserve();
        store
            .borrow_mut()
            .record(session.id, first.ordinal(), Some(Match::new(7, Position::new(0, 1))));
        session.track(first, store.clone());
        session.finish(true);

        let store = store.borrow();
        assert!(store.pending.is_empty());
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.replay(&trace_key, 0),
            Some(Some(Match::new(7, Position::new(0, 1))))
        );
    }

    #[test]
    fn test_discard_keeps_committed_traces() {
        let store: Rc<RefCell<MemoStore<u8>>> = Rc::default();
        let trace_key = key("abc");

        let mut first = MemoSession::new(trace_key.clone());
        let ordinal = first.reserve();
        store.borrow_mut().record(first.id, ordinal.ordinal(), None);
        first.track(ordinal, store.clone());
        first.finish(true);

        let mut second = MemoSession::new(trace_key.clone());
        let ordinal = second.reserve();
        let _ = second.reserve();
        store.borrow_mut().record(second.id, ordinal.ordinal() + 1, None);
        second.track(ordinal.next(), store.clone());
        second.finish(false);

        let store = store.borrow();
        assert!(store.pending.is_empty());
        assert_eq!(store.len(), 1);
    }
}
