use crate::context::{ParseContext, ParseOptions};
use crate::error::ParseError;
use crate::memo::{self, MemoSession, MemoStore, TraceKey};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};
use template_common::{Fragments, Position};
use tracing::debug;

/// A successful match: the recognizer's result and where it stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<T> {
    pub value: T,
    pub end: Position,
}

impl<T> Match<T> {
    pub fn new(value: T, end: Position) -> Self {
        Self { value, end }
    }

    /// Transforms the value, keeping the end position.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Match<U> {
        Match {
            value: f(self.value),
            end: self.end,
        }
    }
}

/// Outcome of one recognizer attempt.
///
/// `Ok(None)` is a soft failure, `Err` a fatal one.
pub type ExecResult<T> = Result<Option<Match<T>>, ParseError>;

pub(crate) type ExecFn<T, V> = dyn Fn(&mut ParseContext<'_, V>, Position) -> ExecResult<T>;

/// Identity of a recognizer node. Also names the grammar root in memo keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParserId(u32);

impl ParserId {
    fn fresh() -> Self {
        static NEXT_ID: AtomicU32 = AtomicU32::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

}

impl fmt::Display for ParserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Node<T, V> {
    id: ParserId,
    /// The match function as constructed.
    exec: Rc<ExecFn<T, V>>,
    /// The caching variant wrapping `exec`; present while caching is on.
    cached: Option<Rc<ExecFn<T, V>>>,
    /// Recorded traces. Kept when caching is toggled off so that turning it
    /// back on finds them again.
    store: Option<Rc<RefCell<MemoStore<T>>>>,
}

/// A recognizer: attempts a match at a position and either fails softly,
/// succeeds with a value and end position, or raises a fatal error.
///
/// `Parser` is a cheap handle; cloning it shares the node. Modifiers such
/// as [`then`](Parser::then) and [`not`](Parser::not) build new nodes around
/// the original, which stays usable on its own.
pub struct Parser<T, V = ()> {
    node: Rc<Node<T, V>>,
}

impl<T, V> Clone for Parser<T, V> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
        }
    }
}

impl<T, V> fmt::Debug for Parser<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("id", &self.node.id)
            .field("cached", &self.node.cached.is_some())
            .finish()
    }
}

impl<T, V> Parser<T, V>
where
    T: 'static,
    V: 'static,
{
    /// Creates a recognizer from a raw match function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut ParseContext<'_, V>, Position) -> ExecResult<T> + 'static,
    {
        Self {
            node: Rc::new(Node {
                id: ParserId::fresh(),
                exec: Rc::new(f),
                cached: None,
                store: None,
            }),
        }
    }

    pub fn id(&self) -> ParserId {
        self.node.id
    }

    /// Returns `true` if both handles refer to the same recognizer node.
    pub fn ptr_eq(left: &Self, right: &Self) -> bool {
        Rc::ptr_eq(&left.node, &right.node)
    }

    pub fn is_cached(&self) -> bool {
        self.node.cached.is_some()
    }

    /// Attempts a match at `pos`.
    pub fn exec(&self, ctx: &mut ParseContext<'_, V>, pos: Position) -> ExecResult<T> {
        match &self.node.cached {
            Some(cached) => cached(ctx, pos),
            None => (self.node.exec)(ctx, pos),
        }
    }

    /// Applies `transform` to the result of a successful match. The
    /// transform also sees the call's interpolated values.
    pub fn then<U, F>(&self, transform: F) -> Parser<U, V>
    where
        U: 'static,
        F: Fn(T, &[V]) -> U + 'static,
    {
        let this = self.clone();
        Parser::new(move |ctx, pos| {
            let values = ctx.values();
            Ok(this
                .exec(ctx, pos)?
                .map(|found| found.map(|value| transform(value, values))))
        })
    }

    /// Negative lookahead: matches like `self` only where `other` does not
    /// match at the same position.
    pub fn not<U: 'static>(&self, other: &Parser<U, V>) -> Parser<T, V> {
        let this = self.clone();
        let other = other.clone();
        Parser::new(move |ctx, pos| {
            if other.exec(ctx, pos)?.is_some() {
                return Ok(None);
            }
            this.exec(ctx, pos)
        })
    }

    /// Parses `input` with default options (caching on).
    ///
    /// Returns `Ok(None)` when the root does not match.
    pub fn parse(
        &self,
        input: impl Into<Fragments>,
        values: &[V],
    ) -> Result<Option<T>, ParseError> {
        self.parse_with(input, values, &ParseOptions::default())
    }

    /// Parses `input` from the start position with explicit options.
    pub fn parse_with(
        &self,
        input: impl Into<Fragments>,
        values: &[V],
        options: &ParseOptions,
    ) -> Result<Option<T>, ParseError> {
        let fragments = input.into();
        let memo = options
            .cache
            .then(|| MemoSession::new(TraceKey::new(self.id(), fragments.fingerprint().clone())));
        let mut ctx = ParseContext::new(&fragments, values)
            .with_options(*options)
            .with_memo(memo);

        let outcome = self.exec(&mut ctx, Position::start());
        ctx.finish(matches!(outcome, Ok(Some(_))));

        match outcome {
            Ok(found) => Ok(found.map(|found| found.value)),
            Err(err) => {
                debug!(parser = %self.id(), error = %err, "parse aborted");
                Err(err)
            }
        }
    }
}

impl<T, V> Parser<T, V>
where
    T: Clone + 'static,
    V: 'static,
{
    /// Turns memoization for this node on or off.
    ///
    /// Changing the state yields a new handle over the same match function;
    /// asking for the state the node already has returns the same handle.
    /// Recorded traces survive a round trip through `use_cache(false)`.
    pub fn use_cache(&self, enabled: bool) -> Self {
        if enabled == self.is_cached() {
            return self.clone();
        }

        let node = &self.node;
        let (cached, store) = if enabled {
            let store = node.store.clone().unwrap_or_default();
            let cached = memo::caching(node.id, Rc::clone(&store), Rc::clone(&node.exec));
            (Some(cached), Some(store))
        } else {
            (None, node.store.clone())
        };

        Self {
            node: Rc::new(Node {
                id: node.id,
                exec: Rc::clone(&node.exec),
                cached,
                store,
            }),
        }
    }

    /// Drops every trace this node has recorded.
    pub fn clear_cache(&self) {
        if let Some(store) = &self.node.store {
            store.borrow_mut().clear();
        }
    }

    /// Number of committed outcomes this node holds across all traces.
    pub fn recorded_entries(&self) -> usize {
        self.node
            .store
            .as_ref()
            .map_or(0, |store| store.borrow().len())
    }
}
