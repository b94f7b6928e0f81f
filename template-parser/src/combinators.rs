//! Structural combinators.
//!
//! Every combinator takes already-built recognizers and returns a new one;
//! none of them mutates its inputs. Soft failures propagate as `Ok(None)`
//! and fatal errors pass straight through with `?`; nothing here catches
//! an error.

use crate::error::ParseError;
use crate::parser::{Match, Parser};
use once_cell::unsync::OnceCell;
use std::rc::Rc;
use tracing::debug;

/// Things [`sequence`] can chain: arrays and vectors of same-typed
/// recognizers (yielding a `Vec`) and tuples of up to eight recognizers
/// (yielding a tuple).
pub trait Sequence<V> {
    type Output;

    fn into_parser(self) -> Parser<Self::Output, V>;
}

/// Matches every step in order, each starting where the previous ended.
///
/// Fails as soon as one step fails, discarding the partial results.
pub fn sequence<V, S>(steps: S) -> Parser<S::Output, V>
where
    S: Sequence<V>,
{
    steps.into_parser()
}

impl<T, V> Sequence<V> for Vec<Parser<T, V>>
where
    T: 'static,
    V: 'static,
{
    type Output = Vec<T>;

    fn into_parser(self) -> Parser<Vec<T>, V> {
        Parser::new(move |ctx, pos| {
            let mut values = Vec::with_capacity(self.len());
            let mut end = pos;
            for step in &self {
                let Some(found) = step.exec(ctx, end)? else {
                    return Ok(None);
                };
                values.push(found.value);
                end = found.end;
            }
            Ok(Some(Match::new(values, end)))
        })
    }
}

impl<T, V, const N: usize> Sequence<V> for [Parser<T, V>; N]
where
    T: 'static,
    V: 'static,
{
    type Output = Vec<T>;

    fn into_parser(self) -> Parser<Vec<T>, V> {
        Vec::from(self).into_parser()
    }
}

macro_rules! impl_sequence_for_tuple {
    ($($T:ident $step:ident),+) => {
        impl<V, $($T),+> Sequence<V> for ($(Parser<$T, V>,)+)
        where
            V: 'static,
            $($T: 'static,)+
        {
            type Output = ($($T,)+);

            fn into_parser(self) -> Parser<Self::Output, V> {
                let ($($step,)+) = self;
                Parser::new(move |ctx, pos| {
                    let mut end = pos;
                    $(
                        let $step = match $step.exec(ctx, end)? {
                            Some(found) => {
                                end = found.end;
                                found.value
                            }
                            None => return Ok(None),
                        };
                    )+
                    Ok(Some(Match::new(($($step,)+), end)))
                })
            }
        }
    };
}

impl_sequence_for_tuple!(A a);
impl_sequence_for_tuple!(A a, B b);
impl_sequence_for_tuple!(A a, B b, C c);
impl_sequence_for_tuple!(A a, B b, C c, D d);
impl_sequence_for_tuple!(A a, B b, C c, D d, E e);
impl_sequence_for_tuple!(A a, B b, C c, D d, E e, F f);
impl_sequence_for_tuple!(A a, B b, C c, D d, E e, F f, G g);
impl_sequence_for_tuple!(A a, B b, C c, D d, E e, F f, G g, H h);

/// Tries each alternative at the same position, in order, and commits to
/// the first that matches.
pub fn any<T, V>(alternatives: impl IntoIterator<Item = Parser<T, V>>) -> Parser<T, V>
where
    T: 'static,
    V: 'static,
{
    let alternatives: Vec<_> = alternatives.into_iter().collect();
    Parser::new(move |ctx, pos| {
        for alternative in &alternatives {
            if let Some(found) = alternative.exec(ctx, pos)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    })
}

/// Always matches: `Some` with the inner result, or `None` without moving.
pub fn optional<T, V>(parser: Parser<T, V>) -> Parser<Option<T>, V>
where
    T: 'static,
    V: 'static,
{
    Parser::new(move |ctx, pos| {
        Ok(Some(match parser.exec(ctx, pos)? {
            Some(found) => found.map(Some),
            None => Match::new(None, pos),
        }))
    })
}

/// Turns a soft failure of `parser` into a fatal [`ParseError`] pointing at
/// the position where it was attempted.
pub fn required<T, V>(parser: Parser<T, V>) -> Parser<T, V>
where
    T: 'static,
    V: 'static,
{
    Parser::new(move |ctx, pos| match parser.exec(ctx, pos)? {
        Some(found) => Ok(Some(found)),
        None => {
            let err =
                ParseError::unexpected_symbol(ctx.fragments(), pos, ctx.options().error_window);
            debug!(position = %pos, error = %err, "required recognizer failed");
            Err(err)
        }
    })
}

/// Runs `test` for its verdict only, then matches `on_success` or `on_fail`
/// from the original position.
pub fn conditional<C, T, V>(
    test: Parser<C, V>,
    on_success: Parser<T, V>,
    on_fail: Parser<T, V>,
) -> Parser<T, V>
where
    C: 'static,
    T: 'static,
    V: 'static,
{
    Parser::new(move |ctx, pos| {
        if test.exec(ctx, pos)?.is_some() {
            on_success.exec(ctx, pos)
        } else {
            on_fail.exec(ctx, pos)
        }
    })
}

/// Matches `main` one or more times, greedily.
///
/// Stops at the first repetition that fails or does not move the cursor
/// forward. Fails if nothing was matched.
pub fn repeat<T, V>(main: Parser<T, V>) -> Parser<Vec<T>, V>
where
    T: 'static,
    V: 'static,
{
    repetition(main.clone(), main)
}

/// Like [`repeat`], with `delimiter` required between repetitions. The
/// delimiter results are dropped, and a trailing delimiter is not consumed.
pub fn repeat_delimited<T, D, V>(main: Parser<T, V>, delimiter: Parser<D, V>) -> Parser<Vec<T>, V>
where
    T: 'static,
    D: 'static,
    V: 'static,
{
    let follow = sequence((delimiter, main.clone())).then(|(_, value), _| value);
    repetition(main, follow)
}

fn repetition<T, V>(first: Parser<T, V>, follow: Parser<T, V>) -> Parser<Vec<T>, V>
where
    T: 'static,
    V: 'static,
{
    Parser::new(move |ctx, pos| {
        let mut values = Vec::new();
        let mut end = pos;
        let mut step = first.exec(ctx, end)?;
        while let Some(found) = step {
            if found.end <= end {
                break;
            }
            values.push(found.value);
            end = found.end;
            step = follow.exec(ctx, end)?;
        }
        Ok((!values.is_empty()).then(|| Match::new(values, end)))
    })
}

/// Resolves the recognizer from `supplier` on first use and keeps it.
///
/// Lets a grammar refer to recognizers that are built later.
pub fn defer<T, V, F>(supplier: F) -> Parser<T, V>
where
    T: 'static,
    V: 'static,
    F: Fn() -> Parser<T, V> + 'static,
{
    let resolved: OnceCell<Parser<T, V>> = OnceCell::new();
    Parser::new(move |ctx, pos| resolved.get_or_init(&supplier).exec(ctx, pos))
}

/// Builds a self-referential recognizer.
///
/// `build` receives a handle standing for the recognizer being defined and
/// returns its definition. The handle reaches the definition through a weak
/// reference, so the grammar does not keep itself alive; using it after
/// the returned recognizer is dropped is a fatal [`ParseError::Unresolved`].
pub fn recursive<T, V, F>(build: F) -> Parser<T, V>
where
    T: 'static,
    V: 'static,
    F: FnOnce(Parser<T, V>) -> Parser<T, V>,
{
    let cell: Rc<OnceCell<Parser<T, V>>> = Rc::new(OnceCell::new());
    let weak = Rc::downgrade(&cell);
    let this = Parser::new(move |ctx, pos| {
        match weak.upgrade().and_then(|cell| cell.get().cloned()) {
            Some(definition) => definition.exec(ctx, pos),
            None => Err(ParseError::Unresolved),
        }
    });

    let definition = build(this);
    // Fresh cell, so `set` cannot fail.
    let _ = cell.set(definition);
    Parser::new(move |ctx, pos| match cell.get() {
        Some(definition) => definition.exec(ctx, pos),
        None => Err(ParseError::Unresolved),
    })
}
