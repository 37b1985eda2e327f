use std::future::Future;

use futures::future::LocalBoxFuture;
use futures::stream::{LocalBoxStream, StreamExt};
use futures::Stream;
use serde_json::Value;
pub use tokio_util::sync::CancellationToken;

use crate::cell::{Patch, StateCell, StateHandle};
use crate::tasks;

/// What a state changer handed back to the runner.
///
/// The three calling conventions are explicit variants, so a sequence's
/// per-step value can never be mistaken for a one-shot result.
pub enum Update {
    /// Already-computed patch, merged synchronously.
    Immediate(Patch),
    /// One-shot asynchronous patch, merged once it resolves.
    Deferred(LocalBoxFuture<'static, Patch>),
    /// Lazy multi-step source; every yielded patch is merged in order until
    /// the sequence completes.
    Sequence(LocalBoxStream<'static, Patch>),
}

impl Update {
    pub fn deferred(fut: impl Future<Output = Patch> + 'static) -> Self {
        Self::Deferred(Box::pin(fut))
    }

    pub fn sequence(steps: impl Stream<Item = Patch> + 'static) -> Self {
        Self::Sequence(Box::pin(steps))
    }
}

impl From<Patch> for Update {
    fn from(patch: Patch) -> Self {
        Self::Immediate(patch)
    }
}

/// A state changer: reads state through the handle, observes the cancellation
/// signal, and produces the next [`Update`]. The action is `Some` only for
/// reducer-style runs.
pub trait StateChanger: Fn(StateHandle, CancellationToken, Option<Value>) -> Update {}

impl<F> StateChanger for F where F: Fn(StateHandle, CancellationToken, Option<Value>) -> Update {}

/// Per-run options.
#[derive(Default)]
pub struct RunOptions {
    /// Reuse an externally owned token instead of minting a fresh one, to
    /// share one cancellation scope across runs.
    pub aborter: Option<CancellationToken>,
    /// Delivered to the changer verbatim (reducer bindings).
    pub action: Option<Value>,
}

/// Drives a state changer to completion against one cell.
///
/// ```
/// use trickle_core::{patch, RunOptions, StateCell};
///
/// let cell = StateCell::new(patch!({ "count": 0 })).unwrap();
/// let controller = cell.runner().run(
///     |_state, _cancel, _action| patch!({ "count": 1 }).into(),
///     RunOptions::default(),
/// );
/// assert!(controller.is_none()); // synchronous work has nothing to cancel
/// assert_eq!(cell.current()["count"], 1);
/// ```
#[derive(Clone)]
pub struct Runner {
    cell: StateCell,
}

impl Runner {
    pub(crate) fn new(cell: StateCell) -> Self {
        Self { cell }
    }

    /// Invokes `changer` and drives whatever it returns.
    ///
    /// Immediate patches merge on the spot and return `None`. Deferred and
    /// sequence results are driven on the thread's task pool, each merge
    /// re-checking the returned controller right before mutating state, so a
    /// cancelled run can no longer touch the cell however long its work keeps
    /// running. Errors raised inside the changer are the changer's own
    /// business; the runner neither catches nor reports them.
    pub fn run(
        &self,
        changer: impl FnOnce(StateHandle, CancellationToken, Option<Value>) -> Update,
        options: RunOptions,
    ) -> Option<CancellationToken> {
        let token = options
            .aborter
            .unwrap_or_else(CancellationToken::new);

        match changer(self.cell.handle(), token.clone(), options.action) {
            Update::Immediate(patch) => {
                self.cell.merge(patch, None);
                None
            }
            Update::Deferred(fut) => {
                let cell = self.cell.clone();
                let guard = token.clone();
                tasks::spawn(async move {
                    let patch = fut.await;
                    cell.merge(patch, Some(&guard));
                });
                Some(token)
            }
            Update::Sequence(mut steps) => {
                let cell = self.cell.clone();
                let guard = token.clone();
                tasks::spawn(async move {
                    while let Some(patch) = steps.next().await {
                        cell.merge(patch, Some(&guard));
                    }
                });
                Some(token)
            }
        }
    }
}
