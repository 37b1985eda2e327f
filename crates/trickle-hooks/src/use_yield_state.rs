use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;
use trickle_core::{CancellationToken, Composite, EngineError, RunOptions, StateHandle, Update};

use crate::keyed::restart_on_change;
use crate::use_yield::use_yield;

/// Subscribes a changer to its dependency list: whenever `deps` change, the
/// previous run's controller is cancelled and the changer starts over.
/// Returns only the composite state, which is appropriate when the changer is
/// fully determined by its dependencies; see
/// [`use_yield_reducer`](crate::use_yield_reducer) when callers need to feed
/// actions in.
pub fn use_yield_state<D>(
    initial: impl Serialize,
    deps: D,
    changer: impl Fn(StateHandle, CancellationToken, Option<Value>) -> Update + 'static,
) -> Result<Rc<Composite>, EngineError>
where
    D: PartialEq + 'static,
{
    let (state, runner) = use_yield(initial)?;

    restart_on_change(&runner, deps, |runner| {
        runner.run(changer, RunOptions::default())
    });

    Ok(state)
}
