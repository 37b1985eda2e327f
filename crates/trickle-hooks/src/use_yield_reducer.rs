use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;
use trickle_core::{
    CancellationToken, Composite, EngineError, RunOptions, StateHandle, Update, remember,
    remember_state, request_frame,
};

use crate::keyed::restart_on_change;
use crate::use_yield::use_yield;

/// Queues actions for a reducer-style changer. Cloneable; handed out by
/// [`use_yield_reducer`](crate::use_yield_reducer).
#[derive(Clone)]
pub struct Dispatch {
    pending: Rc<RefCell<Option<Value>>>,
    count: Rc<Cell<u64>>,
}

impl Dispatch {
    /// Snapshots `action` by value and schedules exactly one new run.
    ///
    /// The snapshot happens now: whatever the caller does to `action`
    /// afterwards cannot change what the changer observes. An action that is
    /// not plain data fails with [`EngineError::UnsupportedActionType`] and
    /// schedules nothing.
    pub fn dispatch(&self, action: impl Serialize) -> Result<(), EngineError> {
        let snapshot = serde_json::to_value(action).map_err(EngineError::UnsupportedActionType)?;
        log::debug!("dispatch: queued action {snapshot}");

        *self.pending.borrow_mut() = Some(snapshot);
        self.count.set(self.count.get() + 1);
        request_frame();
        Ok(())
    }
}

/// Like [`use_yield_state`](crate::use_yield_state), plus a dispatch handle:
/// each successful dispatch forces exactly one new run (even when `deps` are
/// unchanged) whose action parameter is the value snapshotted at dispatch
/// time. The pending action is consumed by the run it triggers; runs started
/// by a plain dep change see `None`.
pub fn use_yield_reducer<D>(
    initial: impl Serialize,
    deps: D,
    changer: impl Fn(StateHandle, CancellationToken, Option<Value>) -> Update + 'static,
) -> Result<(Rc<Composite>, Dispatch), EngineError>
where
    D: PartialEq + 'static,
{
    let (state, runner) = use_yield(initial)?;

    let pending = remember_state(|| None::<Value>);
    let count = remember(|| Cell::new(0u64));

    let dispatch = Dispatch {
        pending: pending.clone(),
        count: count.clone(),
    };

    restart_on_change(&runner, (deps, count.get()), |runner| {
        // one-shot delivery: the slot is emptied as the run starts
        let action = pending.borrow_mut().take();
        runner.run(changer, RunOptions {
            aborter: None,
            action,
        })
    });

    Ok((state, dispatch))
}
