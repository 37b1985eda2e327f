use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::error::EngineError;
use crate::runner::Runner;
use crate::signal::Signal;

/// The full key/value record managed by one cell.
pub type Composite = Map<String, Value>;

/// A partial update; its keys overwrite the matching composite keys on merge.
pub type Patch = Composite;

/// Builds a [`Patch`] from a JSON object literal.
///
/// ```
/// use trickle_core::patch;
///
/// let p = patch!({ "posts": [1, 2], "loading": false });
/// assert_eq!(p.len(), 2);
/// ```
#[macro_export]
macro_rules! patch {
    ({ $($body:tt)* }) => {{
        match $crate::__json::json!({ $($body)* }) {
            $crate::__json::Value::Object(map) => map,
            _ => ::core::unreachable!(),
        }
    }};
}

/// Owns one composite state slice and its render trigger.
///
/// The state lives behind an `Rc`, replaced wholesale on every applied merge,
/// so "did anything change" is observable as pointer identity on the handles
/// returned from [`StateCell::merge`] and [`StateCell::current`].
pub struct StateCell {
    inner: Rc<CellInner>,
}

struct CellInner {
    state: RefCell<Rc<Composite>>,
    renders: Signal<u64>,
}

impl StateCell {
    /// Fails unless `initial` serializes to a plain JSON object; arrays,
    /// primitives and null are not composite state.
    pub fn new(initial: impl Serialize) -> Result<Self, EngineError> {
        let value = serde_json::to_value(initial).map_err(|_| EngineError::InvalidInitialState {
            found: "an unserializable value",
        })?;
        match value {
            Value::Object(map) => Ok(Self {
                inner: Rc::new(CellInner {
                    state: RefCell::new(Rc::new(map)),
                    renders: Signal::new(0),
                }),
            }),
            other => Err(EngineError::InvalidInitialState {
                found: json_kind(&other),
            }),
        }
    }

    /// The live state. Cheap; the same `Rc` is returned until a merge
    /// actually changes a field.
    pub fn current(&self) -> Rc<Composite> {
        self.inner.state.borrow().clone()
    }

    /// A fresh copy for changers to own across suspension points.
    pub fn snapshot(&self) -> Composite {
        (*self.current()).clone()
    }

    /// Applies `patch` over the current state.
    ///
    /// An already-cancelled token discards the patch outright. A patch that
    /// changes no field returns the current `Rc` unchanged and notifies
    /// nobody; otherwise the new state is stored and the render trigger is
    /// bumped exactly once.
    pub fn merge(&self, patch: Patch, cancel: Option<&CancellationToken>) -> Rc<Composite> {
        if let Some(token) = cancel {
            if token.is_cancelled() {
                log::debug!("merge discarded: run was cancelled");
                return self.current();
            }
        }

        let current = self.current();
        let mut next = (*current).clone();
        for (key, value) in patch {
            next.insert(key, value);
        }
        if next == *current {
            return current;
        }

        let next = Rc::new(next);
        *self.inner.state.borrow_mut() = next.clone();
        self.inner.renders.update(|n| *n += 1);
        next
    }

    /// The render trigger. Its counter value is internal; only its change
    /// notifications matter to hosts.
    pub fn renders(&self) -> Signal<u64> {
        self.inner.renders.clone()
    }

    /// The read accessor handed to changers.
    pub fn handle(&self) -> StateHandle {
        StateHandle { cell: self.clone() }
    }

    /// A runner driving changers against this cell.
    pub fn runner(&self) -> Runner {
        Runner::new(self.clone())
    }
}

impl Clone for StateCell {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Read access to a cell for state changers. Cloneable into futures, so a
/// changer can read fresh state between its suspension points without
/// re-subscribing.
pub struct StateHandle {
    cell: StateCell,
}

impl StateHandle {
    pub fn snapshot(&self) -> Composite {
        self.cell.snapshot()
    }

    pub fn current(&self) -> Rc<Composite> {
        self.cell.current()
    }
}

impl Clone for StateHandle {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
