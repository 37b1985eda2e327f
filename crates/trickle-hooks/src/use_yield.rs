use std::rc::Rc;

use serde::Serialize;
use trickle_core::{Composite, EngineError, Runner, StateCell, remember_state, request_frame};

/// Remembers one state cell for this call site and hands back the live state
/// plus a runner the caller drives directly (event handlers, imperative
/// flows). The caller keeps whatever controller `run` returns; no lifecycle
/// policy is imposed here.
///
/// The initial state is validated on the first composition only; later
/// compositions reuse the remembered cell.
pub fn use_yield(initial: impl Serialize) -> Result<(Rc<Composite>, Runner), EngineError> {
    let slot = remember_state(|| None::<StateCell>);

    let mut stored = slot.borrow_mut();
    let cell = if let Some(cell) = stored.as_ref() {
        cell.clone()
    } else {
        let cell = StateCell::new(initial)?;
        cell.renders().subscribe(|_| request_frame());
        *stored = Some(cell.clone());
        cell
    };

    Ok((cell.current(), cell.runner()))
}
