//! # Hooks for yield-driven state
//!
//! Three composition functions wire the `trickle-core` engine into a
//! component's lifecycle:
//!
//! - [`use_yield`] — state plus a runner the caller drives directly.
//! - [`use_yield_state`] — restart the changer whenever a dependency list
//!   changes, cancelling the previous run.
//! - [`use_yield_reducer`] — same, plus a [`Dispatch`] handle that feeds
//!   snapshotted actions into fresh runs.
//!
//! All three remember their cell per call site, so a component composes them
//! unconditionally every frame and only pays for work when something
//! actually changed:
//!
//! ```rust
//! use trickle_core::{Scheduler, patch};
//! use trickle_hooks::use_yield_state;
//!
//! let mut host = Scheduler::new();
//! let compose = || {
//!     use_yield_state(patch!({ "greeting": null }), (), |_state, _cancel, _action| {
//!         patch!({ "greeting": "hello" }).into()
//!     })
//!     .unwrap()
//! };
//!
//! let state = host.frame(compose);
//! assert!(state["greeting"].is_null()); // this frame read before the merge
//! assert!(host.take_frame_request());
//!
//! let state = host.frame(compose);
//! assert_eq!(state["greeting"], "hello");
//! ```
//!
//! Changers that fail must handle it themselves, typically by matching on
//! their own error and yielding an error-shaped patch; nothing error-shaped
//! ever crosses the engine boundary.

mod keyed;
pub mod tests;
pub mod use_yield;
pub mod use_yield_reducer;
pub mod use_yield_state;

pub use use_yield::use_yield;
pub use use_yield_reducer::{Dispatch, use_yield_reducer};
pub use use_yield_state::use_yield_state;

pub use trickle_core::{
    CancellationToken, Composite, EngineError, Patch, RunOptions, Runner, StateChanger,
    StateHandle, Update, patch,
};
