//! # Yield-driven composite state
//!
//! Trickle's core is a small state engine for components whose state arrives
//! in steps: a **state cell** owning one JSON-shaped record, and a **runner**
//! that drives caller-supplied "state changers" (synchronous, one-shot
//! asynchronous, or lazy multi-step), merging every produced patch into the
//! cell under a cooperative cancellation token. There are three pieces:
//!
//! - [`StateCell`] — owns the composite state, suppresses no-op merges.
//! - [`Runner`] / [`Update`] — drives a changer's immediate, deferred, or
//!   sequence result.
//! - `runtime` / `scope` / `tasks` — the composition plumbing (remember
//!   slots, disposers, the thread-local task pool) the hook layer builds on.
//!
//! ## The cell
//!
//! State is a `serde_json` object map behind an `Rc`, replaced wholesale on
//! every applied merge. A merge that changes nothing hands back the *same*
//! `Rc` and triggers no render, so downstream code can use the handle itself
//! as a cheap dependency:
//!
//! ```rust
//! use std::rc::Rc;
//! use trickle_core::{patch, StateCell};
//!
//! let cell = StateCell::new(patch!({ "count": 0 })).unwrap();
//! let before = cell.current();
//! let after = cell.merge(patch!({ "count": 0 }), None);
//! assert!(Rc::ptr_eq(&before, &after)); // no observable change, no render
//! ```
//!
//! ## Changers
//!
//! A changer receives a [`StateHandle`] (fresh reads across its own await
//! points), the run's [`CancellationToken`], and an optional action, and
//! returns an [`Update`]:
//!
//! ```rust
//! use trickle_core::{patch, RunOptions, StateCell, Update};
//!
//! let cell = StateCell::new(patch!({ "posts": [], "users": [] })).unwrap();
//! let _controller = cell.runner().run(
//!     |_state, _cancel, _action| {
//!         Update::sequence(futures::stream::iter([
//!             patch!({ "posts": [1, 2] }),
//!             patch!({ "users": [3] }),
//!         ]))
//!     },
//!     RunOptions::default(),
//! );
//! trickle_core::tasks::drain();
//! assert_eq!(cell.current()["users"], serde_json::json!([3]));
//! ```
//!
//! Cancellation is cooperative: cancelling the returned controller does not
//! interrupt whatever the changer is awaiting, it makes every later merge
//! from that run a silent no-op. Errors inside a changer stay inside the
//! changer; the engine neither catches nor reports them.
//!
//! Everything is single-threaded: futures are `!Send`, handles are `Rc`, and
//! "concurrent" runs are interleaved continuations on the composing thread's
//! pool, so the cell's synchronous merge is the only writer and needs no
//! locking.

pub mod cell;
pub mod effects;
pub mod error;
pub mod runner;
pub mod runtime;
pub mod scope;
pub mod signal;
pub mod tasks;

pub use cell::*;
pub use effects::*;
pub use error::*;
pub use runner::*;
pub use runtime::*;
pub use scope::*;
pub use signal::*;

#[doc(hidden)]
pub use serde_json as __json;
