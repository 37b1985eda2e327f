//! Feed demo: a reducer-style binding loading posts and users in two steps
//! from a stubbed JSON API, driven by a minimal console frame loop.
//!
//! The "network" is in-process: every fetch parks a oneshot in a queue and
//! the main loop delivers responses one at a time, which makes the yield
//! points, the dep/dispatch-triggered restarts, and the discarded merges of
//! a cancelled run visible in the output.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::Result;
use futures::channel::oneshot;
use futures::stream;
use serde::Serialize;
use serde_json::Value;
use trickle_core::{Scheduler, patch, tasks};
use trickle_hooks::{
    CancellationToken, Composite, Dispatch, EngineError, StateChanger, StateHandle, Update,
    use_yield_reducer,
};

#[derive(Serialize)]
struct Post {
    id: u32,
    title: String,
}

#[derive(Serialize)]
struct User {
    id: u32,
    name: String,
}

/// In-process stand-in for a JSON API: `fetch` parks a request, `respond`
/// delivers the oldest pending one.
struct FakeApi {
    parked: RefCell<VecDeque<(String, oneshot::Sender<Value>)>>,
}

impl FakeApi {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            parked: RefCell::new(VecDeque::new()),
        })
    }

    fn fetch(&self, path: &str) -> oneshot::Receiver<Value> {
        log::info!("-> GET {path}");
        let (tx, rx) = oneshot::channel();
        self.parked.borrow_mut().push_back((path.to_owned(), tx));
        rx
    }

    /// Returns false when no request is waiting.
    fn respond(&self) -> bool {
        let Some((path, tx)) = self.parked.borrow_mut().pop_front() else {
            return false;
        };
        log::info!("<- 200 {path}");
        let body = if path.starts_with("/posts") {
            serde_json::to_value([
                Post {
                    id: 1,
                    title: "hello trickle".to_owned(),
                },
                Post {
                    id: 2,
                    title: "state in steps".to_owned(),
                },
            ])
        } else {
            serde_json::to_value([User {
                id: 3,
                name: "ada".to_owned(),
            }])
        };
        // dropped receivers just mean the run is gone; nothing to do
        let _ = tx.send(body.unwrap_or_default());
        true
    }
}

/// The feed changer: `"reset"` clears synchronously, anything else reloads
/// posts then users as a two-step sequence. Request failures are handled
/// here, not by the engine.
fn feed_changer(api: Rc<FakeApi>) -> impl StateChanger {
    move |state: StateHandle, _cancel: CancellationToken, action: Option<Value>| {
        if action.as_ref().and_then(Value::as_str) == Some("reset") {
            return patch!({ "posts": [], "users": [] }).into();
        }

        let api = api.clone();
        Update::sequence(stream::unfold(0u8, move |step| {
            let api = api.clone();
            let state = state.clone();
            async move {
                match step {
                    0 => {
                        let posts = api.fetch("/posts?_limit=2").await.unwrap_or_else(|_| {
                            log::warn!("posts request dropped");
                            Value::Null
                        });
                        Some((patch!({ "posts": posts }), 1))
                    }
                    1 => {
                        log::info!(
                            "posts already visible mid-run: {}",
                            state.current()["posts"]
                        );
                        let users = api.fetch("/users?_limit=1").await.unwrap_or_else(|_| {
                            log::warn!("users request dropped");
                            Value::Null
                        });
                        Some((patch!({ "users": users }), 2))
                    }
                    _ => None,
                }
            }
        }))
    }
}

fn compose_feed(
    host: &mut Scheduler,
    api: &Rc<FakeApi>,
) -> Result<(Rc<Composite>, Dispatch), EngineError> {
    let changer = feed_changer(api.clone());
    host.frame(move || {
        use_yield_reducer(patch!({ "posts": [], "users": [] }), (), changer)
    })
}

fn show(label: &str, state: &Composite) -> Result<()> {
    println!("[{label}] {}", serde_json::to_string(state)?);
    Ok(())
}

/// Recomposes until neither dirty state nor pending responses remain. Dirty
/// state composes first, so a dispatched action cancels a stale run before
/// any of its late responses are delivered.
fn settle(host: &mut Scheduler, api: &Rc<FakeApi>, label: &str) -> Result<()> {
    loop {
        if host.take_frame_request() {
            let (state, _) = compose_feed(host, api)?;
            show(label, &state)?;
            continue;
        }
        if !api.respond() {
            return Ok(());
        }
        tasks::drain();
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let api = FakeApi::new();
    let mut host = Scheduler::new();

    // mount starts the initial load (no action pending)
    let (state, dispatch) = compose_feed(&mut host, &api)?;
    show("mount", &state)?;
    settle(&mut host, &api, "load")?;

    // a reset clears the feed synchronously
    dispatch.dispatch("reset")?;
    settle(&mut host, &api, "reset")?;

    // reload, but reset again while the users request is still in flight:
    // the first run is cancelled and its late merge is discarded
    dispatch.dispatch("reload")?;
    let (state, _) = compose_feed(&mut host, &api)?;
    show("reload", &state)?;
    api.respond(); // posts arrive
    tasks::drain();
    dispatch.dispatch("reset")?;
    settle(&mut host, &api, "reset-mid-flight")?;

    host.teardown();
    Ok(())
}
