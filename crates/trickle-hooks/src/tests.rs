#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    use futures::StreamExt;
    use futures::channel::oneshot;
    use futures::stream;
    use serde_json::{Value, json};
    use trickle_core::{EngineError, Scheduler, StateHandle, Update, patch, tasks};

    use crate::{use_yield, use_yield_reducer, use_yield_state};

    #[test]
    fn test_use_yield_direct_run() {
        let mut host = Scheduler::new();

        let state = host.frame(|| {
            let (state, runner) = use_yield(patch!({ "count": 0 })).unwrap();
            runner.run(
                |state, _cancel, _action| {
                    let count = state.snapshot()["count"].as_i64().unwrap_or(0);
                    patch!({ "count": count + 1 }).into()
                },
                Default::default(),
            );
            state
        });

        // the merge landed after this frame's read
        assert_eq!(state["count"], 0);
        assert!(host.take_frame_request());

        let state = host.frame(|| use_yield(patch!({ "count": 0 })).unwrap().0);
        assert_eq!(state["count"], 1);
        assert!(!host.take_frame_request());
    }

    #[test]
    fn test_initial_state_is_validated() {
        let mut host = Scheduler::new();
        let result = host.frame(|| use_yield(42).map(|_| ()));
        assert!(matches!(
            result,
            Err(EngineError::InvalidInitialState { .. })
        ));
    }

    #[test]
    fn test_state_hook_restarts_and_cancels_on_dep_change() {
        let mut host = Scheduler::new();
        let gates: Rc<RefCell<Vec<oneshot::Sender<()>>>> = Rc::new(RefCell::new(Vec::new()));
        let runs = Rc::new(Cell::new(0u32));

        let compose = |host: &mut Scheduler, page: i64| {
            let gates = gates.clone();
            let runs = runs.clone();
            host.frame(move || {
                use_yield_state(
                    patch!({ "posts": [], "users": [] }),
                    (page,),
                    move |_state, _cancel, _action| {
                        runs.set(runs.get() + 1);
                        let (tx, rx) = oneshot::channel::<()>();
                        gates.borrow_mut().push(tx);
                        Update::sequence(stream::iter([patch!({ "posts": [page] })]).chain(
                            stream::once(async move {
                                let _ = rx.await;
                                patch!({ "users": [page] })
                            }),
                        ))
                    },
                )
                .unwrap()
            })
        };

        compose(&mut host, 1);
        assert_eq!(runs.get(), 1);

        // same deps: recomposition alone starts nothing
        let state = compose(&mut host, 1);
        assert_eq!(runs.get(), 1);
        assert_eq!(state["posts"], json!([1]));

        // dep change: run #1 is cancelled, run #2 starts over
        let state = compose(&mut host, 2);
        assert_eq!(runs.get(), 2);
        assert_eq!(state["posts"], json!([1])); // read before run #2 merged

        // run #1's late step resolves after its cancellation: discarded
        gates.borrow_mut().remove(0).send(()).unwrap();
        tasks::drain();
        let state = compose(&mut host, 2);
        assert_eq!(state["posts"], json!([2]));
        assert_eq!(state["users"], json!([]));

        // run #2's step lands normally
        gates.borrow_mut().remove(0).send(()).unwrap();
        tasks::drain();
        let state = compose(&mut host, 2);
        assert_eq!(state["users"], json!([2]));
    }

    #[test]
    fn test_unmount_cancels_inflight_run() {
        let mut host = Scheduler::new();
        let gate: Rc<RefCell<Option<oneshot::Sender<()>>>> = Rc::new(RefCell::new(None));
        let handle: Rc<RefCell<Option<StateHandle>>> = Rc::new(RefCell::new(None));

        {
            let gate = gate.clone();
            let handle = handle.clone();
            host.frame(move || {
                use_yield_state(patch!({ "users": [] }), (), move |state, _cancel, _action| {
                    *handle.borrow_mut() = Some(state.clone());
                    let (tx, rx) = oneshot::channel::<()>();
                    *gate.borrow_mut() = Some(tx);
                    Update::deferred(async move {
                        let _ = rx.await;
                        patch!({ "users": [1] })
                    })
                })
                .unwrap()
            });
        }

        host.teardown();

        // the response arrives after the component is gone
        gate.borrow_mut().take().unwrap().send(()).unwrap();
        tasks::drain();

        let state = handle.borrow().as_ref().unwrap().current();
        assert_eq!(state["users"], json!([]));
    }

    #[test]
    fn test_reducer_delivers_snapshot_to_exactly_one_run() {
        let mut host = Scheduler::new();
        let seen: Rc<RefCell<Vec<Option<Value>>>> = Rc::new(RefCell::new(Vec::new()));

        let compose = |host: &mut Scheduler| {
            let seen = seen.clone();
            host.frame(move || {
                use_yield_reducer(patch!({ "items": [] }), (), move |_state, _cancel, action| {
                    seen.borrow_mut().push(action.clone());
                    match action {
                        Some(value) => patch!({ "items": [value] }).into(),
                        None => patch!({}).into(),
                    }
                })
                .unwrap()
            })
        };

        // mount run carries no action
        compose(&mut host);
        assert_eq!(*seen.borrow(), vec![None]);

        let (_, dispatch) = compose(&mut host);
        // still one run: recomposition without dispatch schedules nothing
        assert_eq!(seen.borrow().len(), 1);

        let mut payload = vec![1, 2];
        dispatch.dispatch(&payload).unwrap();
        payload.push(3); // later mutation must be invisible to the run

        let (state, _) = compose(&mut host);
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(seen.borrow()[1], Some(json!([1, 2])));
        assert_eq!(state["items"], json!([])); // read before the merge

        let (state, _) = compose(&mut host);
        assert_eq!(state["items"], json!([[1, 2]]));
        // the action was consumed by its run
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_reducer_rejects_non_data_actions() {
        let mut host = Scheduler::new();
        let runs = Rc::new(Cell::new(0u32));

        let compose = |host: &mut Scheduler| {
            let runs = runs.clone();
            host.frame(move || {
                use_yield_reducer(patch!({}), (), move |_state, _cancel, _action| {
                    runs.set(runs.get() + 1);
                    patch!({}).into()
                })
                .unwrap()
            })
        };

        let (_, dispatch) = compose(&mut host);
        assert_eq!(runs.get(), 1);
        host.take_frame_request();

        // map keys that aren't strings can't be snapshotted as plain data
        let action: HashMap<Vec<u8>, i32> = HashMap::from([(vec![1], 1)]);
        let err = dispatch.dispatch(&action).unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedActionType(_)));

        // nothing was scheduled
        assert!(!host.take_frame_request());
        compose(&mut host);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_feed_scenario_end_to_end() {
        let mut host = Scheduler::new();
        let pause: Rc<RefCell<Option<oneshot::Sender<()>>>> = Rc::new(RefCell::new(None));

        let compose = |host: &mut Scheduler| {
            let pause = pause.clone();
            host.frame(move || {
                use_yield_state(
                    patch!({ "posts": [], "users": [] }),
                    (),
                    move |_state, _cancel, _action| {
                        let (tx, rx) = oneshot::channel::<()>();
                        *pause.borrow_mut() = Some(tx);
                        Update::sequence(stream::iter([patch!({ "posts": [1, 2] })]).chain(
                            stream::once(async move {
                                let _ = rx.await;
                                patch!({ "users": [3] })
                            }),
                        ))
                    },
                )
                .unwrap()
            })
        };

        compose(&mut host);
        let state = compose(&mut host);
        assert_eq!(state["posts"], json!([1, 2]));
        assert_eq!(state["users"], json!([]));

        pause.borrow_mut().take().unwrap().send(()).unwrap();
        tasks::drain();

        let state = compose(&mut host);
        assert_eq!(state["posts"], json!([1, 2]));
        assert_eq!(state["users"], json!([3]));
    }
}
