use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::scope::Scope;

thread_local! {
    pub static COMPOSER: RefCell<Composer> = RefCell::new(Composer::default());
    static FRAME_REQUESTED: Cell<bool> = const { Cell::new(false) };
}

#[derive(Default)]
pub struct Composer {
    pub slots: Vec<Box<dyn Any>>,
    pub cursor: usize,
    pub keyed_slots: HashMap<String, Box<dyn Any>>,
}

/// Slot-based remember (sequential composition only)
pub fn remember<T: 'static>(init: impl FnOnce() -> T) -> Rc<T> {
    COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        let cursor = c.cursor;
        c.cursor += 1;

        if cursor >= c.slots.len() {
            let rc: Rc<T> = Rc::new(init());
            c.slots.push(Box::new(rc.clone()));
            return rc;
        }

        if let Some(rc) = c.slots[cursor].downcast_ref::<Rc<T>>() {
            rc.clone()
        } else {
            // replace (else panics)
            log::warn!(
                "remember: slot {} type changed; replacing. \
                 If this is due to conditional composition, prefer remember_with_key.",
                cursor
            );
            let rc: Rc<T> = Rc::new(init());
            c.slots[cursor] = Box::new(rc.clone());
            rc
        }
    })
}

/// Key-based remember
pub fn remember_with_key<T: 'static>(key: impl Into<String>, init: impl FnOnce() -> T) -> Rc<T> {
    COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        let key = key.into();

        if let Some(existing) = c.keyed_slots.get(&key) {
            if let Some(rc) = existing.downcast_ref::<Rc<T>>() {
                return rc.clone();
            } else {
                log::warn!(
                    "remember_with_key: key '{}' reused with a different type; replacing.",
                    key
                );
            }
        }

        let rc: Rc<T> = Rc::new(init());
        c.keyed_slots.insert(key, Box::new(rc.clone()));
        rc
    })
}

pub fn remember_state<T: 'static>(init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
    remember(|| RefCell::new(init()))
}

/// Marks the current composition dirty: the host should compose another
/// frame. Raised by state cells on every applied merge and by `dispatch`.
pub fn request_frame() {
    FRAME_REQUESTED.with(|f| f.set(true));
}

/// Drives composition for hosts without their own frame loop (demos, tests).
///
/// One scheduler owns the thread's composition: creating it resets the slot
/// table, and its root scope lives until `teardown`, so remembered values
/// persist across frames while unmount disposers fire exactly once.
pub struct Scheduler {
    scope: Scope,
}

impl Scheduler {
    pub fn new() -> Self {
        COMPOSER.with(|c| {
            let mut c = c.borrow_mut();
            c.slots.clear();
            c.keyed_slots.clear();
            c.cursor = 0;
        });
        FRAME_REQUESTED.with(|f| f.set(false));
        Self {
            scope: Scope::new(),
        }
    }

    /// Composes one frame: resets the slot cursor, runs `compose` inside the
    /// root scope, then drains queued local tasks.
    pub fn frame<R>(&mut self, compose: impl FnOnce() -> R) -> R {
        COMPOSER.with(|c| c.borrow_mut().cursor = 0);
        let out = self.scope.run(compose);
        crate::tasks::drain();
        out
    }

    /// True when state changed since the last call and a new frame is due.
    pub fn take_frame_request(&mut self) -> bool {
        FRAME_REQUESTED.with(|f| f.replace(false))
    }

    /// Tears the composition down, running every scope disposer.
    pub fn teardown(self) {
        self.scope.dispose();
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
