use std::cell::RefCell;
use std::future::Future;

use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;

thread_local! {
    static POOL: RefCell<LocalPool> = RefCell::new(LocalPool::new());
    static SPAWNER: LocalSpawner = POOL.with(|p| p.borrow().spawner());
}

/// Queues a task on the thread's pool. Tasks are `!Send`; everything runs as
/// interleaved continuations on the composing thread.
pub fn spawn(fut: impl Future<Output = ()> + 'static) {
    SPAWNER.with(|spawner| {
        if let Err(err) = spawner.spawn_local(fut) {
            log::warn!("task pool is shut down, dropping task: {err}");
        }
    });
}

/// Polls queued tasks until all of them are pending or done. Called by the
/// scheduler after every frame; callers waking tasks out of band (tests) may
/// call it directly.
pub fn drain() {
    POOL.with(|p| match p.try_borrow_mut() {
        Ok(mut pool) => {
            pool.run_until_stalled();
        }
        Err(_) => log::warn!("drain called from inside a task; ignoring"),
    });
}
