use std::cell::Cell;

use trickle_core::{
    CancellationToken, Dispose, Runner, on_unmount, remember, remember_state, scoped_effect,
};

/// Restarts a run whenever `deps` change: the previous run's controller is
/// cancelled first, then `start` launches the next one. The last live
/// controller is also cancelled when the owning scope unmounts.
pub(crate) fn restart_on_change<D>(
    runner: &Runner,
    deps: D,
    start: impl FnOnce(&Runner) -> Option<CancellationToken>,
) where
    D: PartialEq + 'static,
{
    let last_deps = remember_state(|| None::<D>);
    let cleanup = remember_state(|| None::<Dispose>);
    let installed = remember(|| Cell::new(false));

    // One unmount disposer per call site.
    if !installed.get() {
        installed.set(true);
        let cleanup = cleanup.clone();
        scoped_effect(move || {
            on_unmount(move || {
                if let Some(d) = cleanup.borrow_mut().take() {
                    d.run();
                }
            })
        });
    }

    let changed = last_deps.borrow().as_ref() != Some(&deps);
    if changed {
        *last_deps.borrow_mut() = Some(deps);

        if let Some(d) = cleanup.borrow_mut().take() {
            d.run();
        }

        if let Some(token) = start(runner) {
            *cleanup.borrow_mut() = Some(Dispose::new(move || token.cancel()));
        }
    }
}
