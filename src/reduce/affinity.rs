// Worker-to-core pinning.

use core_affinity::CoreId;
use tracing::debug;

/// Cores workers may be pinned to, or `None` if the platform reports none.
pub(super) fn available_cores() -> Option<Vec<CoreId>> {
    match core_affinity::get_core_ids() {
        Some(ids) if !ids.is_empty() => Some(ids),
        _ => {
            debug!("core ids unavailable, workers will not be pinned");
            None
        }
    }
}

/// Pin the calling thread to core `worker % cores.len()`.
pub(super) fn pin_current(worker: usize, cores: &[CoreId]) {
    if cores.is_empty() {
        return;
    }
    let core = cores[worker % cores.len()];
    if !core_affinity::set_for_current(core) {
        debug!(worker, core = core.id, "failed to pin worker");
    }
}
