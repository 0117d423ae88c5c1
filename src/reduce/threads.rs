// Thread-per-chunk dispatch.
// Each scoped thread owns a `&mut` to exactly one slot, so writes never alias
// and no lock is needed. The scope ends only after every thread is joined.

use std::thread;

use core_affinity::CoreId;

use super::{affinity, empty_slots, panic_message, Slot};
use crate::error::{ReduceError, Result};
use crate::partition::Chunk;

pub(super) fn run<A, F>(chunks: &[Chunk], cores: Option<&[CoreId]>, work: F) -> Vec<Slot<A>>
where
    A: Send,
    F: Fn(usize, Chunk) -> Result<A> + Sync,
{
    let mut slots = empty_slots(chunks.len());
    let work = &work;

    let failures = thread::scope(|s| {
        let mut handles = Vec::with_capacity(chunks.len());

        for (index, (slot, &chunk)) in slots.iter_mut().zip(chunks).enumerate() {
            let spawned = thread::Builder::new()
                .name(format!("reduce-worker-{index}"))
                .spawn_scoped(s, move || {
                    if let Some(cores) = cores {
                        affinity::pin_current(index, cores);
                    }
                    *slot = Some(work(index, chunk));
                });
            handles.push((index, spawned));
        }

        // Barrier: join every worker before anything is read back.
        let mut failures = Vec::new();
        for (index, spawned) in handles {
            match spawned {
                Ok(handle) => {
                    if let Err(payload) = handle.join() {
                        failures.push((index, panic_message(payload.as_ref())));
                    }
                }
                Err(err) => failures.push((index, format!("failed to spawn worker thread: {err}"))),
            }
        }
        failures
    });

    for (index, reason) in failures {
        slots[index] = Some(Err(ReduceError::WorkerFailure { chunk: index, reason }));
    }

    slots
}
