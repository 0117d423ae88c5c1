// Pool dispatch: a dedicated rayon pool sized to the chunk count, one task per
// chunk inside a rayon scope. `scope` returns only after every task is done.

use std::panic::{self, AssertUnwindSafe};

use core_affinity::CoreId;

use super::{affinity, empty_slots, panic_message, Slot};
use crate::error::{ReduceError, Result};
use crate::partition::Chunk;

pub(super) fn run<A, F>(chunks: &[Chunk], cores: Option<Vec<CoreId>>, work: F) -> Result<Vec<Slot<A>>>
where
    A: Send,
    F: Fn(usize, Chunk) -> Result<A> + Sync,
{
    let mut builder = rayon::ThreadPoolBuilder::new()
        .num_threads(chunks.len().max(1))
        .thread_name(|i| format!("reduce-pool-{i}"));

    if let Some(cores) = cores {
        builder = builder.start_handler(move |i| affinity::pin_current(i, &cores));
    }

    let pool = builder.build()?;
    let mut slots = empty_slots(chunks.len());
    let work = &work;

    pool.scope(|s| {
        for (index, (slot, &chunk)) in slots.iter_mut().zip(chunks).enumerate() {
            s.spawn(move |_| {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| work(index, chunk)));
                *slot = Some(outcome.unwrap_or_else(|payload| {
                    Err(ReduceError::WorkerFailure {
                        chunk: index,
                        reason: panic_message(payload.as_ref()),
                    })
                }));
            });
        }
    });

    Ok(slots)
}
