// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A fixed-size pool of scoped worker threads sharing one task
//! channel.  The caller supplies a producer, which pushes tasks into
//! the channel, and a handler, which the workers run on every task
//! they pull out of it.
//!
//! The shutdown protocol is close, drain, join: once the producer
//! returns, the last sender is dropped, which closes the channel; each
//! worker leaves its receive loop only when the channel is both closed
//! and empty; and the pool does not return until the wait group has
//! seen every worker leave.  Skip the close and the workers wait
//! forever; skip the join and the caller sees a half-filled result.

use crossbeam::channel::{self, Receiver, Sender};
use crossbeam::sync::WaitGroup;
use log::trace;
use std::num::NonZeroUsize;
use std::panic;

/// How much room the task channel has.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Capacity {
    /// A rendezvous channel: every send waits for a worker to take it.
    Handoff,
    /// A channel that holds this many tasks before the producer waits.
    Bounded(usize),
}

impl Capacity {
    fn channel<T>(self) -> (Sender<T>, Receiver<T>) {
        match self {
            Capacity::Handoff => channel::bounded(0),
            Capacity::Bounded(size) => channel::bounded(size),
        }
    }
}

/// Runs `workers` threads, each applying `handler` to tasks until the
/// channel filled by `produce` is closed and drained.  Returns the
/// number of tasks handled by each worker, in the order they were
/// spawned.
///
/// A panic in a worker is raised again on the calling thread once
/// every other worker has been joined.
pub fn dispatch<T, P, H>(workers: NonZeroUsize, capacity: Capacity, produce: P, handler: H) -> Vec<usize>
where
    T: Send,
    P: FnOnce(&Sender<T>),
    H: Fn(T) + Sync,
{
    let (tasks, queue) = capacity.channel::<T>();
    let handler = &handler;
    let result = crossbeam::scope(|spawner| {
        let done = WaitGroup::new();
        let handles: Vec<_> = (0..workers.get())
            .map(|id| {
                let queue = queue.clone();
                let done = done.clone();
                spawner.spawn(move |_| {
                    let mut handled = 0;
                    for task in queue.iter() {
                        handler(task);
                        handled += 1;
                    }
                    trace!("worker {} drained after {} tasks", id, handled);
                    drop(done);
                    handled
                })
            })
            .collect();
        drop(queue);

        produce(&tasks);
        drop(tasks);
        done.wait();

        handles
            .into_iter()
            .map(|handle| handle.join())
            .collect::<Vec<_>>()
    });

    match result {
        Ok(joined) => joined
            .into_iter()
            .map(|handled| handled.unwrap_or_else(|payload| panic::resume_unwind(payload)))
            .collect(),
        Err(payload) => panic::resume_unwind(payload),
    }
}
