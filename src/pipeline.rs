// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A small producer/consumer pipeline with independent lifecycles.
//!
//! The Generator pushes numbers into a bounded queue at a fixed
//! cadence, and the Writer appends each number it pulls out to a file.
//! Each runs on its own thread and is stopped through its own Handle;
//! stopping one says nothing to the other.  When the generator stops,
//! its sender is dropped and the queue closes, which the writer treats
//! as the end of its input.  When the writer stops, whatever is still
//! queued is dropped on the floor, and the generator's next send fails,
//! which it treats the same way.

use crossbeam::channel::{self, select, Receiver, Sender, TryRecvError};
use failure::Fail;
use log::{error, info};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// The queue capacity the demo uses.
pub const DEFAULT_CAPACITY: usize = 100;

/// How often the demo generator emits a number.
pub const DEFAULT_CADENCE: Duration = Duration::from_millis(1);

/// What can go wrong managing the pipeline threads.  Failures to write
/// individual records are not errors; the writer logs and counts them.
#[derive(Debug, Fail)]
pub enum PipelineError {
    /// The operating system would not give us a thread.
    #[fail(display = "could not start {}: {}", _0, _1)]
    Spawn(&'static str, #[cause] io::Error),

    /// The thread died instead of returning.
    #[fail(display = "{} panicked", _0)]
    Panicked(&'static str),
}

/// Why a side of the pipeline stopped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stopped {
    /// Its handle was closed.
    Cancelled,
    /// The other end of the queue went away.
    Disconnected,
    /// The generator ran out of values.
    Exhausted,
}

/// What a side of the pipeline did before it stopped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    /// Values sent (generator) or records written (writer).
    pub handled: usize,
    /// Records the writer failed to persist.
    pub failed: usize,
    /// Why it stopped.
    pub stopped: Stopped,
}

/// Controls one running side of the pipeline.  Dropping the handle
/// cancels the side without waiting for it.
pub struct Handle {
    name: &'static str,
    cancel: Sender<()>,
    thread: JoinHandle<Summary>,
}

impl Handle {
    fn spawn<F>(name: &'static str, body: F) -> Result<Handle, PipelineError>
    where
        F: FnOnce(Receiver<()>) -> Summary + Send + 'static,
    {
        let (cancel, cancelled) = channel::bounded(1);
        let thread = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || body(cancelled))
            .map_err(|e| PipelineError::Spawn(name, e))?;
        info!("{} started", name);
        Ok(Handle {
            name,
            cancel,
            thread,
        })
    }

    /// Asks the side to stop and waits for it.  At most the unit of
    /// work already in flight completes after the request.
    pub fn close(self) -> Result<Summary, PipelineError> {
        let Handle {
            name,
            cancel,
            thread,
        } = self;
        // The task may already be gone; a full or disconnected signal
        // channel means the same thing.
        let _ = cancel.try_send(());
        drop(cancel);
        join(name, thread)
    }

    /// Waits for the side to stop on its own, without cancelling it.
    pub fn wait(self) -> Result<Summary, PipelineError> {
        let Handle {
            name,
            cancel: _keep,
            thread,
        } = self;
        join(name, thread)
    }
}

/// A pending signal and a dropped handle both count as a request to
/// stop.  Checked before each unit of work, since `select!` picks
/// among ready operations at random.
fn cancelled(cancel: &Receiver<()>) -> bool {
    match cancel.try_recv() {
        Ok(()) | Err(TryRecvError::Disconnected) => true,
        Err(TryRecvError::Empty) => false,
    }
}

fn join(name: &'static str, thread: JoinHandle<Summary>) -> Result<Summary, PipelineError> {
    let summary = thread.join().map_err(|_| PipelineError::Panicked(name))?;
    info!(
        "{} stopped ({:?}) after {} values, {} failures",
        name, summary.stopped, summary.handled, summary.failed
    );
    Ok(summary)
}

/// An endless supply of random numbers.
pub fn random_values() -> impl Iterator<Item = u64> + Send + 'static {
    std::iter::repeat_with(rand::random::<u64>)
}

/// Emits values from an iterator into the queue, one per tick.
pub struct Generator<I> {
    out: Sender<u64>,
    cadence: Duration,
    values: I,
}

impl<I> Generator<I>
where
    I: Iterator<Item = u64> + Send + 'static,
{
    /// A generator that will feed `out` from `values`, one value per
    /// `cadence`.
    pub fn new(out: Sender<u64>, cadence: Duration, values: I) -> Self {
        Generator {
            out,
            cadence,
            values,
        }
    }

    /// Starts emitting on a thread of its own.
    pub fn start(self) -> Result<Handle, PipelineError> {
        Handle::spawn("generator", move |cancel| self.run(cancel))
    }

    fn run(mut self, cancel: Receiver<()>) -> Summary {
        let ticker = channel::tick(self.cadence);
        let mut sent = 0;
        let stopped = loop {
            if cancelled(&cancel) {
                break Stopped::Cancelled;
            }
            select! {
                recv(cancel) -> _ => break Stopped::Cancelled,
                recv(ticker) -> _ => {}
            }
            if cancelled(&cancel) {
                break Stopped::Cancelled;
            }

            let value = match self.values.next() {
                Some(value) => value,
                None => break Stopped::Exhausted,
            };

            // A full queue blocks here; cancellation still gets through.
            select! {
                send(self.out, value) -> res => match res {
                    Ok(()) => sent += 1,
                    Err(_) => break Stopped::Disconnected,
                },
                recv(cancel) -> _ => break Stopped::Cancelled,
            }
        };
        Summary {
            handled: sent,
            failed: 0,
            stopped,
        }
    }
}

/// Appends every value it receives to a file, one line per value.
pub struct Writer {
    input: Receiver<u64>,
    path: PathBuf,
}

/// The line written for each value.
pub fn record(value: u64) -> String {
    format!("Number is now: {}\n", value)
}

/// Opens, appends to, syncs and closes the file.  Holding no handle
/// between records means every record succeeds or fails on its own.
fn append(path: &Path, value: u64) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(record(value).as_bytes())?;
    file.sync_all()
}

impl Writer {
    /// A writer draining `input` into the file at `path`.
    pub fn new<P: Into<PathBuf>>(input: Receiver<u64>, path: P) -> Self {
        Writer {
            input,
            path: path.into(),
        }
    }

    /// Starts writing on a thread of its own.
    pub fn start(self) -> Result<Handle, PipelineError> {
        Handle::spawn("writer", move |cancel| self.run(cancel))
    }

    fn run(self, cancel: Receiver<()>) -> Summary {
        let (mut written, mut failed) = (0, 0);
        let stopped = loop {
            if cancelled(&cancel) {
                break Stopped::Cancelled;
            }
            select! {
                recv(self.input) -> value => match value {
                    Ok(value) => match append(&self.path, value) {
                        Ok(()) => written += 1,
                        Err(e) => {
                            error!("Error writing to {}: {}", self.path.display(), e);
                            failed += 1;
                        }
                    },
                    Err(_) => break Stopped::Disconnected,
                },
                recv(cancel) -> _ => break Stopped::Cancelled,
            }
        };
        Summary {
            handled: written,
            failed,
            stopped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Instant;
    use tempfile::tempdir;

    fn wait_for<F: Fn() -> bool>(condition: F) -> bool {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        false
    }

    #[test]
    fn records_have_the_expected_shape() {
        assert_eq!(record(42), "Number is now: 42\n");
    }

    #[test]
    fn writer_appends_every_value_until_the_queue_closes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.txt");
        let (tx, rx) = channel::bounded(DEFAULT_CAPACITY);
        let writer = Writer::new(rx, &path).start().unwrap();

        for value in &[7, 8, 9] {
            tx.send(*value).unwrap();
        }
        drop(tx);

        let summary = writer.wait().unwrap();
        assert_eq!(
            summary,
            Summary {
                handled: 3,
                failed: 0,
                stopped: Stopped::Disconnected
            }
        );
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Number is now: 7\nNumber is now: 8\nNumber is now: 9\n"
        );
    }

    #[test]
    fn write_failures_are_counted_and_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("output.txt");
        let (tx, rx) = channel::bounded(4);
        let writer = Writer::new(rx, &path).start().unwrap();

        for value in 0..3 {
            tx.send(value).unwrap();
        }
        drop(tx);

        let summary = writer.wait().unwrap();
        assert_eq!(summary.handled, 0);
        assert_eq!(summary.failed, 3);
        assert_eq!(summary.stopped, Stopped::Disconnected);
    }

    #[test]
    fn generator_runs_out_and_closes_the_queue() {
        let (tx, rx) = channel::bounded(2);
        let generator = Generator::new(tx, Duration::from_millis(1), vec![1, 2, 3].into_iter())
            .start()
            .unwrap();

        let received: Vec<u64> = rx.iter().collect();
        assert_eq!(received, vec![1, 2, 3]);
        assert_eq!(
            generator.wait().unwrap(),
            Summary {
                handled: 3,
                failed: 0,
                stopped: Stopped::Exhausted
            }
        );
    }

    #[test]
    fn generator_blocked_on_a_full_queue_can_be_cancelled() {
        let (tx, rx) = channel::bounded(2);
        let generator = Generator::new(tx, Duration::from_millis(1), 1..100).start().unwrap();

        assert!(wait_for(|| rx.is_full()));
        let summary = generator.close().unwrap();
        assert_eq!(summary.stopped, Stopped::Cancelled);
        assert_eq!(summary.handled, 2);

        let leftovers: Vec<u64> = rx.iter().collect();
        assert_eq!(leftovers, vec![1, 2]);
    }

    #[test]
    fn generator_stops_when_the_writer_is_gone() {
        let (tx, rx) = channel::bounded(1);
        drop(rx);
        let generator = Generator::new(tx, Duration::from_millis(1), random_values())
            .start()
            .unwrap();
        assert_eq!(generator.wait().unwrap().stopped, Stopped::Disconnected);
    }

    #[test]
    fn cancelled_writer_leaves_the_rest_of_the_queue_unwritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.txt");
        let (tx, rx) = channel::bounded(2);
        let writer = Writer::new(rx, &path).start().unwrap();
        let generator = Generator::new(tx, Duration::from_millis(200), vec![1, 2, 3].into_iter())
            .start()
            .unwrap();

        assert!(wait_for(|| fs::read_to_string(&path)
            .map(|text| text.contains("Number is now: 1\n"))
            .unwrap_or(false)));
        let summary = writer.close().unwrap();
        assert_eq!(summary.stopped, Stopped::Cancelled);
        assert!(summary.handled >= 1 && summary.handled <= 2);

        // The generator is never stuck behind the dead writer.
        let produced = generator.close().unwrap();
        assert!(produced.handled <= 3);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Number is now: 1\n"));
        assert!(!text.contains("Number is now: 3\n"));
    }

    #[test]
    fn pending_cancel_stops_the_writer_before_a_full_queue() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.txt");
        for _ in 0..50 {
            let (tx, rx) = channel::bounded(64);
            for value in 0..64 {
                tx.send(value).unwrap();
            }
            let (cancel, signal) = channel::bounded(1);
            cancel.send(()).unwrap();

            let summary = Writer::new(rx, &path).run(signal);
            assert_eq!(summary.stopped, Stopped::Cancelled);
            assert_eq!(summary.handled, 0);
            assert_eq!(tx.len(), 64);
        }
        assert!(!path.exists());
    }

    #[test]
    fn pending_cancel_stops_the_generator_before_it_sends() {
        for _ in 0..50 {
            let (tx, rx) = channel::bounded(1024);
            let (cancel, signal) = channel::bounded(1);
            cancel.send(()).unwrap();

            let summary = Generator::new(tx, Duration::from_micros(10), 0..).run(signal);
            assert_eq!(summary.stopped, Stopped::Cancelled);
            assert_eq!(summary.handled, 0);
            assert!(rx.is_empty());
        }
    }

    #[test]
    fn dropped_cancel_handle_counts_as_cancellation() {
        let (_tx, rx) = channel::bounded(4);
        let (cancel, signal) = channel::bounded::<()>(1);
        drop(cancel);

        let dir = tempdir().unwrap();
        let summary = Writer::new(rx, dir.path().join("output.txt")).run(signal);
        assert_eq!(summary.stopped, Stopped::Cancelled);
    }
}
