//! Background execution of a single search run.
//!
//! The worker owns its grid snapshot outright and talks to the foreground
//! through one channel: a `Visited` event per expanded cell, then exactly
//! one `Finished` event carrying the whole outcome. The foreground is the
//! only reader.

use crate::error::SearchError;
use crate::grid::{Coord, Grid};
use crate::search::{SearchEngine, SearchOutcome};
use crossbeam_channel::{Receiver, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Messages published by the worker, in order
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    Visited(Coord),
    Finished(Result<SearchOutcome, SearchError>),
}

/// What a drain of the event channel produced
#[derive(Debug, PartialEq)]
pub enum Drained {
    /// Still running
    Pending,
    Finished(Result<SearchOutcome, SearchError>),
    /// The worker went away without reporting an outcome
    Lost,
}

/// Handle to one in-flight search thread
pub struct SearchRun {
    cancel: Arc<AtomicBool>,
    events: Receiver<SearchEvent>,
    handle: Option<JoinHandle<()>>,
}

impl SearchRun {
    /// Spawn the search on its own thread. `visit_delay` pauses after every
    /// visit so the exploration can be watched; cancellation cuts it short.
    pub fn spawn(
        snapshot: Grid,
        start: Coord,
        goal: Coord,
        visit_delay: Duration,
    ) -> std::io::Result<Self> {
        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, rx) = crossbeam_channel::unbounded();

        let worker_cancel = Arc::clone(&cancel);
        let handle = thread::Builder::new()
            .name("grid-search".into())
            .spawn(move || {
                let result = SearchEngine::new(snapshot, start, goal).map(|mut engine| {
                    engine.run(
                        |coord| {
                            // A closed receiver means nobody is watching any more
                            let _ = tx.send(SearchEvent::Visited(coord));
                            if !visit_delay.is_zero() {
                                thread::park_timeout(visit_delay);
                            }
                        },
                        || worker_cancel.load(Ordering::Acquire),
                    )
                });
                let _ = tx.send(SearchEvent::Finished(result));
            })?;

        Ok(SearchRun {
            cancel,
            events: rx,
            handle: Some(handle),
        })
    }

    /// Ask the worker to stop at its next dequeue
    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::Release);
        if let Some(handle) = &self.handle {
            handle.thread().unpark();
        }
    }

    /// Move every pending event into `frontier` without blocking
    pub fn drain(&mut self, frontier: &mut Vec<Coord>) -> Drained {
        loop {
            match self.events.try_recv() {
                Ok(SearchEvent::Visited(coord)) => frontier.push(coord),
                Ok(SearchEvent::Finished(result)) => {
                    self.join();
                    return Drained::Finished(result);
                }
                Err(TryRecvError::Empty) => return Drained::Pending,
                Err(TryRecvError::Disconnected) => {
                    self.join();
                    return Drained::Lost;
                }
            }
        }
    }

    /// Block until the worker reports, collecting visits on the way
    pub fn wait(&mut self, frontier: &mut Vec<Coord>) -> Drained {
        loop {
            match self.events.recv() {
                Ok(SearchEvent::Visited(coord)) => frontier.push(coord),
                Ok(SearchEvent::Finished(result)) => {
                    self.join();
                    return Drained::Finished(result);
                }
                Err(_) => {
                    self.join();
                    return Drained::Lost;
                }
            }
        }
    }

    /// Cancel and wait for the thread to exit, discarding its events
    pub fn shutdown(&mut self) {
        self.request_cancel();
        self.join();
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("search thread panicked");
            }
        }
    }
}

impl Drop for SearchRun {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.shutdown();
        }
    }
}
