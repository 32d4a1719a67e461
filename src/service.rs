// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A background render worker with a one-deep queue.
//!
//! Interactive use produces requests much faster than frames can be
//! drawn: every drag or wheel tick wants a new image.  Only the most
//! recent one matters, so the service keeps a single pending slot.
//! A new submission overwrites whatever is waiting there, and the
//! overwritten request's handle is told it was superseded.  Whatever
//! is already being drawn is allowed to finish; its output carries a
//! generation number so the caller can tell whether it's stale.

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use log::{debug, warn};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::render::{render_threaded, PixelBuffer, RenderRequest};

/// A finished frame.
#[derive(Debug)]
pub struct RenderOutput {
    /// Which submission this answers.  Larger is newer.
    pub generation: u64,
    /// The pixels.
    pub buffer: PixelBuffer,
    /// Time spent drawing, not waiting in the queue.
    pub elapsed: Duration,
}

type Reply = Result<RenderOutput>;
type RenderFn = Box<dyn Fn(&RenderRequest) -> Result<PixelBuffer> + Send>;

struct Job {
    generation: u64,
    request: RenderRequest,
    reply: Sender<Reply>,
}

#[derive(Default)]
struct Slot {
    pending: Option<Job>,
    last_generation: u64,
    shutdown: bool,
}

struct Shared {
    slot: Mutex<Slot>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<Slot> {
        // Nothing panics while holding the lock, so a poisoned slot
        // is still consistent.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The answer to one submission, once it arrives.
pub struct RenderHandle {
    generation: u64,
    receiver: Receiver<Reply>,
}

impl RenderHandle {
    /// The generation number assigned to this submission.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Block until the frame is drawn, superseded, or abandoned.
    pub fn wait(self) -> Result<RenderOutput> {
        match self.receiver.recv() {
            Ok(reply) => reply,
            Err(_) => Err(Error::WorkerLost),
        }
    }

    /// Like `wait`, but gives up after `timeout` and returns None.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<RenderOutput>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(reply) => Some(reply),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(Error::WorkerLost)),
        }
    }

    /// Check without blocking.
    pub fn try_wait(&self) -> Option<Result<RenderOutput>> {
        match self.receiver.try_recv() {
            Ok(reply) => Some(reply),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(Error::WorkerLost)),
        }
    }
}

/// Owns the background worker.  Dropping the service lets the
/// current frame finish, refuses the pending one, and joins the
/// worker.
pub struct RenderService {
    shared: Arc<Shared>,
    worker: Option<thread::JoinHandle<()>>,
}

impl RenderService {
    /// A service whose worker splits each frame across `threads`
    /// threads.
    pub fn new(threads: usize) -> Self {
        RenderService::with_renderer(move |request: &RenderRequest| {
            render_threaded(request, threads)
        })
    }

    /// A service that draws frames with the given function.
    pub fn with_renderer<F>(renderer: F) -> Self
    where
        F: Fn(&RenderRequest) -> Result<PixelBuffer> + Send + 'static,
    {
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot::default()),
            wake: Condvar::new(),
        });
        let worker = {
            let shared = shared.clone();
            let renderer: RenderFn = Box::new(renderer);
            thread::spawn(move || run(&shared, &renderer))
        };
        RenderService {
            shared,
            worker: Some(worker),
        }
    }

    /// Queue a frame.  Replaces any frame still waiting to start.
    pub fn submit(&self, request: RenderRequest) -> RenderHandle {
        let (reply, receiver) = channel::bounded(1);
        let generation = {
            let mut slot = self.shared.lock();
            slot.last_generation += 1;
            let generation = slot.last_generation;
            let job = Job {
                generation,
                request,
                reply,
            };
            if let Some(stale) = slot.pending.replace(job) {
                debug!("request {} supersedes {}", generation, stale.generation);
                let _ = stale.reply.send(Err(Error::Superseded));
            }
            generation
        };
        self.shared.wake.notify_one();
        RenderHandle {
            generation,
            receiver,
        }
    }

    /// True if nothing has been submitted since `generation`.
    pub fn is_latest(&self, generation: u64) -> bool {
        self.shared.lock().last_generation == generation
    }
}

impl Default for RenderService {
    fn default() -> Self {
        RenderService::new(num_cpus::get())
    }
}

impl Drop for RenderService {
    fn drop(&mut self) {
        {
            let mut slot = self.shared.lock();
            slot.shutdown = true;
            if let Some(job) = slot.pending.take() {
                let _ = job.reply.send(Err(Error::Shutdown));
            }
        }
        self.shared.wake.notify_all();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("render worker panicked");
            }
        }
    }
}

fn next_job(shared: &Shared) -> Option<Job> {
    let mut slot = shared.lock();
    loop {
        if slot.shutdown {
            return None;
        }
        if let Some(job) = slot.pending.take() {
            return Some(job);
        }
        slot = shared.wake.wait(slot).unwrap_or_else(PoisonError::into_inner);
    }
}

fn run(shared: &Shared, renderer: &RenderFn) {
    while let Some(job) = next_job(shared) {
        debug!("starting request {}", job.generation);
        let started = Instant::now();
        // A panicking renderer must not take the worker down with it,
        // or every later submission would wait forever.
        let reply = match panic::catch_unwind(AssertUnwindSafe(|| renderer(&job.request))) {
            Ok(rendered) => rendered.map(|buffer| RenderOutput {
                generation: job.generation,
                buffer,
                elapsed: started.elapsed(),
            }),
            Err(_) => {
                warn!("renderer panicked on request {}", job.generation);
                Err(Error::WorkerLost)
            }
        };
        // The caller may have dropped the handle; that's fine.
        let _ = job.reply.send(reply);
    }
    debug!("render worker stopping");
}
