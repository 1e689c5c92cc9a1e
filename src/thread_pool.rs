use std::{
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Condvar, Mutex, MutexGuard},
    thread::{self, JoinHandle},
};

use crossbeam::channel::{Receiver, Sender, unbounded};
use tracing::{trace, warn};

struct Worker {
    id: usize,
    thread: Option<JoinHandle<()>>,
}

struct Job(Box<dyn FnOnce() + Send + 'static>);

/// Count of queued or running jobs.
#[derive(Default)]
struct JobCounter {
    jobcount: Mutex<usize>,
    cvar: Condvar,
}

impl JobCounter {
    fn lock(&self) -> MutexGuard<'_, usize> {
        // the count is only ever touched by these methods, a poisoned
        // lock still holds a valid number
        self.jobcount.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn start_job(&self) {
        let mut joblock = self.lock();
        *joblock += 1;
        trace!(jobs = *joblock, "job queued");
    }

    fn finish_job(&self) {
        let mut joblock = self.lock();
        *joblock -= 1;
        trace!(jobs = *joblock, "job finished");
        if *joblock == 0 {
            self.cvar.notify_all();
        }
    }

    fn wait_empty(&self) {
        let mut joblock = self.lock();
        while *joblock > 0 {
            joblock = self.cvar.wait(joblock).unwrap_or_else(|e| e.into_inner());
        }
    }
}

/// Decrements the counter when the job is done with, panic or not.
struct FinishGuard<'a>(&'a JobCounter);

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        self.0.finish_job();
    }
}

/// Fixed set of OS threads pulling boxed jobs off a shared channel.
pub struct ThreadPool {
    workers: Vec<Worker>,
    counter: Arc<JobCounter>,
    sender: Option<Sender<Job>>,
}

impl ThreadPool {
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "thread pool needs at least one worker");
        let counter = Arc::new(JobCounter::default());
        let (s, r) = unbounded();
        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let counter = Arc::clone(&counter);
            let r: Receiver<Job> = r.clone();
            let thread = thread::spawn(move || {
                while let Ok(job) = r.recv() {
                    let _done = FinishGuard(&counter);
                    if panic::catch_unwind(AssertUnwindSafe(job.0)).is_err() {
                        warn!(worker = id, "job panicked");
                    }
                }
            });
            workers.push(Worker {
                id,
                thread: Some(thread),
            });
        }
        Self {
            workers,
            counter,
            sender: Some(s),
        }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let Some(sender) = &self.sender else {
            return;
        };
        // count before sending, or a fast worker could finish the job
        // before it was ever counted
        self.counter.start_job();
        if sender.send(Job(Box::new(f))).is_err() {
            self.counter.finish_job();
        }
    }

    /// Block until every job handed to [`execute`](Self::execute) so far
    /// has finished.
    pub fn join(&self) {
        self.counter.wait_empty();
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.sender = None;
        for worker in &mut self.workers {
            if let Some(handle) = worker.thread.take() {
                if handle.join().is_err() {
                    warn!(worker = worker.id, "worker thread panicked");
                }
            }
        }
    }
}
