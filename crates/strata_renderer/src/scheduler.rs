//! Parallel job execution.
//!
//! Jobs are distributed over a bounded set of worker threads and their
//! results collected into a shared [`ResultCollector`]. The calling thread
//! blocks on the collector until every job has reported, then hands the
//! results back for merging. Three execution models share this contract:
//!
//! - [`ExecutionModel::WorkerPool`]: dedicated OS threads pull jobs from a
//!   shared FIFO [`JobQueue`] until it is empty.
//! - [`ExecutionModel::TaskPerBlock`] / [`ExecutionModel::TaskPerPixel`]:
//!   one rayon task per job on a dedicated thread pool.
//!
//! A panic inside a job fails the whole render; workers stop taking new jobs
//! and the caller gets [`RenderError::JobPanicked`].

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use parking_lot::{Condvar, Mutex};

use crate::config::{ExecutionModel, SchedulerSettings};
use crate::error::{RenderError, RenderResult};
use crate::job::{render_job, Job, JobResult, RenderContext};

/// FIFO of jobs waiting for a worker.
pub struct JobQueue {
    jobs: Mutex<VecDeque<Job>>,
}

impl JobQueue {
    pub fn new(jobs: impl IntoIterator<Item = Job>) -> Self {
        Self {
            jobs: Mutex::new(jobs.into_iter().collect()),
        }
    }

    /// Take the oldest job, or `None` once the queue is drained.
    pub fn pop(&self) -> Option<Job> {
        self.jobs.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }
}

struct JobFailure {
    job: usize,
    message: String,
}

#[derive(Default)]
struct CollectorState {
    results: Vec<JobResult>,
    failure: Option<JobFailure>,
}

/// Shared sink for finished jobs plus the completion barrier.
pub struct ResultCollector {
    expected: usize,
    state: Mutex<CollectorState>,
    changed: Condvar,
    failed: AtomicBool,
}

impl ResultCollector {
    /// Collector for a render of `expected` jobs.
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            state: Mutex::new(CollectorState {
                results: Vec::with_capacity(expected),
                failure: None,
            }),
            changed: Condvar::new(),
            failed: AtomicBool::new(false),
        }
    }

    /// Append a finished job and wake the waiting thread.
    pub fn push(&self, result: JobResult) {
        let job = result.job.index;
        let done = {
            let mut state = self.state.lock();
            state.results.push(result);
            state.results.len()
        };
        log::trace!("Job {} finished ({}/{})", job, done, self.expected);
        self.changed.notify_all();
    }

    /// Record that `job` failed. Only the first failure is kept.
    pub fn fail(&self, job: usize, message: String) {
        {
            let mut state = self.state.lock();
            if state.failure.is_none() {
                state.failure = Some(JobFailure { job, message });
            }
        }
        self.failed.store(true, Ordering::Release);
        self.changed.notify_all();
    }

    /// Whether any job has failed; workers poll this between jobs.
    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    /// Block until every expected job has reported or one has failed.
    pub fn wait(&self) -> RenderResult<Vec<JobResult>> {
        let mut state = self.state.lock();
        while state.results.len() < self.expected && state.failure.is_none() {
            self.changed.wait(&mut state);
        }

        if let Some(failure) = state.failure.take() {
            return Err(RenderError::JobPanicked {
                job: failure.job,
                message: failure.message,
            });
        }

        Ok(std::mem::take(&mut state.results))
    }
}

/// Runs jobs according to the configured execution model.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    model: ExecutionModel,
    workers: usize,
}

impl Scheduler {
    pub fn new(settings: SchedulerSettings) -> Self {
        Self {
            model: settings.model,
            workers: settings.worker_count().max(1),
        }
    }

    /// Number of worker threads this scheduler runs.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Execute every job exactly once and return all results.
    ///
    /// Results come back in completion order, not job order.
    pub fn run(&self, jobs: Vec<Job>, ctx: &RenderContext<'_>) -> RenderResult<Vec<JobResult>> {
        if jobs.is_empty() {
            return Ok(Vec::new());
        }

        let collector = ResultCollector::new(jobs.len());
        match self.model {
            ExecutionModel::WorkerPool => self.run_worker_pool(jobs, ctx, &collector),
            ExecutionModel::TaskPerBlock | ExecutionModel::TaskPerPixel => {
                self.run_tasks(jobs, ctx, &collector)
            }
        }
    }

    fn run_worker_pool(
        &self,
        jobs: Vec<Job>,
        ctx: &RenderContext<'_>,
        collector: &ResultCollector,
    ) -> RenderResult<Vec<JobResult>> {
        let queue = JobQueue::new(jobs);
        // No point starting threads that would find the queue empty
        let worker_count = self.workers.min(queue.len());
        let queue = &queue;

        thread::scope(|s| {
            for id in 0..worker_count {
                thread::Builder::new()
                    .name(format!("strata-worker-{}", id))
                    .spawn_scoped(s, move || worker_loop(id, queue, ctx, collector))?;
            }
            collector.wait()
        })
    }

    fn run_tasks(
        &self,
        jobs: Vec<Job>,
        ctx: &RenderContext<'_>,
        collector: &ResultCollector,
    ) -> RenderResult<Vec<JobResult>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("strata-task-{}", i))
            .build()?;

        // The calling thread is not part of the pool, so it can block on the
        // barrier while the pool drains the spawned tasks.
        pool.in_place_scope(|s| {
            for job in jobs {
                s.spawn(move |_| {
                    if !collector.has_failed() {
                        run_guarded(job, ctx, collector);
                    }
                });
            }
            collector.wait()
        })
    }
}

fn worker_loop(id: usize, queue: &JobQueue, ctx: &RenderContext<'_>, collector: &ResultCollector) {
    let mut completed = 0usize;
    while !collector.has_failed() {
        let Some(job) = queue.pop() else {
            break;
        };
        run_guarded(job, ctx, collector);
        completed += 1;
    }
    log::debug!("Worker {} exiting after {} jobs", id, completed);
}

/// Render one job, reporting either its result or its panic to the collector.
fn run_guarded(job: Job, ctx: &RenderContext<'_>, collector: &ResultCollector) {
    let index = job.index;
    match panic::catch_unwind(AssertUnwindSafe(|| render_job(job, ctx))) {
        Ok(result) => collector.push(result),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            log::error!("Job {} panicked: {}", index, message);
            collector.fail(index, message);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
