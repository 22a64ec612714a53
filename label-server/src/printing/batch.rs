//! Batch print jobs
//!
//! 批量打印任务管理：
//!
//! - 同一时间只允许一个运行中的任务 (single-flight)
//! - 每个任务在独立的 tokio task 中执行，进度事件通过 mpsc 通道推送
//! - 取消通过 `CancellationToken` 实现，行间暂停期间也能立即响应
//! - 任务结束时 (包括 panic) 一定会被标记为 done
//!
//! # 事件顺序
//!
//! ```text
//! started -> (printing -> printed)* -> done
//!                      \-> error        (dispatch 失败，立即结束)
//!          \-> cancelled                (行首或暂停期间检测到取消)
//! ```

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::Mutex;
use shared::models::{
    BatchEvent, BatchJobStatus, BatchPrintRequest, LabelSettings, PrintOutcome, PrintRow,
    WidgetDescriptor,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::error::DispatchResult;
use super::resolver::PrinterResolver;
use super::template::substitute;
use crate::utils::AppError;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Another batch job is already running")]
    AlreadyRunning,

    #[error("Job not found")]
    NotFound(String),

    #[error("{0}")]
    Invalid(&'static str),
}

pub type BatchResult<T> = Result<T, BatchError>;

impl From<BatchError> for AppError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::AlreadyRunning => AppError::batch_running(),
            BatchError::NotFound(job_id) => AppError::job_not_found(job_id),
            BatchError::Invalid(msg) => AppError::validation(msg),
        }
    }
}

/// Sends one fully expanded label somewhere
#[async_trait]
pub trait LabelDispatcher: Send + Sync {
    async fn dispatch(
        &self,
        widgets: &[WidgetDescriptor],
        settings: &LabelSettings,
    ) -> DispatchResult<PrintOutcome>;
}

#[async_trait]
impl LabelDispatcher for PrinterResolver {
    async fn dispatch(
        &self,
        widgets: &[WidgetDescriptor],
        settings: &LabelSettings,
    ) -> DispatchResult<PrintOutcome> {
        self.resolve(settings.printer_selection(), widgets, settings)
            .await
    }
}

/// 单个批量任务最多打印的标签数 (rows × copies)
pub const MAX_BATCH_LABELS: usize = 10_000;

/// Each row repeated `copies` times, consecutively
///
/// Copies are produced on the fly; only the rows are stored.
#[derive(Debug, Clone)]
pub struct PrintSequence {
    rows: Vec<PrintRow>,
    copies: usize,
}

impl PrintSequence {
    /// `copies` below 1 means 1; `None` when the label count exceeds
    /// [`MAX_BATCH_LABELS`]
    pub fn new(rows: Vec<PrintRow>, copies: i64) -> Option<Self> {
        let copies = usize::try_from(copies.max(1)).ok()?;
        let total = rows.len().checked_mul(copies)?;
        (total <= MAX_BATCH_LABELS).then_some(Self { rows, copies })
    }

    pub fn len(&self) -> usize {
        self.rows.len() * self.copies
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PrintRow> + '_ {
        self.rows
            .iter()
            .flat_map(move |row| std::iter::repeat_n(row, self.copies))
    }
}

/// Pause between labels; negative, NaN and infinite all mean none
pub fn clamp_pause(seconds: f64) -> Duration {
    if seconds.is_finite() && seconds > 0.0 {
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

/// An admitted job: its id and the event stream
#[derive(Debug)]
pub struct BatchJob {
    pub job_id: String,
    pub total: usize,
    pub events: mpsc::Receiver<BatchEvent>,
}

#[derive(Debug)]
struct JobEntry {
    cancel: CancellationToken,
    done: bool,
    finished_at: Option<Instant>,
}

/// Registry and executor for batch jobs
#[derive(Debug)]
pub struct BatchJobManager {
    jobs: Mutex<HashMap<String, JobEntry>>,
    /// 已完成任务在注册表中保留的时间
    retention: Duration,
    event_buffer: usize,
}

impl BatchJobManager {
    pub fn new(retention: Duration, event_buffer: usize) -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            retention,
            event_buffer: event_buffer.max(1),
        }
    }

    /// Admit a job and start executing it in the background
    #[instrument(skip_all, fields(rows = request.rows.len(), copies = request.copies))]
    pub fn start(
        self: &Arc<Self>,
        request: BatchPrintRequest,
        dispatcher: Arc<dyn LabelDispatcher>,
    ) -> BatchResult<BatchJob> {
        if request.widgets.is_empty() {
            return Err(BatchError::Invalid("No widgets provided"));
        }
        if request.rows.is_empty() {
            return Err(BatchError::Invalid("No rows provided"));
        }
        request.settings.validate().map_err(BatchError::Invalid)?;
        let sequence = PrintSequence::new(request.rows, request.copies)
            .ok_or(BatchError::Invalid("Too many labels in one batch"))?;

        let cancel = CancellationToken::new();
        let job_id = {
            let mut jobs = self.jobs.lock();
            if jobs.values().any(|job| !job.done) {
                return Err(BatchError::AlreadyRunning);
            }

            self.evict_expired(&mut jobs);

            let job_id = uuid::Uuid::new_v4().simple().to_string();
            jobs.insert(
                job_id.clone(),
                JobEntry {
                    cancel: cancel.clone(),
                    done: false,
                    finished_at: None,
                },
            );
            job_id
        };
        // Armed as soon as the entry exists, so nothing below can leave it running
        let finish = FinishGuard {
            manager: Arc::clone(self),
            job_id: job_id.clone(),
        };

        let total = sequence.len();
        let pause = clamp_pause(request.pause_time);
        let (tx, rx) = mpsc::channel(self.event_buffer);

        info!(job_id = %job_id, total, pause_ms = pause.as_millis() as u64, "Batch job started");

        let execution = Execution {
            job_id: job_id.clone(),
            widgets: request.widgets,
            settings: request.settings,
            sequence,
            pause,
            cancel,
            dispatcher,
        };

        tokio::spawn(async move {
            let events = tx;
            // Dropped before `events`, so the job is done once the stream ends
            let _finish = finish;
            execution.run(&events).await;
        });

        Ok(BatchJob {
            job_id,
            total,
            events: rx,
        })
    }

    /// Request cancellation; idempotent, harmless once the job is done
    pub fn cancel(&self, job_id: &str) -> BatchResult<()> {
        let jobs = self.jobs.lock();
        let job = jobs
            .get(job_id)
            .ok_or_else(|| BatchError::NotFound(job_id.to_string()))?;
        job.cancel.cancel();
        info!(job_id, done = job.done, "Batch job cancel requested");
        Ok(())
    }

    pub fn status(&self, job_id: &str) -> BatchResult<BatchJobStatus> {
        let jobs = self.jobs.lock();
        let job = jobs
            .get(job_id)
            .ok_or_else(|| BatchError::NotFound(job_id.to_string()))?;
        Ok(BatchJobStatus {
            job_id: job_id.to_string(),
            cancelled: job.cancel.is_cancelled(),
            done: job.done,
        })
    }

    /// Id of the job currently running, if any
    pub fn running(&self) -> Option<String> {
        self.jobs
            .lock()
            .iter()
            .find(|(_, job)| !job.done)
            .map(|(id, _)| id.clone())
    }

    /// Cancel every running job (shutdown)
    pub fn cancel_all(&self) {
        for job in self.jobs.lock().values().filter(|job| !job.done) {
            job.cancel.cancel();
        }
    }

    fn finish(&self, job_id: &str) {
        if let Some(job) = self.jobs.lock().get_mut(job_id) {
            job.done = true;
            job.finished_at = Some(Instant::now());
        }
        debug!(job_id, "Batch job finalized");
    }

    fn evict_expired(&self, jobs: &mut HashMap<String, JobEntry>) {
        let before = jobs.len();
        jobs.retain(|_, job| match job.finished_at {
            Some(at) => !job.done || at.elapsed() < self.retention,
            None => true,
        });
        let evicted = before - jobs.len();
        if evicted > 0 {
            debug!(evicted, "Evicted finished batch jobs");
        }
    }
}

/// Marks the job done on every exit path, unwinding included
struct FinishGuard {
    manager: Arc<BatchJobManager>,
    job_id: String,
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.manager.finish(&self.job_id);
    }
}

struct Execution {
    job_id: String,
    widgets: Vec<WidgetDescriptor>,
    settings: LabelSettings,
    sequence: PrintSequence,
    pause: Duration,
    cancel: CancellationToken,
    dispatcher: Arc<dyn LabelDispatcher>,
}

/// Receiver dropped; the client went away
struct Disconnected;

impl Execution {
    async fn run(self, events: &mpsc::Sender<BatchEvent>) {
        let job_id = self.job_id.clone();
        match self.execute(events).await {
            Ok(()) => {}
            Err(Disconnected) => {
                // Stop exactly as a cancel would
                self.cancel.cancel();
                warn!(job_id = %job_id, "Batch event consumer disconnected, job stopped");
            }
        }
    }

    async fn execute(&self, events: &mpsc::Sender<BatchEvent>) -> Result<(), Disconnected> {
        let total = self.sequence.len();
        emit(
            events,
            BatchEvent::Started {
                job_id: self.job_id.clone(),
                total,
            },
        )
        .await?;

        for (index, row) in self.sequence.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!(job_id = %self.job_id, printed = index, "Batch job cancelled");
                return emit(events, BatchEvent::Cancelled { printed: index }).await;
            }

            emit(events, BatchEvent::Printing { index, total }).await?;

            let widgets = substitute(&self.widgets, row);
            let dispatched = AssertUnwindSafe(self.dispatcher.dispatch(&widgets, &self.settings))
                .catch_unwind()
                .await;
            match dispatched {
                Ok(Ok(outcome)) => {
                    debug!(job_id = %self.job_id, index, printer_id = %outcome.printer_id, "Label printed");
                }
                Err(panic) => {
                    error!(job_id = %self.job_id, index, panic = panic_message(&*panic), "Batch dispatch panicked");
                    return emit(
                        events,
                        BatchEvent::Error {
                            index,
                            message: "Internal error".to_string(),
                        },
                    )
                    .await;
                }
                Ok(Err(e)) => {
                    if e.is_unexpected() {
                        error!(job_id = %self.job_id, index, error = %e, "Batch dispatch failed");
                    } else {
                        warn!(job_id = %self.job_id, index, error = %e, "Batch dispatch failed");
                    }
                    return emit(
                        events,
                        BatchEvent::Error {
                            index,
                            message: e.client_message(),
                        },
                    )
                    .await;
                }
            }

            emit(events, BatchEvent::Printed { index, total }).await?;

            if index + 1 < total && !self.pause.is_zero() {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        info!(job_id = %self.job_id, printed = index + 1, "Batch job cancelled during pause");
                        return emit(events, BatchEvent::Cancelled { printed: index + 1 }).await;
                    }
                    _ = events.closed() => return Err(Disconnected),
                    _ = tokio::time::sleep(self.pause) => {}
                }
            }
        }

        info!(job_id = %self.job_id, total, "Batch job finished");
        emit(events, BatchEvent::Done { total }).await
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

async fn emit(events: &mpsc::Sender<BatchEvent>, event: BatchEvent) -> Result<(), Disconnected> {
    events.send(event).await.map_err(|_| Disconnected)
}
