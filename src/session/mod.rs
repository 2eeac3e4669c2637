use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Instant,
};

use log::{info, warn};

use crate::{
    async_task::AsyncTask,
    generation::{EditRequest, EditResult, ImageGenerator, QuickAction, ServiceError, ValidationError},
    ImageRef,
};

mod batch;
mod progress;

pub use batch::*;
pub use progress::*;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Another edit is still running")]
    Busy,

    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Submitting,
    ResultReady,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Editor,
    /// Before/after view of the latest result
    Comparison,
}

/// Emitted by [`EditSession::update`] when a submission finished.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    ResultReady(EditResult),
    Failed(ServiceError),
    BatchFinished { successes: usize, total: usize },
}

enum Job {
    Single {
        task: AsyncTask<Result<EditResult, ServiceError>>,
        ticker: ProgressTicker,
    },
    Batch {
        task: AsyncTask<BatchOutcome>,
        attempted: Arc<AtomicUsize>,
        total: usize,
    },
}

/// Submits edits for one editing view and keeps what came back.
/// Only one submission runs at a time, there is no cancellation.
pub struct EditSession {
    generator: Arc<dyn ImageGenerator + Send + Sync>,
    progress_settings: ProgressSettings,
    state: SessionState,
    job: Option<Job>,
    progress: u8,
    results: Vec<EditResult>,
    last_batch: Option<BatchOutcome>,
    view_mode: ViewMode,
}

impl EditSession {
    pub fn new(
        generator: Arc<dyn ImageGenerator + Send + Sync>,
        progress_settings: ProgressSettings,
    ) -> Self {
        Self {
            generator,
            progress_settings,
            state: SessionState::Idle,
            job: None,
            progress: 0,
            results: Vec::new(),
            last_batch: None,
            view_mode: ViewMode::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.job.is_some()
    }

    /// 0..=100, cosmetic for single submissions, attempted items for batches.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn results(&self) -> &[EditResult] {
        &self.results
    }

    pub fn latest_result(&self) -> Option<&EditResult> {
        self.results.last()
    }

    pub fn last_batch(&self) -> Option<&BatchOutcome> {
        self.last_batch.as_ref()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn submit_single(&mut self, request: EditRequest, now: Instant) -> Result<(), EditError> {
        self.ensure_idle()?;
        request.validate()?;

        info!(
            "Submitting {:?} edit for {:?}",
            request.edit_type(),
            request.source()
        );
        let task = AsyncTask::new(self.generator.generate(&request));
        self.start(Job::Single {
            task,
            ticker: ProgressTicker::start(now, &self.progress_settings),
        });
        Ok(())
    }

    pub fn submit_quick_action(
        &mut self,
        action: QuickAction,
        source: impl Into<ImageRef>,
        now: Instant,
    ) -> Result<(), EditError> {
        info!("Quick action {}", action.label());
        self.submit_single(action.request(source), now)
    }

    pub fn submit_batch(
        &mut self,
        sources: Vec<ImageRef>,
        template: EditRequest,
    ) -> Result<(), EditError> {
        self.ensure_idle()?;
        template.validate_instruction()?;
        if sources.is_empty() {
            return Err(ValidationError::NoImages.into());
        }

        info!("Starting batch of {} images", sources.len());
        let attempted = Arc::new(AtomicUsize::new(0));
        let total = sources.len();
        let task = AsyncTask::new(run_batch(
            self.generator.clone(),
            sources,
            template,
            attempted.clone(),
        ));
        self.start(Job::Batch {
            task,
            attempted,
            total,
        });
        Ok(())
    }

    /// Frame hook: advances progress and collects a finished submission.
    pub fn update(&mut self, now: Instant) -> Option<SessionEvent> {
        let event = match self.job.as_mut()? {
            Job::Single { task, ticker } => match task.poll_ready() {
                None => {
                    self.progress = ticker.value(now);
                    return None;
                }
                Some(Ok(result)) => {
                    info!("Edit finished with {} image(s)", result.images.len());
                    self.results.push(result.clone());
                    self.state = SessionState::ResultReady;
                    self.view_mode = ViewMode::Comparison;
                    SessionEvent::ResultReady(result)
                }
                Some(Err(e)) => {
                    warn!("Edit failed: {e}");
                    self.state = SessionState::Failed(e.to_string());
                    SessionEvent::Failed(e)
                }
            },
            Job::Batch {
                task,
                attempted,
                total,
            } => match task.poll_ready() {
                None => {
                    let done = attempted.load(Ordering::Relaxed).min(*total);
                    self.progress = (done * 100 / (*total).max(1)) as u8;
                    return None;
                }
                Some(outcome) => {
                    let (successes, total) = (outcome.successes(), outcome.total());
                    info!("Batch finished: {}", outcome.summary());
                    self.results.extend(outcome.results().cloned());
                    self.state = if successes > 0 {
                        self.view_mode = ViewMode::Comparison;
                        SessionState::ResultReady
                    } else {
                        SessionState::Failed(outcome.summary())
                    };
                    self.last_batch = Some(outcome);
                    SessionEvent::BatchFinished { successes, total }
                }
            },
        };
        self.job = None;
        self.progress = 100;
        Some(event)
    }

    /// Leaves a finished state, results are kept.
    pub fn dismiss(&mut self) {
        if !self.is_busy() {
            self.state = SessionState::Idle;
            self.progress = 0;
        }
    }

    /// Drops results and returns to the editor, e.g. when the view is closed.
    pub fn clear_results(&mut self) {
        if !self.is_busy() {
            self.results.clear();
            self.last_batch = None;
            self.view_mode = ViewMode::Editor;
            self.state = SessionState::Idle;
            self.progress = 0;
        }
    }

    fn ensure_idle(&self) -> Result<(), EditError> {
        if self.is_busy() {
            Err(EditError::Busy)
        } else {
            Ok(())
        }
    }

    fn start(&mut self, job: Job) {
        self.job = Some(job);
        self.state = SessionState::Submitting;
        self.progress = 0;
    }
}
