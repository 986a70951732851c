use std::sync::Arc;

use log::{info, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::error::ConfigError;
use crate::model::{RunState, UploadJob};
use crate::services::SubtitleUploadService;

/// What the controller wants the worker to do at the next task boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Run,
    Pause,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Processing,
    Completed,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    Task { index: usize, status: TaskStatus },
    /// Sent exactly once, after the last task event.
    Finished { success: bool, state: RunState },
}

/// Pause/resume/cancel for a running job. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PipelineControl {
    control: Arc<watch::Sender<Control>>,
    state: watch::Receiver<RunState>,
}

impl PipelineControl {
    /// Current run state. A pending pause or cancel shows up right away even
    /// though the worker only acts on it between tasks.
    pub fn state(&self) -> RunState {
        let state = *self.state.borrow();
        if state.is_terminal() {
            return state;
        }
        match *self.control.borrow() {
            Control::Run => RunState::Running,
            Control::Pause => RunState::Paused,
            Control::Cancel => RunState::Cancelled,
        }
    }

    pub fn pause(&self) -> bool {
        if self.state() != RunState::Running {
            return false;
        }
        self.transition(Control::Run, Control::Pause)
    }

    pub fn resume(&self) -> bool {
        if self.state() != RunState::Paused {
            return false;
        }
        self.transition(Control::Pause, Control::Run)
    }

    /// No-op once the run has ended.
    pub fn cancel(&self) -> bool {
        if !matches!(self.state(), RunState::Running | RunState::Paused) {
            return false;
        }
        self.control.send_if_modified(|control| {
            if *control == Control::Cancel {
                false
            } else {
                *control = Control::Cancel;
                true
            }
        })
    }

    fn transition(&self, from: Control, to: Control) -> bool {
        self.control.send_if_modified(|control| {
            if *control == from {
                *control = to;
                true
            } else {
                false
            }
        })
    }
}

pub struct PipelineHandle {
    control: PipelineControl,
    events: mpsc::UnboundedReceiver<PipelineEvent>,
    join: JoinHandle<UploadJob>,
}

impl PipelineHandle {
    pub fn control(&self) -> PipelineControl {
        self.control.clone()
    }

    pub fn state(&self) -> RunState {
        self.control.state()
    }

    pub async fn next_event(&mut self) -> Option<PipelineEvent> {
        self.events.recv().await
    }

    /// Waits for the worker and returns the state the run ended in.
    pub async fn wait(self) -> RunState {
        match self.join.await {
            Ok(job) => job.state(),
            Err(e) => {
                warn!("Upload worker ended abnormally: {}", e);
                RunState::Failed
            }
        }
    }
}

pub struct UploadPipeline {
    service: Arc<dyn SubtitleUploadService>,
}

impl UploadPipeline {
    pub fn new(service: Arc<dyn SubtitleUploadService>) -> Self {
        Self { service }
    }

    /// Hands the job to a new worker task. Must be called inside a tokio runtime.
    pub fn start(&self, mut job: UploadJob) -> Result<PipelineHandle, ConfigError> {
        if job.state() != RunState::Idle {
            return Err(ConfigError::AlreadyStarted(job.state()));
        }
        if job.is_empty() {
            return Err(ConfigError::EmptyJob);
        }

        job.set_state(RunState::Running);
        let (control_tx, control_rx) = watch::channel(Control::Run);
        let (state_tx, state_rx) = watch::channel(RunState::Running);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        info!("Starting upload of {} subtitle(s)", job.len());
        let service = self.service.clone();
        let join = tokio::spawn(run_job(job, service, control_rx, state_tx, events_tx));

        Ok(PipelineHandle {
            control: PipelineControl {
                control: Arc::new(control_tx),
                state: state_rx,
            },
            events: events_rx,
            join,
        })
    }
}

/// Blocks at a task boundary while paused. Returns false if the run should stop.
async fn wait_until_runnable(
    control: &mut watch::Receiver<Control>,
    state: &watch::Sender<RunState>,
) -> bool {
    let current = *control.borrow_and_update();
    match current {
        Control::Run => true,
        Control::Cancel => false,
        Control::Pause => {
            state.send_replace(RunState::Paused);
            info!("Upload paused");
            let next = control.wait_for(|c| *c != Control::Pause).await.map(|c| *c);
            match next {
                Ok(Control::Run) => {
                    state.send_replace(RunState::Running);
                    info!("Upload resumed");
                    true
                }
                // Cancelled while paused, or every controller was dropped.
                _ => false,
            }
        }
    }
}

async fn run_job(
    mut job: UploadJob,
    service: Arc<dyn SubtitleUploadService>,
    mut control: watch::Receiver<Control>,
    state: watch::Sender<RunState>,
    events: mpsc::UnboundedSender<PipelineEvent>,
) -> UploadJob {
    // A closed receiver only means nobody is listening any more.
    let emit = |event: PipelineEvent| {
        let _ = events.send(event);
    };

    let mut outcome = RunState::Completed;

    for (index, task) in job.tasks().iter().enumerate() {
        if !wait_until_runnable(&mut control, &state).await {
            info!("Upload cancelled before task {}", index + 1);
            outcome = RunState::Cancelled;
            break;
        }

        emit(PipelineEvent::Task {
            index,
            status: TaskStatus::Processing,
        });

        match service.upload(task).await {
            Ok(true) => emit(PipelineEvent::Task {
                index,
                status: TaskStatus::Completed,
            }),
            Ok(false) => {
                warn!("Upload of {} was not accepted", task.file_name());
                emit(PipelineEvent::Task {
                    index,
                    status: TaskStatus::Failed("upload was not accepted".to_string()),
                });
                outcome = RunState::Failed;
                break;
            }
            Err(e) => {
                warn!("Upload of {} failed: {}", task.file_name(), e);
                emit(PipelineEvent::Task {
                    index,
                    status: TaskStatus::Failed(e.to_string()),
                });
                outcome = RunState::Failed;
                break;
            }
        }
    }

    // A cancel accepted while the last task was in flight still counts.
    if outcome == RunState::Completed && *control.borrow() == Control::Cancel {
        info!("Upload cancelled during the last task");
        outcome = RunState::Cancelled;
    }

    job.set_state(outcome);
    state.send_replace(outcome);
    info!("Upload finished: {:?}", outcome);
    emit(PipelineEvent::Finished {
        success: outcome == RunState::Completed,
        state: outcome,
    });

    job
}
