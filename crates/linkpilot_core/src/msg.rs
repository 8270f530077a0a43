use crate::{JobHandle, Page, ProgressUpdate, ResultStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the link input (one source page per line).
    InputChanged(String),
    /// User submitted the current input as a new job.
    LinksSubmitted,
    /// Backend accepted the submission.
    JobAccepted { job: JobHandle },
    /// Submission request failed or was refused.
    SubmissionFailed { message: String },
    /// Progress event from the job's push channel.
    ProgressReceived {
        job: JobHandle,
        update: ProgressUpdate,
    },
    /// Terminal success of the push channel.
    JobCompleted { job: JobHandle, store: ResultStore },
    /// Terminal failure of the push channel.
    StreamFailed { job: JobHandle, message: String },
    /// User moved the delay slider.
    DelayChanged(u32),
    AutoOpenStartClicked,
    /// Pause when running, resume when paused.
    PauseClicked,
    StopClicked,
    /// One-second tick of the countdown armed with `generation`.
    CountdownTick { generation: u64 },
    /// User opened a single result outside the scheduler.
    OpenSingleClicked { index: usize },
    ExportClicked { epoch_millis: i64 },
    ExportWritten { path: String },
    ExportFailed { message: String },
    Navigate(Page),
    NewSessionClicked,
    /// Fallback for placeholder wiring.
    NoOp,
}
