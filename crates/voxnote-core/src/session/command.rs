use crate::{AnalysisTap, CoreResult, RecordingResult};

use tokio::sync::oneshot;

pub(crate) type ResultSender = oneshot::Sender<CoreResult<RecordingResult>>;
pub(crate) type ResultReceiver = oneshot::Receiver<CoreResult<RecordingResult>>;

/// Operations queued from [`CaptureSession`](crate::CaptureSession) handles
/// to the session task.
#[derive(Debug)]
pub(crate) enum SessionCommand {
    Start {
        reply: oneshot::Sender<CoreResult<()>>,
    },
    Stop {
        reply: oneshot::Sender<CoreResult<ResultReceiver>>,
    },
    Cancel,
    Teardown,
    IsRecording {
        reply: oneshot::Sender<bool>,
    },
    AnalysisTap {
        reply: oneshot::Sender<Option<AnalysisTap>>,
    },
}
