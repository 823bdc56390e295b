//! Message types for communication between the capture controller and the
//! surface driving it

use crate::capture::ScanState;
use crate::error::ErrorKind;
use crate::vision::prefilter::PrefilterReading;

/// Commands sent from the consumer to the capture controller
#[derive(Debug, Clone)]
pub enum ScanCommand {
    /// Force a capture of the current frame, bypassing the confidence gate
    Capture,
    /// Abort the session and release the camera
    Cancel,
}

/// Events emitted by the capture controller
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// The session moved to a new state
    StateChanged(ScanState),
    /// A frame was assessed by the visual prefilter
    FrameAssessed {
        reading: PrefilterReading,
        candidate: bool,
    },
    /// An exploratory recognition call finished
    RecognitionOutcome {
        is_receipt: bool,
        strong_matches: usize,
        weak_matches: usize,
        error: Option<ErrorKind>,
    },
    /// Items extracted from the final frame, in receipt order
    ItemsExtracted(Vec<String>),
    /// The session ended in failure; emitted once, after the `Failed` state
    /// change, with the user-facing classification
    SessionFailed { error: ErrorKind },
}
