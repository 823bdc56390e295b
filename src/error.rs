//! Error taxonomy for the scan pipeline

use thiserror::Error;

/// Why a recognition or catalog call produced no usable result.
///
/// Carried inside soft-failure results so the scan loop can decide whether
/// to retry locally, surface the problem, or abort the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// Camera or media access was denied; surfaced immediately, never retried
    #[error("access to the camera or media source was denied")]
    PermissionDenied,
    /// The remote call did not finish within its deadline
    #[error("the recognition service did not respond in time")]
    TransportTimeout,
    /// Connection failure, non-2xx status, or malformed payload
    #[error("the remote service call failed")]
    TransportFailure,
    /// Recognition succeeded but returned empty or unusable text
    #[error("no readable text found in image")]
    NoTextFound,
    /// A frame could not be decoded or encoded
    #[error("the frame could not be decoded")]
    DecodeFailure,
}

/// Fatal errors that terminate a capture session
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("camera or media access denied: {0}")]
    PermissionDenied(String),

    #[error("frame could not be decoded: {0}")]
    Decode(String),

    #[error("camera stream is no longer available")]
    StreamUnavailable,

    #[error("recognition failed on the final pass: {0}")]
    Recognition(ErrorKind),

    #[error("no readable text found in image")]
    NoTextFound,
}

impl ScanError {
    /// The classification surfaced to event-stream consumers when this
    /// error ends a session
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScanError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            ScanError::Decode(_) | ScanError::StreamUnavailable => ErrorKind::DecodeFailure,
            ScanError::Recognition(kind) => *kind,
            ScanError::NoTextFound => ErrorKind::NoTextFound,
        }
    }
}
