//! Frame data structures and the camera-stream seam
//!
//! A `Frame` is one immutable bitmap snapshot. The `CameraStream` trait is
//! where the platform camera (or a file, or a test fake) plugs into the
//! capture controller; the controller owns the stream for the lifetime of a
//! session and releases it on every exit path.

use std::io::Cursor;
use std::path::Path;
use std::time::Instant;

use image::codecs::jpeg::JpegEncoder;

use crate::error::ScanError;

/// JPEG quality used when encoding frames for the recognition wire
const JPEG_QUALITY: u8 = 90;

/// A single bitmap sampled from a camera or file
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Timestamp when the frame was captured
    pub timestamp: Instant,
}

impl Frame {
    /// Create a new frame from raw RGBA data
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp: Instant::now(),
        }
    }

    /// Get frame dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Encode the frame as JPEG for the recognition request payload
    pub fn to_jpeg(&self) -> Result<Vec<u8>, ScanError> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| {
                ScanError::Decode("pixel buffer does not match frame dimensions".to_string())
            })?;

        // JPEG has no alpha channel
        let rgb = image::DynamicImage::ImageRgba8(img).to_rgb8();

        let mut out = Cursor::new(Vec::new());
        JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
            .encode_image(&rgb)
            .map_err(|e| ScanError::Decode(e.to_string()))?;

        Ok(out.into_inner())
    }
}

/// Source of live frames for one capture session.
///
/// Implementations own the underlying device handle. `release` must be safe
/// to call more than once; the controller guarantees it is invoked on every
/// exit path.
pub trait CameraStream: Send + Sync {
    /// Grab the current frame from the device
    fn grab(&mut self) -> Result<Frame, ScanError>;

    /// Release the underlying device handle
    fn release(&mut self);
}

/// A single decoded image standing in for a live camera.
///
/// Used for gallery/file scans; `grab` keeps returning the same frame until
/// the stream is released.
pub struct StillStream {
    frame: Option<Frame>,
}

impl StillStream {
    /// Decode an image file into a one-frame stream
    pub fn from_path(path: &Path) -> Result<Self, ScanError> {
        let img = image::open(path).map_err(|e| match &e {
            image::ImageError::IoError(io)
                if io.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                ScanError::PermissionDenied(format!("{}", path.display()))
            }
            _ => ScanError::Decode(e.to_string()),
        })?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Self {
            frame: Some(Frame::new(rgba.into_raw(), width, height)),
        })
    }

    /// Wrap an already-decoded frame
    pub fn from_frame(frame: Frame) -> Self {
        Self { frame: Some(frame) }
    }
}

impl CameraStream for StillStream {
    fn grab(&mut self) -> Result<Frame, ScanError> {
        self.frame.clone().ok_or(ScanError::StreamUnavailable)
    }

    fn release(&mut self) {
        self.frame = None;
    }
}
