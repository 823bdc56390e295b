//! Capture Layer
//!
//! The state machine that decides, frame by frame, whether the camera is
//! pointed at a receipt, throttles recognition calls, freezes the final
//! frame, and extracts line items from it. The controller owns the camera
//! stream for the lifetime of one scan attempt and releases it on every
//! exit path.

pub mod frame;

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::extract;
use crate::capture::frame::{CameraStream, Frame};
use crate::config::{AppConfig, CaptureSettings};
use crate::error::{ErrorKind, ScanError};
use crate::shared::messages::{ScanCommand, ScanEvent};
use crate::vision::prefilter;
use crate::vision::recognition::Recognize;
use crate::vision::scorer;

/// States of one scan attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// No resources held
    Idle,
    /// Camera stream open, frame loop running
    Scanning,
    /// Exactly one exploratory recognition call in flight
    Analyzing,
    /// A final frame has been frozen
    Captured,
    /// High-fidelity recognition running on the final frame
    Extracting,
    Done,
    Cancelled,
    Failed,
}

impl ScanState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanState::Done | ScanState::Cancelled | ScanState::Failed)
    }
}

/// Result of a completed session
#[derive(Debug)]
pub enum ScanOutcome {
    /// Items extracted from the final frame, in receipt order
    Completed { items: Vec<String> },
    /// The session was cancelled before a frame was captured
    Cancelled,
}

/// What interrupted the wait for an exploratory recognition result
enum AnalyzeInterrupt {
    Result(crate::vision::recognition::RecognitionResult),
    ManualCapture,
    Cancelled,
}

/// The stateful entity for one scan attempt.
///
/// All session-scoped flags live here rather than in ambient state; the
/// session is created when scanning starts and its stream is released on
/// every exit path.
struct CaptureSession {
    id: Uuid,
    state: ScanState,
    stream: Option<Box<dyn CameraStream>>,
    last_recognition: Option<Instant>,
    recognition_in_flight: bool,
    attempts: u32,
}

impl CaptureSession {
    fn new(stream: Box<dyn CameraStream>) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: ScanState::Idle,
            stream: Some(stream),
            last_recognition: None,
            recognition_in_flight: false,
            attempts: 0,
        }
    }

    /// Release the camera stream. Safe to call more than once; only the
    /// first call reaches the device.
    fn release_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.release();
            debug!(session = %self.id, "camera stream released");
        }
    }

    fn throttle_elapsed(&self, min_interval: Duration) -> bool {
        self.last_recognition
            .map_or(true, |at| at.elapsed() >= min_interval)
    }
}

/// Orchestrates prefilter, throttled recognition, scoring, and the freeze
/// decision for one scan session.
pub struct CaptureController<R: Recognize> {
    session: CaptureSession,
    recognition: R,
    settings: CaptureSettings,
    scan_deadline: Duration,
    final_deadline: Duration,
    commands: mpsc::Receiver<ScanCommand>,
    commands_closed: bool,
    events: mpsc::Sender<ScanEvent>,
    cancel: CancellationToken,
}

impl<R: Recognize> CaptureController<R> {
    pub fn new(
        stream: Box<dyn CameraStream>,
        recognition: R,
        config: &AppConfig,
        commands: mpsc::Receiver<ScanCommand>,
        events: mpsc::Sender<ScanEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            session: CaptureSession::new(stream),
            recognition,
            settings: config.capture.clone(),
            scan_deadline: config.recognition.scan_deadline(),
            final_deadline: config.recognition.final_deadline(),
            commands,
            commands_closed: false,
            events,
            cancel,
        }
    }

    /// Drive the session to a terminal state.
    ///
    /// The camera stream is released exactly once on every exit path,
    /// including errors.
    pub async fn run(mut self) -> Result<ScanOutcome, ScanError> {
        info!(session = %self.session.id, "scan session starting");

        let outcome = self.drive().await;
        self.session.release_stream();

        match &outcome {
            Ok(ScanOutcome::Completed { items }) => {
                info!(session = %self.session.id, items = items.len(), "scan session complete");
            }
            Ok(ScanOutcome::Cancelled) => {
                info!(session = %self.session.id, "scan session cancelled");
            }
            Err(e) => {
                if self.session.state != ScanState::Failed {
                    self.set_state(ScanState::Failed).await;
                }
                self.emit(ScanEvent::SessionFailed { error: e.kind() }).await;
                warn!(session = %self.session.id, error = %e, "scan session failed");
            }
        }

        outcome
    }

    async fn drive(&mut self) -> Result<ScanOutcome, ScanError> {
        self.set_state(ScanState::Scanning).await;

        let mut ticker = tokio::time::interval(self.settings.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    self.set_state(ScanState::Cancelled).await;
                    return Ok(ScanOutcome::Cancelled);
                }
                cmd = self.commands.recv(), if !self.commands_closed => {
                    match cmd {
                        Some(ScanCommand::Capture) => {
                            info!(session = %self.session.id, "manual capture requested");
                            return self.capture_and_extract().await;
                        }
                        Some(ScanCommand::Cancel) => self.cancel.cancel(),
                        None => self.commands_closed = true,
                    }
                }
                _ = ticker.tick() => {
                    if let Some(outcome) = self.on_tick().await? {
                        return Ok(outcome);
                    }
                }
            }
        }
    }

    /// One scanning tick: prefilter the live frame and, when it passes the
    /// gate and the throttle allows, run an exploratory recognition pass.
    async fn on_tick(&mut self) -> Result<Option<ScanOutcome>, ScanError> {
        let frame = self.grab_frame()?;

        let reading = prefilter::assess(&frame);
        let candidate = reading.is_candidate();
        self.emit(ScanEvent::FrameAssessed { reading, candidate }).await;

        if !candidate {
            return Ok(None);
        }
        if self.session.recognition_in_flight {
            return Ok(None);
        }
        if !self
            .session
            .throttle_elapsed(self.settings.min_recognition_interval())
        {
            return Ok(None);
        }

        self.analyze(frame).await
    }

    /// Run one exploratory recognition pass over `frame` and decide whether
    /// to freeze.
    async fn analyze(&mut self, frame: Frame) -> Result<Option<ScanOutcome>, ScanError> {
        self.set_state(ScanState::Analyzing).await;
        self.session.recognition_in_flight = true;
        self.session.attempts += 1;
        self.session.last_recognition = Some(Instant::now());

        let interrupt = {
            let recognize = self.recognition.recognize(&frame, self.scan_deadline);
            tokio::pin!(recognize);

            loop {
                tokio::select! {
                    _ = self.cancel.cancelled() => break AnalyzeInterrupt::Cancelled,
                    cmd = self.commands.recv(), if !self.commands_closed => {
                        match cmd {
                            Some(ScanCommand::Capture) => break AnalyzeInterrupt::ManualCapture,
                            Some(ScanCommand::Cancel) => self.cancel.cancel(),
                            None => self.commands_closed = true,
                        }
                    }
                    result = &mut recognize => break AnalyzeInterrupt::Result(result),
                }
            }
            // The recognition future is dropped here; an interrupted call
            // can never deliver a result into the session afterwards.
        };
        self.session.recognition_in_flight = false;

        let result = match interrupt {
            AnalyzeInterrupt::Cancelled => {
                self.set_state(ScanState::Cancelled).await;
                return Ok(Some(ScanOutcome::Cancelled));
            }
            AnalyzeInterrupt::ManualCapture => {
                info!(session = %self.session.id, "manual capture requested");
                return self.capture_and_extract().await.map(Some);
            }
            AnalyzeInterrupt::Result(result) => result,
        };

        if result.succeeded {
            let verdict = scorer::score(&result.text);
            self.emit(ScanEvent::RecognitionOutcome {
                is_receipt: verdict.is_receipt,
                strong_matches: verdict.strong_matches,
                weak_matches: verdict.weak_matches,
                error: None,
            })
            .await;

            if verdict.is_receipt {
                info!(
                    session = %self.session.id,
                    strong = verdict.strong_matches,
                    weak = verdict.weak_matches,
                    "receipt detected, freezing frame"
                );
                return self.capture_and_extract().await.map(Some);
            }

            debug!(session = %self.session.id, "text did not look like a receipt, resuming scan");
        } else {
            let kind = result.error_kind.unwrap_or(ErrorKind::TransportFailure);
            self.emit(ScanEvent::RecognitionOutcome {
                is_receipt: false,
                strong_matches: 0,
                weak_matches: 0,
                error: Some(kind),
            })
            .await;

            if kind == ErrorKind::DecodeFailure {
                self.set_state(ScanState::Failed).await;
                return Err(ScanError::Decode(
                    "frame could not be encoded for recognition".to_string(),
                ));
            }

            // Transport problems during exploration recover locally; the
            // throttle timestamp is already set, so the loop backs off.
            debug!(session = %self.session.id, %kind, "exploratory recognition failed, resuming scan");
        }

        if self.settings.max_attempts > 0 && self.session.attempts >= self.settings.max_attempts {
            self.set_state(ScanState::Failed).await;
            return Err(ScanError::NoTextFound);
        }

        self.set_state(ScanState::Scanning).await;
        Ok(None)
    }

    /// Freeze a fresh grab of the scene, stop scanning, and run the
    /// authoritative recognition pass over it.
    ///
    /// The exploratory pass may have seen a lossy frame; the frozen frame is
    /// re-grabbed so the final pass works on full fidelity.
    async fn capture_and_extract(&mut self) -> Result<ScanOutcome, ScanError> {
        self.set_state(ScanState::Captured).await;

        let final_frame = self.grab_frame()?;
        self.session.release_stream();

        self.set_state(ScanState::Extracting).await;

        let result = tokio::select! {
            _ = self.cancel.cancelled() => {
                self.set_state(ScanState::Cancelled).await;
                return Ok(ScanOutcome::Cancelled);
            }
            result = self.recognition.recognize(&final_frame, self.final_deadline) => result,
        };

        if !result.succeeded {
            let kind = result.error_kind.unwrap_or(ErrorKind::TransportFailure);
            self.set_state(ScanState::Failed).await;
            return Err(match kind {
                ErrorKind::NoTextFound => ScanError::NoTextFound,
                other => ScanError::Recognition(other),
            });
        }

        let items = extract::extract(&result.text);
        if items.is_empty() {
            self.set_state(ScanState::Failed).await;
            return Err(ScanError::NoTextFound);
        }

        self.set_state(ScanState::Done).await;
        self.emit(ScanEvent::ItemsExtracted(items.clone())).await;
        info!(session = %self.session.id, items = items.len(), "extraction complete");

        Ok(ScanOutcome::Completed { items })
    }

    fn grab_frame(&mut self) -> Result<Frame, ScanError> {
        match self.session.stream.as_mut() {
            Some(stream) => stream.grab(),
            None => Err(ScanError::StreamUnavailable),
        }
    }

    async fn set_state(&mut self, state: ScanState) {
        if self.session.state == state {
            return;
        }
        debug!(
            session = %self.session.id,
            from = ?self.session.state,
            to = ?state,
            "state transition"
        );
        self.session.state = state;
        let _ = self.events.send(ScanEvent::StateChanged(state)).await;
    }

    async fn emit(&self, event: ScanEvent) {
        let _ = self.events.send(event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::vision::recognition::RecognitionResult;

    fn test_config(tick_ms: u64, min_interval_ms: u64) -> AppConfig {
        let mut config = AppConfig::default();
        config.capture.tick_interval_ms = tick_ms;
        config.capture.min_recognition_interval_ms = min_interval_ms;
        config
    }

    /// White frame with a dark pixel every fifth position; passes the
    /// prefilter gate like printed receipt paper.
    fn receipt_frame() -> Frame {
        let (width, height) = (64u32, 64u32);
        let mut data = vec![255u8; (width * height * 4) as usize];
        for pixel_index in 0..(width * height) as usize {
            if pixel_index % 5 == 4 {
                let base = pixel_index * 4;
                data[base] = 0;
                data[base + 1] = 0;
                data[base + 2] = 0;
            }
        }
        Frame::new(data, width, height)
    }

    fn dark_frame() -> Frame {
        Frame::new(vec![0u8; 64 * 64 * 4], 64, 64)
    }

    struct FakeStream {
        frame: Frame,
        releases: Arc<AtomicUsize>,
    }

    impl CameraStream for FakeStream {
        fn grab(&mut self) -> Result<Frame, ScanError> {
            Ok(self.frame.clone())
        }

        fn release(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct ScriptedRecognizer {
        responses: Mutex<VecDeque<RecognitionResult>>,
        delay: Duration,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        call_times: Mutex<Vec<Instant>>,
    }

    impl ScriptedRecognizer {
        fn new(responses: Vec<RecognitionResult>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                delay,
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                call_times: Mutex::new(Vec::new()),
            })
        }
    }

    impl Recognize for Arc<ScriptedRecognizer> {
        fn recognize(
            &self,
            _frame: &Frame,
            _deadline: Duration,
        ) -> impl Future<Output = RecognitionResult> + Send {
            let this = Arc::clone(self);
            async move {
                this.calls.fetch_add(1, Ordering::SeqCst);
                this.call_times.lock().unwrap().push(Instant::now());

                let current = this.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                this.max_in_flight.fetch_max(current, Ordering::SeqCst);

                struct InFlightGuard(Arc<ScriptedRecognizer>);
                impl Drop for InFlightGuard {
                    fn drop(&mut self) {
                        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
                    }
                }
                let _guard = InFlightGuard(Arc::clone(&this));

                tokio::time::sleep(this.delay).await;

                this.responses
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or_else(|| RecognitionResult::failure(ErrorKind::TransportFailure))
            }
        }
    }

    struct Harness {
        command_tx: mpsc::Sender<ScanCommand>,
        event_rx: mpsc::Receiver<ScanEvent>,
        cancel: CancellationToken,
        releases: Arc<AtomicUsize>,
        controller: CaptureController<Arc<ScriptedRecognizer>>,
    }

    fn harness(
        frame: Frame,
        recognizer: Arc<ScriptedRecognizer>,
        config: AppConfig,
    ) -> Harness {
        let releases = Arc::new(AtomicUsize::new(0));
        let stream = FakeStream {
            frame,
            releases: Arc::clone(&releases),
        };
        let (command_tx, command_rx) = mpsc::channel(8);
        let (event_tx, event_rx) = mpsc::channel(1024);
        let cancel = CancellationToken::new();

        let controller = CaptureController::new(
            Box::new(stream),
            recognizer,
            &config,
            command_rx,
            event_tx,
            cancel.clone(),
        );

        Harness {
            command_tx,
            event_rx,
            cancel,
            releases,
            controller,
        }
    }

    fn drain_states(event_rx: &mut mpsc::Receiver<ScanEvent>) -> Vec<ScanState> {
        let mut states = Vec::new();
        while let Ok(event) = event_rx.try_recv() {
            if let ScanEvent::StateChanged(state) = event {
                states.push(state);
            }
        }
        states
    }

    #[tokio::test]
    async fn test_dark_frames_never_trigger_recognition() {
        let recognizer = ScriptedRecognizer::new(vec![], Duration::ZERO);
        let mut h = harness(dark_frame(), Arc::clone(&recognizer), test_config(5, 20));

        let cancel = h.cancel.clone();
        let handle = tokio::spawn(h.controller.run());

        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();

        let outcome = handle.await.unwrap().unwrap();
        assert!(matches!(outcome, ScanOutcome::Cancelled));
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.releases.load(Ordering::SeqCst), 1);

        let mut assessed = 0;
        while let Ok(event) = h.event_rx.try_recv() {
            if let ScanEvent::FrameAssessed { candidate, .. } = event {
                assert!(!candidate);
                assessed += 1;
            }
        }
        assert!(assessed > 0);
    }

    #[tokio::test]
    async fn test_recognition_calls_are_serialized_and_throttled() {
        let responses =
            vec![RecognitionResult::success("plain page of words".to_string()); 16];
        let recognizer = ScriptedRecognizer::new(responses, Duration::from_millis(20));
        let h = harness(receipt_frame(), Arc::clone(&recognizer), test_config(5, 60));

        let cancel = h.cancel.clone();
        let handle = tokio::spawn(h.controller.run());

        tokio::time::sleep(Duration::from_millis(250)).await;
        cancel.cancel();
        let outcome = handle.await.unwrap().unwrap();
        assert!(matches!(outcome, ScanOutcome::Cancelled));

        assert_eq!(recognizer.max_in_flight.load(Ordering::SeqCst), 1);

        let times = recognizer.call_times.lock().unwrap();
        assert!(times.len() >= 2, "expected multiple throttled attempts");
        for pair in times.windows(2) {
            assert!(
                pair[1] - pair[0] >= Duration::from_millis(55),
                "recognition calls closer than the minimum interval"
            );
        }
    }

    #[tokio::test]
    async fn test_receipt_text_freezes_and_extracts() {
        let responses = vec![
            RecognitionResult::success("SUBTOTAL 10.00\nTOTAL 12.00".to_string()),
            RecognitionResult::success("Milk\n\nBread 2.50\nx\nEGGS".to_string()),
        ];
        let recognizer = ScriptedRecognizer::new(responses, Duration::from_millis(5));
        let mut h = harness(receipt_frame(), Arc::clone(&recognizer), test_config(5, 10));

        let outcome = h.controller.run().await.unwrap();
        let ScanOutcome::Completed { items } = outcome else {
            panic!("expected a completed scan");
        };
        assert_eq!(items, vec!["Milk", "Bread 2.50", "EGGS"]);

        // Exploratory pass plus the final high-fidelity pass
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 2);
        assert_eq!(h.releases.load(Ordering::SeqCst), 1);

        let states = drain_states(&mut h.event_rx);
        assert_eq!(
            states,
            vec![
                ScanState::Scanning,
                ScanState::Analyzing,
                ScanState::Captured,
                ScanState::Extracting,
                ScanState::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_cancel_mid_analyzing_releases_and_discards() {
        let responses = vec![RecognitionResult::success("TOTAL 5.00".to_string())];
        let recognizer = ScriptedRecognizer::new(responses, Duration::from_millis(500));
        let mut h = harness(receipt_frame(), Arc::clone(&recognizer), test_config(5, 10));

        let cancel = h.cancel.clone();
        let handle = tokio::spawn(h.controller.run());

        // Wait until the recognition call is actually in flight
        loop {
            match h.event_rx.recv().await.expect("controller hung up") {
                ScanEvent::StateChanged(ScanState::Analyzing) => break,
                _ => continue,
            }
        }
        cancel.cancel();

        let started = Instant::now();
        let outcome = handle.await.unwrap().unwrap();
        assert!(matches!(outcome, ScanOutcome::Cancelled));
        assert!(
            started.elapsed() < Duration::from_millis(400),
            "cancellation waited for the in-flight call"
        );
        assert_eq!(h.releases.load(Ordering::SeqCst), 1);

        // The discarded call must not surface any result after cancellation
        let mut saw_cancelled = false;
        while let Ok(event) = h.event_rx.try_recv() {
            match event {
                ScanEvent::StateChanged(state) => {
                    assert!(!saw_cancelled, "event after terminal state");
                    if state == ScanState::Cancelled {
                        saw_cancelled = true;
                    }
                }
                ScanEvent::RecognitionOutcome { .. } | ScanEvent::ItemsExtracted(_) => {
                    panic!("recognition result leaked past cancellation");
                }
                ScanEvent::SessionFailed { .. } => {
                    panic!("cancellation must not report a failure");
                }
                ScanEvent::FrameAssessed { .. } => {}
            }
        }
        assert!(saw_cancelled);
    }

    #[tokio::test]
    async fn test_manual_capture_bypasses_prefilter_and_scorer() {
        // Dark frame: the prefilter would never let this through
        let responses = vec![RecognitionResult::success(
            "three random lines\nanother line".to_string(),
        )];
        let recognizer = ScriptedRecognizer::new(responses, Duration::from_millis(5));
        let h = harness(dark_frame(), Arc::clone(&recognizer), test_config(5, 10));

        h.command_tx.send(ScanCommand::Capture).await.unwrap();

        let outcome = h.controller.run().await.unwrap();
        let ScanOutcome::Completed { items } = outcome else {
            panic!("expected a completed scan");
        };
        assert_eq!(items, vec!["three random lines", "another line"]);

        // Only the final pass ran; no exploratory call was spent
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancel_command_is_honoured() {
        let recognizer = ScriptedRecognizer::new(vec![], Duration::ZERO);
        let h = harness(dark_frame(), Arc::clone(&recognizer), test_config(5, 20));

        h.command_tx.send(ScanCommand::Cancel).await.unwrap();

        let outcome = h.controller.run().await.unwrap();
        assert!(matches!(outcome, ScanOutcome::Cancelled));
        assert_eq!(h.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_final_pass_fails_session() {
        let responses = vec![RecognitionResult::failure(ErrorKind::NoTextFound)];
        let recognizer = ScriptedRecognizer::new(responses, Duration::from_millis(5));
        let mut h = harness(dark_frame(), Arc::clone(&recognizer), test_config(5, 10));

        h.command_tx.send(ScanCommand::Capture).await.unwrap();

        let result = h.controller.run().await;
        assert!(matches!(result, Err(ScanError::NoTextFound)));
        assert_eq!(h.releases.load(Ordering::SeqCst), 1);

        let mut states = Vec::new();
        let mut failure = None;
        while let Ok(event) = h.event_rx.try_recv() {
            match event {
                ScanEvent::StateChanged(state) => states.push(state),
                ScanEvent::SessionFailed { error } => failure = Some(error),
                _ => {}
            }
        }
        assert_eq!(states.last(), Some(&ScanState::Failed));
        assert_eq!(failure, Some(ErrorKind::NoTextFound));
    }

    #[tokio::test]
    async fn test_transport_failure_during_analyzing_recovers() {
        let responses = vec![
            RecognitionResult::failure(ErrorKind::TransportTimeout),
            RecognitionResult::success("TOTAL 9.99".to_string()),
            RecognitionResult::success("Coffee\nOat Milk".to_string()),
        ];
        let recognizer = ScriptedRecognizer::new(responses, Duration::from_millis(5));
        let h = harness(receipt_frame(), Arc::clone(&recognizer), test_config(5, 10));

        let outcome = h.controller.run().await.unwrap();
        let ScanOutcome::Completed { items } = outcome else {
            panic!("expected the loop to recover and complete");
        };
        assert_eq!(items, vec!["Coffee", "Oat Milk"]);
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_max_attempts_bounds_the_session() {
        let responses =
            vec![RecognitionResult::success("plain page of words".to_string()); 4];
        let recognizer = ScriptedRecognizer::new(responses, Duration::from_millis(5));
        let mut config = test_config(5, 10);
        config.capture.max_attempts = 2;
        let h = harness(receipt_frame(), Arc::clone(&recognizer), config);

        let result = h.controller.run().await;
        assert!(matches!(result, Err(ScanError::NoTextFound)));
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 2);
        assert_eq!(h.releases.load(Ordering::SeqCst), 1);
    }
}
