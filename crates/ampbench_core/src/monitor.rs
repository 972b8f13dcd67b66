//! Live Capture Monitor
//!
//! Optional background worker that keeps a live display responsive:
//! it repeatedly acquires a capture, runs the analyzer, and publishes the
//! newest reading into a single slot that consumers poll at their own
//! cadence. Independent of the batch sweep orchestrator; shares the
//! analyzer.
//!
//! # Architecture
//!
//! ```text
//! owner thread                        worker thread
//!   start() ──spawn───────────────▶  loop {
//!   latest() ◀──single slot (RwLock)──  acquire → analyze → publish
//!   poll_event() ◀──channel──────────  sleep(interval)
//!   stop()/drop ──AtomicBool───────▶  } → Stopped event, exit
//! ```
//!
//! Exactly one writer (the worker) updates the slot; readers only clone a
//! snapshot and never block on an in-progress acquisition. Shutdown is
//! cooperative: the flag is checked once per cycle and the owner joins the
//! worker, so release is deterministic.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use ampbench_dsp::{vpp, vrms, AnalysisResult, HarmonicAnalyzer};

use crate::error::{CoreError, CoreResult};
use crate::instrument::SampleSource;

/// Events sent from the worker to the owning thread
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    /// Worker loop is up
    Started,

    /// Worker exited its loop (after `stop()` or drop)
    Stopped,

    /// One acquire/analyze cycle failed; the previous reading was kept
    CycleFailed { reason: String },
}

/// Latest completed acquire/analyze result
#[derive(Debug, Clone)]
pub struct MonitorReading {
    pub analysis: AnalysisResult,

    /// RMS voltage of the capture
    pub vrms: f64,

    /// Peak-to-peak voltage of the capture
    pub vpp: f64,

    /// Monotonic cycle counter, lets a consumer detect fresh data
    pub sequence: u64,

    pub captured_at: DateTime<Utc>,
}

/// Handle to the background capture worker
///
/// Lives on the owning (UI) thread; the worker holds clones of the shared
/// slot and shutdown flag.
pub struct CaptureMonitor {
    worker: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    latest: Arc<RwLock<Option<MonitorReading>>>,
    event_receiver: Receiver<MonitorEvent>,
}

impl CaptureMonitor {
    /// Spawn the worker and start the acquire/analyze loop
    pub fn start<S>(
        source: S,
        analyzer: HarmonicAnalyzer,
        interval: Duration,
    ) -> CoreResult<Self>
    where
        S: SampleSource + Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let latest: Arc<RwLock<Option<MonitorReading>>> = Arc::new(RwLock::new(None));
        let (event_sender, event_receiver) = unbounded::<MonitorEvent>();

        let worker_shutdown = Arc::clone(&shutdown);
        let worker_latest = Arc::clone(&latest);

        let worker = thread::Builder::new()
            .name("ampbench-monitor".into())
            .spawn(move || {
                worker_main(
                    source,
                    analyzer,
                    interval,
                    worker_shutdown,
                    worker_latest,
                    event_sender,
                );
            })
            .map_err(|e| CoreError::WorkerSpawn(e.to_string()))?;

        Ok(Self {
            worker: Some(worker),
            shutdown,
            latest,
            event_receiver,
        })
    }

    /// Snapshot of the most recently completed reading
    ///
    /// Never blocks on an in-progress acquisition; returns `None` until the
    /// first cycle completes.
    pub fn latest(&self) -> Option<MonitorReading> {
        self.latest.read().clone()
    }

    /// Get next worker event (non-blocking)
    pub fn poll_event(&self) -> Option<MonitorEvent> {
        self.event_receiver.try_recv().ok()
    }

    /// Stop the worker at its next cycle boundary and join it
    pub fn stop(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CaptureMonitor {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}

fn worker_main<S: SampleSource>(
    mut source: S,
    analyzer: HarmonicAnalyzer,
    interval: Duration,
    shutdown: Arc<AtomicBool>,
    latest: Arc<RwLock<Option<MonitorReading>>>,
    event_sender: Sender<MonitorEvent>,
) {
    info!("capture monitor worker started");
    let _ = event_sender.send(MonitorEvent::Started);

    let mut sequence = 0u64;
    // Shutdown flag is the cycle boundary: checked once per iteration
    while !shutdown.load(Ordering::SeqCst) {
        match source.acquire() {
            Ok(capture) => {
                let analysis = analyzer.analyze(&capture, None);
                let volts = capture.volts();
                let reading = MonitorReading {
                    analysis,
                    vrms: vrms(volts),
                    vpp: vpp(volts),
                    sequence,
                    captured_at: Utc::now(),
                };
                sequence += 1;
                *latest.write() = Some(reading);
                debug!(sequence, "monitor reading published");
            }
            Err(e) => {
                warn!(error = %e, "monitor cycle failed, keeping previous reading");
                let _ = event_sender.send(MonitorEvent::CycleFailed {
                    reason: e.to_string(),
                });
            }
        }

        thread::sleep(interval);
    }

    let _ = event_sender.send(MonitorEvent::Stopped);
    info!("capture monitor worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::AcquireError;
    use ampbench_dsp::{CaptureSample, NumericCapability};
    use std::time::Instant;

    const TAU: f64 = 2.0 * std::f64::consts::PI;

    fn tone_source() -> impl FnMut() -> Result<CaptureSample, AcquireError> {
        || {
            let fs = 50_000.0;
            let volts: Vec<f64> = (0..1024)
                .map(|i| (TAU * 1000.0 * i as f64 / fs).sin())
                .collect();
            Ok(CaptureSample::from_amplitudes(volts, fs))
        }
    }

    /// Poll until `predicate` holds or the deadline passes
    fn wait_for(deadline: Duration, mut predicate: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if predicate() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_monitor_publishes_readings() {
        let analyzer = HarmonicAnalyzer::with_defaults(NumericCapability::full());
        let monitor =
            CaptureMonitor::start(tone_source(), analyzer, Duration::from_millis(1)).unwrap();

        assert!(
            wait_for(Duration::from_secs(2), || monitor.latest().is_some()),
            "worker should publish a reading"
        );

        let reading = monitor.latest().unwrap();
        assert!((reading.analysis.f0_estimate_hz - 1000.0).abs() < 50.0);
        assert!(reading.vpp > 1.5 && reading.vpp < 2.5);
        assert!(reading.vrms > 0.5 && reading.vrms < 1.0);

        monitor.stop();
    }

    #[test]
    fn test_monitor_sequence_advances() {
        let analyzer = HarmonicAnalyzer::with_defaults(NumericCapability::full());
        let monitor =
            CaptureMonitor::start(tone_source(), analyzer, Duration::from_millis(1)).unwrap();

        assert!(wait_for(Duration::from_secs(2), || monitor.latest().is_some()));
        let first = monitor.latest().unwrap().sequence;
        assert!(
            wait_for(Duration::from_secs(2), || {
                monitor.latest().map(|r| r.sequence > first).unwrap_or(false)
            }),
            "sequence should advance between cycles"
        );

        monitor.stop();
    }

    #[test]
    fn test_monitor_start_stop_events() {
        let analyzer = HarmonicAnalyzer::with_defaults(NumericCapability::full());
        let monitor =
            CaptureMonitor::start(tone_source(), analyzer, Duration::from_millis(1)).unwrap();

        assert!(wait_for(Duration::from_secs(2), || monitor.latest().is_some()));

        let receiver = monitor.event_receiver.clone();
        monitor.stop();

        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        assert_eq!(events.first(), Some(&MonitorEvent::Started));
        assert_eq!(events.last(), Some(&MonitorEvent::Stopped));
    }

    #[test]
    fn test_monitor_failure_keeps_previous_reading() {
        let analyzer = HarmonicAnalyzer::with_defaults(NumericCapability::full());

        // First cycle succeeds, everything after fails
        let mut calls = 0;
        let source = move || {
            calls += 1;
            if calls == 1 {
                Ok(CaptureSample::from_amplitudes(vec![0.5; 1024], 50_000.0))
            } else {
                Err(AcquireError::Io("scope unplugged".into()))
            }
        };

        let monitor =
            CaptureMonitor::start(source, analyzer, Duration::from_millis(1)).unwrap();

        assert!(wait_for(Duration::from_secs(2), || monitor.latest().is_some()));
        assert!(
            wait_for(Duration::from_secs(2), || {
                matches!(
                    monitor.poll_event(),
                    Some(MonitorEvent::CycleFailed { .. })
                )
            }),
            "failed cycles should surface as events"
        );

        // Reading from the good cycle is still there
        let reading = monitor.latest().unwrap();
        assert_eq!(reading.sequence, 0);

        monitor.stop();
    }

    #[test]
    fn test_monitor_drop_joins_worker() {
        let analyzer = HarmonicAnalyzer::with_defaults(NumericCapability::full());
        let monitor =
            CaptureMonitor::start(tone_source(), analyzer, Duration::from_millis(1)).unwrap();
        drop(monitor); // Should shut down cleanly without hanging
    }

    #[test]
    fn test_stub_analyzer_monitor() {
        // Degraded hosts still get live vrms/vpp and placeholder analysis
        let analyzer = HarmonicAnalyzer::with_defaults(NumericCapability::degraded());
        let monitor =
            CaptureMonitor::start(tone_source(), analyzer, Duration::from_millis(1)).unwrap();

        assert!(wait_for(Duration::from_secs(2), || monitor.latest().is_some()));
        let reading = monitor.latest().unwrap();
        assert_eq!(reading.analysis.thd_ratio, 0.0);
        assert_eq!(reading.analysis.f0_estimate_hz, 1000.0);

        monitor.stop();
    }
}
