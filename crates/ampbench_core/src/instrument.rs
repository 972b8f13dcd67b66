//! Instrument Session Interface
//!
//! The seams between the sweep engine and the bench hardware. Real
//! implementations wrap a generator/scope driver pair; tests inject fakes.
//! Collaborators own their timeouts: a driver must return an error rather
//! than block indefinitely, because the engine adds no timeout of its own.

use thiserror::Error;

use ampbench_dsp::CaptureSample;

/// Errors from configuring the signal generator for one test point
///
/// Recovered by the orchestrator into a failed report entry; a configure
/// error never aborts a sweep.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("generator rejected settings: {0}")]
    Rejected(String),

    #[error("generator I/O failed: {0}")]
    Io(String),

    #[error("generator timed out after {ms} ms")]
    Timeout { ms: u64 },
}

/// Errors from acquiring a capture for one test point
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquireError {
    #[error("scope I/O failed: {0}")]
    Io(String),

    #[error("scope timed out after {ms} ms")]
    Timeout { ms: u64 },

    #[error("capture too short: {got} samples")]
    ShortCapture { got: usize },
}

/// One open connection to the bench for a sweep run
///
/// Non-reentrant by design: the orchestrator holds `&mut` and never
/// overlaps calls, so implementations are free to keep per-run state
/// (serial handles, armed-trigger flags) without internal locking.
pub trait InstrumentSession {
    /// Drive the generator to the given test frequency
    fn configure(&mut self, frequency_hz: f64) -> Result<(), ConfigError>;

    /// Capture one record at the given test frequency
    fn acquire(&mut self, frequency_hz: f64) -> Result<CaptureSample, AcquireError>;
}

/// Frequency-free acquisition for the live capture monitor
pub trait SampleSource {
    fn acquire(&mut self) -> Result<CaptureSample, AcquireError>;
}

/// Any `FnMut` closure works as a monitor source
impl<F> SampleSource for F
where
    F: FnMut() -> Result<CaptureSample, AcquireError>,
{
    fn acquire(&mut self) -> Result<CaptureSample, AcquireError> {
        (self)()
    }
}

/// Session assembled from two closures
///
/// Handy for tests and for callers that already have driver functions in
/// scope and do not want a dedicated session type.
pub struct FnSession<C, A> {
    configure: C,
    acquire: A,
}

impl<C, A> FnSession<C, A>
where
    C: FnMut(f64) -> Result<(), ConfigError>,
    A: FnMut(f64) -> Result<CaptureSample, AcquireError>,
{
    pub fn new(configure: C, acquire: A) -> Self {
        Self { configure, acquire }
    }
}

impl<C, A> InstrumentSession for FnSession<C, A>
where
    C: FnMut(f64) -> Result<(), ConfigError>,
    A: FnMut(f64) -> Result<CaptureSample, AcquireError>,
{
    fn configure(&mut self, frequency_hz: f64) -> Result<(), ConfigError> {
        (self.configure)(frequency_hz)
    }

    fn acquire(&mut self, frequency_hz: f64) -> Result<CaptureSample, AcquireError> {
        (self.acquire)(frequency_hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_session_dispatch() {
        let mut configured = Vec::new();
        let mut session = FnSession::new(
            |hz| {
                configured.push(hz);
                Ok(())
            },
            |hz| Ok(CaptureSample::from_amplitudes(vec![hz], 1000.0)),
        );

        session.configure(100.0).unwrap();
        let capture = session.acquire(100.0).unwrap();
        assert_eq!(capture.volts(), &[100.0]);
        drop(session);
        assert_eq!(configured, vec![100.0]);
    }

    #[test]
    fn test_closure_sample_source() {
        let mut calls = 0;
        let mut source = || {
            calls += 1;
            Ok(CaptureSample::from_amplitudes(vec![0.5], 1000.0))
        };
        assert!(SampleSource::acquire(&mut source).is_ok());
        assert!(SampleSource::acquire(&mut source).is_ok());
        drop(source);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::Timeout { ms: 1500 };
        assert!(err.to_string().contains("1500"));

        let err = AcquireError::ShortCapture { got: 3 };
        assert!(err.to_string().contains("3 samples"));
    }
}
