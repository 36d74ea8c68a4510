//! Timing for the benchmark phases
//!
//! Bulk phases (fill, invalidate) are reported in milliseconds; the single
//! probe is reported in microseconds from a nanosecond-resolution source.

use serde::Serialize;
use std::time::{Duration, Instant};

use crate::config::ThresholdConfig;

/// Run `op` and return its result with the elapsed wall-clock time
pub fn measure<T>(op: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let result = op();
    (result, start.elapsed())
}

/// Elapsed time of each timed phase of one scenario
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PhaseTimings {
    #[serde(rename = "fill_ms", serialize_with = "as_millis")]
    pub fill: Duration,
    #[serde(rename = "invalidate_ms", serialize_with = "as_millis")]
    pub invalidate: Duration,
    #[serde(rename = "probe_us", serialize_with = "as_micros")]
    pub probe: Duration,
}

impl PhaseTimings {
    pub fn fill_ms(&self) -> f64 {
        millis(self.fill)
    }

    pub fn invalidate_ms(&self) -> f64 {
        millis(self.invalidate)
    }

    pub fn probe_us(&self) -> f64 {
        micros(self.probe)
    }

    pub fn probe_ns(&self) -> u128 {
        self.probe.as_nanos()
    }

    /// Threshold breaches, one message each
    pub fn breaches(&self, thresholds: &ThresholdConfig) -> Vec<String> {
        let mut breaches = Vec::new();

        if let Some(max) = thresholds.max_fill_ms {
            if self.fill_ms() > max as f64 {
                breaches.push(format!("Fill took {:.1}ms, limit is {}ms", self.fill_ms(), max));
            }
        }
        if let Some(max) = thresholds.max_invalidate_ms {
            if self.invalidate_ms() > max as f64 {
                breaches.push(format!(
                    "Invalidate took {:.1}ms, limit is {}ms",
                    self.invalidate_ms(),
                    max
                ));
            }
        }
        if let Some(max) = thresholds.max_probe_us {
            if self.probe_us() > max as f64 {
                breaches.push(format!(
                    "Probe took {:.1}μs, limit is {}μs",
                    self.probe_us(),
                    max
                ));
            }
        }

        breaches
    }
}

fn millis(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1_000_000.0
}

fn micros(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1_000.0
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(millis(*d))
}

fn as_micros<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(micros(*d))
}
