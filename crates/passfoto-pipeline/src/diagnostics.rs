//! Per-operation diagnostics: timing and payload sizes.
//!
//! Permanent instrumentation for every remote round-trip and the local
//! crop, intended for spotting slow service calls and oversized
//! payloads in the field. Timestamps are captured via the `web-time`
//! crate, which uses `performance.now()` on WASM and
//! `std::time::Instant` natively.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::Instant;

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// The instrumented operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Remote background removal.
    Segment,
    /// Remote background composition.
    Composite,
    /// Remote tonal adjustment.
    Adjust,
    /// Local crop + resample.
    Crop,
}

impl Operation {
    /// Lowercase operation name for log lines.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Segment => "segment",
            Self::Composite => "composite",
            Self::Adjust => "adjust",
            Self::Crop => "crop",
        }
    }
}

/// Diagnostics for one completed operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpDiagnostics {
    /// Which operation ran.
    pub operation: Operation,
    /// Wall-clock duration (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Size of the transmitted image payload.
    pub input_bytes: usize,
    /// Size of the returned image payload.
    pub output_bytes: usize,
    /// Coalescer sequence number, for adjust operations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
}

/// A running timer for one operation.
///
/// Started before the call, finished with the observed payload sizes:
///
/// ```rust
/// # use passfoto_pipeline::diagnostics::{Operation, OpTimer};
/// let timer = OpTimer::start(Operation::Segment, 1024);
/// // ... perform the call ...
/// let diagnostics = timer.finish(2048);
/// assert_eq!(diagnostics.input_bytes, 1024);
/// ```
#[derive(Debug)]
pub struct OpTimer {
    operation: Operation,
    input_bytes: usize,
    seq: Option<u64>,
    started: Instant,
}

impl OpTimer {
    /// Start timing an operation with the given input payload size.
    #[must_use]
    pub fn start(operation: Operation, input_bytes: usize) -> Self {
        Self {
            operation,
            input_bytes,
            seq: None,
            started: Instant::now(),
        }
    }

    /// Tag the timer with a coalescer sequence number.
    #[must_use]
    pub const fn with_seq(mut self, seq: u64) -> Self {
        self.seq = Some(seq);
        self
    }

    /// Stop the timer and produce the diagnostics record.
    #[must_use]
    pub fn finish(self, output_bytes: usize) -> OpDiagnostics {
        OpDiagnostics {
            operation: self.operation,
            duration: self.started.elapsed(),
            input_bytes: self.input_bytes,
            output_bytes,
            seq: self.seq,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn timer_records_operation_and_sizes() {
        let diagnostics = OpTimer::start(Operation::Composite, 100).finish(250);
        assert_eq!(diagnostics.operation, Operation::Composite);
        assert_eq!(diagnostics.input_bytes, 100);
        assert_eq!(diagnostics.output_bytes, 250);
        assert!(diagnostics.seq.is_none());
    }

    #[test]
    fn timer_carries_sequence_number() {
        let diagnostics = OpTimer::start(Operation::Adjust, 10).with_seq(7).finish(20);
        assert_eq!(diagnostics.seq, Some(7));
    }

    #[test]
    fn serde_round_trip_preserves_duration_as_seconds() {
        let diagnostics = OpDiagnostics {
            operation: Operation::Segment,
            duration: Duration::from_millis(1500),
            input_bytes: 1,
            output_bytes: 2,
            seq: None,
        };
        let json = serde_json::to_string(&diagnostics).unwrap();
        assert!(json.contains("\"duration\":1.5"), "json was {json}");
        let back: OpDiagnostics = serde_json::from_str(&json).unwrap();
        assert_eq!(back.duration, Duration::from_millis(1500));
    }

    #[test]
    fn operation_names_are_lowercase() {
        for op in [
            Operation::Segment,
            Operation::Composite,
            Operation::Adjust,
            Operation::Crop,
        ] {
            assert!(op.name().chars().all(|c| c.is_ascii_lowercase()));
        }
    }
}
