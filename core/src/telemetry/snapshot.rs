//! telemetry/snapshot.rs
//! Immutable telemetry snapshot returned from encode/decode.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{Stage, StageTimes, TelemetryTimer};
use crate::types::PgpError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub counters: TelemetryCounters,
    /// compressed / plaintext; can exceed 1.0 for incompressible input.
    pub compression_ratio: f64,
    pub throughput_plaintext_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(counters: &TelemetryCounters, timer: &TelemetryTimer) -> Self {
        let elapsed = timer.elapsed();

        let compression_ratio = if counters.bytes_plaintext > 0 {
            counters.bytes_compressed as f64 / counters.bytes_plaintext as f64
        } else {
            0.0
        };

        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_plaintext as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            counters: counters.clone(),
            compression_ratio,
            throughput_plaintext_bytes_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    /// Charge work done outside the pipeline timer (key lookup) to `stage`.
    pub fn add_outer_stage(&mut self, stage: Stage, dur: Duration) {
        self.stage_times.add(stage, dur);
        self.elapsed += dur;
    }

    pub fn total_stage_time(&self) -> Duration {
        self.stage_times.total()
    }

    pub fn has_all_stages(&self, expected: &[Stage]) -> bool {
        self.stage_times.has_all(expected)
    }

    /// Internal consistency: stage times fit inside the elapsed time.
    pub fn sanity_check(&self) -> bool {
        self.total_stage_time() <= self.elapsed
    }

    pub fn output_bytes(&self) -> u64 {
        self.counters.bytes_ciphertext
    }

    pub fn to_json(&self) -> Result<String, PgpError> {
        serde_json::to_string(self).map_err(|e| PgpError::Config(format!("telemetry serialization failed: {}", e)))
    }
}
