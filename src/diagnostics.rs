//! Stage timings recorded by the analyzer.

use serde::Serialize;
use std::time::Instant;

/// Wall-clock duration of one pipeline stage.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

/// Stage timings for one analysis run, in execution order.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    /// Run `f`, recording its duration under `label`.
    pub(crate) fn time<T>(&mut self, label: &str, f: impl FnOnce() -> T) -> T {
        let t0 = Instant::now();
        let out = f();
        self.stages.push(StageTiming {
            label: label.to_string(),
            elapsed_ms: elapsed_ms(t0),
        });
        out
    }
}

pub(crate) fn elapsed_ms(t0: Instant) -> f64 {
    t0.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_recorded_in_order() {
        let mut timing = TimingBreakdown::default();
        let n = timing.time("count", || 2 + 2);
        timing.time("rank", || ());
        assert_eq!(n, 4);
        let labels: Vec<&str> = timing.stages.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["count", "rank"]);
        assert!(timing.stages.iter().all(|s| s.elapsed_ms >= 0.0));

        let json = serde_json::to_value(&timing).unwrap();
        assert_eq!(json["stages"][1]["label"], "rank");
        assert!(json["stages"][0]["elapsedMs"].is_number());
        assert!(json["totalMs"].is_number());
    }
}
