//! Run-level statistics, mirroring the original CLI's
//! `report_statistics(start_time_ns, trace_times, pages_processed,
//! total_files, total_timeouts)` report.

use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub submitted: u64,
    pub completed: u64,
    pub timed_out: u64,
    pub errored: u64,
    pub pages_processed: u64,
    /// Per-stage latencies (nanoseconds), accumulated across all completed
    /// jobs, for the mean/median report.
    pub stage_latencies_ns: BTreeMap<String, Vec<u64>>,
}

impl RunStats {
    pub fn record_completion(&mut self, stage_latencies: BTreeMap<String, u64>, pages: u64) {
        self.completed += 1;
        self.pages_processed += pages;
        for (stage, latency) in stage_latencies {
            self.stage_latencies_ns.entry(stage).or_default().push(latency);
        }
    }

    pub fn record_timeout(&mut self) {
        self.timed_out += 1;
    }

    pub fn record_error(&mut self) {
        self.errored += 1;
    }

    /// Exit code per the CLI surface: 0 success, 3 partial failure (any
    /// timeout or error), assuming no fatal broker/user-input error occurred
    /// (those abort earlier with codes 1/2).
    pub fn exit_code(&self) -> i32 {
        if self.timed_out > 0 || self.errored > 0 {
            3
        } else {
            0
        }
    }

    pub fn stage_mean_median(&self, stage: &str) -> Option<(Duration, Duration)> {
        let mut values = self.stage_latencies_ns.get(stage)?.clone();
        if values.is_empty() {
            return None;
        }
        values.sort_unstable();
        let mean_ns = values.iter().sum::<u64>() / values.len() as u64;
        let median_ns = values[values.len() / 2];
        Some((
            Duration::from_nanos(mean_ns),
            Duration::from_nanos(median_ns),
        ))
    }

    pub fn report(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "submitted={} completed={} timed_out={} errored={} pages_processed={}\n",
            self.submitted, self.completed, self.timed_out, self.errored, self.pages_processed
        ));
        for stage in self.stage_latencies_ns.keys() {
            if let Some((mean, median)) = self.stage_mean_median(stage) {
                out.push_str(&format!(
                    "  {stage}: mean={:.2}ms median={:.2}ms\n",
                    mean.as_secs_f64() * 1000.0,
                    median.as_secs_f64() * 1000.0
                ));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_is_zero_on_full_success() {
        let mut stats = RunStats::default();
        stats.record_completion(BTreeMap::new(), 1);
        assert_eq!(stats.exit_code(), 0);
    }

    #[test]
    fn exit_code_is_three_on_any_timeout() {
        let mut stats = RunStats::default();
        stats.record_completion(BTreeMap::new(), 1);
        stats.record_timeout();
        assert_eq!(stats.exit_code(), 3);
    }

    #[test]
    fn mean_median_of_single_value() {
        let mut stats = RunStats::default();
        let mut latencies = BTreeMap::new();
        latencies.insert("extract".to_string(), 1_000_000);
        stats.record_completion(latencies, 1);
        let (mean, median) = stats.stage_mean_median("extract").unwrap();
        assert_eq!(mean.as_millis(), 1);
        assert_eq!(median.as_millis(), 1);
    }
}
