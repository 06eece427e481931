//! Per-scenario statistics and the formatted summary report.

use std::time::Duration;

/// Samples collected for one scenario by the measurement loop.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub durations: Vec<Duration>,
    pub alloc_bytes: Vec<u64>,
    /// Rows decoded by the most recent successful invocation.
    pub rows_decoded: u64,
    pub failed_iterations: u32,
}

impl ScenarioResult {
    pub fn new(scenario_name: &str) -> Self {
        Self {
            scenario_name: scenario_name.to_string(),
            durations: Vec::new(),
            alloc_bytes: Vec::new(),
            rows_decoded: 0,
            failed_iterations: 0,
        }
    }

    pub fn add_sample(&mut self, duration: Duration, bytes: u64, rows: u64) {
        self.durations.push(duration);
        self.alloc_bytes.push(bytes);
        self.rows_decoded = rows;
    }

    pub fn add_failure(&mut self) {
        self.failed_iterations += 1;
    }

    pub fn sample_count(&self) -> usize {
        self.durations.len()
    }

    pub fn mean_us(&self) -> f64 {
        if self.durations.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.durations.iter().map(|d| d.as_secs_f64() * 1e6).sum();
        sum / self.durations.len() as f64
    }

    pub fn std_dev_us(&self) -> f64 {
        if self.durations.len() < 2 {
            return 0.0;
        }
        let mean = self.mean_us();
        let var: f64 = self
            .durations
            .iter()
            .map(|d| {
                let us = d.as_secs_f64() * 1e6;
                (us - mean) * (us - mean)
            })
            .sum::<f64>()
            / (self.durations.len() - 1) as f64;
        var.sqrt()
    }

    /// Standard error of the mean.
    pub fn std_error_us(&self) -> f64 {
        if self.durations.is_empty() {
            return 0.0;
        }
        self.std_dev_us() / (self.durations.len() as f64).sqrt()
    }

    pub fn percentile_us(&self, pct: f64) -> f64 {
        if self.durations.is_empty() {
            return 0.0;
        }
        let mut sorted: Vec<f64> = self
            .durations
            .iter()
            .map(|d| d.as_secs_f64() * 1e6)
            .collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let idx = ((pct / 100.0) * (sorted.len() - 1) as f64).round() as usize;
        sorted[idx.min(sorted.len() - 1)]
    }

    pub fn mean_alloc_bytes(&self) -> f64 {
        if self.alloc_bytes.is_empty() {
            return 0.0;
        }
        self.alloc_bytes.iter().sum::<u64>() as f64 / self.alloc_bytes.len() as f64
    }
}

/// Print the human-readable summary for a completed run.
pub fn print_report(results: &[ScenarioResult]) {
    println!("\n{}", "=".repeat(100));
    println!("  PostgreSQL Call-Pattern Benchmark Report");
    println!("{}", "=".repeat(100));

    println!(
        "\n  {:38} {:>11} {:>9} {:>11} {:>11} {:>12} {:>9}",
        "Scenario", "Mean (µs)", "±SE (µs)", "p50 (µs)", "p95 (µs)", "Alloc (B)", "Rows"
    );
    println!("  {}", "-".repeat(96));

    for r in results {
        if r.sample_count() == 0 {
            println!(
                "  {:38} {:>11} ({} failed iterations)",
                r.scenario_name, "FAILED", r.failed_iterations
            );
            continue;
        }
        println!(
            "  {:38} {:>11.1} {:>9.1} {:>11.1} {:>11.1} {:>12.0} {:>9}",
            r.scenario_name,
            r.mean_us(),
            r.std_error_us(),
            r.percentile_us(50.0),
            r.percentile_us(95.0),
            r.mean_alloc_bytes(),
            r.rows_decoded,
        );
        if r.failed_iterations > 0 {
            println!(
                "  {:38} ({} failed iterations excluded)",
                "", r.failed_iterations
            );
        }
    }

    println!("\n{}", "=".repeat(100));
}

#[cfg(test)]
mod tests {
    use super::ScenarioResult;
    use std::time::Duration;

    fn result_with_us(samples: &[u64]) -> ScenarioResult {
        let mut r = ScenarioResult::new("test");
        for &us in samples {
            r.add_sample(Duration::from_micros(us), 0, 1);
        }
        r
    }

    #[test]
    fn mean_of_known_samples() {
        let r = result_with_us(&[100, 200, 300]);
        assert!((r.mean_us() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn percentiles_of_known_samples() {
        let r = result_with_us(&[10, 20, 30, 40, 50]);
        assert!((r.percentile_us(50.0) - 30.0).abs() < 1e-9);
        assert!((r.percentile_us(100.0) - 50.0).abs() < 1e-9);
        assert!((r.percentile_us(0.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn std_error_shrinks_with_sample_count() {
        let few = result_with_us(&[100, 300]);
        let many = result_with_us(&[100, 300, 100, 300, 100, 300, 100, 300]);
        assert!(many.std_error_us() < few.std_error_us());
    }

    #[test]
    fn empty_result_reports_zeroes() {
        let r = ScenarioResult::new("empty");
        assert_eq!(r.sample_count(), 0);
        assert_eq!(r.mean_us(), 0.0);
        assert_eq!(r.percentile_us(95.0), 0.0);
        assert_eq!(r.mean_alloc_bytes(), 0.0);
    }
}
