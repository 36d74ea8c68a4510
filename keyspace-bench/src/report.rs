//! Report generation for benchmark runs
//!
//! Renders a [`SuiteReport`] as a box-drawing table, plain text, one line per
//! scenario, or JSON.

use std::fmt::Write;
use std::str::FromStr;

use keyspace_common::MemoryStats;

use crate::scenario::{ScenarioReport, SuiteReport};

/// Report format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Pretty box-drawing format for terminal display
    #[default]
    Pretty,
    /// Simple text format
    Simple,
    /// Compact single-line-per-scenario format
    Compact,
    /// Machine-readable JSON
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(ReportFormat::Pretty),
            "simple" => Ok(ReportFormat::Simple),
            "compact" => Ok(ReportFormat::Compact),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format '{}'", other)),
        }
    }
}

/// Generate a formatted report
pub fn generate_report(report: &SuiteReport, format: ReportFormat) -> String {
    match format {
        ReportFormat::Pretty => generate_pretty_report(report),
        ReportFormat::Simple => generate_simple_report(report),
        ReportFormat::Compact => generate_compact_report(report),
        ReportFormat::Json => generate_json_report(report),
    }
}

fn status(passed: bool) -> &'static str {
    if passed {
        "PASSED"
    } else {
        "FAILED"
    }
}

fn generate_pretty_report(report: &SuiteReport) -> String {
    let mut out = String::new();
    let rule = "═".repeat(64);

    writeln!(out, "╔{}╗", rule).unwrap();
    writeln!(out, "║            KEYSPACE INVALIDATION BENCHMARK                     ║").unwrap();
    writeln!(out, "╠{}╣", rule).unwrap();
    writeln!(out, "║ Status:  {:<54}║", status(report.passed())).unwrap();
    writeln!(out, "║ Backend: {:<54}║", report.backend.to_string()).unwrap();
    writeln!(out, "║ Started: {:<54}║", report.started_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()).unwrap();
    writeln!(
        out,
        "║ Dataset: {:<54}║",
        format!(
            "{} groups x {} members ({} entries)",
            format_number(report.dataset.groups as u64),
            format_number(report.dataset.members_per_group as u64),
            format_number(report.dataset.entries)
        )
    )
    .unwrap();

    for scenario in &report.scenarios {
        writeln!(out, "╠{}╣", rule).unwrap();
        writeln!(
            out,
            "║ {:<63}║",
            format!("{} [{}]", scenario.strategy.as_str().to_uppercase(), status(scenario.passed))
        )
        .unwrap();
        writeln!(out, "║   Fill:          {:>14.1} ms                              ║", scenario.timings.fill_ms()).unwrap();
        writeln!(out, "║   Invalidate:    {:>14.3} ms                              ║", scenario.timings.invalidate_ms()).unwrap();
        writeln!(out, "║   Probe:         {:>14.1} μs                              ║", scenario.timings.probe_us()).unwrap();
        writeln!(out, "║   Keys before:   {:>14}                                 ║", format_number(scenario.keys_before_invalidate)).unwrap();
        writeln!(out, "║   Keys after:    {:>14}                                 ║", format_number(scenario.keys_after_invalidate)).unwrap();
        writeln!(out, "║   Unlinked:      {:>14}                                 ║", format_number(scenario.unlinked)).unwrap();
        for (label, value) in stat_highlights(&scenario.memory_stats) {
            writeln!(out, "║   {:<14} {:>14}                                 ║", label, value).unwrap();
        }
        for failure in &scenario.failures {
            let msg = if failure.chars().count() > 58 {
                format!("{}...", failure.chars().take(55).collect::<String>())
            } else {
                failure.clone()
            };
            writeln!(out, "║   - {:<59}║", msg).unwrap();
        }
    }

    writeln!(out, "╚{}╝", rule).unwrap();
    out
}

fn generate_simple_report(report: &SuiteReport) -> String {
    let mut out = String::new();

    writeln!(out, "=== KEYSPACE INVALIDATION BENCHMARK ===").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "Status: {}", status(report.passed())).unwrap();
    writeln!(out, "Backend: {}", report.backend).unwrap();
    writeln!(out, "Started: {}", report.started_at.to_rfc3339()).unwrap();
    writeln!(
        out,
        "Dataset: {} groups x {} members, {} entries, {} payload bytes",
        format_number(report.dataset.groups as u64),
        format_number(report.dataset.members_per_group as u64),
        format_number(report.dataset.entries),
        format_number(report.dataset.payload_bytes)
    )
    .unwrap();

    for scenario in &report.scenarios {
        writeln!(out).unwrap();
        write_simple_scenario(&mut out, scenario);
    }

    out
}

fn write_simple_scenario(out: &mut String, scenario: &ScenarioReport) {
    writeln!(out, "{} ({}):", scenario.strategy.as_str().to_uppercase(), status(scenario.passed)).unwrap();
    writeln!(out, "  Fill: {:.1} ms", scenario.timings.fill_ms()).unwrap();
    writeln!(
        out,
        "  Invalidate group {}: {:.3} ms",
        scenario.invalidated_group,
        scenario.timings.invalidate_ms()
    )
    .unwrap();
    writeln!(out, "  Probe: {:.1} μs ({} ns)", scenario.timings.probe_us(), scenario.timings.probe_ns()).unwrap();
    writeln!(
        out,
        "  Keys: {} -> {} (unlinked {})",
        format_number(scenario.keys_before_invalidate),
        format_number(scenario.keys_after_invalidate),
        format_number(scenario.unlinked)
    )
    .unwrap();

    if scenario.memory_stats.is_empty() {
        writeln!(out, "  Memory stats: none reported").unwrap();
    } else {
        writeln!(out, "  Memory stats:").unwrap();
        for (name, value) in scenario.memory_stats.entries() {
            writeln!(out, "    {}: {}", name, value).unwrap();
        }
    }

    if !scenario.failures.is_empty() {
        writeln!(out, "  FAILURES:").unwrap();
        for failure in &scenario.failures {
            writeln!(out, "    - {}", failure).unwrap();
        }
    }
}

fn generate_compact_report(report: &SuiteReport) -> String {
    report
        .scenarios
        .iter()
        .map(|s| {
            format!(
                "[{}] strategy={} fill={:.1}ms invalidate={:.3}ms probe={:.1}μs keys={}->{} unlinked={} allocated={}",
                if s.passed { "PASS" } else { "FAIL" },
                s.strategy,
                s.timings.fill_ms(),
                s.timings.invalidate_ms(),
                s.timings.probe_us(),
                format_number(s.keys_before_invalidate),
                format_number(s.keys_after_invalidate),
                format_number(s.unlinked),
                s.memory_stats
                    .total_allocated()
                    .map(format_number)
                    .unwrap_or_else(|| "-".to_string())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn generate_json_report(report: &SuiteReport) -> String {
    serde_json::to_string_pretty(report)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize report: {}\"}}", e))
}

/// Labelled memory figures shown in the pretty table
fn stat_highlights(stats: &MemoryStats) -> Vec<(&'static str, String)> {
    let mut rows = Vec::new();
    if let Some(v) = stats.total_allocated() {
        rows.push(("Allocated:", format_bytes(v)));
    }
    if let Some(v) = stats.peak_allocated() {
        rows.push(("Peak:", format_bytes(v)));
    }
    if let Some(v) = stats.dataset_bytes() {
        rows.push(("Dataset:", format_bytes(v)));
    }
    if let Some(v) = stats.keys_count() {
        rows.push(("Keys (stats):", format_number(v)));
    }
    if let Some(v) = stats.bytes_per_key() {
        rows.push(("Bytes/key:", format_number(v)));
    }
    if let Some(v) = stats.fragmentation_ratio() {
        rows.push(("Fragmentation:", format!("{:.2}", v)));
    }
    rows
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);

    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result
}

fn format_bytes(bytes: u64) -> String {
    const MIB: f64 = 1024.0 * 1024.0;
    if bytes as f64 >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB)
    } else {
        format!("{} B", format_number(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetSummary;
    use crate::strategy::StrategyKind;
    use crate::timing::PhaseTimings;
    use chrono::{TimeZone, Utc};
    use keyspace_common::{StatValue, StoreBackend};
    use std::time::Duration;

    fn scenario(strategy: StrategyKind, unlinked: u64) -> ScenarioReport {
        ScenarioReport {
            strategy,
            timings: PhaseTimings {
                fill: Duration::from_millis(81_647),
                invalidate: Duration::from_micros(1_250),
                probe: Duration::from_nanos(604_378),
            },
            invalidated_group: 1000,
            keys_before_invalidate: 2_000_000,
            keys_after_invalidate: 2_000_000 - unlinked,
            unlinked,
            probe_previous_found: true,
            fill_reads_checked: 30,
            memory_stats: MemoryStats::new(vec![
                ("total.allocated".to_string(), StatValue::Int(1_572_864_000)),
                ("keys.count".to_string(), StatValue::Int(1_998_000)),
                ("fragmentation".to_string(), StatValue::Float(1.07)),
            ]),
            passed: true,
            failures: Vec::new(),
        }
    }

    fn create_test_report() -> SuiteReport {
        SuiteReport {
            started_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
            backend: StoreBackend::Redis,
            dataset: DatasetSummary {
                groups: 1000,
                members_per_group: 2000,
                entries: 2_000_000,
                payload_bytes: 1_200_000_000,
            },
            scenarios: vec![
                scenario(StrategyKind::Flat, 2000),
                scenario(StrategyKind::Hashed, 1),
            ],
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
        assert_eq!(format_number(2_000_000), "2,000,000");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MiB");
    }

    #[test]
    fn test_report_format_parse() {
        assert_eq!("JSON".parse::<ReportFormat>(), Ok(ReportFormat::Json));
        assert_eq!("compact".parse::<ReportFormat>(), Ok(ReportFormat::Compact));
        assert!("xml".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_pretty_report() {
        let output = generate_report(&create_test_report(), ReportFormat::Pretty);

        assert!(output.contains("KEYSPACE INVALIDATION BENCHMARK"));
        assert!(output.contains("PASSED"));
        assert!(output.contains("FLAT [PASSED]"));
        assert!(output.contains("2,000,000"));
        assert!(output.contains("1500.0 MiB"));
        assert!(output.starts_with('╔'));
    }

    #[test]
    fn test_simple_report_lists_all_stats() {
        let output = generate_report(&create_test_report(), ReportFormat::Simple);

        assert!(output.contains("Status: PASSED"));
        assert!(output.contains("Invalidate group 1000: 1.250 ms"));
        assert!(output.contains("Probe: 604.4 μs (604378 ns)"));
        assert!(output.contains("unlinked 2,000"));
        assert!(output.contains("keys.count: 1998000"));
        assert!(output.contains("fragmentation: 1.07"));
    }

    #[test]
    fn test_compact_report() {
        let output = generate_report(&create_test_report(), ReportFormat::Compact);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[PASS] strategy=flat"));
        assert!(lines[0].contains("unlinked=2,000"));
        assert!(lines[1].contains("strategy=hashed"));
    }

    #[test]
    fn test_failed_scenario_is_reported() {
        let mut report = create_test_report();
        report.scenarios[1].passed = false;
        report.scenarios[1].failures.push("Fill took 81647.0ms, limit is 1000ms".to_string());

        let pretty = generate_report(&report, ReportFormat::Pretty);
        assert!(pretty.contains("Status:  FAILED"));
        assert!(pretty.contains("Fill took 81647.0ms"));

        let compact = generate_report(&report, ReportFormat::Compact);
        assert!(compact.contains("[FAIL] strategy=hashed"));
    }

    #[test]
    fn test_json_report() {
        let output = generate_report(&create_test_report(), ReportFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["backend"], "redis");
        assert_eq!(value["dataset"]["entries"], 2_000_000);
        assert_eq!(value["scenarios"][0]["strategy"], "flat");
        assert_eq!(value["scenarios"][1]["unlinked"], 1);
        assert_eq!(value["scenarios"][0]["memory_stats"][0][0], "total.allocated");
    }
}
