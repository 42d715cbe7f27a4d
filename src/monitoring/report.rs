/*!
 * Scheduler Performance Report
 *
 * Derives per-process response, turnaround, CPU and waiting times from
 * stored metrics entries, and compares policies side by side.
 */

use crate::core::types::{Pid, Ticks};
use crate::metrics::MetricsEntry;
use crate::scheduler::SchedulingPolicy;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Derived timings of one terminated process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessTimes {
    pub pid: Pid,
    /// start − creation (0 for a process that never ran)
    pub response: Ticks,
    /// completion − creation
    pub turnaround: Ticks,
    /// total run time
    pub cpu: Ticks,
    /// total ready time
    pub waiting: Ticks,
}

impl From<&MetricsEntry> for ProcessTimes {
    fn from(entry: &MetricsEntry) -> Self {
        let response = if entry.start_time == 0 {
            0
        } else {
            entry.start_time.saturating_sub(entry.creation_time)
        };
        Self {
            pid: entry.pid,
            response,
            turnaround: entry.completion_time.saturating_sub(entry.creation_time),
            cpu: entry.total_run_time,
            waiting: entry.total_ready_time,
        }
    }
}

/// Mean of each derived timing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Averages {
    pub response: f64,
    pub turnaround: f64,
    pub cpu: f64,
    pub waiting: f64,
}

impl Averages {
    pub fn of(times: &[ProcessTimes]) -> Self {
        if times.is_empty() {
            return Self::default();
        }
        let n = times.len() as f64;
        let mean = |f: fn(&ProcessTimes) -> Ticks| times.iter().map(f).sum::<Ticks>() as f64 / n;
        Self {
            response: mean(|t| t.response),
            turnaround: mean(|t| t.turnaround),
            cpu: mean(|t| t.cpu),
            waiting: mean(|t| t.waiting),
        }
    }
}

/// Results of one workload under one policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyReport {
    pub policy: SchedulingPolicy,
    pub uptime: Ticks,
    pub processes: Vec<ProcessTimes>,
    pub averages: Averages,
}

impl PolicyReport {
    /// Build from the entries of the processes of interest
    pub fn new<'a, I>(policy: SchedulingPolicy, uptime: Ticks, entries: I) -> Self
    where
        I: IntoIterator<Item = &'a MetricsEntry>,
    {
        let processes: Vec<ProcessTimes> = entries.into_iter().map(ProcessTimes::from).collect();
        let averages = Averages::of(&processes);
        Self {
            policy,
            uptime,
            processes,
            averages,
        }
    }
}

/// Side-by-side comparison of several policy runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub runs: Vec<PolicyReport>,
}

impl ComparisonReport {
    pub fn new(runs: Vec<PolicyReport>) -> Self {
        Self { runs }
    }

    /// Policy with the lowest average turnaround
    pub fn best_turnaround(&self) -> Option<SchedulingPolicy> {
        self.runs
            .iter()
            .min_by(|a, b| a.averages.turnaround.total_cmp(&b.averages.turnaround))
            .map(|r| r.policy)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Markdown tables: averages per policy, then per-process detail
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("# Scheduler Performance Comparison\n\n");

        out.push_str("| Metric |");
        for run in &self.runs {
            let _ = write!(out, " {} |", run.policy);
        }
        out.push_str("\n|--------|");
        for _ in &self.runs {
            out.push_str("------|");
        }
        out.push('\n');

        let rows: [(&str, fn(&Averages) -> f64); 4] = [
            ("Avg Response Time", |a| a.response),
            ("Avg Turnaround Time", |a| a.turnaround),
            ("Avg CPU Time", |a| a.cpu),
            ("Avg Waiting Time", |a| a.waiting),
        ];
        for (label, value) in rows {
            let _ = write!(out, "| {} |", label);
            for run in &self.runs {
                let _ = write!(out, " {:.2} |", value(&run.averages));
            }
            out.push('\n');
        }

        for run in &self.runs {
            let _ = write!(
                out,
                "\n## {} (uptime {} ticks)\n\n| PID | Response | Turnaround | CPU | Waiting |\n|-----|----------|------------|-----|---------|\n",
                run.policy, run.uptime
            );
            for t in &run.processes {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} | {} |",
                    t.pid, t.response, t.turnaround, t.cpu, t.waiting
                );
            }
        }

        if let Some(best) = self.best_turnaround() {
            let _ = write!(out, "\nLowest average turnaround: {}\n", best);
        }
        out
    }
}
