//! Command timing and the append-only `performance.log`.

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const PERFORMANCE_LOG_FILE_NAME: &str = "performance.log";
const SLOW_COMMAND_SECS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Success,
    Failed,
}

impl RunStatus {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerfRecord {
    pub timestamp: String,
    pub command: String,
    pub seconds: f64,
    pub status: RunStatus,
    pub error: Option<String>,
}

impl PerfRecord {
    /// `timestamp,command,seconds,status[,error]`. The error is flattened to
    /// one line so the file stays line-oriented.
    #[must_use]
    pub fn to_csv_line(&self) -> String {
        let mut line = format!(
            "{},{},{:.3},{}",
            self.timestamp,
            self.command,
            self.seconds,
            self.status.as_str()
        );
        if let Some(error) = &self.error {
            line.push(',');
            line.push_str(&error.replace(['\n', '\r'], " "));
        }
        line
    }

    /// Parses one log line; malformed lines yield `None`.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.trim().splitn(5, ',');
        let timestamp = parts.next()?.to_string();
        let command = parts.next()?.to_string();
        let seconds = parts.next()?.parse().ok()?;
        let status = match parts.next()? {
            "SUCCESS" => RunStatus::Success,
            "FAILED" => RunStatus::Failed,
            _ => return None,
        };
        Some(Self {
            timestamp,
            command,
            seconds,
            status,
            error: parts.next().map(str::to_string),
        })
    }
}

#[must_use]
pub fn performance_log_path(logs_dir: &Path) -> PathBuf {
    logs_dir.join(PERFORMANCE_LOG_FILE_NAME)
}

/// Runs `body`, logs its duration and appends a record to the performance log.
///
/// Failing to write the record is logged and never changes the command result.
pub fn timed<T>(logs_dir: &Path, command: &str, body: impl FnOnce() -> Result<T>) -> Result<T> {
    let started = Instant::now();
    let result = body();
    let seconds = started.elapsed().as_secs_f64();

    if seconds > SLOW_COMMAND_SECS {
        log::warn!("Performance: {command} took {seconds:.2}s (threshold: {SLOW_COMMAND_SECS:.1}s)");
    } else {
        log::debug!("Performance: {command} completed in {seconds:.3}s");
    }

    let record = PerfRecord {
        timestamp: chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        command: command.to_string(),
        seconds,
        status: if result.is_ok() {
            RunStatus::Success
        } else {
            RunStatus::Failed
        },
        error: result.as_ref().err().map(|err| format!("{err:#}")),
    };
    if let Err(err) = append_record(logs_dir, &record) {
        log::warn!("Failed to append performance record: {err}");
    }
    result
}

fn append_record(logs_dir: &Path, record: &PerfRecord) -> std::io::Result<()> {
    std::fs::create_dir_all(logs_dir)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(performance_log_path(logs_dir))?;
    writeln!(file, "{}", record.to_csv_line())
}

pub fn read_records(logs_dir: &Path) -> Result<Vec<PerfRecord>> {
    let path = performance_log_path(logs_dir);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(&path)?;
    Ok(raw.lines().filter_map(PerfRecord::parse_line).collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandStats {
    pub count: usize,
    pub min: f64,
    pub avg: f64,
    pub max: f64,
    pub p95: f64,
    pub failures: usize,
}

/// Per-command duration statistics, keyed by command name.
#[must_use]
pub fn summarize(records: &[PerfRecord]) -> BTreeMap<String, CommandStats> {
    let mut grouped: BTreeMap<String, (Vec<f64>, usize)> = BTreeMap::new();
    for record in records {
        let entry = grouped.entry(record.command.clone()).or_default();
        entry.0.push(record.seconds);
        if record.status == RunStatus::Failed {
            entry.1 += 1;
        }
    }

    grouped
        .into_iter()
        .filter(|(_, (times, _))| !times.is_empty())
        .map(|(command, (mut times, failures))| {
            times.sort_by(f64::total_cmp);
            let count = times.len();
            let p95_idx = (count as f64 * 0.95) as usize;
            let stats = CommandStats {
                count,
                min: times[0],
                avg: times.iter().sum::<f64>() / count as f64,
                max: times[count - 1],
                p95: times.get(p95_idx).copied().unwrap_or(times[count - 1]),
                failures,
            };
            (command, stats)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn csv_line_round_trips_with_error() {
        let record = PerfRecord {
            timestamp: "2026-10-18T10:00:00.000000".to_string(),
            command: "evaluate".to_string(),
            seconds: 1.5,
            status: RunStatus::Failed,
            error: Some("no savegame,\nsee logs".to_string()),
        };
        let line = record.to_csv_line();
        assert_eq!(
            line,
            "2026-10-18T10:00:00.000000,evaluate,1.500,FAILED,no savegame, see logs"
        );
        let back = PerfRecord::parse_line(&line).unwrap();
        assert_eq!(back.error.as_deref(), Some("no savegame, see logs"));
        assert!(PerfRecord::parse_line("garbage").is_none());
    }

    #[test]
    fn timed_appends_success_and_failure() {
        let tmp = TempDir::new().unwrap();
        let ok: Result<u8> = timed(tmp.path(), "parse", || Ok(7));
        assert_eq!(ok.unwrap(), 7);
        let failed: Result<u8> = timed(tmp.path(), "parse", || anyhow::bail!("boom"));
        assert!(failed.is_err());

        let records = read_records(tmp.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, RunStatus::Success);
        assert_eq!(records[1].status, RunStatus::Failed);
        assert_eq!(records[1].error.as_deref(), Some("boom"));

        let stats = summarize(&records);
        assert_eq!(stats["parse"].count, 2);
        assert_eq!(stats["parse"].failures, 1);
    }
}
