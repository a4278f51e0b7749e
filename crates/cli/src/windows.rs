//! Transfer windows to Mars and the near-Earth asteroids.
//!
//! Windows repeat with each target's synodic period from a known optimal
//! departure date.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::path::Path;
use tias_snapshot::GameDate;

#[derive(Debug, Clone, Copy)]
pub struct WindowTarget {
    pub name: &'static str,
    pub base_window: (i32, u32, u32),
    pub synodic_days: i64,
    /// Whether departing off-window carries a delta-v penalty estimate.
    pub penalised: bool,
}

pub const TARGETS: [WindowTarget; 3] = [
    WindowTarget {
        name: "Mars",
        base_window: (2026, 11, 13),
        synodic_days: 780,
        penalised: true,
    },
    WindowTarget {
        name: "Sisyphus",
        base_window: (2027, 8, 2),
        synodic_days: 592,
        penalised: false,
    },
    WindowTarget {
        name: "Hephaistos",
        base_window: (2027, 8, 1),
        synodic_days: 533,
        penalised: false,
    },
];

const MAX_PENALTY_PERCENT: f64 = 40.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchWindow {
    pub target: String,
    pub next_window: String,
    pub days_away: i64,
    /// Percent penalty for departing today, for penalised targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_penalty: Option<u32>,
}

/// Next window of `target` on or after `today`. `None` only for an invalid base date.
#[must_use]
pub fn next_window(target: &WindowTarget, today: NaiveDate) -> Option<LaunchWindow> {
    let (y, m, d) = target.base_window;
    let base = NaiveDate::from_ymd_opt(y, m, d)?;
    let period = target.synodic_days;

    let since_base = (today - base).num_days();
    let mut cycles = since_base.div_euclid(period);
    if since_base.rem_euclid(period) > 0 {
        cycles += 1;
    }
    let window = base + Duration::days(cycles * period);
    let days_away = (window - today).num_days();

    let current_penalty = target.penalised.then(|| {
        let from_optimal = days_away.min(period - days_away) as f64;
        let normalized = from_optimal / (period as f64 / 2.0);
        (MAX_PENALTY_PERCENT * normalized.sqrt()) as u32
    });

    Some(LaunchWindow {
        target: target.name.to_string(),
        next_window: window.format("%Y-%m-%d").to_string(),
        days_away,
        current_penalty,
    })
}

/// Windows for every target. Requires the body templates extracted from the
/// game; without them nothing is reported.
#[must_use]
pub fn launch_windows(date: &GameDate, templates_file: &Path) -> Vec<LaunchWindow> {
    if !templates_file.is_file() {
        log::warn!("Templates file not found: {}", templates_file.display());
        return Vec::new();
    }
    TARGETS
        .iter()
        .filter_map(|target| next_window(target, date.naive()))
        .collect()
}
