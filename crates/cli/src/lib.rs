//! Library side of the `tias` binary: settings, the refresh/evaluate
//! pipeline and the auxiliary reports.

pub mod config;
pub mod perf;
pub mod pipeline;
pub mod remediation;
pub mod windows;

pub use config::{ConfigError, ConfigFile, Overrides, Settings};
pub use pipeline::{refresh_store, run_evaluation, EvaluationOutcome, RefreshOutcome};
pub use remediation::{classify, Remediation};
