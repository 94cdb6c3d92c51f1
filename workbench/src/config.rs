//! Workbench settings loaded from the environment.

use std::fmt;
use std::str::FromStr;

use analysis_api::ApiConfig;
use analysis_api::ConfigError;
use analysis_api::error_handler::{
    Lookup, env_opt, env_opt_u64, env_opt_usize, process_env, validate_positive,
};
use file_intake::{AcceptList, DEFAULT_CONCURRENCY, FileIntake, IntakeMode};

use crate::error::{UnknownAnalysisMode, UnknownMergePolicy, WorkbenchResult};

/// Longest text the backend's validator accepts.
pub const DEFAULT_MAX_TEXT_CHARS: usize = 1000;

/// What a new action does to results already on the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Each action starts from an empty board.
    #[default]
    Replace,
    /// Earlier entries stay; entries with the same key are replaced in place.
    Append,
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MergePolicy::Replace => "replace",
            MergePolicy::Append => "append",
        })
    }
}

impl FromStr for MergePolicy {
    type Err = UnknownMergePolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(MergePolicy::Replace),
            "append" => Ok(MergePolicy::Append),
            _ => Err(UnknownMergePolicy(s.to_string())),
        }
    }
}

/// Where analysis results come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnalysisMode {
    /// Call the analysis API.
    #[default]
    Remote,
    /// Produce canned results locally from the input (no network).
    Simulated,
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnalysisMode::Remote => "remote",
            AnalysisMode::Simulated => "simulated",
        })
    }
}

impl FromStr for AnalysisMode {
    type Err = UnknownAnalysisMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(AnalysisMode::Remote),
            "simulated" | "simulate" => Ok(AnalysisMode::Simulated),
            _ => Err(UnknownAnalysisMode(s.to_string())),
        }
    }
}

/// Everything the workbench needs at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbenchConfig {
    pub api: ApiConfig,
    pub merge: MergePolicy,
    pub analysis: AnalysisMode,
    pub intake: IntakeMode,
    /// Overrides the intake preset's size limit.
    pub max_upload_bytes: Option<u64>,
    pub max_text_chars: usize,
    /// Files of one batch processed at once.
    pub concurrency: usize,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            merge: MergePolicy::default(),
            analysis: AnalysisMode::default(),
            intake: IntakeMode::default(),
            max_upload_bytes: None,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl WorkbenchConfig {
    /// Loads settings from process environment.
    ///
    /// # Env
    /// - `DEVASSIST_API_URL`, `DEVASSIST_API_TIMEOUT_SECS` (see [`ApiConfig::from_env`])
    /// - `DEVASSIST_MERGE_POLICY`: `replace` | `append`
    /// - `DEVASSIST_ANALYSIS_MODE`: `remote` | `simulated`
    /// - `DEVASSIST_INTAKE_MODE`: `read` | `upload`
    /// - `DEVASSIST_MAX_UPLOAD_BYTES`
    /// - `DEVASSIST_MAX_TEXT_CHARS` (default [`DEFAULT_MAX_TEXT_CHARS`])
    /// - `DEVASSIST_CONCURRENCY` (default [`DEFAULT_CONCURRENCY`])
    pub fn from_env() -> WorkbenchResult<Self> {
        Self::from_lookup(&process_env)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> WorkbenchResult<Self> {
        let defaults = Self::default();
        let cfg = Self {
            api: ApiConfig::from_lookup(lookup)?,
            merge: env_choice(lookup, "DEVASSIST_MERGE_POLICY", "replace, append")?
                .unwrap_or(defaults.merge),
            analysis: env_choice(lookup, "DEVASSIST_ANALYSIS_MODE", "remote, simulated")?
                .unwrap_or(defaults.analysis),
            intake: env_choice(lookup, "DEVASSIST_INTAKE_MODE", "read, upload")?
                .unwrap_or(defaults.intake),
            max_upload_bytes: env_opt_u64(lookup, "DEVASSIST_MAX_UPLOAD_BYTES")?,
            max_text_chars: env_opt_usize(lookup, "DEVASSIST_MAX_TEXT_CHARS")?
                .unwrap_or(defaults.max_text_chars),
            concurrency: env_opt_usize(lookup, "DEVASSIST_CONCURRENCY")?
                .unwrap_or(defaults.concurrency),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> WorkbenchResult<()> {
        self.api.validate()?;
        validate_positive("max_text_chars", self.max_text_chars as u64)?;
        validate_positive("concurrency", self.concurrency as u64)?;
        if let Some(max) = self.max_upload_bytes {
            validate_positive("max_upload_bytes", max)?;
        }
        Ok(())
    }

    /// Intake preset for the configured mode, with the size override applied.
    pub fn accept_list(&self) -> AcceptList {
        let preset = self.intake.default_accept_list();
        match self.max_upload_bytes {
            Some(max) => preset.with_max_size(max),
            None => preset,
        }
    }

    pub fn file_intake(&self) -> FileIntake {
        FileIntake::new(self.intake, self.accept_list()).with_concurrency(self.concurrency)
    }
}

fn env_choice<T: FromStr>(
    lookup: Lookup<'_>,
    var: &'static str,
    expected: &'static str,
) -> WorkbenchResult<Option<T>> {
    match env_opt(lookup, var) {
        None => Ok(None),
        Some(value) => match value.parse::<T>() {
            Ok(v) => Ok(Some(v)),
            Err(_) => Err(analysis_api::ApiError::from(ConfigError::InvalidChoice {
                var,
                value,
                expected,
            })
            .into()),
        },
    }
}
