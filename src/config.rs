//! Coordinator configuration.
//!
//! Loaded from an explicit path, ./awaitable.yml, or
//! ~/.config/awaitable/awaitable.yml, falling back to defaults.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Task entries reserved when the coordinator is created
    pub task_capacity: usize,
    /// Value slots reserved when the coordinator is created
    pub value_capacity: usize,
    /// Abort a drive when one sub-task yields more than this many steps
    pub max_steps_per_task: Option<u64>,
    /// Log every pulled sub-task step at trace level
    pub trace_steps: bool,
}

impl CoordinatorConfig {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // Explicit path takes precedence
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_name = env!("CARGO_PKG_NAME");

        // Try project config: ./<project>.yml
        let project_config = PathBuf::from(format!("{}.yml", project_name));
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", project_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config = Self::from_yaml(&content)?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_steps_per_task == Some(0) {
            eyre::bail!("max_steps_per_task must be > 0 when set");
        }
        Ok(())
    }

    /// Builder: cap the number of steps a single sub-task may yield
    pub fn with_max_steps_per_task(mut self, limit: u64) -> Self {
        self.max_steps_per_task = Some(limit);
        self
    }

    /// Builder: log each pulled step
    pub fn with_trace_steps(mut self, trace: bool) -> Self {
        self.trace_steps = trace;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_defaults() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.task_capacity, 0);
        assert_eq!(config.value_capacity, 0);
        assert!(config.max_steps_per_task.is_none());
        assert!(!config.trace_steps);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_yaml_partial() {
        let config = CoordinatorConfig::from_yaml("max_steps_per_task: 64\n").unwrap();
        assert_eq!(config.max_steps_per_task, Some(64));
        assert_eq!(config.task_capacity, 0);
    }

    #[test]
    fn test_config_from_yaml_full() {
        let yaml = "task_capacity: 4\nvalue_capacity: 16\nmax_steps_per_task: 10\ntrace_steps: true\n";
        let config = CoordinatorConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.task_capacity, 4);
        assert_eq!(config.value_capacity, 16);
        assert_eq!(config.max_steps_per_task, Some(10));
        assert!(config.trace_steps);
    }

    #[test]
    fn test_config_rejects_zero_step_limit() {
        let err = CoordinatorConfig::from_yaml("max_steps_per_task: 0\n").unwrap_err();
        assert!(err.to_string().contains("max_steps_per_task"));
    }

    #[test]
    fn test_config_rejects_bad_yaml() {
        assert!(CoordinatorConfig::from_yaml("task_capacity: [not, a, number]").is_err());
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "trace_steps: true").unwrap();
        let path = file.path().to_path_buf();

        let config = CoordinatorConfig::load(Some(&path)).unwrap();
        assert!(config.trace_steps);
    }

    #[test]
    fn test_config_load_missing_explicit_path() {
        let path = PathBuf::from("/nonexistent/awaitable.yml");
        let err = CoordinatorConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }

    #[test]
    fn test_config_builders() {
        let config = CoordinatorConfig::default()
            .with_max_steps_per_task(5)
            .with_trace_steps(true);
        assert_eq!(config.max_steps_per_task, Some(5));
        assert!(config.trace_steps);
    }

    #[test]
    fn test_config_yaml_round_trip() {
        let config = CoordinatorConfig::default().with_max_steps_per_task(3);
        let yaml = serde_yaml::to_string(&config).unwrap();
        let restored = CoordinatorConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config, restored);
    }
}
