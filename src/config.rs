use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the project-level override file looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = ".prompt-template";

/// Status of config file loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLoadStatus {
    /// Config loaded successfully from existing file
    Loaded,
    /// Created default config file (first run)
    Created,
    /// Error occurred during loading, using defaults.
    Error(String),
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Output path that means "write to stdout".
pub const STDOUT_PATH: &str = "-";

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PathsConfig {
    /// Where rendered prompts are written. Empty or `-` means stdout.
    pub output: String,
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Expand `~` to home directory in a path string
    pub fn expand_tilde(path: &str) -> PathBuf {
        if let Some(stripped) = path.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(stripped);
        }
        PathBuf::from(path)
    }

    /// Get the expanded output path, or None when output goes to stdout
    pub fn output_path(&self) -> Option<PathBuf> {
        if self.paths.output.is_empty() || self.paths.output == STDOUT_PATH {
            None
        } else {
            Some(Self::expand_tilde(&self.paths.output))
        }
    }
}

/// Partial logging configuration for project overrides.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PartialLoggingConfig {
    pub level: Option<String>,
}

/// Partial path configuration for project overrides.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PartialPathsConfig {
    pub output: Option<String>,
}

/// Project-specific configuration where every field is optional.
/// Parsed from `.prompt-template` files. Fields that are `None` inherit from the global config.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PartialConfig {
    pub logging: PartialLoggingConfig,
    pub paths: PartialPathsConfig,
}

/// Merge a global config with a project-level partial config.
/// Project values override global values where present.
pub fn merge_config(global: &Config, project: &PartialConfig) -> Config {
    Config {
        logging: LoggingConfig {
            level: project
                .logging
                .level
                .clone()
                .unwrap_or_else(|| global.logging.level.clone()),
        },
        paths: PathsConfig {
            output: project
                .paths
                .output
                .clone()
                .unwrap_or_else(|| global.paths.output.clone()),
        },
    }
}

/// Loaded configuration with metadata
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub config_path: PathBuf,
    pub project_config_path: Option<PathBuf>,
    pub status: ConfigLoadStatus,
    /// Set when the project override exists but could not be used.
    pub project_error: Option<String>,
}

/// Get the platform-appropriate config directory
fn get_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "prompt-template", "prompt-template")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the full path to the config file
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.prompt-template in current working directory).
pub fn get_project_config_path() -> Option<PathBuf> {
    let path = std::env::current_dir().ok()?.join(PROJECT_CONFIG_FILE);
    if path.exists() { Some(path) } else { None }
}

/// Load a project config from the given path.
fn load_project_config(path: &Path) -> Result<PartialConfig, String> {
    let contents = fs::read_to_string(path).map_err(|e| {
        warn!(path = ?path, error = %e, "project_config_read_failed");
        format!("Failed to read {}: {}", PROJECT_CONFIG_FILE, e)
    })?;

    toml::from_str::<PartialConfig>(&contents).map_err(|e| {
        warn!(path = ?path, error = %e, "project_config_parse_failed");
        format!("Invalid {}: {}", PROJECT_CONFIG_FILE, e)
    })
}

/// Resolve the log level without emitting any events or touching the filesystem
/// beyond reads. Used before the log subscriber exists.
pub fn resolve_log_level() -> String {
    match get_config_path() {
        Some(path) => resolve_log_level_at(&path, get_project_config_path().as_deref()),
        None => env::var("PROMPT_TEMPLATE_LOG").unwrap_or_else(|_| LoggingConfig::default().level),
    }
}

/// Same precedence as `load_config_at`: env, then project file, then global file.
/// Unreadable or malformed files are skipped.
pub fn resolve_log_level_at(config_path: &Path, project_config_path: Option<&Path>) -> String {
    if let Ok(level) = env::var("PROMPT_TEMPLATE_LOG") {
        return level;
    }

    let project_level = project_config_path
        .and_then(|path| fs::read_to_string(path).ok())
        .and_then(|contents| toml::from_str::<PartialConfig>(&contents).ok())
        .and_then(|partial| partial.logging.level);

    project_level
        .or_else(|| {
            fs::read_to_string(config_path)
                .ok()
                .and_then(|contents| toml::from_str::<Config>(&contents).ok())
                .map(|config| config.logging.level)
        })
        .unwrap_or_else(|| LoggingConfig::default().level)
}

/// Load configuration from file, environment, and defaults
pub fn load_config() -> LoadedConfig {
    let config_path = match get_config_path() {
        Some(path) => path,
        None => {
            warn!("config_dir_unavailable");
            return LoadedConfig {
                config: apply_env_overrides(Config::default()),
                config_path: PathBuf::from("config.toml"),
                project_config_path: None,
                status: ConfigLoadStatus::Error("Could not determine config directory".to_string()),
                project_error: None,
            };
        }
    };

    load_config_at(config_path, get_project_config_path())
}

/// Load configuration from explicit global and project paths.
pub fn load_config_at(config_path: PathBuf, project_config_path: Option<PathBuf>) -> LoadedConfig {
    debug!(path = ?config_path, "config_path_resolved");

    let (mut config, status) = match read_global_config(&config_path) {
        Ok(Some(config)) => {
            info!(path = ?config_path, "config_file_loaded");
            (config, ConfigLoadStatus::Loaded)
        }
        Ok(None) => match write_default_config(&config_path) {
            Ok(()) => {
                info!(path = ?config_path, "config_file_created");
                (Config::default(), ConfigLoadStatus::Created)
            }
            Err(message) => {
                warn!(path = ?config_path, error = %message, "config_file_create_failed");
                (Config::default(), ConfigLoadStatus::Error(message))
            }
        },
        Err(message) => {
            warn!(path = ?config_path, error = %message, "config_file_unusable");
            (Config::default(), ConfigLoadStatus::Error(message))
        }
    };

    let mut project_error = None;
    if let Some(ref project_path) = project_config_path {
        match load_project_config(project_path) {
            Ok(partial) => {
                config = merge_config(&config, &partial);
                info!(path = ?project_path, "project_config_loaded");
            }
            Err(e) => {
                // Keep using global config only
                project_error = Some(e);
            }
        }
    }

    let config = apply_env_overrides(config);

    LoadedConfig {
        config,
        config_path,
        project_config_path,
        status,
        project_error,
    }
}

/// Read and parse the global config. `Ok(None)` means the file does not exist yet.
fn read_global_config(config_path: &Path) -> Result<Option<Config>, String> {
    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            return Err("Permission denied reading config".to_string());
        }
        Err(e) => return Err(format!("Read error: {}", e)),
    };

    toml::from_str::<Config>(&contents)
        .map(Some)
        .map_err(|e| format!("Malformed TOML: {}", e))
}

/// Write the default config so users have a file to edit.
fn write_default_config(config_path: &Path) -> Result<(), String> {
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Could not create config directory: {}", e))?;
    }

    let toml_content = toml::to_string_pretty(&Config::default())
        .map_err(|e| format!("Serialization error: {}", e))?;

    fs::write(config_path, toml_content).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => "Permission denied creating config".to_string(),
        _ => format!("Write error: {}", e),
    })
}

/// Apply environment variable overrides to config
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(level) = env::var("PROMPT_TEMPLATE_LOG") {
        debug!(var = "PROMPT_TEMPLATE_LOG", "config_env_override");
        config.logging.level = level;
    }

    if let Ok(path) = env::var("PROMPT_TEMPLATE_OUTPUT") {
        debug!(var = "PROMPT_TEMPLATE_OUTPUT", "config_env_override");
        config.paths.output = path;
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.paths.output, "");
        assert!(config.output_path().is_none());
    }

    #[test]
    fn test_output_path_dash_is_stdout() {
        let mut config = Config::default();
        config.paths.output = STDOUT_PATH.to_string();
        assert!(config.output_path().is_none());
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = Config::expand_tilde("~/prompts/out.txt");
        assert!(!expanded.to_string_lossy().starts_with('~'));

        let no_tilde = Config::expand_tilde("/absolute/path");
        assert_eq!(no_tilde, PathBuf::from("/absolute/path"));

        let relative = Config::expand_tilde("./relative/path");
        assert_eq!(relative, PathBuf::from("./relative/path"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
[logging]
level = "debug"

[paths]
output = "./prompt.txt"
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.output_path(), Some(PathBuf::from("./prompt.txt")));
    }

    #[test]
    fn test_config_partial_sections_use_defaults() {
        let config: Config = toml::from_str("[paths]\noutput = \"x\"\n").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.paths.output, "x");

        let empty: Config = toml::from_str("").unwrap();
        assert_eq!(empty.logging.level, "info");
    }

    #[test]
    fn test_merge_config_project_overrides() {
        let global = Config::default();
        let project: PartialConfig = toml::from_str("[logging]\nlevel = \"trace\"\n").unwrap();

        let merged = merge_config(&global, &project);
        assert_eq!(merged.logging.level, "trace");
        assert_eq!(merged.paths.output, "");
    }

    #[test]
    fn test_merge_config_empty_project_keeps_global() {
        let mut global = Config::default();
        global.paths.output = "/tmp/prompt.txt".to_string();

        let merged = merge_config(&global, &PartialConfig::default());
        assert_eq!(merged.logging.level, "info");
        assert_eq!(merged.paths.output, "/tmp/prompt.txt");
    }

    /// Collects formatted log output so tests can assert on event names.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        (result, logs.text())
    }

    #[test]
    fn test_load_config_at_creates_default() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("nested").join("config.toml");

        let loaded = load_config_at(config_path.clone(), None);
        assert_eq!(loaded.status, ConfigLoadStatus::Created);
        assert_eq!(loaded.config.logging.level, "info");
        assert!(config_path.exists());

        let reloaded = load_config_at(config_path, None);
        assert_eq!(reloaded.status, ConfigLoadStatus::Loaded);
    }

    #[test]
    fn test_load_config_at_malformed_global() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        fs::write(&config_path, "[logging\nlevel = ").unwrap();

        let loaded = load_config_at(config_path, None);
        assert!(
            matches!(loaded.status, ConfigLoadStatus::Error(ref m) if m.starts_with("Malformed TOML"))
        );
        assert_eq!(loaded.config.logging.level, "info");
    }

    #[test]
    fn test_load_config_at_emits_events() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        let project_path = temp.path().join(PROJECT_CONFIG_FILE);
        fs::write(&project_path, "[logging]\nlevel = \"debug\"\n").unwrap();

        let (_, logs) = with_captured_logs(|| load_config_at(config_path, Some(project_path)));
        assert!(logs.contains("config_file_created"), "{logs}");
        assert!(logs.contains("project_config_loaded"), "{logs}");
    }

    #[test]
    fn test_load_config_at_logs_bad_project_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        let project_path = temp.path().join(PROJECT_CONFIG_FILE);
        fs::write(&project_path, "logging = [").unwrap();

        let (_, logs) = with_captured_logs(|| load_config_at(config_path, Some(project_path)));
        assert!(logs.contains("project_config_parse_failed"), "{logs}");
    }

    #[test]
    fn test_resolve_log_level_at_is_quiet_and_read_only() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");

        let (level, logs) = with_captured_logs(|| resolve_log_level_at(&config_path, None));
        assert_eq!(level, "info");
        assert!(logs.is_empty(), "{logs}");
        assert!(!config_path.exists());
    }

    #[test]
    fn test_resolve_log_level_at_precedence() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        fs::write(&config_path, "[logging]\nlevel = \"warn\"\n").unwrap();
        assert_eq!(resolve_log_level_at(&config_path, None), "warn");

        let project_path = temp.path().join(PROJECT_CONFIG_FILE);
        fs::write(&project_path, "[logging]\nlevel = \"trace\"\n").unwrap();
        assert_eq!(
            resolve_log_level_at(&config_path, Some(project_path.as_path())),
            "trace"
        );

        fs::write(&project_path, "[paths]\noutput = \"x\"\n").unwrap();
        assert_eq!(
            resolve_log_level_at(&config_path, Some(project_path.as_path())),
            "warn"
        );
    }

    #[test]
    fn test_load_config_at_merges_project_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        fs::write(&config_path, "[logging]\nlevel = \"warn\"\n").unwrap();
        let project_path = temp.path().join(PROJECT_CONFIG_FILE);
        fs::write(&project_path, "[paths]\noutput = \"out.txt\"\n").unwrap();

        let loaded = load_config_at(config_path, Some(project_path));
        assert_eq!(loaded.status, ConfigLoadStatus::Loaded);
        assert!(loaded.project_error.is_none());
        assert_eq!(loaded.config.paths.output, "out.txt");
    }

    #[test]
    fn test_load_config_at_bad_project_file_keeps_global() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        fs::write(&config_path, "[paths]\noutput = \"global.txt\"\n").unwrap();
        let project_path = temp.path().join(PROJECT_CONFIG_FILE);
        fs::write(&project_path, "paths = 3").unwrap();

        let loaded = load_config_at(config_path, Some(project_path));
        assert!(loaded.project_error.unwrap().starts_with("Invalid"));
        assert_eq!(loaded.config.paths.output, "global.txt");
    }
}
