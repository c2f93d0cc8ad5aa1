use anyhow::{Context, Result};
use playbook_core::record::RecordDefaults;
use playbook_core::target_lag::TargetLag;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub wizard: WizardConfig,
    #[serde(default)]
    pub playground: PlaygroundConfig,
    #[serde(default)]
    pub prototype: PrototypeConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3001".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Deserialize, Clone)]
pub struct GithubConfig {
    /// OAuth app client id. Falls back to `GITHUB_CLIENT_ID`.
    #[serde(default)]
    pub client_id: Option<String>,
    /// Name of the environment variable holding the client secret.
    #[serde(default = "default_client_secret_env")]
    pub client_secret_env: String,
    #[serde(default = "default_oauth_url")]
    pub oauth_url: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default = "default_repo")]
    pub repo: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret_env: default_client_secret_env(),
            oauth_url: default_oauth_url(),
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            owner: default_owner(),
            repo: default_repo(),
        }
    }
}

fn default_client_secret_env() -> String {
    "GITHUB_CLIENT_SECRET".to_string()
}
fn default_oauth_url() -> String {
    "https://github.com/login/oauth/access_token".to_string()
}
fn default_api_url() -> String {
    "https://api.github.com".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_owner() -> String {
    "sfc-gh-adey".to_string()
}
fn default_repo() -> String {
    "Playbook".to_string()
}

impl GithubConfig {
    /// The client id from config, else from `GITHUB_CLIENT_ID`.
    pub fn resolve_client_id(&self) -> Option<String> {
        self.client_id
            .clone()
            .or_else(|| std::env::var("GITHUB_CLIENT_ID").ok())
            .filter(|id| !id.is_empty())
    }

    pub fn resolve_client_secret(&self) -> Option<String> {
        std::env::var(&self.client_secret_env)
            .ok()
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WizardConfig {
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_target_lag")]
    pub target_lag: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

impl Default for WizardConfig {
    fn default() -> Self {
        let d = RecordDefaults::default();
        Self {
            database: d.database,
            schema: d.schema,
            target_lag: d.target_lag,
            embedding_model: d.embedding_model,
        }
    }
}

fn default_database() -> String {
    RecordDefaults::default().database
}
fn default_schema() -> String {
    RecordDefaults::default().schema
}
fn default_target_lag() -> String {
    RecordDefaults::default().target_lag
}
fn default_embedding_model() -> String {
    RecordDefaults::default().embedding_model
}

impl WizardConfig {
    pub fn record_defaults(&self) -> RecordDefaults {
        RecordDefaults {
            database: self.database.clone(),
            schema: self.schema.clone(),
            target_lag: self.target_lag.clone(),
            embedding_model: self.embedding_model.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlaygroundConfig {
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_service")]
    pub default_service: String,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            default_limit: default_limit(),
            default_service: default_service(),
        }
    }
}

fn default_delay_ms() -> u64 {
    500
}
fn default_limit() -> usize {
    10
}
fn default_service() -> String {
    "CHAT_CUSTOMER_TEST_CSS_A".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PrototypeConfig {
    /// Extra globs skipped when copying a prototype, on top of the built-in
    /// excludes.
    #[serde(default)]
    pub exclude_globs: Vec<String>,
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

/// Load the config file if it exists, otherwise fall back to
/// [`Config::minimal`]. A file that exists but is invalid is still an error.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::minimal())
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.server.bind.is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if config.wizard.database.is_empty() || config.wizard.schema.is_empty() {
        anyhow::bail!("wizard.database and wizard.schema must not be empty");
    }

    TargetLag::parse(&config.wizard.target_lag).context("invalid wizard.target_lag")?;

    if config.wizard.embedding_model.is_empty() {
        anyhow::bail!("wizard.embedding_model must not be empty");
    }

    if config.playground.default_limit == 0 {
        anyhow::bail!("playground.default_limit must be >= 1");
    }

    if config.github.timeout_secs == 0 {
        anyhow::bail!("github.timeout_secs must be > 0");
    }

    if config.github.owner.is_empty() || config.github.repo.is_empty() {
        anyhow::bail!("github.owner and github.repo must not be empty");
    }

    for pattern in &config.prototype.exclude_globs {
        globset::Glob::new(pattern)
            .with_context(|| format!("invalid prototype.exclude_globs pattern: {}", pattern))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(content: &str) -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("playbook.toml");
        std::fs::write(&path, content).unwrap();
        (tmp, path)
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let (_tmp, path) = write_config("");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:3001");
        assert_eq!(cfg.wizard.database, "ADEY_TEST_DB.TEST");
        assert_eq!(cfg.playground.delay_ms, 500);
        assert_eq!(cfg.github.repo, "Playbook");
    }

    #[test]
    fn test_sections_override_defaults() {
        let (_tmp, path) = write_config(
            r#"
[wizard]
database = "DEMO_DB"
target_lag = "2 days"

[playground]
delay_ms = 0
"#,
        );
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.wizard.database, "DEMO_DB");
        assert_eq!(cfg.wizard.schema, "TEST");
        assert_eq!(cfg.wizard.record_defaults().target_lag, "2 days");
        assert_eq!(cfg.playground.delay_ms, 0);
    }

    #[test]
    fn test_bad_target_lag_rejected() {
        let (_tmp, path) = write_config("[wizard]\ntarget_lag = \"soon\"\n");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("target_lag"));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let (_tmp, path) = write_config("[playground]\ndefault_limit = 0\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_bad_glob_rejected() {
        let (_tmp, path) = write_config("[prototype]\nexclude_globs = [\"a[\"]\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_or_default(&tmp.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.storage.dir, PathBuf::from("./data"));
    }
}
