use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub download: DownloadConfig,
    pub notify: NotifyConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub base_url: String,
    pub passkey: String,
    #[serde(default = "default_listing_path")]
    pub listing_path: String,
    pub cookie: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default = "default_site_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub save_path: String,
    #[serde(default = "default_download_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    pub base_url: String,
    #[serde(default = "default_notify_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_file_name")]
    pub file_name: String,
    /// Size that triggers a roll of the log file
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,
    /// Extra time-based roll on top of the size cap
    #[serde(default = "default_rotation")]
    pub rotation: String,
    /// Rolled-over backups kept next to the live file
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    #[serde(default = "default_console")]
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            directory: default_log_directory(),
            file_name: default_log_file_name(),
            max_size_bytes: default_max_size_bytes(),
            rotation: default_rotation(),
            max_files: default_max_files(),
            console: default_console(),
        }
    }
}

// Default value functions
fn default_listing_path() -> String {
    "torrents.php".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string()
}

fn default_site_timeout() -> u64 {
    10
}

fn default_download_timeout() -> u64 {
    30
}

fn default_notify_timeout() -> u64 {
    5
}

fn default_interval() -> u64 {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "console".to_string()
}

fn default_log_directory() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_file_name() -> String {
    "monitor.log".to_string()
}

fn default_max_size_bytes() -> u64 {
    10 * 1024 * 1024 // 10 MiB
}

fn default_rotation() -> String {
    "never".to_string()
}

fn default_max_files() -> usize {
    5
}

fn default_console() -> bool {
    true
}

impl SiteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl DownloadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl NotifyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate site config
        if self.site.base_url.is_empty() {
            bail!("site.base_url must not be empty");
        }

        if self.site.base_url.ends_with('/') {
            bail!("site.base_url must not end with '/'");
        }

        if self.site.passkey.is_empty() {
            bail!("site.passkey must not be empty");
        }

        if self.site.listing_path.is_empty() {
            bail!("site.listing_path must not be empty");
        }

        if self.site.timeout_secs == 0 {
            bail!("site.timeout_secs must be greater than 0");
        }

        // Validate download client config
        if self.download.url.is_empty() {
            bail!("download.url must not be empty");
        }

        if self.download.save_path.is_empty() {
            bail!("download.save_path must not be empty");
        }

        if self.download.password.is_some() && self.download.username.is_none() {
            bail!("download.password is set but download.username is missing");
        }

        if self.download.timeout_secs == 0 {
            bail!("download.timeout_secs must be greater than 0");
        }

        // Validate notification config
        if self.notify.base_url.is_empty() {
            bail!("notify.base_url must not be empty");
        }

        if self.notify.timeout_secs == 0 {
            bail!("notify.timeout_secs must be greater than 0");
        }

        if self.poll.interval_secs == 0 {
            bail!("poll.interval_secs must be greater than 0");
        }

        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        let valid_rotations = ["hourly", "daily", "never"];
        if !valid_rotations.contains(&self.logging.rotation.as_str()) {
            bail!(
                "Invalid log rotation '{}'. Must be one of: hourly, daily, never",
                self.logging.rotation
            );
        }

        if self.logging.max_files == 0 {
            bail!("logging.max_files must be greater than 0");
        }

        if self.logging.max_size_bytes == 0 {
            bail!("logging.max_size_bytes must be greater than 0");
        }

        if self.logging.file_name.is_empty() {
            bail!("logging.file_name must not be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
[site]
base_url = "https://bt.example.org"
passkey = "0123456789abcdef"

[download]
url = "http://127.0.0.1:8080"
save_path = "/data/torrents"

[notify]
base_url = "https://push.example.org/device-key"
"#;

    #[test]
    fn test_minimal_config_defaults() {
        let config = Config::from_toml(MINIMAL).expect("Failed to parse config");

        assert_eq!(config.site.listing_path, "torrents.php");
        assert_eq!(config.site.timeout(), Duration::from_secs(10));
        assert!(config.site.cookie.is_none());
        assert!(config.site.headers.is_empty());
        assert_eq!(config.download.timeout(), Duration::from_secs(30));
        assert!(config.download.username.is_none());
        assert_eq!(config.notify.timeout(), Duration::from_secs(5));
        assert_eq!(config.poll.interval(), Duration::from_secs(20));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "console");
        assert_eq!(config.logging.rotation, "never");
        assert_eq!(config.logging.max_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.logging.max_files, 5);
        assert_eq!(config.logging.directory, PathBuf::from("logs"));
        assert!(config.logging.console);
    }

    #[test]
    fn test_full_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[site]
base_url = "https://bt.example.org"
passkey = "0123456789abcdef"
cookie = "uid=1; pass=abc"

[site.headers]
Referer = "https://bt.example.org/"

[download]
url = "http://127.0.0.1:8080"
username = "admin"
password = "adminadmin"
save_path = "/data/torrents"

[notify]
base_url = "https://push.example.org/device-key"
timeout_secs = 3

[poll]
interval_secs = 60

[logging]
level = "debug"
format = "json"
directory = "/var/log/bidwatch"
max_size_bytes = 1048576
rotation = "hourly"
max_files = 3
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).expect("Failed to load config");

        assert_eq!(config.site.cookie.as_deref(), Some("uid=1; pass=abc"));
        assert_eq!(
            config.site.headers.get("Referer").map(String::as_str),
            Some("https://bt.example.org/")
        );
        assert_eq!(config.download.username.as_deref(), Some("admin"));
        assert_eq!(config.notify.timeout(), Duration::from_secs(3));
        assert_eq!(config.poll.interval(), Duration::from_secs(60));
        assert_eq!(config.logging.directory, PathBuf::from("/var/log/bidwatch"));
        assert_eq!(config.logging.max_size_bytes, 1_048_576);
        assert_eq!(config.logging.max_files, 3);
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_file(Path::new("/nonexistent/bidwatch.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_section() {
        let result = Config::from_toml("[site]\nbase_url = \"https://x\"\npasskey = \"k\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_trailing_slash() {
        let content = MINIMAL.replace("https://bt.example.org\"", "https://bt.example.org/\"");
        assert!(Config::from_toml(&content).is_err());
    }

    #[test]
    fn test_rejects_password_without_username() {
        let content = MINIMAL.replace(
            "save_path = \"/data/torrents\"",
            "save_path = \"/data/torrents\"\npassword = \"secret\"",
        );
        assert!(Config::from_toml(&content).is_err());
    }

    #[test]
    fn test_rejects_zero_interval() {
        let content = format!("{}\n[poll]\ninterval_secs = 0\n", MINIMAL);
        assert!(Config::from_toml(&content).is_err());
    }

    #[test]
    fn test_rejects_invalid_logging() {
        let bad_level = format!("{}\n[logging]\nlevel = \"critical\"\n", MINIMAL);
        assert!(Config::from_toml(&bad_level).is_err());

        let bad_rotation = format!("{}\n[logging]\nrotation = \"weekly\"\n", MINIMAL);
        assert!(Config::from_toml(&bad_rotation).is_err());

        let no_files = format!("{}\n[logging]\nmax_files = 0\n", MINIMAL);
        assert!(Config::from_toml(&no_files).is_err());

        let no_size = format!("{}\n[logging]\nmax_size_bytes = 0\n", MINIMAL);
        assert!(Config::from_toml(&no_size).is_err());
    }
}
