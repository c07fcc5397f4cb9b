use super::env::{
    load_env_bool, load_env_path_opt, load_env_string, load_env_string_opt, load_env_var,
    load_env_var_opt,
};
use super::{ConfigError, LogFormat, LogLevel};
use crate::client::ClientConfig;
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Connection and logging settings of the `shmdash` binary.
///
/// Values are taken from command line arguments, then environment variables,
/// then the optional TOML file, then the defaults below.
#[derive(Parser, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SHM Dash server URL
    #[arg(long, env = "SHMDASH_URL", default_value = "https://shmdash.de")]
    pub url: String,

    /// API key of the upload source
    #[arg(long, env = "SHMDASH_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Total request timeout in seconds (no timeout if not set)
    #[arg(long, env = "SHMDASH_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Connection timeout in seconds
    #[arg(long, env = "SHMDASH_CONNECT_TIMEOUT_SECS", default_value = "10")]
    pub connect_timeout_secs: u64,

    /// Check TLS certificates
    #[arg(long, env = "SHMDASH_VERIFY_SSL")]
    pub verify_ssl: bool,

    /// Split uploads into chunks of this many records before sending
    #[arg(long, env = "SHMDASH_CHUNK_SIZE")]
    pub chunk_size: Option<usize>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,

    /// Extra `target=level` log directives, comma separated
    #[arg(long, env = "LOG_DIRECTIVES")]
    pub log_directives: Option<String>,

    /// Configuration file path (optional)
    #[arg(long, env = "SHMDASH_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Derived fields (not CLI arguments)
    #[serde(skip)]
    #[arg(skip)]
    pub timeout: Option<Duration>,

    #[serde(skip)]
    #[arg(skip)]
    pub connect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: "https://shmdash.de".to_string(),
            api_key: String::new(),
            timeout_secs: None,
            connect_timeout_secs: 10,
            verify_ssl: false,
            chunk_size: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Text,
            log_directives: None,
            config_file: None,
            timeout: None,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

// Field ids as clap names them, with the environment variable backing each
const ENV_VARS: [(&str, &str); 9] = [
    ("url", "SHMDASH_URL"),
    ("api_key", "SHMDASH_API_KEY"),
    ("timeout_secs", "SHMDASH_TIMEOUT_SECS"),
    ("connect_timeout_secs", "SHMDASH_CONNECT_TIMEOUT_SECS"),
    ("verify_ssl", "SHMDASH_VERIFY_SSL"),
    ("chunk_size", "SHMDASH_CHUNK_SIZE"),
    ("log_level", "LOG_LEVEL"),
    ("log_format", "LOG_FORMAT"),
    ("log_directives", "LOG_DIRECTIVES"),
];

fn env_is_set(id: &str) -> bool {
    ENV_VARS
        .iter()
        .find(|(field, _)| *field == id)
        .is_some_and(|(_, name)| std::env::var_os(name).is_some())
}

/// Set on the command line or through its environment variable.
fn given_explicitly(matches: &ArgMatches, id: &str) -> bool {
    matches
        .value_source(id)
        .is_some_and(|source| source != ValueSource::DefaultValue)
}

impl Config {
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = Config::command()
            .try_get_matches_from(args)
            .map_err(|e| ConfigError::InvalidConfig(e.to_string()))?;
        let config = Config::from_arg_matches(&matches)
            .map_err(|e| ConfigError::InvalidConfig(e.to_string()))?;
        config.finalize(&matches)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        load_env_string("SHMDASH_URL", &mut config.url);
        load_env_string("SHMDASH_API_KEY", &mut config.api_key);
        load_env_var_opt("SHMDASH_TIMEOUT_SECS", &mut config.timeout_secs)?;
        load_env_var("SHMDASH_CONNECT_TIMEOUT_SECS", &mut config.connect_timeout_secs)?;
        load_env_bool("SHMDASH_VERIFY_SSL", &mut config.verify_ssl)?;
        load_env_var_opt("SHMDASH_CHUNK_SIZE", &mut config.chunk_size)?;
        load_env_var("LOG_LEVEL", &mut config.log_level)?;
        load_env_var("LOG_FORMAT", &mut config.log_format)?;
        load_env_string_opt("LOG_DIRECTIVES", &mut config.log_directives);
        load_env_path_opt("SHMDASH_CONFIG_FILE", &mut config.config_file);

        config.finalize_with(env_is_set)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::read_file(path)?;
        config.post_process()?;
        config.validate()?;
        Ok(config)
    }

    fn read_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Merge the config file (if any), derive durations and validate.
    ///
    /// Values given on the command line or through the environment, as
    /// recorded in `matches`, win over the file.
    pub fn finalize(self, matches: &ArgMatches) -> Result<Self, ConfigError> {
        self.finalize_with(|id| given_explicitly(matches, id))
    }

    fn finalize_with(self, is_explicit: impl Fn(&str) -> bool) -> Result<Self, ConfigError> {
        let mut config = match &self.config_file {
            Some(path) => {
                let file_config = Self::read_file(path)?;
                self.merge(file_config, is_explicit)
            }
            None => self,
        };
        config.post_process()?;
        config.validate()?;
        Ok(config)
    }

    /// Take every field not set explicitly from `file`.
    fn merge(mut self, file: Config, is_explicit: impl Fn(&str) -> bool) -> Self {
        if !is_explicit("url") {
            self.url = file.url;
        }
        if !is_explicit("api_key") {
            self.api_key = file.api_key;
        }
        if !is_explicit("timeout_secs") {
            self.timeout_secs = file.timeout_secs;
        }
        if !is_explicit("connect_timeout_secs") {
            self.connect_timeout_secs = file.connect_timeout_secs;
        }
        if !is_explicit("verify_ssl") {
            self.verify_ssl = file.verify_ssl;
        }
        if !is_explicit("chunk_size") {
            self.chunk_size = file.chunk_size;
        }
        if !is_explicit("log_level") {
            self.log_level = file.log_level;
        }
        if !is_explicit("log_format") {
            self.log_format = file.log_format;
        }
        if !is_explicit("log_directives") {
            self.log_directives = file.log_directives;
        }

        self
    }

    pub fn post_process(&mut self) -> Result<(), ConfigError> {
        self.timeout = self.timeout_secs.map(Duration::from_secs);
        self.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            url: self.url.clone(),
            api_key: self.api_key.clone(),
            timeout: self.timeout,
            connect_timeout: Some(self.connect_timeout),
            verify_ssl: self.verify_ssl,
            chunk_size: self.chunk_size.and_then(NonZeroUsize::new),
            ..ClientConfig::default()
        }
    }
}
