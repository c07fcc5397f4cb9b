use serial_test::serial;
use shmdash::app::{Config, ConfigError, LogFormat, LogLevel};
use std::io::Write;
use std::time::Duration;
use std::{env, fs};
use tempfile::{NamedTempFile, TempDir};

const ENV_VARS: [&str; 10] = [
    "SHMDASH_URL",
    "SHMDASH_API_KEY",
    "SHMDASH_TIMEOUT_SECS",
    "SHMDASH_CONNECT_TIMEOUT_SECS",
    "SHMDASH_VERIFY_SSL",
    "SHMDASH_CHUNK_SIZE",
    "SHMDASH_CONFIG_FILE",
    "LOG_LEVEL",
    "LOG_FORMAT",
    "LOG_DIRECTIVES",
];

fn clean_all_env_vars() {
    unsafe {
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }
}

fn set_env(name: &str, value: &str) {
    unsafe {
        env::set_var(name, value);
    }
}

#[test]
#[serial]
fn test_config_from_args() {
    clean_all_env_vars();

    let config = Config::from_args([
        "shmdash",
        "--url",
        "https://dev.shmdash.de",
        "--api-key",
        "key",
        "--timeout-secs",
        "30",
        "--chunk-size",
        "500",
        "--verify-ssl",
        "--log-level",
        "debug",
        "--log-format",
        "json",
    ])
    .unwrap();

    assert_eq!(config.url, "https://dev.shmdash.de");
    assert_eq!(config.api_key, "key");
    assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    assert_eq!(config.connect_timeout, Duration::from_secs(10));
    assert!(config.verify_ssl);
    assert_eq!(config.chunk_size, Some(500));
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.log_format, LogFormat::Json);

    let client_config = config.client_config();
    assert_eq!(client_config.url, "https://dev.shmdash.de");
    assert_eq!(client_config.timeout, Some(Duration::from_secs(30)));
    assert_eq!(client_config.chunk_size.map(|n| n.get()), Some(500));
    assert!(client_config.verify_ssl);
}

#[test]
#[serial]
fn test_config_from_environment() {
    clean_all_env_vars();
    set_env("SHMDASH_URL", "http://localhost:8080");
    set_env("SHMDASH_API_KEY", "env-key");
    set_env("SHMDASH_CONNECT_TIMEOUT_SECS", "3");
    set_env("SHMDASH_VERIFY_SSL", "yes");
    set_env("SHMDASH_CHUNK_SIZE", "128");
    set_env("LOG_LEVEL", "WARN");

    let config = Config::from_env().unwrap();

    assert_eq!(config.url, "http://localhost:8080");
    assert_eq!(config.api_key, "env-key");
    assert_eq!(config.connect_timeout, Duration::from_secs(3));
    assert!(config.timeout.is_none());
    assert!(config.verify_ssl);
    assert_eq!(config.chunk_size, Some(128));
    assert_eq!(config.log_level, LogLevel::Warn);

    clean_all_env_vars();
}

#[test]
#[serial]
fn test_invalid_environment_values() {
    clean_all_env_vars();
    set_env("SHMDASH_API_KEY", "key");

    set_env("SHMDASH_CHUNK_SIZE", "many");
    assert!(matches!(Config::from_env(), Err(ConfigError::EnvError(_))));
    clean_all_env_vars();

    set_env("SHMDASH_API_KEY", "key");
    set_env("SHMDASH_VERIFY_SSL", "maybe");
    assert!(matches!(Config::from_env(), Err(ConfigError::EnvError(_))));
    clean_all_env_vars();

    set_env("SHMDASH_API_KEY", "key");
    set_env("LOG_LEVEL", "loud");
    assert!(matches!(Config::from_env(), Err(ConfigError::EnvError(_))));
    clean_all_env_vars();
}

#[test]
#[serial]
fn test_config_validation() {
    clean_all_env_vars();

    let missing_key = Config::from_env();
    assert!(matches!(missing_key, Err(ConfigError::InvalidConfig(_))));

    let config = Config {
        api_key: "key".to_string(),
        url: "not a url".to_string(),
        ..Config::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));

    let config = Config {
        api_key: "key".to_string(),
        url: "ftp://shmdash.de".to_string(),
        ..Config::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));

    let config = Config {
        api_key: "key".to_string(),
        chunk_size: Some(0),
        ..Config::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::InvalidConfig(_))));

    let config = Config {
        api_key: "key".to_string(),
        timeout_secs: Some(0),
        ..Config::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::InvalidConfig(_))));

    let config = Config {
        api_key: "key".to_string(),
        ..Config::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_config_from_file() {
    clean_all_env_vars();

    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
url = "https://dev.shmdash.de"
api_key = "file-key"
timeout_secs = 60
chunk_size = 1000
log_level = "trace"
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.url, "https://dev.shmdash.de");
    assert_eq!(config.api_key, "file-key");
    assert_eq!(config.timeout, Some(Duration::from_secs(60)));
    assert_eq!(config.connect_timeout, Duration::from_secs(10));
    assert_eq!(config.chunk_size, Some(1000));
    assert_eq!(config.log_level, LogLevel::Trace);
    assert_eq!(config.log_format, LogFormat::Text);
}

#[test]
#[serial]
fn test_arguments_override_config_file() {
    clean_all_env_vars();

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("shmdash.toml");
    fs::write(
        &path,
        "url = \"https://file.shmdash.de\"\napi_key = \"file-key\"\nconnect_timeout_secs = 5\n",
    )
    .unwrap();

    let config = Config::from_args([
        "shmdash",
        "--url",
        "https://cli.shmdash.de",
        "--config-file",
        path.to_str().unwrap(),
    ])
    .unwrap();

    assert_eq!(config.url, "https://cli.shmdash.de");
    assert_eq!(config.api_key, "file-key");
    assert_eq!(config.connect_timeout, Duration::from_secs(5));
}

#[test]
#[serial]
fn test_explicit_default_values_override_config_file() {
    clean_all_env_vars();

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("shmdash.toml");
    fs::write(
        &path,
        r#"
url = "https://file.shmdash.de"
api_key = "file-key"
connect_timeout_secs = 30
log_level = "debug"
log_format = "json"
log_directives = "reqwest=debug"
"#,
    )
    .unwrap();

    let config = Config::from_args([
        "shmdash",
        "--config-file",
        path.to_str().unwrap(),
        "--url",
        "https://shmdash.de",
        "--log-level",
        "info",
        "--connect-timeout-secs",
        "10",
    ])
    .unwrap();

    assert_eq!(config.url, "https://shmdash.de");
    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.connect_timeout_secs, 10);
    assert_eq!(config.connect_timeout, Duration::from_secs(10));
    // Not given, so taken from the file
    assert_eq!(config.api_key, "file-key");
    assert_eq!(config.log_format, LogFormat::Json);
    assert_eq!(config.log_directives.as_deref(), Some("reqwest=debug"));
}

#[test]
#[serial]
fn test_environment_overrides_config_file() {
    clean_all_env_vars();

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "api_key = \"file-key\"\nverify_ssl = true\nlog_level = \"trace\"").unwrap();

    set_env("SHMDASH_VERIFY_SSL", "false");
    set_env("LOG_LEVEL", "info");
    set_env("SHMDASH_CONFIG_FILE", file.path().to_str().unwrap());

    let from_env = Config::from_env().unwrap();
    let from_args = Config::from_args(["shmdash"]).unwrap();

    for config in [from_env, from_args] {
        assert!(!config.verify_ssl);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.api_key, "file-key");
    }

    clean_all_env_vars();
}

#[test]
#[serial]
fn test_log_directives_from_args() {
    clean_all_env_vars();

    let config = Config::from_args([
        "shmdash",
        "--api-key",
        "key",
        "--log-directives",
        "shmdash::sender=debug,hyper=info",
    ])
    .unwrap();

    assert_eq!(
        config.log_directives.as_deref(),
        Some("shmdash::sender=debug,hyper=info")
    );
}

#[test]
#[serial]
fn test_missing_config_file() {
    clean_all_env_vars();

    let result = Config::from_file("/nonexistent/shmdash.toml");
    assert!(matches!(result, Err(ConfigError::FileError(_))));

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "timeout_secs = \"soon\"").unwrap();
    assert!(matches!(
        Config::from_file(file.path()),
        Err(ConfigError::ParseError(_))
    ));
}
