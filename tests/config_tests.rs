use std::fs;
use std::time::Duration;

use bikeyard::error::{ConfigError, Error};
use bikeyard::infrastructure::config::Config;

#[test]
fn loads_file_from_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("bikeyard.toml");
    fs::write(
        &path,
        r#"
[api]
base_url = "https://bikes.example.com/api/"

[http]
retry_backoff_ms = 0

[edit]
close_delay_ms = 250
"#,
    )
    .expect("write config");

    let config = Config::load(&path).unwrap();

    assert_eq!(
        config.base_url().unwrap().as_str(),
        "https://bikes.example.com/api/"
    );
    assert_eq!(config.http.retry_backoff_ms, 0);
    assert_eq!(config.close_delay(), Duration::from_millis(250));
    assert_eq!(config.logging.format, "pretty");
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::ReadFile(_))));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = Config::load_or_default(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.api.base_url, "http://localhost:5000/api");
    assert_eq!(config.close_delay(), Duration::from_millis(1500));
}

#[test]
fn present_but_invalid_file_is_not_replaced_by_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("bikeyard.toml");
    fs::write(&path, "[http]\nretry_max_attempts = 0\n").expect("write config");

    let err = Config::load_or_default(&path).unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidValue {
            field: "retry_max_attempts",
            ..
        })
    ));
}
