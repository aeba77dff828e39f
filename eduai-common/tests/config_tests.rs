//! Integration tests for bootstrap configuration resolution
//!
//! Tests that touch EDUAI_CONFIG are marked #[serial] so they never race on
//! the process environment.

use eduai_common::config::{load_config, resolve_config_path, ConfigSource, CONFIG_ENV_VAR};
use serial_test::serial;
use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Shared in-memory sink for captured log output
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
#[serial]
fn test_cli_argument_beats_environment() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/eduai-from-env.toml");

    let cli = PathBuf::from("/tmp/eduai-from-cli.toml");
    let source = resolve_config_path(Some(&cli));
    assert_eq!(source, ConfigSource::CommandLine(cli));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_environment_variable_used_without_cli() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/eduai-from-env.toml");

    let source = resolve_config_path(None);
    assert_eq!(
        source,
        ConfigSource::Environment(PathBuf::from("/tmp/eduai-from-env.toml"))
    );

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_file_degrades_to_defaults() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    let loaded = load_config(Some(&missing)).expect("missing config must not be fatal");
    assert_eq!(loaded.source, ConfigSource::Defaults);
    assert_eq!(loaded.config.port, 5001);
}

#[test]
#[serial]
fn test_file_values_are_loaded() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eduai.toml");
    fs::write(
        &path,
        r#"
host = "127.0.0.1"
port = 6100
model_accuracy = 91.0

[models]
dir = "/var/lib/eduai/models"
classifier = "nb.json"

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let loaded = load_config(Some(&path)).unwrap();
    assert_eq!(loaded.source, ConfigSource::CommandLine(path.clone()));
    assert_eq!(loaded.config.bind_address(), "127.0.0.1:6100");
    assert_eq!(loaded.config.model_accuracy, 91.0);
    assert_eq!(loaded.config.logging.level, "debug");
    assert_eq!(
        loaded.config.models.classifier_path(),
        PathBuf::from("/var/lib/eduai/models/nb.json")
    );
    assert_eq!(
        loaded.config.models.scaler_path(),
        PathBuf::from("/var/lib/eduai/models/scaler.json")
    );
}

#[test]
#[serial]
fn test_malformed_file_is_an_error() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "port = \"not a number\"").unwrap();

    let err = load_config(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("Configuration error"));
}

#[test]
#[serial]
fn test_missing_environment_file_logs_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    env::set_var(CONFIG_ENV_VAR, &missing);

    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let loaded = tracing::subscriber::with_default(subscriber, || load_config(None));
    env::remove_var(CONFIG_ENV_VAR);

    let loaded = loaded.expect("missing config must not be fatal");
    assert_eq!(loaded.source, ConfigSource::Defaults);

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("WARN"), "{output}");
    assert!(output.contains("absent.toml"), "{output}");
}
