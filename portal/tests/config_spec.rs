//! Portal settings and seed loading from a config directory.

use std::fs;

use config_loader::ConfigLoader;
use portal::config::{LogFormat, PortalConfig};
use portal::store::RecordStore;
use serial_test::serial;
use tempfile::TempDir;

const ENV_KEYS: [&str; 5] = ["PORT", "BIND_ADDR", "JWT_SECRET", "JWT_ALGORITHM", "PORTAL_LOG_FORMAT"];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

fn given_config_dir(portal_yaml: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("portal.yaml"), portal_yaml).unwrap();
    dir
}

#[test]
#[serial]
fn test_missing_file_uses_defaults() {
    clear_env();
    let dir = TempDir::new().unwrap();

    let config = PortalConfig::load(&ConfigLoader::with_dir(dir.path())).unwrap();

    assert_eq!(config, PortalConfig::default());
    assert_eq!(config.listen_addr(), "0.0.0.0:3000");
}

#[test]
#[serial]
fn test_file_values_then_env_overrides() {
    clear_env();
    let dir = given_config_dir("port: 8080\njwtSecret: from-file\nlogFormat: json\npageSize: 0\n");
    std::env::set_var("PORT", "9000");

    let config = PortalConfig::load(&ConfigLoader::with_dir(dir.path())).unwrap();
    clear_env();

    assert_eq!(config.port, 9000);
    assert_eq!(config.jwt_secret.as_deref(), Some("from-file"));
    assert_eq!(config.log_format, LogFormat::Json);
    assert_eq!(config.page_size, 10);
}

#[test]
#[serial]
fn test_malformed_file_is_an_error() {
    clear_env();
    let dir = given_config_dir("port: [not a number\n");

    assert!(PortalConfig::load(&ConfigLoader::with_dir(dir.path())).is_err());
}

#[test]
fn test_seed_file_populates_store() {
    let dir = TempDir::new().unwrap();
    let seed_path = dir.path().join("seed.yaml");
    fs::write(
        &seed_path,
        r#"
menuItems:
  - id: 1
    name: home
    label: Home
    target:
      kind: content_page
      id: 1
      name: home
questions:
  - id: 7
    questionnaireId: 2
    txt: Was it on time?
    type: Checkbox
    seq: 1.0
latePolicies:
  - id: 3
    policyName: Standard
    instructorId: 6
    maxPenalty: 50
    penaltyPerUnit: 10
    penaltyUnit: Hour
"#,
    )
    .unwrap();

    let config = PortalConfig {
        seed_file: Some(seed_path),
        ..PortalConfig::default()
    };
    let store = config.open_store().unwrap();

    assert_eq!(store.menu_items().unwrap().len(), 1);
    assert_eq!(store.find_question(7).unwrap().txt, "Was it on time?");
    assert_eq!(store.list_late_policies(6).unwrap()[0].policy_name, "Standard");
}

#[test]
fn test_missing_seed_file_is_an_error() {
    let config = PortalConfig {
        seed_file: Some("/nonexistent/seed.yaml".into()),
        ..PortalConfig::default()
    };
    assert!(config.open_store().is_err());
}
