use std::fs;
use std::path::PathBuf;

use comiclink::config::{Config, ConfigError};
use figment::providers::Serialized;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = figment::Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.extensions, vec!["cbz", "cbr", "pdf"]);
    assert_eq!(config.volume_pattern, r"[._]T(\d+)");
    assert!(config.notify);
    assert!(config.cleanup);
    assert!(!config.should_notify());
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
source_dirs = ["/mnt/comics", "/mnt/more"]
destination_root = "/srv/library"
webhook_url = "https://discord.com/api/webhooks/1/abc"
threads = 8
exclude = ["@eaDir/"]
missing_info_fallback = true
"#;
    fs::write(&config_path, toml_content).unwrap();

    let config = Config::load(Some(&config_path)).unwrap();

    assert_eq!(
        config.source_dirs,
        vec![PathBuf::from("/mnt/comics"), PathBuf::from("/mnt/more")]
    );
    assert_eq!(config.destination_root, PathBuf::from("/srv/library"));
    assert_eq!(config.threads, 8);
    assert_eq!(config.exclude, vec!["@eaDir/"]);
    assert!(config.missing_info_fallback);
    // Unset keys keep their defaults
    assert_eq!(config.extensions, vec!["cbz", "cbr", "pdf"]);
    assert!(config.cleanup);
    assert!(config.should_notify());
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_load_from_env() {
    std::env::set_var("COMICLINK_ENVTEST_THREADS", "16");
    std::env::set_var("COMICLINK_ENVTEST_CLEANUP", "false");

    // Use figment directly with a private prefix so other tests are unaffected
    use figment::{providers::Env, Figment};
    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("COMICLINK_ENVTEST_"));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config.threads, 16);
    assert!(!config.cleanup);

    std::env::remove_var("COMICLINK_ENVTEST_THREADS");
    std::env::remove_var("COMICLINK_ENVTEST_CLEANUP");
}

#[test]
fn test_config_invalid_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "threads = \"many\"").unwrap();

    let result = Config::load(Some(&config_path));
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

#[test]
fn test_config_missing_explicit_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("absent.toml");

    let result = Config::load(Some(&config_path));
    assert!(matches!(result, Err(ConfigError::MissingFile(p)) if p == config_path));
}

#[test]
fn test_config_file_with_bad_pattern_fails_validation() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "volume_pattern = \"Tome\\\\d+\"").unwrap();

    let config = Config::load(Some(&config_path)).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::VolumePatternGroup(_))
    ));
}
