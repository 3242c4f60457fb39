//! Kept in its own test binary: it mutates the process environment.

use jarguard_config::{discover_config_path, load, JARGUARD_CONFIG_ENV_VAR};

#[test]
fn env_var_is_resolved_against_working_dir_and_loses_to_explicit() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("jarguard.toml"), "").unwrap();
    std::fs::write(dir.path().join("from-env.toml"), "[logging]\njson = true\n").unwrap();
    let explicit = dir.path().join("explicit.toml");
    std::fs::write(&explicit, "").unwrap();

    std::env::set_var(JARGUARD_CONFIG_ENV_VAR, "from-env.toml");

    assert_eq!(
        discover_config_path(None, dir.path()),
        Some(dir.path().join("from-env.toml"))
    );
    let (config, _) = load(None, dir.path()).unwrap();
    assert!(config.logging.json);
    assert_eq!(
        discover_config_path(Some(explicit.as_path()), dir.path()),
        Some(explicit.clone())
    );

    std::env::remove_var(JARGUARD_CONFIG_ENV_VAR);
    assert_eq!(
        discover_config_path(None, dir.path()),
        Some(dir.path().join("jarguard.toml"))
    );
}
