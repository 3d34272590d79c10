//! Environment variables sit on top of every file layer.

use figment::Jail;
use urbis_config::{ConfigError, UrbisConfig};
use urbis_core::enums::LevelOfDetail;

#[test]
fn env_fills_nested_sections() {
    Jail::expect_with(|jail| {
        jail.set_env("XDG_CONFIG_HOME", jail.directory().join("xdg").display());
        jail.set_env("URBIS_COMPUTE__BASE_URL", "http://env-compute:9000/");
        jail.set_env("URBIS_COMPUTE__TIMEOUT_SECS", "15");
        jail.set_env("URBIS_COMPUTE__OFFLINE", "true");
        jail.set_env("URBIS_GENERAL__DEFAULT_LOD", "low");

        let config = UrbisConfig::load_from(jail.directory()).expect("config loads");
        assert_eq!(config.compute.base_url, "http://env-compute:9000/");
        assert_eq!(config.compute.timeout_secs, 15);
        assert!(config.compute.offline);
        assert_eq!(config.general.default_lod, LevelOfDetail::Low);
        Ok(())
    });
}

#[test]
fn env_beats_project_file() {
    Jail::expect_with(|jail| {
        jail.set_env("XDG_CONFIG_HOME", jail.directory().join("xdg").display());
        jail.create_dir(".urbis")?;
        jail.create_file(
            ".urbis/config.toml",
            r#"
[store]
path = "from-file.db"
"#,
        )?;
        jail.set_env("URBIS_STORE__PATH", "from-env.db");

        let config = UrbisConfig::load_from(jail.directory()).expect("config loads");
        assert_eq!(config.store.path, "from-env.db");
        Ok(())
    });
}

#[test]
fn unrelated_env_is_ignored() {
    Jail::expect_with(|jail| {
        jail.set_env("XDG_CONFIG_HOME", jail.directory().join("xdg").display());
        jail.set_env("COMPUTE__BASE_URL", "http://not-ours/");

        let config = UrbisConfig::load_from(jail.directory()).expect("config loads");
        assert_eq!(config.compute.base_url, "http://localhost:5000/");
        Ok(())
    });
}

#[test]
fn dotenv_in_project_root_is_loaded() {
    Jail::expect_with(|jail| {
        jail.create_file(".env", "DOTENV_LOADED_MARKER=yes\n")?;

        let loaded = UrbisConfig::load_dotenv(jail.directory()).expect("dotenv loads");
        assert_eq!(loaded, Some(jail.directory().join(".env")));
        assert_eq!(
            std::env::var("DOTENV_LOADED_MARKER").as_deref(),
            Ok("yes")
        );
        Ok(())
    });
}

#[test]
fn missing_dotenv_is_not_an_error() {
    Jail::expect_with(|jail| {
        let loaded = UrbisConfig::load_dotenv(jail.directory()).expect("no dotenv is fine");
        assert_eq!(loaded, None);
        Ok(())
    });
}

#[test]
fn malformed_dotenv_is_reported() {
    Jail::expect_with(|jail| {
        jail.create_file(".env", "this is not an env line\n")?;

        let err = UrbisConfig::load_dotenv(jail.directory()).unwrap_err();
        assert!(matches!(err, ConfigError::Dotenv { ref path, .. } if path.ends_with(".env")));
        Ok(())
    });
}
