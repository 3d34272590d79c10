use urbis_config::UrbisConfig;

/// Emit warnings for settings that are likely mistyped or unusable.
pub fn warn_unconfigured(config: &UrbisConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &UrbisConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();
    let mut warnings = Vec::new();

    if !config.compute.offline && !config.compute.is_configured() {
        if has_single_underscore_key(&env_keys, "URBIS_COMPUTE") {
            warnings.push(
                "Compute config appears default while URBIS_COMPUTE* env vars exist. Use double underscores (example: URBIS_COMPUTE__DEFINITION)."
                    .to_string(),
            );
        } else {
            warnings.push(
                "No compute definition configured; geometry refreshes will fail. Set compute.definition or enable compute.offline."
                    .to_string(),
            );
        }
    }

    if has_single_underscore_key(&env_keys, "URBIS_STORE") {
        warnings.push(
            "URBIS_STORE* env var ignored. Use double underscores (example: URBIS_STORE__PATH)."
                .to_string(),
        );
    }

    warnings
}

fn has_single_underscore_key(env_keys: &[String], prefix: &str) -> bool {
    let sectioned = format!("{prefix}__");
    env_keys
        .iter()
        .any(|key| key.starts_with(prefix) && !key.starts_with(&sectioned))
}
