use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment overrides, e.g. `PTF__DISPATCH__QUEUE_WARN_DEPTH`.
pub const ENV_PREFIX: &str = "PTF";
const DEFAULT_CONFIG_BASENAME: &str = "ptf";

/// Custom error type for config loading.
#[ptf_derive::ptf_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Layered configuration loader.
///
/// 1. **Base File**: settings from `path` (format picked from the extension).
///    An explicit path must exist; without one, an optional `ptf.*` file in
///    the working directory is used when present.
/// 2. **Environment Overrides**: variables prefixed with `PTF__`, nested with
///    double underscores (`PTF__LOGGING__LEVEL` maps to `logging.level`).
///
/// # Errors
/// * The explicitly given file cannot be found or parsed.
/// * The merged values do not match the structure of `T`.
///
/// # Example
/// ```rust
/// use ptf_kernel::config::load_config;
/// use ptf_kernel::domain::config::FrameworkConfig;
///
/// let cfg: FrameworkConfig = load_config(None::<&str>).unwrap_or_default();
/// assert_eq!(cfg.dispatch.thread_name, "ptf-dispatch");
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let (effective_path, required) = path.map_or_else(
        || (PathBuf::from(DEFAULT_CONFIG_BASENAME), false),
        |p| (p.as_ref().to_path_buf(), true),
    );

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX).prefix_separator("__").separator("__"),
        );

    info!(path = %effective_path.display(), required, "Loading framework config");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptf_domain::config::FrameworkConfig;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    #[serial]
    fn explicit_file_is_loaded() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(
            file,
            r#"
            [dispatch]
            queue_warn_depth = 4

            [[platform.participants]]
            name = "TCPU"
            "#
        )?;

        let cfg: FrameworkConfig = load_config(Some(file.path()))?;
        assert_eq!(cfg.dispatch.queue_warn_depth, 4);
        assert_eq!(cfg.platform.participants[0].name, "TCPU");
        assert_eq!(cfg.logging.level, "info");
        Ok(())
    }

    #[test]
    #[serial]
    fn missing_explicit_file_is_an_error() {
        let err = load_config::<FrameworkConfig>(Some("/nonexistent/ptf-config.toml"))
            .expect_err("explicit path must exist");
        assert_eq!(err.kind(), "Config");
    }

    #[test]
    #[serial]
    fn absent_default_file_falls_back_to_defaults() -> Result<(), ConfigError> {
        let cfg: FrameworkConfig = load_config(None::<&str>)?;
        assert_eq!(cfg.dispatch.thread_name, "ptf-dispatch");
        Ok(())
    }
}
