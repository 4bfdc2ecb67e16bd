//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;

/// Error type for configuration loading. Only these escalate to the
/// supervisor; anything below (a broken pool, node or check) is skipped
/// with a warning during construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    tracing::info!(path = %path.display(), "loading configuration");
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn minimal_pool_with_defaults() {
        let file = write_config(
            r#"
            [[pool]]
            name = "www"
            ip4 = "192.0.2.10"
            pf_name = "www_pool"

            [[pool.healthchecks]]
            type = "http"
            url = "/status"

            [[pool.nodes]]
            name = "web1"
            ip4 = "10.0.0.1"
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.pools.len(), 1);

        let pool = &config.pools[0];
        assert_eq!(pool.pf_name, "www_pool");
        assert_eq!(pool.min_nodes, 0);
        assert_eq!(pool.max_nodes, 0);

        let check = &pool.healthchecks[0];
        assert_eq!(check.max_failed, 3);
        assert_eq!(check.interval, 1);
        assert_eq!(check.timeout, 1000);

        assert!(!pool.nodes[0].backup);
        assert!(pool.nodes[0].healthchecks.is_none());
    }

    #[test]
    fn pool_missing_required_fields_does_not_abort_the_load() {
        // The broken pool deserializes with empty defaults and is rejected
        // later, during pool construction; the healthy pool survives.
        let file = write_config(
            r#"
            [[pool]]
            name = "www"
            ip4 = "192.0.2.10"
            pf_name = "www_pool"

            [[pool]]
            name = "broken"
            ip4 = "192.0.2.11"
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.pools.len(), 2);
        assert!(config.pools[1].pf_name.is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_config(Path::new("/nonexistent/pfguard.toml")).is_err());
    }

    #[test]
    fn unparseable_toml_is_an_error() {
        let file = write_config("[[pool]\nname =");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn degrade_action_names() {
        let file = write_config(
            r#"
            [[pool]]
            name = "a"
            ip4 = "192.0.2.1"
            pf_name = "a"
            min_nodes = 1
            min_nodes_action = "backup_pool"
            "#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(
            config.pools[0].min_nodes_action,
            crate::config::schema::DegradeAction::BackupPool
        );
    }
}
