// Configuration module entry point
// Loads layered configuration: defaults, then config file, then environment,
// then command line overrides

mod types;

use std::net::SocketAddr;
use std::path::Path;

pub use types::{Config, LoggingConfig, PerformanceConfig, ServerConfig, StaticFilesConfig};

/// Environment variable prefix, e.g. `STATICROOTS_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "STATICROOTS";

/// Values given on the command line, applied last
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub static_root: Option<String>,
    pub root: Option<String>,
}

impl Config {
    /// Load configuration from the given file (required when specified),
    /// otherwise from `config.toml` in the working directory if present
    pub fn load_from(
        config_path: Option<&Path>,
        overrides: &Overrides,
    ) -> Result<Self, config::ConfigError> {
        let file = match config_path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("config").required(false),
        };

        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("static_files.static_root", "static")?
            .set_default("static_files.static_prefix", "/static/")?
            .set_default("static_files.max_age", 60)?
            .set_default("static_files.allow_all_origins", true)?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("server.host", overrides.host.clone())?
            .set_override_option("server.port", overrides.port.map(i64::from))?
            .set_override_option("static_files.static_root", overrides.static_root.clone())?
            .set_override_option("static_files.root", overrides.root.clone())?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(contents: &str) -> (TempDir, std::path::PathBuf) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, contents).unwrap();
        (tmp, path)
    }

    #[test]
    fn test_defaults_apply_to_empty_file() {
        let (_tmp, path) = write_config("");
        let cfg = Config::load_from(Some(&path), &Overrides::default()).unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.workers, None);
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.static_files.static_root, "static");
        assert_eq!(cfg.static_files.static_prefix, "/static/");
        assert_eq!(cfg.static_files.root, None);
        assert_eq!(cfg.static_files.max_age, 60);
        assert!(cfg.static_files.allow_all_origins);
    }

    #[test]
    fn test_file_values() {
        let (_tmp, path) = write_config(
            r#"
[server]
port = 9000
workers = 2

[static_files]
static_root = "/srv/static"
root = "/srv/public"
max_age = 0
"#,
        );
        let cfg = Config::load_from(Some(&path), &Overrides::default()).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.workers, Some(2));
        assert_eq!(cfg.static_files.static_root, "/srv/static");
        assert_eq!(cfg.static_files.root.as_deref(), Some("/srv/public"));
        assert_eq!(cfg.static_files.max_age, 0);
    }

    #[test]
    fn test_overrides_win() {
        let (_tmp, path) = write_config("[server]\nport = 9000\n");
        let overrides = Overrides {
            port: Some(7000),
            root: Some("public".to_string()),
            ..Overrides::default()
        };
        let cfg = Config::load_from(Some(&path), &overrides).unwrap();
        assert_eq!(cfg.server.port, 7000);
        assert_eq!(cfg.static_files.root.as_deref(), Some("public"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.toml");
        assert!(Config::load_from(Some(&path), &Overrides::default()).is_err());
    }

    #[test]
    fn test_socket_addr() {
        let (_tmp, path) = write_config("");
        let mut cfg = Config::load_from(Some(&path), &Overrides::default()).unwrap();
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 8080);
        cfg.server.host = "not an address".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
