//! Layered configuration for dmread.
//!
//! Sources are merged lowest to highest priority:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. The per-user file, `config.toml` in the platform config directory.
//! 3. An explicit file passed on the command line (TOML, YAML or JSON).
//! 4. `DMREAD_*` environment variables, nested keys split on `__`
//!    (`DMREAD_LOG__PREFIX=RUN`).
//!
//! Command-line flags are applied on top by the binary.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
pub use dmread_decode::Symbology;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::instrument;

const ENV_PREFIX: &str = "DMREAD_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Institution code identifiers must start with, e.g. `MGCL`.
    pub institution: String,
    /// Scan budget for a single decoder run, in milliseconds.
    pub scan_time_ms: u64,
    /// Image extensions to process. Matched case-sensitively.
    pub image_extensions: Vec<String>,
    /// Extension of the raw companion file renamed alongside each image.
    pub raw_extension: String,
    /// Decoders to try, in order.
    pub decoders: Vec<Symbology>,
    pub log: LogConfig,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            institution: "MGCL".to_string(),
            scan_time_ms: 30_000,
            image_extensions: ["JPG", "jpg", "jpeg", "JPEG"].map(String::from).to_vec(),
            raw_extension: "CR2".to_string(),
            decoders: vec![Symbology::Barcode, Symbology::DataMatrix],
            log: LogConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Where audit logs are written; the batch root when unset.
    pub directory: Option<PathBuf>,
    /// File name prefix for audit logs.
    pub prefix: String,
}
impl Default for LogConfig {
    fn default() -> Self {
        Self { directory: None, prefix: "DMREAD_SCRIPT_LOG".to_string() }
    }
}

impl Config {
    /// Loads configuration from every source, with `path` as an optional
    /// explicit file.
    ///
    /// Not validated: apply command-line overrides first, then call
    /// [`validate`](Self::validate).
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(user_config_path(), path)?.extract().or_raise(|| ErrorKind::Load)?;
        tracing::debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// Builds the layered [`Figment`] without extracting it.
    ///
    /// `user` is only merged if it exists; `explicit` must exist.
    pub fn figment(user: Option<PathBuf>, explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(user) = user {
            tracing::trace!(path = %user.display(), "Merging user configuration if present");
            figment = figment.merge(Toml::file_exact(user));
        }
        if let Some(path) = explicit {
            if !path.is_file() {
                exn::bail!(ErrorKind::Invalid(format!("configuration file {} does not exist", path.display())));
            }
            let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
            figment = match extension.as_deref() {
                Some("toml") => figment.merge(Toml::file_exact(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
                Some("json") => figment.merge(Json::file_exact(path)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(path.display().to_string())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn validate(&self) -> Result<()> {
        if self.institution.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("institution code must not be empty".to_string()));
        }
        if self.institution.contains('_') || self.institution.contains(char::is_whitespace) {
            exn::bail!(ErrorKind::Invalid(format!(
                "institution code {:?} must not contain underscores or whitespace",
                self.institution
            )));
        }
        if self.scan_time_ms == 0 {
            exn::bail!(ErrorKind::Invalid("scan_time_ms must be greater than zero".to_string()));
        }
        if self.image_extensions.is_empty() || self.image_extensions.iter().any(|e| e.is_empty()) {
            exn::bail!(ErrorKind::Invalid("image_extensions must list at least one non-empty extension".to_string()));
        }
        if self.raw_extension.is_empty() {
            exn::bail!(ErrorKind::Invalid("raw_extension must not be empty".to_string()));
        }
        if self.decoders.is_empty() {
            exn::bail!(ErrorKind::Invalid("at least one decoder must be enabled".to_string()));
        }
        if self.log.prefix.is_empty() || self.log.prefix.contains(['/', '\\']) {
            exn::bail!(ErrorKind::Invalid(format!("log prefix {:?} is not a valid file name", self.log.prefix)));
        }
        Ok(())
    }

    pub fn scan_time(&self) -> Duration {
        Duration::from_millis(self.scan_time_ms)
    }
}

/// `config.toml` in the platform configuration directory, if the platform
/// has one (e.g. `~/.config/dmread/config.toml` on Linux).
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("edu", "Florida Museum", "dmread").map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    fn extract(jail_file: Option<&str>) -> std::result::Result<Config, figment::Error> {
        let figment = Config::figment(None, jail_file.map(Path::new)).map_err(|e| figment::Error::from(e.to_string()))?;
        figment.extract()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.institution, "MGCL");
        assert_eq!(config.scan_time(), Duration::from_secs(30));
        assert_eq!(config.image_extensions, vec!["JPG", "jpg", "jpeg", "JPEG"]);
        assert_eq!(config.raw_extension, "CR2");
        assert_eq!(config.decoders, vec![Symbology::Barcode, Symbology::DataMatrix]);
        assert_eq!(config.log.prefix, "DMREAD_SCRIPT_LOG");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_figment_without_sources_is_default() {
        Jail::expect_with(|_jail| {
            assert_eq!(extract(None)?, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "dmread.toml",
                r#"
                    institution = "FLMNH"
                    decoders = ["data-matrix"]

                    [log]
                    prefix = "RUN"
                "#,
            )?;
            let config = extract(Some("dmread.toml"))?;
            assert_eq!(config.institution, "FLMNH");
            assert_eq!(config.decoders, vec![Symbology::DataMatrix]);
            assert_eq!(config.log.prefix, "RUN");
            assert_eq!(config.scan_time_ms, 30_000);
            Ok(())
        });
    }

    #[test]
    fn test_yaml_and_json_files() {
        Jail::expect_with(|jail| {
            jail.create_file("dmread.yaml", "scan_time_ms: 500\n")?;
            jail.create_file("dmread.json", r#"{ "raw_extension": "cr2" }"#)?;
            assert_eq!(extract(Some("dmread.yaml"))?.scan_time_ms, 500);
            assert_eq!(extract(Some("dmread.json"))?.raw_extension, "cr2");
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("dmread.toml", "scan_time_ms = 500")?;
            jail.set_env("DMREAD_SCAN_TIME_MS", "750");
            jail.set_env("DMREAD_LOG__DIRECTORY", "/var/log/dmread");
            let config = extract(Some("dmread.toml"))?;
            assert_eq!(config.scan_time_ms, 750);
            assert_eq!(config.log.directory, Some(PathBuf::from("/var/log/dmread")));
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_must_exist() {
        Jail::expect_with(|_jail| {
            let err = Config::figment(None, Some(Path::new("missing.toml"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Invalid(_)));
            Ok(())
        });
    }

    #[test]
    fn test_unsupported_format() {
        Jail::expect_with(|jail| {
            jail.create_file("dmread.ini", "institution = MGCL")?;
            let err = Config::figment(None, Some(Path::new("dmread.ini"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
            Ok(())
        });
    }

    #[rstest]
    #[case::empty_institution(Config { institution: " ".to_string(), ..Config::default() })]
    #[case::underscore(Config { institution: "MG_CL".to_string(), ..Config::default() })]
    #[case::zero_scan_time(Config { scan_time_ms: 0, ..Config::default() })]
    #[case::no_extensions(Config { image_extensions: vec![], ..Config::default() })]
    #[case::blank_extension(Config { image_extensions: vec![String::new()], ..Config::default() })]
    #[case::no_raw_extension(Config { raw_extension: String::new(), ..Config::default() })]
    #[case::no_decoders(Config { decoders: vec![], ..Config::default() })]
    #[case::log_prefix_path(Config {
        log: LogConfig { directory: None, prefix: "a/b".to_string() },
        ..Config::default()
    })]
    fn test_validate_rejects(#[case] config: Config) {
        let err = config.validate().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)));
    }
}
