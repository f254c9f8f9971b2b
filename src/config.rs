//! Startup configuration.
//!
//! Settings are read once at process start and turned into the explicit
//! objects the request pipeline needs ([`Paginator`], [`CredentialTable`]).
//! Nothing reads the environment after that.

use config::{Config, Environment, File, Map, Source};
use serde::Deserialize;

use crate::pagination::Paginator;
use crate::resolver::CredentialTable;
use crate::secret::Secret;

/// Errors raised while loading or validating [`Settings`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A source could not be read or deserialized.
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
    /// Values were read but are inconsistent.
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Recognized configuration options.
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Upper bound for `per_page`
    #[serde(default = "default_max_per_page")]
    pub max_per_page: i64,
    /// `per_page` used when the caller sends none
    #[serde(default = "default_default_per_page")]
    pub default_per_page: i64,
    /// Longest accepted client/project name, in characters
    #[serde(default = "default_max_input_length")]
    pub max_input_length: usize,
    /// Token bound to the full-access principal
    #[serde(default)]
    pub full_permission_token: Option<Secret<String>>,
    /// Token bound to the no-access principal
    #[serde(default)]
    pub no_permission_token: Option<Secret<String>>,
    /// Token bound to the read-only principal
    #[serde(default)]
    pub read_only_permission_token: Option<Secret<String>>,
}

/// Legacy spelling of `MAX_PER_PAGE`; wins when both are set.
const MAX_PER_PAGE_ALIAS: &str = "MAX_PROJECTS_PER_PAGE";

fn default_max_per_page() -> i64 {
    1000
}

fn default_default_per_page() -> i64 {
    100
}

fn default_max_input_length() -> usize {
    255
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_per_page: default_max_per_page(),
            default_per_page: default_default_per_page(),
            max_input_length: default_max_input_length(),
            full_permission_token: None,
            no_permission_token: None,
            read_only_permission_token: None,
        }
    }
}

impl Settings {
    /// Loads settings from an optional `config.toml` and the environment.
    ///
    /// Environment variables take precedence. A `.env` file, if present, is
    /// read into the environment first. `MAX_PROJECTS_PER_PAGE` is honoured as
    /// an alias of `MAX_PER_PAGE`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if a source cannot be read, a value has the
    /// wrong type, or the result fails [`Settings::validate`].
    pub fn load() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();

        Self::load_layered(File::with_name("config.toml").required(false), None)
    }

    /// Layers `file` under the environment and validates the result.
    ///
    /// `vars` replaces the process environment when given.
    fn load_layered<S>(file: S, vars: Option<Map<String, String>>) -> Result<Self, SettingsError>
    where
        S: Source + Send + Sync + 'static,
    {
        let alias = match &vars {
            Some(vars) => vars.get(MAX_PER_PAGE_ALIAS).cloned(),
            None => std::env::var(MAX_PER_PAGE_ALIAS).ok(),
        };

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::default()
                    .source(vars)
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .set_override_option("max_per_page", alias)?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Checks that the numeric limits are usable.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_per_page < 1 {
            return Err(SettingsError::Invalid(
                "max_per_page must be at least 1".to_string(),
            ));
        }
        if self.default_per_page < 1 {
            return Err(SettingsError::Invalid(
                "default_per_page must be at least 1".to_string(),
            ));
        }
        if self.default_per_page > self.max_per_page {
            return Err(SettingsError::Invalid(format!(
                "default_per_page ({}) exceeds max_per_page ({})",
                self.default_per_page, self.max_per_page
            )));
        }
        if self.max_input_length == 0 {
            return Err(SettingsError::Invalid(
                "max_input_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Paginator configured with these limits.
    pub fn paginator(&self) -> Paginator {
        Paginator::new(self.default_per_page, self.max_per_page)
    }

    /// The reference credential table built from the configured tokens.
    pub fn credential_table(&self) -> CredentialTable {
        let copy = |token: &Option<Secret<String>>| {
            token
                .as_ref()
                .map(|t| Secret::new(t.expose_secret().clone()))
        };

        CredentialTable::reference(
            copy(&self.full_permission_token),
            copy(&self.no_permission_token),
            copy(&self.read_only_permission_token),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Resolution;
    use config::FileFormat;

    fn vars(pairs: &[(&str, &str)]) -> Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn no_file() -> impl Source + Send + Sync + 'static {
        File::from_str("", FileFormat::Toml)
    }

    #[test]
    fn defaults_match_reference_limits() {
        let settings = Settings::default();
        assert_eq!(settings.max_per_page, 1000);
        assert_eq!(settings.default_per_page, 100);
        assert_eq!(settings.max_input_length, 255);
        assert!(settings.validate().is_ok());
        assert!(settings.credential_table().is_empty());
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let settings: Settings =
            serde_json::from_str(r#"{ "max_per_page": 50, "full_permission_token": "abc" }"#)
                .unwrap();

        assert_eq!(settings.max_per_page, 50);
        assert_eq!(settings.default_per_page, 100);
        assert_eq!(format!("{:?}", settings.full_permission_token), "Some([REDACTED])");
    }

    #[test]
    fn validate_rejects_inconsistent_limits() {
        let bad = [
            Settings {
                max_per_page: 0,
                ..Settings::default()
            },
            Settings {
                default_per_page: 0,
                ..Settings::default()
            },
            Settings {
                default_per_page: 2000,
                ..Settings::default()
            },
            Settings {
                max_input_length: 0,
                ..Settings::default()
            },
        ];

        for settings in bad {
            assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));
        }
    }

    #[test]
    fn credential_table_binds_configured_tokens() {
        let settings = Settings {
            full_permission_token: Some(Secret::new("f".to_string())),
            read_only_permission_token: Some(Secret::new("r".to_string())),
            ..Settings::default()
        };

        let table = settings.credential_table();
        assert_eq!(table.len(), 2);

        let resolved = table.resolve(Some(&Secret::new("r".to_string())));
        assert_eq!(resolved.principal().map(|p| p.id.as_str()), Some("read-only"));
        assert_eq!(
            table.resolve(Some(&Secret::new("n".to_string()))),
            Resolution::Unauthenticated
        );
    }

    #[test]
    fn paginator_uses_configured_limits() {
        let settings = Settings {
            max_per_page: 10,
            default_per_page: 5,
            ..Settings::default()
        };
        let paginator = settings.paginator();
        assert_eq!(paginator.default_per_page(), 5);
        assert_eq!(paginator.max_per_page(), 10);
    }

    #[test]
    fn layered_load_uses_defaults_without_sources() {
        let settings = Settings::load_layered(no_file(), Some(vars(&[]))).unwrap();
        assert_eq!(settings.max_per_page, 1000);
        assert_eq!(settings.default_per_page, 100);
        assert!(settings.credential_table().is_empty());
    }

    #[test]
    fn environment_strings_are_parsed() {
        let settings = Settings::load_layered(
            no_file(),
            Some(vars(&[
                ("MAX_PER_PAGE", "50"),
                ("DEFAULT_PER_PAGE", "10"),
                ("MAX_INPUT_LENGTH", "80"),
                ("FULL_PERMISSION_TOKEN", "full-env"),
            ])),
        )
        .unwrap();

        assert_eq!(settings.max_per_page, 50);
        assert_eq!(settings.default_per_page, 10);
        assert_eq!(settings.max_input_length, 80);
        assert_eq!(settings.credential_table().len(), 1);
    }

    #[test]
    fn legacy_alias_overrides_max_per_page() {
        let settings = Settings::load_layered(
            no_file(),
            Some(vars(&[
                ("MAX_PER_PAGE", "50"),
                ("MAX_PROJECTS_PER_PAGE", "20"),
                ("DEFAULT_PER_PAGE", "10"),
            ])),
        )
        .unwrap();

        assert_eq!(settings.max_per_page, 20);
    }

    #[test]
    fn environment_overrides_file() {
        let file = File::from_str(
            "max_per_page = 300\ndefault_per_page = 30\n",
            FileFormat::Toml,
        );
        let settings =
            Settings::load_layered(file, Some(vars(&[("DEFAULT_PER_PAGE", "40")]))).unwrap();

        assert_eq!(settings.max_per_page, 300);
        assert_eq!(settings.default_per_page, 40);
    }

    #[test]
    fn loaded_values_are_validated() {
        let err = Settings::load_layered(
            no_file(),
            Some(vars(&[("MAX_PROJECTS_PER_PAGE", "5"), ("DEFAULT_PER_PAGE", "10")])),
        )
        .unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));

        let err =
            Settings::load_layered(no_file(), Some(vars(&[("MAX_PER_PAGE", "lots")]))).unwrap_err();
        assert!(matches!(err, SettingsError::Load(_)));
    }
}
