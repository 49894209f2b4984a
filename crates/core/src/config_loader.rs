use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Base figment: built-in defaults, then `config/Config.toml`.
    fn base() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("config/Config.toml"))
    }

    /// Loads configuration by merging defaults, TOML, environment variables,
    /// and JSON.
    ///
    /// Environment variables use the `PARLAY_` prefix with `__` as the
    /// nesting separator, e.g. `PARLAY_API__BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load() -> Result<AppConfig> {
        let config: AppConfig = Self::base()
            .merge(Env::prefixed("PARLAY_").split("__"))
            .join(Json::file("config/Config.json"))
            .extract()?;

        Ok(config)
    }

    /// Loads configuration with a specific profile overlay
    /// (`config/Config.{profile}.toml`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load_with_profile(profile: &str) -> Result<AppConfig> {
        let config: AppConfig = Self::base()
            .merge(Toml::file(format!("config/Config.{profile}.toml")))
            .merge(Env::prefixed("PARLAY_").split("__"))
            .join(Json::file("config/Config.json"))
            .extract()?;

        Ok(config)
    }

    /// Loads configuration from an explicit TOML file instead of
    /// `config/Config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed.
    pub fn load_from(path: &str) -> Result<AppConfig> {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("PARLAY_").split("__"))
            .extract()?;

        Ok(config)
    }
}
