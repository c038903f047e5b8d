use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use texto_legado::Fallback;

use crate::legado::ConnectionOptions;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub legado: LegacySettings,
    pub logging: LoggingSettings,
}

/// Conexão com o banco legado (Firebird)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LegacySettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub charset: String,
    /// Máximo de conexões anexadas ao mesmo tempo
    pub pool_size: usize,
    /// Sem valor = sem timeout por BLOB
    #[serde(default)]
    pub blob_timeout_ms: Option<u64>,
    #[serde(default)]
    pub text_fallback: Fallback,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

impl LegacySettings {
    pub fn connection_options(&self) -> ConnectionOptions {
        ConnectionOptions {
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            charset: self.charset.clone(),
        }
    }

    pub fn blob_timeout(&self) -> Option<Duration> {
        self.blob_timeout_ms.map(Duration::from_millis)
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size.max(1)
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        Self::builder(&run_mode)?.build()?.try_deserialize()
    }

    fn builder(
        run_mode: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let builder = Config::builder()
            .set_default("legado.host", "localhost")?
            .set_default("legado.port", 3050)?
            .set_default("legado.database", "")?
            .set_default("legado.user", "SYSDBA")?
            .set_default("legado.password", "")?
            .set_default("legado.charset", "WIN1252")?
            .set_default("legado.pool_size", 4)?
            .set_default("legado.text_fallback", "latin1")?
            .set_default("logging.level", "info")?
            // Arquivo de configuração base
            .add_source(File::with_name("config/default").required(false))
            // Arquivo específico do ambiente
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // SOLUTII__LEGADO__HOST, SOLUTII__LOGGING__LEVEL, ...
            .add_source(
                Environment::with_prefix("SOLUTII")
                    .prefix_separator("__")
                    .separator("__"),
            );

        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_sem_arquivos() {
        let settings: Settings = Settings::builder("test-inexistente")
            .unwrap()
            .set_override("legado.database", "/dados/SOLUTII.FDB")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.legado.port, 3050);
        assert_eq!(settings.legado.charset, "WIN1252");
        assert_eq!(settings.legado.pool_size(), 4);
        assert_eq!(settings.legado.text_fallback, Fallback::Latin1);
        assert!(settings.legado.blob_timeout().is_none());
        assert_eq!(settings.logging.level, "info");

        let options = settings.legado.connection_options();
        assert_eq!(options.database, "/dados/SOLUTII.FDB");
        assert_eq!(options.user, "SYSDBA");
    }

    #[test]
    fn test_overrides() {
        let settings: Settings = Settings::builder("test-inexistente")
            .unwrap()
            .set_override("legado.blob_timeout_ms", 1500)
            .unwrap()
            .set_override("legado.text_fallback", "windows1252")
            .unwrap()
            .set_override("legado.pool_size", 0)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.legado.blob_timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(settings.legado.text_fallback, Fallback::Windows1252);
        assert_eq!(settings.legado.pool_size(), 1);
    }
}
