//! Settings for the sync server. Configuration is read from an optional
//! `settings.toml` next to the binary, overridden by `LEDGER_SYNC__*`
//! environment variables (e.g. `LEDGER_SYNC__SERVER__PORT=3000`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub database: Database,
    pub bind: Option<String>,
    pub port: u16,
    /// Bearer token every request must carry. Unset leaves the API open.
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("LEDGER_SYNC").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn server_section_is_optional() {
        let settings = parse("[app]\nlevel = \"debug\"\n");
        assert_eq!(settings.app.level, "debug");
        assert!(settings.server.is_none());
    }

    #[test]
    fn sqlite_database_with_token() {
        let settings = parse(
            "[server]\nport = 3000\ntoken = \"abc\"\n[server.database]\nsqlite = \"ledger.db\"\n",
        );
        let server = settings.server.unwrap();
        assert_eq!(server.port, 3000);
        assert_eq!(server.token.as_deref(), Some("abc"));
        assert!(matches!(server.database, Database::Sqlite(path) if path == "ledger.db"));
        assert_eq!(settings.app.level, "info");
    }

    #[test]
    fn memory_database() {
        let settings = parse("[server]\nport = 3000\ndatabase = \"memory\"\n");
        assert!(matches!(settings.server.unwrap().database, Database::Memory));
    }
}
