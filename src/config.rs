//! Connection configuration.
//!
//! Settings come from an optional YAML file, then CLI flags override them
//! field by field. The merged settings are resolved into a concrete
//! `ConnectionConfig` before anything connects.

use crate::catalog::{Catalog, CatalogError, CatalogResult, DuckDbCatalog, MssqlCatalog};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable consulted for the SQL login password
pub const PASSWORD_ENV: &str = "SCHEMA_GRAPH_PASSWORD";

/// Catalog backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// SQL Server / Azure SQL
    #[default]
    Mssql,
    /// DuckDB database file
    Duckdb,
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mssql" | "sqlserver" | "sql-server" => Ok(SourceKind::Mssql),
            "duckdb" | "duck" => Ok(SourceKind::Duckdb),
            _ => Err(format!(
                "Unknown source: {}. Valid options: mssql, duckdb",
                s
            )),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Mssql => write!(f, "mssql"),
            SourceKind::Duckdb => write!(f, "duckdb"),
        }
    }
}

/// How to authenticate against SQL Server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    /// Windows integrated security (`Trusted_Connection=True`)
    #[default]
    Integrated,
    /// SQL Server login with user and password
    Sql,
}

impl std::str::FromStr for AuthKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "integrated" | "windows" | "trusted" => Ok(AuthKind::Integrated),
            "sql" | "sql-server" | "login" => Ok(AuthKind::Sql),
            _ => Err(format!(
                "Unknown authentication mode: {}. Valid options: integrated, sql",
                s
            )),
        }
    }
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthKind::Integrated => write!(f, "integrated"),
            AuthKind::Sql => write!(f, "sql"),
        }
    }
}

/// Connection settings as written in the YAML file. Every field is optional
/// so a file and the CLI flags can each supply part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub source: Option<SourceKind>,
    pub server: Option<String>,
    /// Named instance, resolved through the SQL Browser service
    pub instance: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub auth: Option<AuthKind>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub trust_cert: Option<bool>,
    pub encrypt: Option<bool>,
    pub connect_timeout_secs: Option<u64>,
    /// Raw ADO.NET connection string; wins over the individual fields
    pub connection_string: Option<String>,
    /// DuckDB database file
    pub path: Option<PathBuf>,
}

impl SourceConfig {
    /// Load settings from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: SourceConfig = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Per-user config file location, if the platform has a config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("schema-graph").join("config.yaml"))
    }

    /// Load `explicit` if given, else the per-user file when it exists, else defaults
    pub fn discover(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path)
                .with_context(|| format!("failed to load config {}", path.display()));
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                log::info!("using config file {}", path.display());
                Self::load(&path)
                    .with_context(|| format!("failed to load config {}", path.display()))
            }
            _ => Ok(Self::default()),
        }
    }

    /// Overlay `other` on top of `self`: any field set in `other` wins
    pub fn merge(self, other: SourceConfig) -> SourceConfig {
        SourceConfig {
            source: other.source.or(self.source),
            server: other.server.or(self.server),
            instance: other.instance.or(self.instance),
            port: other.port.or(self.port),
            database: other.database.or(self.database),
            auth: other.auth.or(self.auth),
            user: other.user.or(self.user),
            password: other.password.or(self.password),
            trust_cert: other.trust_cert.or(self.trust_cert),
            encrypt: other.encrypt.or(self.encrypt),
            connect_timeout_secs: other.connect_timeout_secs.or(self.connect_timeout_secs),
            connection_string: other.connection_string.or(self.connection_string),
            path: other.path.or(self.path),
        }
    }

    /// Validate and resolve into a concrete connection config.
    ///
    /// A DuckDB `path` without an explicit `source` selects the DuckDB backend.
    pub fn resolve(self) -> CatalogResult<ConnectionConfig> {
        let kind = match (self.source, &self.path) {
            (Some(kind), _) => kind,
            (None, Some(_)) => SourceKind::Duckdb,
            (None, None) => SourceKind::Mssql,
        };

        match kind {
            SourceKind::Duckdb => {
                let path = self
                    .path
                    .ok_or_else(|| CatalogError::config("duckdb source requires a path"))?;
                Ok(ConnectionConfig::Duckdb { path })
            }
            SourceKind::Mssql => self.resolve_mssql().map(ConnectionConfig::Mssql),
        }
    }

    fn resolve_mssql(self) -> CatalogResult<MssqlConfig> {
        let connect_timeout = self.connect_timeout_secs.map(Duration::from_secs);

        if let Some(connection_string) = self.connection_string {
            // The ADO string decides which database is opened
            let database = ado_database(&connection_string);
            if let Some(ref flag) = self.database {
                if database.as_deref() != Some(flag.as_str()) {
                    return Err(CatalogError::config(format!(
                        "database '{}' conflicts with the connection string; set it there instead",
                        flag
                    )));
                }
            }
            return Ok(MssqlConfig {
                server: self.server.unwrap_or_default(),
                instance: None,
                port: None,
                database,
                auth: AuthMode::Integrated,
                trust_cert: false,
                encrypt: None,
                connect_timeout,
                connection_string: Some(connection_string),
            });
        }

        let server = self
            .server
            .ok_or_else(|| CatalogError::config("missing server (use --server or `server:`)"))?;
        let database = self.database.ok_or_else(|| {
            CatalogError::config("missing database (use --database or `database:`)")
        })?;

        let auth = match self.auth.unwrap_or_default() {
            AuthKind::Integrated => AuthMode::Integrated,
            AuthKind::Sql => {
                let user = self
                    .user
                    .ok_or_else(|| CatalogError::config("sql authentication requires a user"))?;
                let password = self.password.ok_or_else(|| {
                    CatalogError::config(format!(
                        "sql authentication requires a password (use --password or {})",
                        PASSWORD_ENV
                    ))
                })?;
                AuthMode::Sql { user, password }
            }
        };

        // `HOST\INSTANCE` is the usual way to name an instance
        let (server, instance) = match (server.split_once('\\'), self.instance) {
            (_, Some(instance)) => (server, Some(instance)),
            (Some((host, inst)), None) => (host.to_string(), Some(inst.to_string())),
            (None, None) => (server, None),
        };

        Ok(MssqlConfig {
            server,
            instance,
            port: self.port,
            database: Some(database),
            auth,
            trust_cert: self.trust_cert.unwrap_or(false),
            encrypt: self.encrypt,
            connect_timeout,
            connection_string: None,
        })
    }
}

/// `Database` / `Initial Catalog` value of an ADO.NET connection string
fn ado_database(connection_string: &str) -> Option<String> {
    connection_string
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| {
            let key = key.trim().to_ascii_lowercase();
            key == "database" || key == "initial catalog"
        })
        .map(|(_, value)| value.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
        .filter(|value| !value.is_empty())
}

/// Resolved SQL Server authentication
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    Integrated,
    Sql { user: String, password: String },
}

impl fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Integrated => write!(f, "Integrated"),
            AuthMode::Sql { user, .. } => f
                .debug_struct("Sql")
                .field("user", user)
                .field("password", &"***")
                .finish(),
        }
    }
}

/// Resolved SQL Server connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MssqlConfig {
    pub server: String,
    pub instance: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub auth: AuthMode,
    pub trust_cert: bool,
    pub encrypt: Option<bool>,
    pub connect_timeout: Option<Duration>,
    pub connection_string: Option<String>,
}

impl MssqlConfig {
    /// Connection target for status lines (never includes credentials)
    pub fn describe(&self) -> String {
        if self.connection_string.is_some() {
            return match self.database {
                Some(ref db) => format!("mssql:<connection string>/{}", db),
                None => "mssql:<connection string>".to_string(),
            };
        }
        let mut target = format!("mssql:{}", self.server);
        if let Some(ref instance) = self.instance {
            target.push('\\');
            target.push_str(instance);
        }
        if let Some(port) = self.port {
            target.push_str(&format!(":{}", port));
        }
        if let Some(ref db) = self.database {
            target.push('/');
            target.push_str(db);
        }
        target
    }
}

/// A fully resolved catalog connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionConfig {
    Mssql(MssqlConfig),
    Duckdb { path: PathBuf },
}

impl ConnectionConfig {
    /// Build the catalog backend for this connection
    pub fn open(self) -> CatalogResult<Box<dyn Catalog>> {
        match self {
            ConnectionConfig::Mssql(settings) => Ok(Box::new(MssqlCatalog::new(settings)?)),
            ConnectionConfig::Duckdb { path } => Ok(Box::new(DuckDbCatalog::new(path))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
source: mssql
server: "IZHAK-LENOVO\\SQLEXPRESS"
database: AdventureWorks2022
auth: integrated
trust_cert: true
"#;
        let config: SourceConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.source, Some(SourceKind::Mssql));
        assert_eq!(config.auth, Some(AuthKind::Integrated));
        assert_eq!(config.trust_cert, Some(true));
    }

    #[test]
    fn test_unknown_yaml_field_rejected() {
        let yaml = "server: localhost\nhostname: typo\n";
        assert!(serde_yaml_ng::from_str::<SourceConfig>(yaml).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "source: duckdb\npath: /tmp/shop.duckdb").unwrap();

        let config = SourceConfig::load(file.path()).unwrap();
        assert_eq!(
            config.resolve().unwrap(),
            ConnectionConfig::Duckdb {
                path: PathBuf::from("/tmp/shop.duckdb")
            }
        );
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = SourceConfig {
            server: Some("file-host".to_string()),
            database: Some("FileDb".to_string()),
            ..Default::default()
        };
        let cli = SourceConfig {
            database: Some("CliDb".to_string()),
            ..Default::default()
        };

        let merged = file.merge(cli);
        assert_eq!(merged.server.as_deref(), Some("file-host"));
        assert_eq!(merged.database.as_deref(), Some("CliDb"));
    }

    #[test]
    fn test_resolve_instance_from_server() {
        let config = SourceConfig {
            server: Some("IZHAK-LENOVO\\ELINORSQLSERVER".to_string()),
            database: Some("AdventureWorks2022".to_string()),
            ..Default::default()
        };

        match config.resolve().unwrap() {
            ConnectionConfig::Mssql(settings) => {
                assert_eq!(settings.server, "IZHAK-LENOVO");
                assert_eq!(settings.instance.as_deref(), Some("ELINORSQLSERVER"));
                assert_eq!(settings.auth, AuthMode::Integrated);
                assert_eq!(
                    settings.describe(),
                    "mssql:IZHAK-LENOVO\\ELINORSQLSERVER/AdventureWorks2022"
                );
            }
            other => panic!("expected mssql config, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_requires_database() {
        let config = SourceConfig {
            server: Some("localhost".to_string()),
            ..Default::default()
        };
        let err = config.resolve().unwrap_err();
        assert!(err.to_string().contains("missing database"));
    }

    #[test]
    fn test_sql_auth_requires_credentials() {
        let config = SourceConfig {
            server: Some("localhost".to_string()),
            database: Some("Sales".to_string()),
            auth: Some(AuthKind::Sql),
            user: Some("reader".to_string()),
            ..Default::default()
        };
        let err = config.resolve().unwrap_err();
        assert!(err.to_string().contains("requires a password"));
    }

    #[test]
    fn test_path_implies_duckdb() {
        let config = SourceConfig {
            path: Some(PathBuf::from("local.duckdb")),
            ..Default::default()
        };
        assert!(matches!(
            config.resolve().unwrap(),
            ConnectionConfig::Duckdb { .. }
        ));
    }

    #[test]
    fn test_connection_string_names_the_database() {
        let config = SourceConfig {
            connection_string: Some(
                "Server=tcp:db.internal,1433;Initial Catalog=Sales;User Id=sa;Password=pw"
                    .to_string(),
            ),
            ..Default::default()
        };
        match config.resolve().unwrap() {
            ConnectionConfig::Mssql(settings) => {
                assert_eq!(settings.database.as_deref(), Some("Sales"));
            }
            other => panic!("expected mssql config, got {:?}", other),
        }
    }

    #[test]
    fn test_connection_string_conflicting_database_rejected() {
        let config = SourceConfig {
            connection_string: Some("server=db.internal;database=Sales".to_string()),
            database: Some("Billing".to_string()),
            ..Default::default()
        };
        let err = config.resolve().unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
        assert!(err.to_string().contains("Billing"));
    }

    #[test]
    fn test_trust_cert_override_to_false() {
        let file = SourceConfig {
            trust_cert: Some(true),
            ..Default::default()
        };
        let cli = SourceConfig {
            trust_cert: Some(false),
            ..Default::default()
        };
        assert_eq!(file.merge(cli).trust_cert, Some(false));
    }

    #[test]
    fn test_bad_config_file_keeps_error_chain() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hostname: typo").unwrap();

        let err = SourceConfig::discover(Some(file.path())).unwrap_err();
        assert!(err.to_string().starts_with("failed to load config"));
        assert!(err.chain().count() > 1);
    }

    #[test]
    fn test_debug_hides_password() {
        let auth = AuthMode::Sql {
            user: "reader".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{:?}", auth);
        assert!(rendered.contains("reader"));
        assert!(!rendered.contains("hunter2"));
    }
}
