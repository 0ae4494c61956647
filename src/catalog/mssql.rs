//! SQL Server catalog access over TDS.
//!
//! `tiberius` is async; a current-thread runtime drives each query so the
//! catalog API stays blocking. Every query gets its own connection, which is
//! closed once all rows are read.

use super::{
    required, sql, Catalog, CatalogError, CatalogQuery, CatalogResult, ForeignKeyRow,
    KeyColumnRow,
};
use crate::config::{AuthMode, MssqlConfig};
use tiberius::{AuthMethod, Client, Config, EncryptionLevel, Row, SqlBrowser};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

type TdsClient = Client<Compat<TcpStream>>;

/// Reads key metadata from SQL Server `sys.*` catalog views
pub struct MssqlCatalog {
    settings: MssqlConfig,
    runtime: Runtime,
}

impl MssqlCatalog {
    pub fn new(settings: MssqlConfig) -> CatalogResult<Self> {
        // Fail on bad settings before any connection attempt
        build_tds_config(&settings)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_io()
            .enable_time()
            .build()
            .map_err(|e| CatalogError::config(format!("failed to start I/O runtime: {}", e)))?;
        Ok(Self { settings, runtime })
    }

    fn fetch(&self, query: CatalogQuery) -> CatalogResult<Vec<Row>> {
        let target = self.describe();
        self.runtime.block_on(async {
            let mut client = self.connect().await?;
            let rows = client
                .simple_query(sql::mssql(query))
                .await
                .map_err(|e| CatalogError::query(query, e))?
                .into_first_result()
                .await
                .map_err(|e| CatalogError::query(query, e))?;
            if let Err(e) = client.close().await {
                log::debug!("error closing connection to {}: {}", target, e);
            }
            log::debug!("{}: {} rows from {}", query, rows.len(), target);
            Ok::<_, CatalogError>(rows)
        })
    }

    async fn connect(&self) -> CatalogResult<TdsClient> {
        let target = self.describe();
        let config = build_tds_config(&self.settings)?;

        let attempt = connect_client(config, self.settings.instance.is_some());
        let client = match self.settings.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, attempt)
                .await
                .map_err(|_| {
                    CatalogError::connect(&target, format!("timed out after {:?}", limit))
                })?,
            None => attempt.await,
        };
        client.map_err(|e| CatalogError::connect(target, e))
    }

    fn key_columns(&self, query: CatalogQuery) -> CatalogResult<Vec<KeyColumnRow>> {
        self.fetch(query)?
            .iter()
            .map(|row| {
                Ok(KeyColumnRow {
                    table: text(row, 0, query, "table")?,
                    column: text(row, 1, query, "column")?,
                })
            })
            .collect()
    }
}

impl Catalog for MssqlCatalog {
    fn kind(&self) -> &'static str {
        "mssql"
    }

    fn describe(&self) -> String {
        self.settings.describe()
    }

    fn database(&self) -> Option<String> {
        self.settings.database.clone()
    }

    fn primary_key_columns(&self) -> CatalogResult<Vec<KeyColumnRow>> {
        self.key_columns(CatalogQuery::PrimaryKeyColumns)
    }

    fn foreign_key_columns(&self) -> CatalogResult<Vec<KeyColumnRow>> {
        self.key_columns(CatalogQuery::ForeignKeyColumns)
    }

    fn foreign_key_links(&self) -> CatalogResult<Vec<ForeignKeyRow>> {
        let query = CatalogQuery::ForeignKeyLinks;
        self.fetch(query)?
            .iter()
            .map(|row| {
                Ok(ForeignKeyRow {
                    from_table: text(row, 0, query, "from_table")?,
                    from_column: text(row, 1, query, "from_column")?,
                    to_table: text(row, 2, query, "to_table")?,
                    to_column: text(row, 3, query, "to_column")?,
                })
            })
            .collect()
    }
}

/// Connect, following one server redirect (Azure SQL gateways answer with one)
async fn connect_client(config: Config, named_instance: bool) -> tiberius::Result<TdsClient> {
    let tcp = open_tcp(&config, named_instance).await?;
    match Client::connect(config.clone(), tcp.compat_write()).await {
        Err(tiberius::error::Error::Routing { host, port }) => {
            log::info!("server redirected connection to {}:{}", host, port);
            let mut config = config;
            config.host(&host);
            config.port(port);
            let tcp = open_tcp(&config, false).await?;
            Client::connect(config, tcp.compat_write()).await
        }
        other => other,
    }
}

async fn open_tcp(config: &Config, named_instance: bool) -> tiberius::Result<TcpStream> {
    let tcp = if named_instance {
        TcpStream::connect_named(config).await?
    } else {
        TcpStream::connect(config.get_addr()).await?
    };
    tcp.set_nodelay(true)?;
    Ok(tcp)
}

fn text(row: &Row, index: usize, query: CatalogQuery, column: &str) -> CatalogResult<String> {
    let value = row
        .try_get::<&str, usize>(index)
        .map_err(|e| CatalogError::malformed(query, format!("{}: {}", column, e)))?
        .map(|s| s.to_string());
    required(value, query, column)
}

/// Translate connection settings into a TDS client config
fn build_tds_config(settings: &MssqlConfig) -> CatalogResult<Config> {
    if let Some(ref ado) = settings.connection_string {
        return Config::from_ado_string(ado)
            .map_err(|e| CatalogError::config(format!("bad connection string: {}", e)));
    }

    let mut config = Config::new();
    config.host(&settings.server);
    if let Some(port) = settings.port {
        config.port(port);
    }
    if let Some(ref instance) = settings.instance {
        config.instance_name(instance);
    }
    if let Some(ref database) = settings.database {
        config.database(database);
    }
    config.application_name("schema-graph");

    match settings.auth {
        AuthMode::Integrated => config.authentication(integrated_auth()?),
        AuthMode::Sql {
            ref user,
            ref password,
        } => config.authentication(AuthMethod::sql_server(user, password)),
    }

    if settings.trust_cert {
        config.trust_cert();
    }
    match settings.encrypt {
        Some(true) => config.encryption(EncryptionLevel::Required),
        Some(false) => config.encryption(EncryptionLevel::Off),
        None => {}
    }

    Ok(config)
}

#[cfg(windows)]
fn integrated_auth() -> CatalogResult<AuthMethod> {
    Ok(AuthMethod::Integrated)
}

#[cfg(not(windows))]
fn integrated_auth() -> CatalogResult<AuthMethod> {
    Err(CatalogError::config(
        "integrated authentication is only available on Windows; use --auth sql",
    ))
}
