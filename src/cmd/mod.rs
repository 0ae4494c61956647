mod extract;
mod graph;
mod schema;

use crate::catalog::Catalog;
use crate::config::{AuthKind, SourceConfig, SourceKind, PASSWORD_ENV};
use crate::extractor::SchemaExtractor;
use crate::model::Schema;
use crate::progress::StageSpinner;
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "schema-graph")]
#[command(version)]
#[command(
    about = "Extract tables, keys and foreign keys from a database catalog and export them as a diagram",
    long_about = None
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where to read the catalog from. Flags override the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct ConnectionArgs {
    /// YAML connection config (default: <config dir>/schema-graph/config.yaml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Catalog backend: mssql or duckdb
    #[arg(long)]
    pub source: Option<SourceKind>,

    /// SQL Server host, optionally HOST\INSTANCE
    #[arg(short = 'S', long)]
    pub server: Option<String>,

    /// Named SQL Server instance (resolved via the SQL Browser service)
    #[arg(long)]
    pub instance: Option<String>,

    /// TCP port (default 1433)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database name
    #[arg(short, long)]
    pub database: Option<String>,

    /// Authentication mode: integrated or sql
    #[arg(long)]
    pub auth: Option<AuthKind>,

    /// Login name for sql authentication
    #[arg(short, long)]
    pub user: Option<String>,

    /// Password for sql authentication
    #[arg(long, env = PASSWORD_ENV, hide_env_values = true)]
    pub password: Option<String>,

    /// Trust the server certificate without validation (`--trust-cert false` turns it off)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub trust_cert: Option<bool>,

    /// Require an encrypted connection (false: encrypt login only)
    #[arg(long)]
    pub encrypt: Option<bool>,

    /// Give up connecting after this many seconds
    #[arg(long)]
    pub connect_timeout: Option<u64>,

    /// ADO.NET connection string; overrides server, database and auth flags
    #[arg(long)]
    pub connection_string: Option<String>,

    /// DuckDB database file (implies --source duckdb)
    #[arg(long)]
    pub duckdb: Option<PathBuf>,
}

impl ConnectionArgs {
    /// Flags as a partial config, to be laid over the config file
    fn overrides(&self) -> SourceConfig {
        SourceConfig {
            source: self.source,
            server: self.server.clone(),
            instance: self.instance.clone(),
            port: self.port,
            database: self.database.clone(),
            auth: self.auth,
            user: self.user.clone(),
            password: self.password.clone(),
            trust_cert: self.trust_cert,
            encrypt: self.encrypt,
            connect_timeout_secs: self.connect_timeout,
            connection_string: self.connection_string.clone(),
            path: self.duckdb.clone(),
        }
    }

    /// Merge the config file with the flags and open the catalog backend
    pub fn open_catalog(&self) -> Result<Box<dyn Catalog>> {
        let settings = SourceConfig::discover(self.config.as_deref())?.merge(self.overrides());
        let catalog = settings.resolve()?.open()?;
        Ok(catalog)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the schema and write it as a JSON snapshot
    Extract {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show a spinner while querying the catalog
        #[arg(short, long)]
        progress: bool,
    },

    /// Render the schema as a diagram (DOT, Mermaid, JSON or HTML)
    Graph {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Render from a snapshot written by `extract` instead of connecting
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Output file (default: stdout); .png/.svg/.pdf render through Graphviz
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: dot, mermaid, json, html (default: from extension, else html)
        #[arg(short, long)]
        format: Option<String>,

        /// Layout direction: lr or tb
        #[arg(long)]
        layout: Option<String>,

        /// Only include tables matching these globs (comma-separated)
        #[arg(short, long)]
        tables: Option<String>,

        /// Exclude tables matching these globs (comma-separated)
        #[arg(short, long)]
        exclude: Option<String>,

        /// Focus on one table and its neighbours
        #[arg(long)]
        table: Option<String>,

        /// With --table: follow references to parent tables transitively
        #[arg(long, requires = "table")]
        transitive: bool,

        /// With --table: follow referencing child tables transitively
        #[arg(long, requires = "table")]
        reverse: bool,

        /// With --transitive/--reverse: maximum hops
        #[arg(long, requires = "table")]
        max_depth: Option<usize>,

        /// Render DOT through Graphviz even without an image extension
        #[arg(long)]
        render: bool,

        /// Show a spinner while querying the catalog
        #[arg(short, long)]
        progress: bool,
    },

    /// Print JSON Schemas for the JSON documents this tool writes
    Schema {
        /// Document name (extract, graph); all when omitted
        name: Option<String>,

        /// Write each schema to <dir>/<name>.schema.json instead of stdout
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Extract {
            connection,
            output,
            progress,
        } => extract::run(connection, output, progress),
        Commands::Graph {
            connection,
            snapshot,
            output,
            format,
            layout,
            tables,
            exclude,
            table,
            transitive,
            reverse,
            max_depth,
            render,
            progress,
        } => graph::run(
            connection, snapshot, output, format, layout, tables, exclude, table, transitive,
            reverse, max_depth, render, progress,
        ),
        Commands::Schema { name, output_dir } => schema::run(name, output_dir),
        Commands::Completions { shell } => {
            generate(
                shell,
                &mut Cli::command(),
                "schema-graph",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}

/// Run a full extraction, optionally behind a spinner
fn extract_schema(catalog: &dyn Catalog, progress: bool) -> Result<Schema> {
    let target = catalog.describe();
    log::info!("extracting schema from {}", target);

    let schema = if progress {
        let spinner = StageSpinner::start(&target);
        let result = SchemaExtractor::new(catalog)
            .with_observer(spinner.observer())
            .extract();
        spinner.finish();
        result
    } else {
        SchemaExtractor::new(catalog).extract()
    }
    .with_context(|| format!("schema extraction from {} failed", target))?;

    log::info!(
        "extracted {} tables and {} relationships",
        schema.table_count(),
        schema.relationship_count()
    );
    if schema.collapsed_link_count() > 0 {
        log::info!(
            "{} foreign key rows share a table pair with an earlier row and were folded",
            schema.collapsed_link_count()
        );
    }
    Ok(schema)
}
