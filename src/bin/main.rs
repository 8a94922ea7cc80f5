//! sqlbench CLI - bounded SQL against a remote engine
//!
//! Usage:
//!   sqlbench rewrite <sql> [--limit <n>]
//!   sqlbench validate <sql>
//!   sqlbench query <sql> [--env <id>] [--limit <n>] [--format arrow|json] [--tool-output]
//!   sqlbench read <locator>
//!   sqlbench schema <sql> [--env <id>]
//!   sqlbench environments
//!
//! Examples:
//!   sqlbench rewrite "SELECT id FROM users ORDER BY id DESC" --limit 50
//!   sqlbench query "DESCRIBE hive.sales.orders" --env prod --tool-output

use clap::{Parser, Subcommand, ValueEnum};
use sqlbench::config::Settings;
use sqlbench::engine::SemanticConnection;
use sqlbench::resource::HttpFetcher;
use sqlbench::sql::{bound_query, validate_select_only};
use sqlbench::tool_result::{format_tool_result, tool_message};
use sqlbench::transport::{QueryClient, ResultFormat};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqlbench")]
#[command(about = "sqlbench - run bounded, read-only SQL against a remote query engine")]
#[command(version)]
struct Cli {
    /// Path to a config file (defaults to the standard search locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the SQL that would be sent for a bounded query
    Rewrite {
        sql: String,

        /// Maximum number of rows
        #[arg(short, long, default_value_t = 1000)]
        limit: u64,
    },

    /// Check that a query is read-only
    Validate { sql: String },

    /// Run a read-only query
    Query {
        sql: String,

        /// Environment id (defaults to the configured default)
        #[arg(short, long)]
        env: Option<String>,

        /// Maximum number of rows (defaults to the configured row limit)
        #[arg(short, long)]
        limit: Option<u64>,

        /// Result transfer format
        #[arg(short, long)]
        format: Option<FormatArg>,

        /// Print the text the chat assistant would receive
        #[arg(long)]
        tool_output: bool,
    },

    /// Fetch a semantic-model source and print it
    Read {
        /// URL, or an internal:// or malloy:// locator
        locator: String,
    },

    /// Print the output schema of a SQL block
    Schema {
        sql: String,

        /// Environment id (defaults to the configured default)
        #[arg(short, long)]
        env: Option<String>,
    },

    /// List configured environments
    Environments,
}

#[derive(Clone, ValueEnum)]
enum FormatArg {
    Arrow,
    Json,
}

impl From<FormatArg> for ResultFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Arrow => ResultFormat::Arrow,
            FormatArg::Json => ResultFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Rewrite { sql, limit } => cmd_rewrite(&sql, limit),
        Commands::Validate { sql } => cmd_validate(&sql),
        Commands::Query {
            sql,
            env,
            limit,
            format,
            tool_output,
        } => {
            let settings = match load_settings(cli.config) {
                Ok(s) => s,
                Err(code) => return code,
            };
            cmd_query(&settings, &sql, env, limit, format, tool_output).await
        }
        Commands::Read { locator } => match load_settings(cli.config) {
            Ok(settings) => cmd_read(&settings, &locator).await,
            Err(code) => code,
        },
        Commands::Schema { sql, env } => match load_settings(cli.config) {
            Ok(settings) => cmd_schema(&settings, &sql, env).await,
            Err(code) => code,
        },
        Commands::Environments => match load_settings(cli.config) {
            Ok(settings) => cmd_environments(&settings),
            Err(code) => code,
        },
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sqlbench=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(path: Option<PathBuf>) -> Result<Settings, ExitCode> {
    let result = match path {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    result.map_err(|e| {
        eprintln!("Configuration error: {}", e);
        ExitCode::FAILURE
    })
}

fn cmd_rewrite(sql: &str, limit: u64) -> ExitCode {
    println!("{}", bound_query(sql, limit));
    ExitCode::SUCCESS
}

fn cmd_validate(sql: &str) -> ExitCode {
    match validate_select_only(sql) {
        Ok(()) => {
            println!("OK: query is read-only");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Validation error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn cmd_query(
    settings: &Settings,
    sql: &str,
    env: Option<String>,
    limit: Option<u64>,
    format: Option<FormatArg>,
    tool_output: bool,
) -> ExitCode {
    if let Err(e) = validate_select_only(sql) {
        eprintln!("Validation error: {}", e);
        return ExitCode::FAILURE;
    }

    let session = match settings.session(env.as_deref()) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let client = QueryClient::new(settings.transport());
    let format = format.map(ResultFormat::from).unwrap_or(settings.query.format);
    let limit = limit.unwrap_or(settings.query.row_limit);

    let result = client.query_table(sql, limit, &session, format).await;

    if tool_output {
        println!("{}", tool_message(None, &format_tool_result(sql, &result)));
    } else {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing result: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn cmd_read(settings: &Settings, locator: &str) -> ExitCode {
    let reader = settings.resource_reader(HttpFetcher::new());
    match reader.read_resource(locator).await {
        Ok(read) => {
            if let Some(key) = &read.invalidation_key {
                eprintln!("invalidation key: {}", key);
            }
            print!("{}", read.contents);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn cmd_schema(settings: &Settings, sql: &str, env: Option<String>) -> ExitCode {
    let connection = match settings.connect(env.as_deref(), Arc::new(settings.describe_cache())) {
        Ok(connection) => connection,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match connection.fetch_schema_for_sql_block(sql).await {
        Ok(schema) => {
            for field in &schema.fields {
                println!("{}\t{}\t{:?}", field.name, field.raw_type, field.kind);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Schema error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_environments(settings: &Settings) -> ExitCode {
    for env in &settings.environments {
        let marker = if env.id == settings.default_environment {
            "*"
        } else {
            " "
        };
        println!("{} {} ({}, cluster: {})", marker, env.id, env.name, env.cluster);
    }
    ExitCode::SUCCESS
}
