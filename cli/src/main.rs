use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use sqldeploy_core::Dialect;
use sqldeploy_db::{Config, DeployOptions, SchemaPlan, TranslatedPlan, UpdateOptions};
use sqldeploy_sqlite::{SqliteDatabase, SqliteSession, sqlite_version};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Verbosity of the diagnostics written to stderr.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Info,
    Debug,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "sqldeploy")]
#[command(about = "Deploy and update SQL schemas written for MySQL/MariaDB")]
struct Cli {
    /// Diagnostics written to stderr.
    #[arg(long, global = true, default_value = "error")]
    log_level: LogLevel,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the database and apply the plan's deploy statements.
    Deploy(DeployArgs),
    /// Apply the plan's update statements in one transaction.
    Update(UpdateArgs),
    /// Print the plan's statements as they would run against a dialect.
    Translate(TranslateArgs),
    /// Connect and report on a deployed database.
    Status(StatusArgs),
}

#[derive(Debug, Args)]
struct DeployArgs {
    /// Connection configuration YAML.
    #[arg(long)]
    config: PathBuf,
    /// Schema plan YAML.
    #[arg(long)]
    plan: PathBuf,
    /// Also apply the update section, on the same connection.
    #[arg(long)]
    with_update: bool,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    /// Connection configuration YAML.
    #[arg(long)]
    config: PathBuf,
    /// Schema plan YAML.
    #[arg(long)]
    plan: PathBuf,
}

#[derive(Debug, Args)]
struct TranslateArgs {
    /// Schema plan YAML.
    #[arg(long)]
    plan: PathBuf,
    /// Dialect to translate for (mysql, mariadb, sqlite, mssql).
    #[arg(long)]
    target: String,
    /// Print JSON instead of SQL.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct StatusArgs {
    /// Connection configuration YAML.
    #[arg(long)]
    config: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    let result = match cli.command {
        Command::Deploy(args) => run_deploy(args),
        Command::Update(args) => run_update(args),
        Command::Translate(args) => run_translate(args),
        Command::Status(args) => run_status(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(level: LogLevel) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::new(level.directive()))
        .init();
}

// ---------------------------------------------------------------------------
// deploy / update
// ---------------------------------------------------------------------------

fn run_deploy(args: DeployArgs) -> Result<(), String> {
    let config = load_sqlite_config(&args.config)?;
    let plan = load_plan(&args.plan)?;
    let path = config.sqlite_path.clone();

    let deploy = plan
        .deploy_job::<SqliteSession>(Dialect::Sqlite)
        .map_err(|e| format!("Invalid plan '{}': {e}", args.plan.display()))?;
    let mut db = SqliteDatabase::new(config);
    info!(path = %path, statements = deploy.statement_list().len(), "deploying plan");
    db.deploy_schema(&deploy, DeployOptions { keep_open: true })
        .map_err(|e| format!("Deploy failed: {e}"))?;
    println!(
        "Deploy complete. {} statement(s) applied to '{path}'.",
        deploy.statement_list().len()
    );

    if args.with_update {
        let update = plan
            .update_job::<SqliteSession>(Dialect::Sqlite)
            .map_err(|e| format!("Invalid plan '{}': {e}", args.plan.display()))?;
        db.update_schema(&update, UpdateOptions { keep_open: true })
            .map_err(|e| format!("Update failed: {e}"))?;
        println!(
            "Update complete. {} statement(s) applied.",
            update.statement_list().len()
        );
    }

    print_tables(&db)?;
    db.close().map_err(|e| format!("Failed to close '{path}': {e}"))
}

fn run_update(args: UpdateArgs) -> Result<(), String> {
    let config = load_sqlite_config(&args.config)?;
    let plan = load_plan(&args.plan)?;
    let path = config.sqlite_path.clone();

    let update = plan
        .update_job::<SqliteSession>(Dialect::Sqlite)
        .map_err(|e| format!("Invalid plan '{}': {e}", args.plan.display()))?;
    let mut db = SqliteDatabase::new(config);
    info!(path = %path, statements = update.statement_list().len(), "updating schema");
    db.update_schema(&update, UpdateOptions { keep_open: true })
        .map_err(|e| format!("Update failed: {e}"))?;
    println!(
        "Update complete. {} statement(s) applied to '{path}'.",
        update.statement_list().len()
    );

    print_tables(&db)?;
    db.close().map_err(|e| format!("Failed to close '{path}': {e}"))
}

// ---------------------------------------------------------------------------
// translate
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct TranslateReport<'a> {
    #[serde(flatten)]
    plan: &'a TranslatedPlan,
    fingerprint: String,
}

fn run_translate(args: TranslateArgs) -> Result<(), String> {
    let target: Dialect = args.target.parse().map_err(|e| format!("{e}"))?;
    let plan = load_plan(&args.plan)?;
    let translated = plan
        .translated_statements(target)
        .map_err(|e| format!("Invalid plan '{}': {e}", args.plan.display()))?;
    let fingerprint = translated.fingerprint();

    if args.json {
        let report = TranslateReport {
            plan: &translated,
            fingerprint,
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Failed to serialize translation: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    println!("{}", render_sql(&translated, &fingerprint));
    Ok(())
}

/// Renders a translated plan as a SQL script with section comments.
fn render_sql(plan: &TranslatedPlan, fingerprint: &str) -> String {
    let mut out = format!("-- target: {}\n-- fingerprint: {fingerprint}\n", plan.target);
    for (section, statements) in [("deploy", &plan.deploy), ("update", &plan.update)] {
        out.push_str(&format!("\n-- {section} ({})\n", statements.len()));
        for statement in statements {
            out.push_str(statement.trim());
            out.push_str(";\n");
        }
    }
    out
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

fn run_status(args: StatusArgs) -> Result<(), String> {
    let config = load_sqlite_config(&args.config)?;
    let path = config.sqlite_path.clone();
    let mut db = SqliteDatabase::new(config);
    db.connect()
        .map_err(|e| format!("Failed to connect to '{path}': {e}"))?;

    println!("Database: {path}");
    println!("SQLite version: {}", sqlite_version());
    print_tables(&db)?;
    db.close().map_err(|e| format!("Failed to close '{path}': {e}"))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Loads a connection config, refusing dialects this binary cannot execute.
fn load_sqlite_config(path: &Path) -> Result<Config, String> {
    let config = Config::load(path)
        .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?;
    if config.dialect != Dialect::Sqlite {
        return Err(format!(
            "Config '{}' targets {}; only sqlite databases can be deployed from the command line",
            path.display(),
            config.dialect
        ));
    }
    Ok(config)
}

fn load_plan(path: &Path) -> Result<SchemaPlan, String> {
    SchemaPlan::load(path).map_err(|e| format!("Failed to load plan '{}': {e}", path.display()))
}

fn print_tables(db: &SqliteDatabase) -> Result<(), String> {
    let session = db.session().map_err(|e| e.to_string())?;
    let tables = session
        .table_names()
        .map_err(|e| format!("Failed to list tables: {e}"))?;
    println!("Tables ({}): {}", tables.len(), tables.join(", "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_sql_sections() {
        let plan = TranslatedPlan {
            target: Dialect::Sqlite,
            deploy: vec!["CREATE TABLE a (x TEXT)\n".into(), "CREATE TABLE b (y TEXT)".into()],
            update: Vec::new(),
        };
        let sql = render_sql(&plan, "abc");
        assert_eq!(
            sql,
            "-- target: sqlite\n-- fingerprint: abc\n\
             \n-- deploy (2)\nCREATE TABLE a (x TEXT);\nCREATE TABLE b (y TEXT);\n\
             \n-- update (0)\n"
        );
    }

    #[test]
    fn test_log_level_directives() {
        assert_eq!(LogLevel::Off.directive(), "off");
        assert_eq!(LogLevel::Debug.directive(), "debug");
    }

    #[test]
    fn test_cli_parses_global_log_level() {
        let cli = Cli::try_parse_from([
            "sqldeploy",
            "translate",
            "--plan",
            "plan.yml",
            "--target",
            "mssql",
            "--log-level",
            "info",
        ])
        .unwrap();
        assert!(matches!(cli.log_level, LogLevel::Info));
        assert!(matches!(cli.command, Command::Translate(ref a) if a.target == "mssql" && !a.json));
    }
}
