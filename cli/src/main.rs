use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use nldoc_core::{Database, Entry, MergePolicy, QueryEngine, QueryError, fold_name};
use nldoc_db::{BuildConfig, DatabaseBuilder};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// CLI-specific merge policy enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliMergePolicy {
    VersionThenRecency,
    FirstWins,
    LastWins,
}

impl From<CliMergePolicy> for MergePolicy {
    fn from(policy: CliMergePolicy) -> Self {
        match policy {
            CliMergePolicy::VersionThenRecency => Self::VersionThenRecency,
            CliMergePolicy::FirstWins => Self::FirstWins,
            CliMergePolicy::LastWins => Self::LastWins,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "nldoc", version)]
#[command(about = "Look up MESA namelist parameters: documentation, defaults and search")]
struct Cli {
    /// Database artifact (default: $MESA_DIR/data/mesa.db).
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Print JSON instead of plain text.
    #[arg(long, global = true)]
    json: bool,
    /// Log more (-v for progress, -vv for per-record decisions).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the documentation of a parameter.
    Doc(NameArgs),
    /// Print the default value of a parameter.
    #[command(name = "default")]
    DefaultValue(NameArgs),
    /// Print the one-line summary of a parameter.
    Summary(NameArgs),
    /// Print every field of a parameter.
    Show(NameArgs),
    /// Print the source and schema version of the database.
    Version,
    /// List parameters whose name contains any pattern.
    Search(SearchArgs),
    /// List parameters whose documentation contains any pattern.
    Searchd(PatternArgs),
    /// Build the database from a MESA source tree.
    Makedb(MakedbArgs),
}

#[derive(Debug, Args)]
struct NameArgs {
    /// Parameter name (case-insensitive).
    name: String,
}

#[derive(Debug, Args)]
struct PatternArgs {
    /// Case-insensitive substrings; a match on any of them counts.
    patterns: Vec<String>,
}

#[derive(Debug, Args)]
struct SearchArgs {
    #[command(flatten)]
    patterns: PatternArgs,
    /// Match name prefixes instead of substrings.
    #[arg(long)]
    prefix: bool,
}

#[derive(Debug, Args)]
struct MakedbArgs {
    /// Root of the MESA source tree (default: $MESA_DIR).
    source: Option<PathBuf>,
    /// Artifact path (default: --db, then <source>/data/mesa.db).
    #[arg(long)]
    output: Option<PathBuf>,
    /// YAML build configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// How same-named parameters from different sources are resolved.
    #[arg(long, value_enum)]
    merge_policy: Option<CliMergePolicy>,
    /// Keep the replaced artifact as <stem>_old.<ext>.
    #[arg(long)]
    backup: bool,
}

/// Why a command failed; decides the message prefix and exit status.
#[derive(Debug)]
enum Failure {
    Query(QueryError),
    Fatal(String),
}

impl Failure {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Query(_) => 2,
            Self::Fatal(_) => 1,
        }
    }

    fn report(&self) {
        match self {
            Self::Query(QueryError::NotFound(name)) => eprintln!("not found: {name}"),
            Self::Query(err @ QueryError::EmptyQuery) => eprintln!("usage: {err}"),
            Self::Fatal(message) => eprintln!("error: {message}"),
        }
    }
}

impl From<QueryError> for Failure {
    fn from(err: QueryError) -> Self {
        Self::Query(err)
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Self::Fatal(message)
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Cli {
        db, json, command, ..
    } = cli;
    let result = match command {
        Command::Doc(args) => run_doc(db, args),
        Command::DefaultValue(args) => run_default(db, args),
        Command::Summary(args) => run_summary(db, args),
        Command::Show(args) => run_show(db, json, args),
        Command::Version => run_version(db, json),
        Command::Search(args) => run_search(db, json, args),
        Command::Searchd(args) => run_searchd(db, json, args),
        Command::Makedb(args) => run_makedb(db, json, args),
    };

    if let Err(failure) = result {
        failure.report();
        std::process::exit(failure.exit_code());
    }
}

/// Logs to stderr at `warn` by default; `RUST_LOG` takes precedence over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_database(db: Option<PathBuf>) -> Result<Database, String> {
    let path = match db {
        Some(path) => path,
        None => nldoc_db::default_artifact_path().map_err(|err| err.to_string())?,
    };
    debug!(path = %path.display(), "Opening database");
    nldoc_db::load(&path).map_err(|err| err.to_string())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let raw = serde_json::to_string_pretty(value)
        .map_err(|err| format!("Failed to serialize output: {err}"))?;
    println!("{raw}");
    Ok(())
}

fn print_names(names: &[&str], json: bool) -> Result<(), Failure> {
    if json {
        print_json(&names)?;
    } else {
        for name in names {
            println!("{name}");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

fn run_doc(db: Option<PathBuf>, args: NameArgs) -> Result<(), Failure> {
    let db = open_database(db)?;
    println!("{}", QueryEngine::new(&db).doc(&args.name)?);
    Ok(())
}

fn run_default(db: Option<PathBuf>, args: NameArgs) -> Result<(), Failure> {
    let db = open_database(db)?;
    println!("{}", QueryEngine::new(&db).default(&args.name)?);
    Ok(())
}

fn run_summary(db: Option<PathBuf>, args: NameArgs) -> Result<(), Failure> {
    let db = open_database(db)?;
    println!("{}", QueryEngine::new(&db).summary(&args.name)?);
    Ok(())
}

fn run_show(db: Option<PathBuf>, json: bool, args: NameArgs) -> Result<(), Failure> {
    let db = open_database(db)?;
    let entry = QueryEngine::new(&db).entry(&args.name)?;
    if json {
        print_json(entry)?;
    } else {
        print!("{}", render_entry(entry));
    }
    Ok(())
}

fn render_entry(entry: &Entry) -> String {
    let mut out = String::new();
    let mut field = |label: &str, value: &dyn std::fmt::Display| {
        out.push_str(&format!("{label:<10}{value}\n"));
    };
    field("name", &entry.name);
    field("namelist", &entry.namelist);
    field("type", &entry.value_type);
    field("dim", &entry.dim);
    field("default", &entry.default);
    field("version", &entry.version);
    field("origin", &entry.origin);
    if let Some(order) = entry.order {
        field("order", &order);
    }
    field("summary", &entry.summary);
    if !entry.doc.is_empty() {
        out.push('\n');
        out.push_str(&entry.doc);
        out.push('\n');
    }
    out
}

fn run_version(db: Option<PathBuf>, json: bool) -> Result<(), Failure> {
    let db = open_database(db)?;
    let version = QueryEngine::new(&db).version();
    if json {
        print_json(&version)?;
    } else {
        println!("{version}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Searches
// ---------------------------------------------------------------------------

fn run_search(db: Option<PathBuf>, json: bool, args: SearchArgs) -> Result<(), Failure> {
    let db = open_database(db)?;
    let query = QueryEngine::new(&db);
    let patterns = args.patterns.patterns;

    let names = if args.prefix {
        if patterns.is_empty() {
            return Err(QueryError::EmptyQuery.into());
        }
        let mut names: Vec<&str> = patterns
            .iter()
            .flat_map(|prefix| query.search_name_prefix(prefix))
            .collect();
        names.sort_by_cached_key(|name| (fold_name(name), *name));
        names.dedup();
        names
    } else {
        query.search_namelist_name(patterns.as_slice())?
    };
    print_names(&names, json)
}

fn run_searchd(db: Option<PathBuf>, json: bool, args: PatternArgs) -> Result<(), Failure> {
    let db = open_database(db)?;
    let names = QueryEngine::new(&db).search_doc(args.patterns.as_slice())?;
    print_names(&names, json)
}

// ---------------------------------------------------------------------------
// makedb
// ---------------------------------------------------------------------------

fn run_makedb(db: Option<PathBuf>, json: bool, args: MakedbArgs) -> Result<(), Failure> {
    let mut config = match &args.config {
        Some(path) => BuildConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => BuildConfig::default(),
    };
    if let Some(source) = args.source {
        config.source_root = Some(source);
    }
    if let Some(artifact) = args.output.or(db) {
        config.artifact = Some(artifact);
    }
    if let Some(policy) = args.merge_policy {
        config.merge_policy = policy.into();
    }
    if args.backup {
        config.backup_previous = true;
    }

    info!(
        root = ?config.source_root,
        policy = ?config.merge_policy,
        "Building database"
    );
    let report = DatabaseBuilder::from_config(&config)
        .and_then(|builder| builder.build())
        .map_err(|err| err.to_string())?;

    if json {
        print_json(&report)?;
    } else {
        println!("{report}");
        if let Some(backup) = &report.backup {
            println!("previous artifact kept at {}", backup.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use nldoc_core::DefaultValue;

    use super::*;

    #[test]
    fn test_failure_exit_codes() {
        assert_eq!(Failure::from(QueryError::EmptyQuery).exit_code(), 2);
        assert_eq!(Failure::from(QueryError::NotFound("x".into())).exit_code(), 2);
        assert_eq!(Failure::from("boom".to_string()).exit_code(), 1);
    }

    #[test]
    fn test_render_entry() {
        let entry = Entry::new("initial_mass", "15140")
            .with_doc("Initial mass in Msun units.")
            .with_default(DefaultValue::literal("1"))
            .with_namelist("controls");
        let text = render_entry(&entry);
        assert!(text.starts_with("name      initial_mass\n"));
        assert!(text.contains("default   1\n"));
        assert!(text.ends_with("\nInitial mass in Msun units.\n"));
        assert!(!text.contains("order"));
    }

    #[test]
    fn test_cli_parses_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["nldoc", "search", "mass", "--json", "--db", "x.db"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
        assert!(matches!(cli.command, Command::Search(ref args) if !args.prefix));
    }

    #[test]
    fn test_cli_parses_merge_policy() {
        let cli = Cli::try_parse_from(["nldoc", "makedb", "--merge-policy", "last-wins"]).unwrap();
        let Command::Makedb(args) = cli.command else {
            panic!("expected makedb");
        };
        assert!(matches!(args.merge_policy, Some(CliMergePolicy::LastWins)));
        assert!(args.source.is_none());
    }
}
