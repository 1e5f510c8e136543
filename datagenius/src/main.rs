//! DataGenius command-line tool.
//!
//! Profiles, scores and inspects tabular data from delimited files or a
//! read-only database connection, and prints the resulting report tables.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use datagenius_core::{
    AnalysisConfig, AnalysisKind, ReportContext, RenderFormat, SampleLimit, SourceConfig,
    TableAnalyzer, TableData, create_source, error::redact_database_url, extract_chart_tags,
    init_logging, read_delimited_file, render,
};
use tracing::{debug, info};

const DEFAULT_APPLICATION: &str = "App";

#[derive(Parser, Debug)]
#[command(name = "datagenius")]
#[command(about = "Tabular data profiling, quality scoring and anomaly detection")]
#[command(version)]
#[command(long_about = "
DataGenius - profile and score tabular data

Reports:
- profile     per-field counts, completeness, min/max/median/std-dev
- quality     completeness, uniqueness, validity and a composite score
- anomalies   sigma-rule outliers and blank values
- compliance  static compliance summary for a table

EXAMPLES:
  datagenius analyze --input heroes.csv --kind quality
  datagenius analyze -i heroes.csv --format markdown -o report.md
  datagenius query --database-url sqlite://data.db sample superheroes --limit 50 --analyze profile
  datagenius charts '[CHART: type=bar; x=[\"A\",\"B\"]; y=[1,2]]'
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(
        short,
        long,
        global = true,
        help = "Suppress all log output except errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a comma- or pipe-delimited file
    Analyze(AnalyzeArgs),
    /// Print the compliance summary for a table
    Compliance(ComplianceArgs),
    /// Extract chart tags from text and print them as JSON
    Charts(ChartsArgs),
    /// Fetch rows from a database and optionally analyze them
    Query(QueryArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Input file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Report to build
    #[arg(short, long, value_enum, default_value = "all")]
    pub kind: KindArg,

    /// Application name written to every report row
    #[arg(long, default_value = DEFAULT_APPLICATION)]
    pub application: String,

    /// Table name written to every report row (defaults to the file stem)
    #[arg(long)]
    pub table: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Outlier threshold in standard deviations
    #[arg(long)]
    pub outlier_sigma: Option<f64>,
}

#[derive(Args, Debug)]
pub struct ComplianceArgs {
    /// Application name
    #[arg(long, default_value = DEFAULT_APPLICATION)]
    pub application: String,

    /// Table name
    #[arg(long)]
    pub table: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct ChartsArgs {
    /// Text containing chart tags, or `-` to read stdin
    pub text: String,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Database connection URL
    #[arg(
        long,
        env = "DATABASE_URL",
        help = "Database connection string (credentials will be sanitized in logs)"
    )]
    pub database_url: String,

    /// Analyze the fetched rows instead of printing them
    #[arg(long, value_enum)]
    pub analyze: Option<KindArg>,

    /// Application name written to every report row
    #[arg(long, default_value = DEFAULT_APPLICATION)]
    pub application: String,

    /// Query timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(subcommand)]
    pub action: QueryAction,
}

#[derive(Subcommand, Debug)]
pub enum QueryAction {
    /// List tables
    Tables,
    /// Describe the columns of a table
    Schema {
        /// Table name
        table: String,
    },
    /// Sample rows from a table
    Sample {
        /// Table name
        table: String,
        /// Number of rows (1-5000)
        #[arg(short, long, default_value = "5")]
        limit: u32,
    },
    /// Run a SELECT statement
    Sql {
        /// Query text; must start with SELECT or WITH
        query: String,
    },
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: FormatArg,

    /// Output file path (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Reports selectable on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    /// Descriptive statistics per field
    Profile,
    /// Completeness, uniqueness, validity and quality score per field
    Quality,
    /// Outliers and blank values
    Anomalies,
    /// Static compliance summary
    Compliance,
    /// Row and column counts, numeric ranges and most frequent values
    Summary,
    /// Every report
    All,
}

impl KindArg {
    fn kinds(self) -> Vec<AnalysisKind> {
        match self {
            Self::Profile => vec![AnalysisKind::Profile],
            Self::Quality => vec![AnalysisKind::Quality],
            Self::Anomalies => vec![AnalysisKind::Anomalies],
            Self::Compliance => vec![AnalysisKind::Compliance],
            Self::Summary => vec![AnalysisKind::Summary],
            Self::All => AnalysisKind::ALL.to_vec(),
        }
    }
}

/// Available output formats
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    /// Aligned plain text
    Text,
    /// Markdown tables
    Markdown,
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    /// JSON
    Json,
}

impl From<FormatArg> for RenderFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => Self::Text,
            FormatArg::Markdown => Self::Markdown,
            FormatArg::Csv => Self::Csv,
            FormatArg::Tsv => Self::Tsv,
            FormatArg::Json => Self::Json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    match cli.command {
        Command::Analyze(args) => {
            let rendered = run_analyze(&args)?;
            emit(&args.output, &rendered)
        }
        Command::Compliance(args) => {
            let rendered = run_compliance(&args)?;
            emit(&args.output, &rendered)
        }
        Command::Charts(args) => {
            let text = if args.text == "-" {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .context("Failed to read stdin")?;
                buffer
            } else {
                args.text
            };
            println!("{}", run_charts(&text)?);
            Ok(())
        }
        Command::Query(args) => {
            let rendered = run_query(&args).await?;
            emit(&args.output, &rendered)
        }
    }
}

/// Parses the input file and renders the requested reports.
fn run_analyze(args: &AnalyzeArgs) -> Result<String> {
    info!("Analyzing {}", args.input.display());
    let table = read_delimited_file(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    info!(
        "Loaded {} rows across {} columns",
        table.row_count(),
        table.column_count()
    );

    let mut config = AnalysisConfig::default();
    if let Some(sigma) = args.outlier_sigma {
        config = config.with_outlier_sigma(sigma);
    }

    let table_name = args
        .table
        .clone()
        .unwrap_or_else(|| default_table_name(&args.input));
    let context = ReportContext::new(args.application.as_str(), table_name.as_str());
    let reports = analyze(&table, &context, config, args.kind);

    render_reports(&reports, args.output.format.into())
}

fn run_compliance(args: &ComplianceArgs) -> Result<String> {
    let context = ReportContext::new(args.application.as_str(), args.table.as_str());
    let reports = analyze(
        &TableData::default(),
        &context,
        AnalysisConfig::default(),
        KindArg::Compliance,
    );
    render_reports(&reports, args.output.format.into())
}

fn run_charts(text: &str) -> Result<String> {
    let charts = extract_chart_tags(text);
    info!("Found {} chart tags", charts.len());
    serde_json::to_string_pretty(&charts).context("Failed to serialize charts")
}

/// Runs a query action against a row source; the source is always closed.
async fn run_query(args: &QueryArgs) -> Result<String> {
    if args.timeout == 0 {
        bail!("--timeout must be greater than 0");
    }
    let config = SourceConfig::default().with_query_timeout(Duration::from_secs(args.timeout));
    let source = create_source(&args.database_url, &config)
        .await
        .with_context(|| {
            format!(
                "Failed to open data source {}",
                redact_database_url(&args.database_url)
            )
        })?;
    debug!("Opened {} source", source.source_type());

    let (table, table_name) = match &args.action {
        QueryAction::Tables => {
            let result = source.list_tables().await;
            let names = result.map(|names| {
                TableData::new(
                    ["table_name"],
                    names.into_iter().map(|n| vec![n.into()]).collect(),
                )
            });
            (names, "tables".to_string())
        }
        QueryAction::Schema { table } => (source.describe_table(table).await, table.clone()),
        QueryAction::Sample { table, limit } => (
            source.sample_rows(table, SampleLimit::clamp(*limit)).await,
            table.clone(),
        ),
        QueryAction::Sql { query } => (source.run_select(query).await, "query".to_string()),
    };
    source.close().await;
    let table = table.context("Query failed")?;

    match args.analyze {
        Some(kind) => {
            let context = ReportContext::new(args.application.as_str(), table_name.as_str());
            let reports = analyze(&table, &context, AnalysisConfig::default(), kind);
            render_reports(&reports, args.output.format.into())
        }
        None => Ok(render(&table, args.output.format.into())?),
    }
}

fn analyze(
    table: &TableData,
    context: &ReportContext,
    config: AnalysisConfig,
    kind: KindArg,
) -> Vec<(AnalysisKind, TableData)> {
    let analyzer = TableAnalyzer::new(config);
    kind.kinds()
        .into_iter()
        .map(|kind| (kind, analyzer.run(kind, table, context)))
        .collect()
}

/// Renders one or more reports. A single report is rendered bare; several
/// are titled sections, or one JSON object keyed by report name.
fn render_reports(reports: &[(AnalysisKind, TableData)], format: RenderFormat) -> Result<String> {
    if let [(_, table)] = reports {
        return Ok(render(table, format)?);
    }

    if format == RenderFormat::Json {
        let mut object = serde_json::Map::new();
        for (kind, table) in reports {
            object.insert(kind.as_str().to_string(), serde_json::to_value(table)?);
        }
        return Ok(serde_json::to_string_pretty(&object)?);
    }

    let mut sections = Vec::with_capacity(reports.len());
    for (kind, table) in reports {
        let title = match format {
            RenderFormat::Markdown => format!("## {}\n\n", kind.title()),
            RenderFormat::Csv | RenderFormat::Tsv => format!("# {}\n", kind.title()),
            _ => format!("{}\n\n", kind.title()),
        };
        sections.push(format!("{}{}", title, render(table, format)?));
    }
    Ok(sections.join("\n"))
}

fn default_table_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("table")
        .to_string()
}

fn emit(output: &OutputArgs, rendered: &str) -> Result<()> {
    match &output.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("✓ Report written to {}", path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_analyze_defaults() {
        let cli = parse(&["datagenius", "analyze", "--input", "heroes.csv"]);
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.kind, KindArg::All);
        assert_eq!(args.application, "App");
        assert_eq!(args.output.format, FormatArg::Text);
        assert!(args.table.is_none());
        assert_eq!(cli.global.verbose, 0);
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = parse(&[
            "datagenius", "analyze", "-i", "x.csv", "-k", "quality", "-f", "markdown", "-vv",
        ]);
        assert_eq!(cli.global.verbose, 2);
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.kind, KindArg::Quality);
        assert_eq!(args.output.format, FormatArg::Markdown);
    }

    #[test]
    fn test_cli_query_sample() {
        let cli = parse(&[
            "datagenius",
            "query",
            "--database-url",
            "sqlite::memory:",
            "--analyze",
            "profile",
            "sample",
            "superheroes",
            "--limit",
            "50",
        ]);
        let Command::Query(args) = cli.command else {
            panic!("expected query");
        };
        assert_eq!(args.analyze, Some(KindArg::Profile));
        assert!(matches!(
            args.action,
            QueryAction::Sample { ref table, limit: 50 } if table == "superheroes"
        ));
    }

    #[test]
    fn test_cli_rejects_unknown_kind() {
        assert!(
            Cli::try_parse_from(["datagenius", "analyze", "-i", "x.csv", "-k", "forecast"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["datagenius", "compliance"]).is_err());
    }

    #[test]
    fn test_default_table_name() {
        assert_eq!(default_table_name(Path::new("/tmp/superheroes.csv")), "superheroes");
        assert_eq!(default_table_name(Path::new("data.txt")), "data");
    }

    #[test]
    fn test_run_analyze_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("heroes.csv");
        std::fs::write(&input, "name,power\nAstra,Flight\nBolt,\n").unwrap();
        let output = dir.path().join("report.json");

        let args = AnalyzeArgs {
            input,
            kind: KindArg::All,
            application: "App".to_string(),
            table: None,
            output: OutputArgs {
                format: FormatArg::Json,
                output: Some(output.clone()),
            },
            outlier_sigma: None,
        };
        let rendered = run_analyze(&args).unwrap();
        emit(&args.output, &rendered).unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        for key in ["profile", "quality", "anomalies", "compliance", "summary"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(value["profile"]["rows"][0][1], "heroes");
        assert_eq!(value["anomalies"]["rows"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_run_analyze_summary_csv() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("heroes.csv");
        std::fs::write(&input, "name,movies\nAstra,3\nBolt,1\nAstra,5\n").unwrap();

        let args = AnalyzeArgs {
            input,
            kind: KindArg::Summary,
            application: "App".to_string(),
            table: Some("superheroes".to_string()),
            output: OutputArgs {
                format: FormatArg::Csv,
                output: None,
            },
            outlier_sigma: None,
        };
        let rendered = run_analyze(&args).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();

        assert!(lines[0].starts_with("Application,Table Name,Section,Field"));
        assert!(lines[1].starts_with("App,superheroes,Table,,Rows,3,"));
        assert!(lines.iter().any(|l| l.contains("Numeric,movies,Average,3,")));
        assert!(lines.iter().any(|l| l.contains("Top Values,name,Top Value,Astra,2")));
    }

    #[test]
    fn test_cli_query_analyze_summary() {
        let cli = parse(&[
            "datagenius",
            "query",
            "--database-url",
            "heroes.db",
            "--analyze",
            "summary",
            "sql",
            "SELECT * FROM superheroes",
        ]);
        let Command::Query(args) = cli.command else {
            panic!("expected query");
        };
        assert_eq!(args.analyze, Some(KindArg::Summary));
    }

    #[test]
    fn test_run_analyze_missing_file() {
        let args = AnalyzeArgs {
            input: PathBuf::from("/nonexistent/input.csv"),
            kind: KindArg::Profile,
            application: "App".to_string(),
            table: None,
            output: OutputArgs {
                format: FormatArg::Text,
                output: None,
            },
            outlier_sigma: None,
        };
        assert!(run_analyze(&args).is_err());
    }

    #[test]
    fn test_render_single_report_is_bare() {
        let args = ComplianceArgs {
            application: "App".to_string(),
            table: "ledger".to_string(),
            output: OutputArgs {
                format: FormatArg::Csv,
                output: None,
            },
        };
        let rendered = run_compliance(&args).unwrap();
        assert!(rendered.starts_with("Compliance Aspect,Application,Layer"));
        assert_eq!(rendered.lines().count(), 5);
    }

    #[test]
    fn test_render_reports_sections() {
        let context = ReportContext::new("App", "T");
        let reports = analyze(
            &TableData::default(),
            &context,
            AnalysisConfig::default(),
            KindArg::All,
        );
        let rendered = render_reports(&reports, RenderFormat::Markdown).unwrap();
        assert!(rendered.contains("## Data Profiling"));
        assert!(rendered.contains("## Compliance Summary"));
        assert!(rendered.contains("## Table Summary"));
    }

    #[test]
    fn test_run_charts() {
        let json = run_charts(r#"See [CHART: type=bar; x=["A"]; y=[3]]"#).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["type"], "bar");
        assert_eq!(value[0]["y"][0], 3.0);
    }

    #[tokio::test]
    async fn test_run_query_rejects_non_select() {
        let cli = parse(&[
            "datagenius",
            "query",
            "--database-url",
            "sqlite::memory:",
            "sql",
            "DELETE FROM t",
        ]);
        let Command::Query(args) = cli.command else {
            panic!("expected query");
        };
        assert!(run_query(&args).await.is_err());
    }
}
