use std::path::{Path, PathBuf};

use analyse_core::{AnalyseSession, Buffer, BufferSearcher, SortKey, SortOrder};
use analyse_settings::{export_with_hits, load_into, save_config, LoadMode};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "analyse-cli",
    about = "Run pattern configurations against text files",
    author,
    version
)]
struct Cli {
    /// 輸出除錯記錄。 / Print debug logging to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 以樣式清單分析檔案。 / Search files with every pattern of a configuration.
    Run(RunArgs),
    /// 排序樣式清單。 / Sort the patterns of a configuration.
    Sort(SortArgs),
    /// 重新編號排序標籤。 / Overwrite order labels with sequential numbers.
    Number(NumberArgs),
    /// 啟用或停用群組。 / Enable or disable every pattern of a group.
    Group(GroupArgs),
    /// 匯出樣式與命中數。 / Search a file and write the configuration with hit counts.
    Export(ExportArgs),
}

#[derive(Args)]
struct ConfigArg {
    /// 樣式設定檔 (XML)。 / Pattern configuration file (XML).
    #[arg(long, short, value_name = "FILE")]
    config: PathBuf,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    config: ConfigArg,

    /// 要分析的檔案。 / Files to analyse.
    #[arg(required = true, value_name = "PATH")]
    inputs: Vec<PathBuf>,

    /// 列出命中的行。 / Print the lines hit by the patterns.
    #[arg(long)]
    lines: bool,
}

#[derive(Args)]
struct SortArgs {
    #[command(flatten)]
    config: ConfigArg,

    /// 排序欄位。 / Attribute to sort by.
    #[arg(long, value_enum)]
    key: SortKeyChoice,

    /// 遞減排序。 / Sort descending.
    #[arg(long)]
    descending: bool,

    /// 輸出路徑；預設覆寫設定檔。 / Output path; defaults to overwriting the configuration.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct NumberArgs {
    #[command(flatten)]
    config: ConfigArg,

    /// 覆寫既有標籤。 / Overwrite labels that are already set.
    #[arg(long)]
    force: bool,

    /// 輸出路徑；預設覆寫設定檔。 / Output path; defaults to overwriting the configuration.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct GroupArgs {
    #[command(flatten)]
    config: ConfigArg,

    /// 群組名稱。 / Group name.
    group: String,

    /// 停用而非啟用。 / Disable instead of enable.
    #[arg(long)]
    disable: bool,

    /// 輸出路徑；預設覆寫設定檔。 / Output path; defaults to overwriting the configuration.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    config: ConfigArg,

    /// 要分析的檔案。 / File to analyse.
    #[arg(value_name = "PATH")]
    input: PathBuf,

    /// 匯出路徑。 / Export destination.
    #[arg(long, value_name = "FILE")]
    output: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortKeyChoice {
    Comment,
    Group,
    Order,
    #[value(alias = "text")]
    Search,
}

impl From<SortKeyChoice> for SortKey {
    fn from(choice: SortKeyChoice) -> Self {
        match choice {
            SortKeyChoice::Comment => SortKey::Comment,
            SortKeyChoice::Group => SortKey::Group,
            SortKeyChoice::Order => SortKey::OrderLabel,
            SortKeyChoice::Search => SortKey::SearchText,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(err) = run(cli.command) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Run(args) => run_analysis(args),
        Commands::Sort(args) => run_sort(args),
        Commands::Number(args) => run_number(args),
        Commands::Group(args) => run_group(args),
        Commands::Export(args) => run_export(args),
    }
}

fn load_session(config: &Path) -> Result<AnalyseSession> {
    let mut session = AnalyseSession::new();
    load_into(config, &mut session, LoadMode::Replace)
        .with_context(|| format!("unable to load {}", config.display()))?;
    Ok(session)
}

fn open_buffer(path: &Path) -> Result<Buffer> {
    let buffer =
        Buffer::open(path).with_context(|| format!("unable to open {}", path.display()))?;
    log::debug!("opened {} as {}", path.display(), buffer.encoding_name());
    Ok(buffer)
}

fn run_analysis(args: RunArgs) -> Result<()> {
    let mut session = load_session(&args.config.config)?;
    if session.is_empty() {
        println!("No patterns configured.");
        return Ok(());
    }

    for path in &args.inputs {
        let buffer = open_buffer(path)?;
        session.buffer_modified();
        let summary = session.research(&mut BufferSearcher::new(buffer.text()));
        for (id, err) in &summary.failures {
            eprintln!("warning: pattern {id}: {err}");
        }

        println!("{} ({} hits)", path.display(), summary.total_hits);
        for (id, pattern) in session.patterns().iter() {
            let label = if pattern.order_label().is_empty() {
                "-"
            } else {
                pattern.order_label()
            };
            let status = if !pattern.is_enabled() {
                "disabled".to_string()
            } else {
                match session.hit_count(id) {
                    Some(count) => format!("{count} hits"),
                    None => "failed".to_string(),
                }
            };
            println!("  [{label}] \"{}\" ({status})", pattern.search_text());
        }

        if args.lines {
            for line in session.result_lines(buffer.text()) {
                println!("    Line {}: {}", line.line, line.text);
            }
        }
    }
    Ok(())
}

fn run_sort(args: SortArgs) -> Result<()> {
    let mut session = load_session(&args.config.config)?;
    let order = if args.descending {
        SortOrder::Descending
    } else {
        SortOrder::Ascending
    };
    session.sort(args.key.into(), order);
    let output = args.output.as_deref().unwrap_or(&args.config.config);
    save_config(output, session.patterns())
        .with_context(|| format!("unable to write {}", output.display()))?;
    println!(
        "Sorted {} patterns by {:?} into {}",
        session.len(),
        args.key,
        output.display()
    );
    Ok(())
}

fn run_number(args: NumberArgs) -> Result<()> {
    let mut session = load_session(&args.config.config)?;
    if session.has_order_labels() && !args.force {
        bail!("some patterns already have an order label; re-run with --force to overwrite them");
    }
    session.apply_order_labels();
    let output = args.output.as_deref().unwrap_or(&args.config.config);
    save_config(output, session.patterns())
        .with_context(|| format!("unable to write {}", output.display()))?;
    println!("Numbered {} patterns in {}", session.len(), output.display());
    Ok(())
}

fn run_group(args: GroupArgs) -> Result<()> {
    let mut session = load_session(&args.config.config)?;
    if !session.groups().contains(&args.group) {
        bail!("group '{}' not found", args.group);
    }
    let enabled = !args.disable;
    let changed = session.set_group_enabled(&args.group, enabled);
    let output = args.output.as_deref().unwrap_or(&args.config.config);
    save_config(output, session.patterns())
        .with_context(|| format!("unable to write {}", output.display()))?;
    println!(
        "{} {} patterns of group '{}'",
        if enabled { "Enabled" } else { "Disabled" },
        changed,
        args.group
    );
    Ok(())
}

fn run_export(args: ExportArgs) -> Result<()> {
    let mut session = load_session(&args.config.config)?;
    let buffer = open_buffer(&args.input)?;
    let summary = session.research(&mut BufferSearcher::new(buffer.text()));
    export_with_hits(&args.output, &session)
        .with_context(|| format!("unable to write {}", args.output.display()))?;
    println!(
        "Exported {} patterns ({} hits) to {}",
        session.len(),
        summary.total_hits,
        args.output.display()
    );
    Ok(())
}
