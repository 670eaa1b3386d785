use anyhow::Result;
use batch_renamer_core::{
    app_paths, app_span, init_logging, list_folder_entries, load_config, save_config, AppConfig,
    BatchConfig, BatchProcessor, BatchReport, FileTask, OutcomeStatus, RenameRule, TracingLogger,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "batch-renamer", version)]
#[command(about = "Batch-renames files in a folder by extension, find/replace and prefix/suffix")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Rename(RenameArgs),
    List(ListArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
    /// Write the current settings (defaults where unset) to the config file.
    Init,
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(long)]
    folder: PathBuf,
}

#[derive(Debug, Args)]
struct RenameArgs {
    #[arg(long)]
    folder: PathBuf,
    /// Extension to match, e.g. `txt`.
    #[arg(long)]
    ext: String,
    /// Comma-separated strings to replace.
    #[arg(long, default_value = "")]
    find: String,
    #[arg(long, default_value = "")]
    replace: String,
    #[arg(long, default_value = "")]
    prefix: String,
    #[arg(long, default_value = "")]
    suffix: String,
    /// Keep the originals and write renamed copies.
    #[arg(long, default_value_t = false, conflicts_with = "move_files")]
    copy: bool,
    /// Rename in place even when the config file enables copy mode.
    #[arg(long = "move", default_value_t = false)]
    move_files: bool,
    /// Process files in name order.
    #[arg(long, default_value_t = false, conflicts_with = "unsorted")]
    sorted: bool,
    /// Use directory order even when the config file enables sorting.
    #[arg(long, default_value_t = false)]
    unsorted: bool,
    #[arg(long, default_value_t = false)]
    apply: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Rename(args) => cmd_rename(args),
        Commands::List(args) => cmd_list(&args.folder).map(|_| ExitCode::SUCCESS),
        Commands::Config(config) => match config.action {
            ConfigAction::Show => cmd_config_show().map(|_| ExitCode::SUCCESS),
            ConfigAction::Init => cmd_config_init().map(|_| ExitCode::SUCCESS),
        },
    }
}

// The command line wins over the config file in both directions.
fn resolve_flag(on: bool, off: bool, configured: bool) -> bool {
    if on {
        true
    } else if off {
        false
    } else {
        configured
    }
}

fn batch_config(args: RenameArgs, config: &AppConfig) -> BatchConfig {
    let extension = args.ext.strip_prefix('.').unwrap_or(&args.ext).to_string();
    BatchConfig {
        folder_path: args.folder,
        extension_filter: extension,
        rule: RenameRule::from_find_text(&args.find, args.replace, args.prefix, args.suffix),
        copy_mode: resolve_flag(args.copy, args.move_files, config.copy_mode),
        sort_entries: resolve_flag(args.sorted, args.unsorted, config.sort_entries),
    }
}

fn cmd_rename(args: RenameArgs) -> Result<ExitCode> {
    let config = load_config()?;
    let paths = app_paths()?;
    let guard = init_logging(&config.log_settings(&paths))?;
    eprintln!("Logfile is {}", guard.log_path().display());
    let _span = app_span().entered();

    let apply = args.apply;
    let output = args.output;
    let batch = batch_config(args, &config);
    if batch.rule.is_identity() {
        eprintln!("warning: no find strings, prefix or suffix given; names will not change");
    }
    let processor = BatchProcessor::new(TracingLogger);

    if !apply {
        match processor.scan(&batch) {
            Ok(tasks) => match output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tasks)?),
                OutputFormat::Table => print_preview(&tasks),
            },
            Err(err) => eprintln!("{err}"),
        }
        eprintln!("dry-run: no files were changed. Pass --apply to rename.");
        return Ok(ExitCode::SUCCESS);
    }

    let report = processor.run_batch(&batch);
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => {
            print_report(&report);
            if !report.is_aborted() {
                println!();
                cmd_list(&report.folder)?;
            }
        }
    }

    if report.has_failures() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_list(folder: &Path) -> Result<()> {
    for name in list_folder_entries(folder)? {
        println!("{name}");
    }
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let paths = app_paths()?;
    println!("config file: {}", paths.config_path.display());
    println!("default log file: {}", paths.default_log_path().display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let config = load_config()?;
    save_config(&config)?;
    println!("wrote {}", app_paths()?.config_path.display());
    Ok(())
}

fn print_preview(tasks: &[FileTask]) {
    println!("original -> new");
    for task in tasks {
        let marker = if task.changed() { "" } else { " (unchanged)" };
        println!("{} -> {}{}", task.original_name, task.computed_name, marker);
    }
}

fn print_report(report: &BatchReport) {
    if let Some(err) = &report.aborted {
        println!("nothing done: {err}");
        return;
    }

    println!("original -> new (result)");
    for outcome in &report.outcomes {
        let result = match &outcome.status {
            OutcomeStatus::Renamed => "renamed".to_string(),
            OutcomeStatus::Copied => "copied".to_string(),
            OutcomeStatus::Unchanged => "unchanged".to_string(),
            OutcomeStatus::Failed { message, .. } => format!("failed: {message}"),
        };
        println!("{} -> {} ({})", outcome.original_name, outcome.new_name, result);
    }

    let stats = report.stats();
    println!(
        "\nsummary: matched={} renamed={} copied={} unchanged={} failed={}",
        stats.matched, stats.renamed, stats.copied, stats.unchanged, stats.failed
    );
}
