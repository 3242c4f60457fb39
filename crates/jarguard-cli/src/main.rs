use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use jarguard_analysis::{
    baseline_file_name, AnalysisUnit, ArchiveDiffUnit, ArchiveResult, ClasspathDiff,
    ClasspathReport, ConservativeComparator, ResourceSet, Verdict,
};
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "jarguard",
    version,
    about = "Decide whether changed classpath archives allow an incremental build"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Config file (defaults to $JARGUARD_CONFIG_PATH, then ./jarguard.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Diff one archive of the current classpath against its snapshot
    Analyze(AnalyzeArgs),
    /// Diff every archive of the current classpath
    Classpath(ClasspathArgs),
    /// Print the file name a snapshot of ARCHIVE is stored under
    BaselineName(BaselineNameArgs),
}

#[derive(Args)]
struct ClasspathSets {
    /// Entry of the previous build's classpath (snapshots); repeatable
    #[arg(long = "previous", value_name = "PATH")]
    previous: Vec<PathBuf>,
    /// Entry of the current classpath; repeatable
    #[arg(long = "current", value_name = "PATH")]
    current: Vec<PathBuf>,
}

#[derive(Args)]
struct AnalyzeArgs {
    #[command(flatten)]
    sets: ClasspathSets,
    /// The current archive to analyze
    #[arg(long)]
    archive: PathBuf,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ClasspathArgs {
    #[command(flatten)]
    sets: ClasspathSets,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct BaselineNameArgs {
    archive: PathBuf,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let cwd = std::env::current_dir().context("failed to determine working directory")?;
    let (config, config_path) = jarguard_config::load(cli.config.as_deref(), &cwd)?;
    jarguard_config::init_tracing(&config.logging);
    if let Some(path) = &config_path {
        tracing::debug!(target: "jarguard.config", path = %path.display(), "using config file");
    }

    match cli.command {
        Command::Analyze(args) => {
            let mut unit = ArchiveDiffUnit::new(
                ResourceSet::new(args.sets.previous),
                ResourceSet::new(args.sets.current),
                &args.archive,
                &ConservativeComparator,
            )?;
            let verdict = match unit.analyze() {
                Ok(verdict) => verdict,
                Err(err) if config.analysis.errors_as_full_rebuild => {
                    tracing::warn!(
                        target: "jarguard.analysis",
                        archive = %args.archive.display(),
                        error = %err,
                        "analysis failed; assuming a full rebuild"
                    );
                    Verdict::full_rebuild(format!(
                        "analysis of {} failed: {err}",
                        args.archive.display()
                    ))
                }
                Err(err) => {
                    return Err(anyhow::Error::new(err)
                        .context(format!("failed to analyze {}", args.archive.display())));
                }
            };

            let report = AnalyzeReport {
                archive: &args.archive,
                previous_archive: unit.previous_archive(),
                verdict: &verdict,
            };
            if args.json {
                print_json(&report)?;
            } else {
                println!("{}", describe(&verdict));
            }
            Ok(exit_code(&verdict))
        }
        Command::Classpath(args) => {
            let report = ClasspathDiff::new(
                ResourceSet::new(args.sets.previous),
                ResourceSet::new(args.sets.current),
                &ConservativeComparator,
            )
            .with_options(config.analysis)
            .run()?;

            if args.json {
                print_json(&report)?;
            } else {
                print_classpath_report(&report);
            }
            Ok(exit_code(&report.verdict))
        }
        Command::BaselineName(args) => {
            let name = baseline_file_name(&args.archive)
                .ok_or_else(|| anyhow!("invalid archive path {}", args.archive.display()))?;
            if args.json {
                print_json(&serde_json::json!({
                    "archive": args.archive,
                    "baseline": name,
                }))?;
            } else {
                println!("{name}");
            }
            Ok(0)
        }
    }
}

#[derive(Serialize)]
struct AnalyzeReport<'a> {
    archive: &'a Path,
    previous_archive: Option<&'a Path>,
    #[serde(flatten)]
    verdict: &'a Verdict,
}

fn exit_code(verdict: &Verdict) -> i32 {
    if verdict.is_full_rebuild_needed() {
        1
    } else {
        0
    }
}

fn describe(verdict: &Verdict) -> String {
    match verdict.full_rebuild_cause() {
        Some(cause) => format!("full rebuild: {cause}"),
        None => "incremental".to_owned(),
    }
}

fn print_classpath_report(report: &ClasspathReport) {
    for outcome in &report.archives {
        let status = match &outcome.result {
            ArchiveResult::Analyzed { verdict } => describe(verdict),
            ArchiveResult::Failed { error } => format!("failed: {error}"),
        };
        println!("{}: {status}", outcome.archive.display());
    }
    println!("verdict: {}", describe(&report.verdict));
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}
