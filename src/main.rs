mod cli;
mod error;
mod prompt;

use crate::cli::{Cli, OnComplete};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use dmread_config::Config;
use dmread_decode::SymbolReader;
use dmread_library::rename::SkipReason;
use dmread_library::{BatchSummary, Context, RangeTable, Run, batch};
use dmread_storage::BackendHandle;
use dmread_storage::backend::LocalBackend;
use exn::ResultExt;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use time::UtcDateTime;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = ?e, "dmread failed");
            eprintln!("{e:?}");
            ExitCode::FAILURE
        },
    }
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn,dmread=info,dmread_library=info",
        1 => "info,dmread=debug,dmread_library=debug",
        _ => "debug,dmread=trace,dmread_library=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    cli.apply(&mut config);
    config.validate().or_raise(|| ErrorKind::Config)?;

    // Check everything the batch needs before touching a single file.
    let root = std::path::absolute(&cli.directory)
        .or_raise(|| ErrorKind::Directory(cli.directory.display().to_string()))?;
    if !root.is_dir() {
        exn::bail!(ErrorKind::Directory(root.display().to_string()));
    }
    let reader = SymbolReader::discover(&config.decoders, config.institution.as_str(), config.scan_time())
        .or_raise(|| ErrorKind::Decoders)?;
    let storage: BackendHandle = Arc::new(LocalBackend::default());
    let mut ctx = Context::new(config.institution.as_str(), reader)
        .with_image_extensions(config.image_extensions.iter().cloned())
        .with_raw_extension(config.raw_extension.as_str());
    if let Some(path) = &cli.ranges {
        let ranges = RangeTable::load(&storage, path).await.or_raise(|| ErrorKind::RangeTable)?;
        ctx = ctx.with_ranges(ranges);
    }

    let mut run = Run::default();
    let summary =
        batch(&storage, &ctx, &mut run, &root, cli.mode.into()).await.or_raise(|| ErrorKind::Batch)?;
    print_summary(&summary);

    if run.record.is_empty() {
        println!("\nNothing was renamed; no log written.");
        return Ok(ExitCode::SUCCESS);
    }
    let undo = match cli.on_complete {
        OnComplete::Undo => true,
        OnComplete::Log => false,
        OnComplete::Prompt => prompt::ask_undo(io::stdin().lock(), io::stdout()).or_raise(|| ErrorKind::Prompt)?,
    };

    if undo {
        let report = run.record.undo(&storage).await;
        println!("\nRestored {} file(s).", report.restored);
        if !report.is_success() {
            for pair in &report.failed {
                eprintln!("Could not restore {} (now at {})", pair.old.display(), pair.new.display());
            }
            return Ok(ExitCode::FAILURE);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let log_dir = config.log.directory.clone().unwrap_or_else(|| root.clone());
    let date = UtcDateTime::now().date();
    let path = run
        .record
        .write_log(&storage, &log_dir, &config.log.prefix, date)
        .await
        .or_raise(|| ErrorKind::Log)?;
    println!("\nLog file can be found here: {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn print_summary(summary: &BatchSummary) {
    println!("\nCompleted... {} image(s) handled in {:?}.", summary.considered, summary.elapsed);
    if let Some(average) = summary.average_per_image() {
        println!("Average time per image: {average:?}");
    }
    println!("  renamed:           {}", summary.renamed);
    println!("  raw files renamed: {}", summary.companions_renamed);
    println!("  already named:     {}", summary.already_named);
    for (reason, count) in &summary.skipped {
        println!("  skipped ({reason}): {count}");
    }
    if summary.failed > 0 {
        println!("  failed:            {}", summary.failed);
    }
    if summary.companions_failed > 0 {
        println!("  raw files failed:  {}", summary.companions_failed);
    }
    if summary.unreadable_directories > 0 {
        println!("  unreadable dirs:   {}", summary.unreadable_directories);
    }
    if summary.skipped(SkipReason::SymbolNotFound) > 0 {
        println!("Failure rate: {:.1}%", summary.miss_rate() * 100.0);
    }
}
