use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tokio::io::AsyncReadExt;
use tracing::info;

use jellyfin_strm::organizer::{FileDecision, MediaOrganizer};
use jellyfin_strm::{logging, tui, ItemOutcome, MediaItem, OrganizerConfig, WebhookPayload};

struct CliArgs {
    config_path: PathBuf,
    payload_path: String,
    dry_run: bool,
    use_tui: bool,
    verbose: bool,
}

fn print_usage(program: &str) {
    println!("Usage: {program} [--dry-run] [--tui] [--verbose] <config.json> <payload.json | ->");
    println!();
    println!("  --dry-run   Print the planned layout without writing anything");
    println!("  --tui       Review the batch interactively before writing");
    println!("  --verbose   Log at debug level (RUST_LOG overrides)");
    println!("  -           Read the webhook payload from stdin");
}

fn parse_args(args: &[String]) -> Option<CliArgs> {
    let mut dry_run = false;
    let mut use_tui = false;
    let mut verbose = false;
    let mut positional = Vec::new();

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--dry-run" => dry_run = true,
            "--tui" => use_tui = true,
            "--verbose" | "-v" => verbose = true,
            "--help" | "-h" => return None,
            _ => positional.push(arg.clone()),
        }
    }

    if positional.len() != 2 {
        return None;
    }
    let payload_path = positional.pop()?;
    let config_path = PathBuf::from(positional.pop()?);
    Some(CliArgs {
        config_path,
        payload_path,
        dry_run,
        use_tui,
        verbose,
    })
}

async fn read_payload(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("failed to read payload from stdin")?;
        Ok(buf)
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("failed to read payload file '{source}'"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("jellyfin-strm");

    let Some(cli) = parse_args(&args) else {
        print_usage(program);
        std::process::exit(2);
    };

    if cli.use_tui {
        let log_path = env::temp_dir().join("jellyfin-strm.log");
        logging::init_file(&log_path, cli.verbose)?;
    } else {
        logging::init_stderr(cli.verbose);
    }

    let config = OrganizerConfig::from_json_file(&cli.config_path)
        .with_context(|| format!("failed to load config '{}'", cli.config_path.display()))?;
    let payload = WebhookPayload::from_json(&read_payload(&cli.payload_path).await?)?;
    let items = payload.items;
    info!(items = items.len(), base = %config.base_path.display(), "loaded webhook payload");

    let organizer = MediaOrganizer::new(config)?;

    if cli.use_tui {
        let stats = tui::run_tui(organizer, items).await?;
        if stats.failed > 0 {
            std::process::exit(1);
        }
        return Ok(());
    }

    if cli.dry_run {
        return dry_run(&organizer, &items);
    }

    println!("Jellyfin STRM Organizer");
    println!("=======================");
    println!("Processing {} item(s)...\n", items.len());

    let report = tokio::task::spawn_blocking(move || organizer.process_batch(&items))
        .await
        .context("batch worker panicked")?;

    for entry in &report.items {
        match &entry.result {
            Ok(ItemOutcome::Written(path)) => {
                println!("✓ {} -> {}", entry.name, path.display())
            }
            Ok(ItemOutcome::Skipped(path)) => {
                println!("ℹ {} already exists at {}", entry.name, path.display())
            }
            Err(e) => println!("✗ {}: {e}", entry.name),
        }
    }

    println!();
    println!("=======================");
    println!(
        "Summary: {} written, {} skipped, {} failed",
        report.written(),
        report.skipped(),
        report.failed()
    );

    if report.failed() > 0 {
        if report.written() + report.skipped() == 0 {
            bail!("no items were organized");
        }
        std::process::exit(1);
    }
    Ok(())
}

fn dry_run(organizer: &MediaOrganizer, items: &[MediaItem]) -> Result<()> {
    for item in items {
        match organizer.plan_item(item) {
            Ok(plan) => {
                let kind = plan
                    .media_type()
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let action = match plan.file {
                    FileDecision::Write(_) => "write",
                    FileDecision::Skip(_) => "skip",
                };
                println!("[{kind}] {action} {}", plan.target_path().display());
            }
            Err(e) => println!("✗ {}: {e}", item.name),
        }
    }
    Ok(())
}
