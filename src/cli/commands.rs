//! CLI commands implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::audit::LogAuditSink;
use crate::auth::AllowAll;
use crate::config::Config;
use crate::exec::{check_binary, SystemRunner};
use crate::models::{ScanOptions, UserMetadata};
use crate::ocr::OcrExtractor;
use crate::services::{ArchiveService, CancelFlag, ScanService};
use crate::store::SqliteDocumentStore;

#[derive(Parser)]
#[command(name = "paperflow")]
#[command(about = "Document digitization pipeline: scan, extract, archive")]
#[command(version)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides the configured one)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Actor id recorded in the audit trail
    #[arg(long, global = true, env = "PAPERFLOW_ACTOR", default_value = "cli")]
    actor: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and document database
    Init,

    /// List scanner devices across backends
    Devices,

    /// Report availability of the external tools the pipeline shells out to
    Tools,

    /// Capture a single scan
    Scan {
        /// Backend-native device id (from `paperflow devices`)
        device: String,
        #[command(flatten)]
        capture: CaptureArgs,
    },

    /// Capture a batch of scans sequentially
    Batch {
        /// Backend-native device id
        device: String,
        /// Number of pages to capture
        #[arg(short, long, default_value = "1")]
        count: usize,
        #[command(flatten)]
        capture: CaptureArgs,
    },

    /// Capture scans and build archive records from them
    Archive {
        /// Backend-native device id
        device: String,
        /// Number of pages to capture
        #[arg(short, long, default_value = "1")]
        count: usize,
        /// Record title (suffixed per document for batches)
        #[arg(long)]
        title: String,
        /// Archive category (drives the reference prefix)
        #[arg(long)]
        category: String,
        /// Record description
        #[arg(long, default_value = "")]
        description: String,
        /// Owning department
        #[arg(long, default_value = "")]
        department: String,
        /// Record priority
        #[arg(long, default_value = "normal")]
        priority: String,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Mark records confidential
        #[arg(long)]
        confidential: bool,
        #[command(flatten)]
        capture: CaptureArgs,
    },
}

#[derive(clap::Args)]
struct CaptureArgs {
    /// Resolution in DPI
    #[arg(long)]
    resolution: Option<u32>,
    /// Output format: jpeg, png, tiff
    #[arg(long)]
    format: Option<String>,
    /// Color mode: color, grayscale, monochrome
    #[arg(long)]
    color_mode: Option<String>,
    /// Page size: A4, A5, Letter, Legal
    #[arg(long)]
    page_size: Option<String>,
}

impl CaptureArgs {
    fn apply(&self, base: ScanOptions) -> anyhow::Result<ScanOptions> {
        let mut options = base;
        if let Some(dpi) = self.resolution {
            options.resolution_dpi = dpi;
        }
        if let Some(format) = &self.format {
            options.format = crate::models::ImageFormat::from_str(format)
                .ok_or_else(|| anyhow::anyhow!("unknown image format: {}", format))?;
        }
        if let Some(mode) = &self.color_mode {
            options.color_mode = crate::models::ColorMode::from_str(mode)
                .ok_or_else(|| anyhow::anyhow!("unknown color mode: {}", mode))?;
        }
        if let Some(size) = &self.page_size {
            options.page_size = size.clone();
        }
        Ok(options)
    }
}

/// Parse arguments and dispatch the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }

    match cli.command {
        Commands::Init => init(&config),
        Commands::Tools => tools(),
        Commands::Devices => devices(&config, &cli.actor).await,
        Commands::Scan { device, capture } => {
            let options = capture.apply(config.scan_options()?)?;
            scan(&config, &cli.actor, &device, &options).await
        }
        Commands::Batch {
            device,
            count,
            capture,
        } => {
            let options = capture.apply(config.scan_options()?)?;
            batch(&config, &cli.actor, &device, count, &options).await
        }
        Commands::Archive {
            device,
            count,
            title,
            category,
            description,
            department,
            priority,
            tags,
            confidential,
            capture,
        } => {
            let options = capture.apply(config.scan_options()?)?;
            let meta = UserMetadata {
                title,
                description,
                category,
                priority,
                department,
                tags: tags
                    .map(|t| t.split(',').map(|s| s.trim().to_string()).collect())
                    .unwrap_or_default(),
                confidential,
                original_name: None,
                archive_location: None,
                folder_number: None,
            };
            archive(&config, &cli.actor, &device, count, &options, &meta).await
        }
    }
}

fn scan_service(config: &Config) -> ScanService {
    ScanService::new(
        Arc::new(SystemRunner),
        Arc::new(AllowAll),
        Arc::new(LogAuditSink),
        config.scan_service_config(),
    )
}

fn archive_service(config: &Config) -> anyhow::Result<ArchiveService> {
    let store = SqliteDocumentStore::open(&config.database_path())
        .map_err(|e| anyhow::anyhow!("failed to open document store: {}", e))?;
    Ok(ArchiveService::new(
        Arc::new(store),
        Arc::new(SystemRunner),
        Arc::new(AllowAll),
        Arc::new(LogAuditSink),
        OcrExtractor::new().with_timeout(config.ocr_timeout()),
        config.ocr_options(),
    ))
}

/// Cancel flag wired to Ctrl-C, so batches stop between items.
fn cancel_on_ctrl_c() -> CancelFlag {
    let cancel = CancelFlag::new();
    let flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nstopping after the current item...");
            flag.cancel();
        }
    });
    cancel
}

fn init(config: &Config) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.data_dir)?;
    std::fs::create_dir_all(config.working_dir())?;
    SqliteDocumentStore::open(&config.database_path())
        .map_err(|e| anyhow::anyhow!("failed to create document store: {}", e))?;

    let config_path = config.data_dir.join("paperflow.toml");
    if !config_path.exists() {
        config.save(&config_path)?;
    }

    println!(
        "{} initialized {}",
        style("✓").green(),
        config.data_dir.display()
    );
    Ok(())
}

fn tools() -> anyhow::Result<()> {
    let mut all_tools = vec![
        ("scanimage".to_string(), check_binary("scanimage")),
        ("powershell".to_string(), check_binary("powershell")),
    ];
    all_tools.extend(OcrExtractor::check_tools());

    for (tool, available) in all_tools {
        let marker = if available {
            style("found").green()
        } else {
            style("missing").red()
        };
        println!("  {:<12} {}", tool, marker);
    }
    Ok(())
}

async fn devices(config: &Config, actor: &str) -> anyhow::Result<()> {
    let service = scan_service(config);
    let devices = service.discover(actor).await?;

    if devices.is_empty() {
        println!("No scanners found.");
        return Ok(());
    }

    for device in devices {
        println!(
            "  [{}] {} {}",
            device.backend.as_str(),
            style(&device.id).cyan(),
            device.display_name
        );
    }
    Ok(())
}

async fn scan(
    config: &Config,
    actor: &str,
    device: &str,
    options: &ScanOptions,
) -> anyhow::Result<()> {
    let service = scan_service(config);
    let result = service.scan(actor, device, options).await?;

    println!(
        "{} {} ({} bytes, {})",
        style("✓").green(),
        result.file_path.display(),
        result.file_size_bytes,
        result.mime_type
    );
    Ok(())
}

async fn batch(
    config: &Config,
    actor: &str,
    device: &str,
    count: usize,
    options: &ScanOptions,
) -> anyhow::Result<()> {
    let service = scan_service(config);
    let cancel = cancel_on_ctrl_c();

    let progress = ProgressBar::new_spinner();
    progress.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    progress.set_message(format!("capturing {} page(s) from {}", count, device));
    progress.enable_steady_tick(std::time::Duration::from_millis(120));

    let outcome = service
        .scan_batch(actor, device, count, options, &cancel)
        .await?;
    progress.finish_and_clear();

    for item in &outcome.items {
        match &item.outcome {
            Ok(result) => println!(
                "  {} page {}: {}",
                style("✓").green(),
                item.ordinal,
                result.file_path.display()
            ),
            Err(e) => println!("  {} page {}: {}", style("✗").red(), item.ordinal, e),
        }
    }
    println!(
        "{} succeeded, {} failed{}",
        outcome.succeeded,
        outcome.failed,
        if outcome.cancelled { " (cancelled)" } else { "" }
    );
    Ok(())
}

async fn archive(
    config: &Config,
    actor: &str,
    device: &str,
    count: usize,
    options: &ScanOptions,
    meta: &UserMetadata,
) -> anyhow::Result<()> {
    let scans = scan_service(config);
    let archive = archive_service(config)?;
    let cancel = cancel_on_ctrl_c();

    println!("Capturing {} page(s) from {}...", count, device);
    let captured = scans
        .scan_batch(actor, device, count, options, &cancel)
        .await?;
    println!(
        "Captured: {} succeeded, {} failed",
        captured.succeeded, captured.failed
    );

    println!("Extracting text and building records...");
    let outcome = archive
        .build_records(actor, captured, meta, &cancel)
        .await?;

    for item in &outcome.items {
        match &item.outcome {
            Ok(record) => println!(
                "  {} {} {}",
                style("✓").green(),
                style(&record.reference).cyan(),
                record.title
            ),
            Err(e) => println!("  {} document {}: {}", style("✗").red(), item.ordinal, e),
        }
    }
    println!(
        "{} archived, {} failed{}",
        outcome.succeeded,
        outcome.failed,
        if outcome.cancelled { " (cancelled)" } else { "" }
    );
    Ok(())
}
