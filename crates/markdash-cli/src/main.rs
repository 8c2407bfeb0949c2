//! Markdash CLI — command-line client for the marksheet service.
//!
//! Set MARKDASH_API_URL (or API_URL); see `ClientConfig` for the full
//! set of MARKDASH_* variables.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use markdash_api_client::ApiClient;
use markdash_cli::{content_type_for, init_tracing};
use markdash_client::{
    events, BatchValidator, OverviewDataSource, PollerConfig, RefreshBus, SelectionClient,
    ToastLevel, UiEvent, UploadOrchestrator,
};
use markdash_core::{ClientConfig, PendingFile, RefreshToken};

#[derive(Parser)]
#[command(name = "markdash", about = "Markdash marksheet service CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload PDF marksheets and wait for processing to finish
    Upload {
        /// Paths of the PDF files to upload
        files: Vec<PathBuf>,
    },
    /// List the files currently accepted by the server
    List,
    /// Delete uploaded files by name
    Delete {
        /// File names to delete, as reported by `list`
        names: Vec<String>,
        /// Delete every listed file
        #[arg(long)]
        all: bool,
    },
    /// Fetch the aggregate dashboard metrics
    Overview,
    /// Watch for refresh signals and print fresh metrics on each one
    Watch,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn print_event(event: &UiEvent) {
    match event {
        UiEvent::Toast(toast) => {
            let tag = match toast.level {
                ToastLevel::Info => "info",
                ToastLevel::Success => "ok",
                ToastLevel::Error => "error",
            };
            println!("[{}] {}", tag, toast.message);
        }
        UiEvent::NavigateToOverview => {}
    }
}

async fn upload(
    api: Arc<ApiClient>,
    config: &ClientConfig,
    bus: RefreshBus,
    files: Vec<PathBuf>,
) -> anyhow::Result<()> {
    let mut pending = Vec::with_capacity(files.len());
    for path in &files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Invalid file name: {}", path.display()))?
            .to_string();
        let content =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        pending.push(PendingFile::new(name, content_type_for(path), content));
    }

    let (tx, mut rx) = events::channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            print_event(&event);
        }
    });

    let mut uploader = UploadOrchestrator::new(
        Arc::clone(&api),
        bus,
        BatchValidator::from_config(config),
        PollerConfig::from(config),
        tx,
    );

    uploader.add_files(pending)?;
    uploader.submit().await?;

    let handle = uploader
        .take_processing_handle()
        .context("No processing session started")?;
    handle.await??;

    drop(uploader);
    printer.await?;

    let metrics = api.fetch_overview(RefreshToken::now()).await?;
    print_json(&metrics)
}

async fn delete(
    api: Arc<ApiClient>,
    bus: RefreshBus,
    names: Vec<String>,
    all: bool,
) -> anyhow::Result<()> {
    let (tx, mut rx) = events::channel();
    let mut client = SelectionClient::new(api, bus, tx);
    client.refresh_listing().await?;

    if all {
        client.toggle_all();
    } else {
        for name in &names {
            if !client.listing().contains(name) {
                anyhow::bail!("'{}' is not in the server listing", name);
            }
            client.toggle(name);
        }
    }

    let result = client.delete_selected().await;
    while let Ok(event) = rx.try_recv() {
        print_event(&event);
    }
    let message = result?;
    print_json(&serde_json::json!({
        "message": message,
        "files": client.listing(),
    }))
}

async fn watch(api: Arc<ApiClient>, bus: RefreshBus) -> anyhow::Result<()> {
    let source = OverviewDataSource::new(api);
    let mut sub = bus.subscribe()?;
    println!("Watching {} for refresh signals", bus.path().display());

    while let Some(token) = sub.recv().await {
        source.refresh(token).await;
        let snapshot = source.snapshot();
        match (snapshot.data, snapshot.error) {
            (Some(metrics), None) => print_json(&metrics)?,
            (_, Some(error)) => eprintln!("[error] {}", error),
            _ => {}
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ClientConfig::from_env()?;
    let api = Arc::new(ApiClient::from_config(&config)?);
    let bus = RefreshBus::from_config(&config);

    let cli = Cli::parse();

    match cli.command {
        Commands::Upload { files } => {
            if files.is_empty() {
                anyhow::bail!("Provide at least one PDF file to upload");
            }
            upload(api, &config, bus, files).await?;
        }
        Commands::List => {
            let files = api.list_uploads().await?;
            print_json(&serde_json::json!({ "files": files }))?;
        }
        Commands::Delete { names, all } => {
            if names.is_empty() && !all {
                anyhow::bail!("Provide file names to delete, or pass --all");
            }
            delete(api, bus, names, all).await?;
        }
        Commands::Overview => {
            let metrics = api.fetch_overview(RefreshToken::now()).await?;
            print_json(&metrics)?;
        }
        Commands::Watch => {
            watch(api, bus).await?;
        }
    }

    Ok(())
}
