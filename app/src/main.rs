//! Command line host for the pet gallery.

use api_client::ApiClient;
use clap::{Parser, Subcommand};
use gallery::{
    DetailMode, DirPhotoStore, Gallery, GalleryLayout, ImageLoader, LayoutMetrics, Message,
    Session, UploadPipeline,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_appender::rolling;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

mod config;

#[derive(Parser)]
#[command(name = "petgallery", author, version, about = "Pet image gallery client")]
struct Cli {
    /// Override log level (e.g. info, debug)
    #[arg(long)]
    log_level: Option<String>,
    /// Override the catalog server
    #[arg(long)]
    base_url: Option<String>,
    /// Override the app id sent with uploads
    #[arg(long)]
    app_id: Option<String>,
    /// Directory receiving local copies of saved images
    #[arg(long)]
    photos_dir: Option<PathBuf>,
    /// Detail presentation: inline or overlay
    #[arg(long)]
    detail_mode: Option<DetailMode>,
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the catalog, optionally filtered
    List {
        /// Case-insensitive title/description filter
        #[arg(long)]
        query: Option<String>,
    },
    /// Expand one row and print the resulting layout
    Show {
        /// Row index in the filtered view
        index: usize,
        #[arg(long)]
        query: Option<String>,
    },
    /// Save a row's image locally and upload it
    Save {
        /// Row index in the filtered view
        index: usize,
        #[arg(long)]
        query: Option<String>,
    },
}

impl Commands {
    fn query(&self) -> Option<&str> {
        match self {
            Commands::List { query } | Commands::Show { query, .. } | Commands::Save { query, .. } => {
                query.as_deref()
            }
        }
    }
}

#[cfg_attr(feature = "trace-spans", tracing::instrument)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let overrides = config::AppConfigOverrides {
        log_level: cli.log_level.clone(),
        base_url: cli.base_url.clone(),
        app_id: cli.app_id.clone(),
        detail_mode: cli.detail_mode,
        photos_dir: cli.photos_dir.clone(),
    };
    let cfg = config::AppConfig::load_from(cli.config.clone()).apply_overrides(&overrides);
    std::fs::create_dir_all(&cfg.cache_path)?;
    let file_appender = rolling::daily(&cfg.cache_path, "petgallery.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cfg.log_level.clone()))
        .with_writer(std::io::stderr.and(file_writer))
        .init();

    let client = Arc::new(ApiClient::with_base_url(cfg.base_url.clone()));
    let store = Arc::new(DirPhotoStore::new(cfg.photos_dir.clone()));
    let pipeline = UploadPipeline::new(client.clone(), store, cfg.app_id.clone());
    let loader = ImageLoader::new(cfg.cache_path.clone());
    let layout = GalleryLayout::new(LayoutMetrics::default()).with_mode(cfg.detail_mode);
    let mut session = Session::new(Gallery::new(layout), client, loader, pipeline);

    session.send(Message::FetchRequested);
    session.settle().await;
    if let Some(err) = session.gallery().errors().first() {
        return Err(err.to_string().into());
    }
    if let Some(query) = cli.command.query() {
        session.send(Message::QueryChanged(query.to_string()));
    }

    match cli.command {
        Commands::List { .. } => {
            let view = session.gallery().view();
            if view.is_empty() {
                println!("No images found");
            }
            for (i, record) in view.iter().enumerate() {
                println!("{}: {} - {} ({})", i, record.title, record.description, record.image_url);
            }
        }
        Commands::Show { index, .. } => {
            session.send(Message::RowTapped(index));
            if let Some(err) = session.gallery().errors().first() {
                return Err(err.to_string().into());
            }
            let gallery = session.gallery();
            let geometry = gallery.geometry();
            for row in &geometry.rows {
                let title = gallery.view().get(row.index).map(|r| r.title.as_str()).unwrap_or("");
                println!("row {} y={} {}", row.index, row.y, title);
            }
            if let Some(detail) = geometry.detail {
                println!("detail row={} y={} height={}", detail.row, detail.y, detail.height);
            }
            if let Some(row) = geometry.overlay {
                println!("overlay row={}", row);
            }
            if let Some(record) = gallery.view().get(index) {
                println!("{}\n{}\ncreated {}", record.title, record.description, record.created);
            }
            println!("content extent {}", geometry.content_extent);
        }
        Commands::Save { index, .. } => {
            session.send(Message::SaveRequested(index));
            session.settle().await;
            let report = match session.gallery().last_save() {
                Some(report) => report,
                None => {
                    let msg = session
                        .gallery()
                        .errors()
                        .first()
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| format!("No row {}", index));
                    return Err(msg.into());
                }
            };
            match &report.local {
                Ok(path) => println!("Saved locally: {}", path.display()),
                Err(e) => println!("Local save failed: {}", e),
            }
            match &report.remote {
                Ok(()) => println!("Uploaded {}", report.original_url),
                Err(e) => println!("Upload failed: {}", e),
            }
            if !report.is_success() {
                return Err("save did not complete".into());
            }
        }
    }

    Ok(())
}
