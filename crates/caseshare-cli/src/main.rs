//! caseshare: upload case media to SharePoint from the command line.
//!
//! By default talks to the caseshare API (CASESHARE_API_URL or API_URL). With `--direct`
//! it reads the Graph credentials from the environment and skips the server.

use std::path::PathBuf;

use anyhow::Context;
use caseshare_api_client::{ApiClient, BatchUploader, CaseUpload, LocalFile};
use caseshare_cli::{init_tracing, print_json, ConsoleProgress};
use caseshare_core::models::SanitizeResponse;
use caseshare_core::{sanitize_filename, BatchValidator, Config, UploadPolicy};
use caseshare_graph::{ChunkedUploader, SharePointService};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "caseshare", about = "Upload case media to SharePoint")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload files into the folder for a case
    Upload {
        /// Case identifier; becomes the folder name
        #[arg(long)]
        case_id: String,
        /// Files to upload, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Use Graph credentials from the environment instead of the API server
        #[arg(long, conflicts_with = "legacy")]
        direct: bool,
        /// Send everything in one multipart request and let the server upload
        #[arg(long)]
        legacy: bool,
    },
    /// Create the folder for a case (no-op if it exists)
    CreateFolder {
        /// Case identifier
        case_id: String,
    },
    /// Show how file names will be stored
    Preview {
        /// File names to check
        #[arg(required = true)]
        names: Vec<String>,
        /// Keep spaces instead of replacing them with underscores
        #[arg(long)]
        preserve_spaces: bool,
        /// Sanitize locally without contacting the server
        #[arg(long)]
        offline: bool,
    },
    /// Check that the API server is up
    Health,
}

async fn collect_files(paths: &[PathBuf]) -> anyhow::Result<Vec<LocalFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(LocalFile::from_path(path).await?);
    }
    Ok(files)
}

fn print_case_upload(upload: &CaseUpload) -> anyhow::Result<()> {
    print_json(&serde_json::json!({
        "success": upload.report.is_complete_success(),
        "message": format!("{}; {}", upload.folder.message, upload.report.summary()),
        "folder": upload.folder,
        "report": upload.report,
    }))?;
    if !upload.report.failed.is_empty() {
        anyhow::bail!("{} file(s) failed to upload", upload.report.failed.len());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Upload {
            case_id,
            files,
            direct,
            legacy,
        } => {
            if legacy {
                let client = ApiClient::from_env()?;
                let response = client.submit_case_legacy(&case_id, &files).await?;
                print_json(&response)?;
                if !response.success {
                    anyhow::bail!("{}", response.message);
                }
                return Ok(());
            }

            let files = collect_files(&files).await?;
            let progress = ConsoleProgress;

            let upload = if direct {
                let config = Config::from_env().context(
                    "Failed to load Graph configuration. Set GRAPH_TENANT_ID, GRAPH_CLIENT_ID, \
                     GRAPH_CLIENT_SECRET and SHAREPOINT_SITE_ID",
                )?;
                config.validate()?;
                let service = SharePointService::new(config.graph(), config.library())?;
                let uploader = BatchUploader::new(
                    service.clone(),
                    service.uploader(),
                    BatchValidator::from_policy(config.upload_policy()),
                );
                uploader.upload_case(&case_id, &files, &progress).await?
            } else {
                let client = ApiClient::from_env()?;
                let uploader = BatchUploader::new(
                    client,
                    ChunkedUploader::new(reqwest::Client::new()),
                    BatchValidator::from_policy(&UploadPolicy::default()),
                );
                uploader.upload_case(&case_id, &files, &progress).await?
            };

            print_case_upload(&upload)?;
        }
        Commands::CreateFolder { case_id } => {
            let client = ApiClient::from_env()?;
            let response = client.create_folder(&case_id).await?;
            print_json(&response)?;
        }
        Commands::Preview {
            names,
            preserve_spaces,
            offline,
        } => {
            let response = if offline {
                SanitizeResponse {
                    success: true,
                    results: names
                        .iter()
                        .map(|n| sanitize_filename(n, preserve_spaces))
                        .collect(),
                }
            } else {
                ApiClient::from_env()?
                    .sanitize(&names, preserve_spaces)
                    .await?
            };
            print_json(&response)?;
        }
        Commands::Health => {
            let client = ApiClient::from_env()?;
            print_json(&client.health().await?)?;
        }
    }

    Ok(())
}
