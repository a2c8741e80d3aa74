//! Command-line front end: parses arguments and forwards to [`Uploader`].

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use chunk_uploader::{FileEntry, UploadOptions, Uploader, UploaderConfig};

#[derive(Debug, Parser)]
#[command(name = "chunk-uploader", version, about = "Upload a file in chunks or in a single request")]
struct Cli {
    /// File to upload
    file: PathBuf,

    /// Bearer token for the upload endpoint
    #[arg(long, env = "UPLOAD_ACCESS_TOKEN", hide_env_values = true)]
    token: String,

    /// Upload type, e.g. "audio" or "cover"
    #[arg(long = "type")]
    upload_type: Option<String>,

    #[arg(long)]
    artist_name: Option<String>,

    #[arg(long)]
    track_title: Option<String>,

    /// Send the consent flag
    #[arg(long)]
    consent: bool,

    /// Send the whole file in one request instead of chunks
    #[arg(long)]
    direct: bool,

    /// Backend base URL, overrides API_URL
    #[arg(long)]
    api_url: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> chunk_uploader::Result<()> {
    let mut config = UploaderConfig::from_env();
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url)?;
    }
    let uploader = Uploader::new(config)?;

    let file = FileEntry::from_path(&cli.file)?;
    let options = UploadOptions {
        upload_type: cli.upload_type,
        artist_name: cli.artist_name,
        track_title: cli.track_title,
        consent: cli.consent,
    };

    let mut on_progress = |percent: u8| {
        eprint!("\r{}: {:>3}%", file.file_name, percent);
        let _ = std::io::stderr().flush();
    };

    let result = if cli.direct {
        uploader
            .upload_direct(&file, &cli.token, Some(&mut on_progress), &options)
            .await
    } else {
        uploader
            .upload_chunked(&file, &cli.token, Some(&mut on_progress), &options)
            .await
    };
    eprintln!();
    let result = result?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
