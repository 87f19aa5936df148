//! `scout files` and `scout health`.

use anyhow::{Context, Result, bail};
use scout_api::{ApiClient, HealthProber};
use scout_settings::ScoutSettings;

use crate::FilesCommand;

/// The API base for document calls: the first reachable candidate.
async fn api_base(settings: &ScoutSettings) -> Result<String> {
    let prober = HealthProber::from_settings(&settings.http);
    let host = settings
        .endpoints
        .origin
        .as_deref()
        .and_then(|origin| url::Url::parse(origin).ok())
        .and_then(|origin| origin.host_str().map(str::to_owned))
        .unwrap_or_default();
    prober
        .resolve_api_url(&host, &settings.endpoints.api_urls)
        .await
        .context("No API URL configured")
}

pub async fn run(settings: &ScoutSettings, command: FilesCommand) -> Result<()> {
    let base = api_base(settings).await?;
    let client = ApiClient::new(&base).with_context(|| format!("Invalid API URL: {base}"))?;

    match command {
        FilesCommand::List => {
            let files = client.list_files().await.context("Failed to list files")?;
            for name in files {
                println!("{name}");
            }
        }
        FilesCommand::Upload { path } => {
            let uploaded = client
                .upload_file(&path)
                .await
                .with_context(|| format!("Failed to upload {}", path.display()))?;
            println!("{} -> {}", uploaded.filename, uploaded.path);
        }
        FilesCommand::Delete { name } => {
            let message = client
                .delete_file(&name)
                .await
                .with_context(|| format!("Failed to delete {name}"))?;
            println!("{message}");
        }
    }
    Ok(())
}

pub async fn health(settings: &ScoutSettings, urls: &[String]) -> Result<()> {
    let prober = HealthProber::from_settings(&settings.http);
    let mut unreachable = 0usize;
    for url in urls {
        if prober.probe(url).await {
            println!("{url}\treachable");
        } else {
            println!("{url}\tunreachable");
            unreachable += 1;
        }
    }
    if unreachable > 0 {
        bail!("{unreachable} of {} URLs unreachable", urls.len());
    }
    Ok(())
}
