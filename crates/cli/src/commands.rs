//! Subcommand implementations. Each returns the JSON document to print.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use serde_json::{Value, json};
use siteaudit_core::model::{AuditRecord, SeoAnalysis, Technology};
use siteaudit_core::url::{generate_report_id, normalize_url};
use siteaudit_core::{AppConfig, AuditService, CacheStatus, DataSource, SystemClock};

use crate::Command;

#[derive(Debug, Serialize)]
struct GetOutput<'a> {
    status: CacheStatus,
    source: DataSource,
    record: &'a AuditRecord,
}

#[derive(Debug, Serialize)]
struct InspectOutput {
    seo: SeoAnalysis,
    technologies: Vec<Technology>,
}

pub async fn run(command: Command, config: &AppConfig) -> Result<Value> {
    match command {
        Command::ReportId { url } => {
            let canonical = normalize_url(&url)?;
            Ok(json!({ "url": canonical.as_str(), "reportId": generate_report_id(canonical.as_str()) }))
        }
        Command::Inspect { file } => {
            let html = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            inspect(&html)
        }
        command => {
            let service = siteaudit_client::build_service(config, Arc::new(SystemClock)).await?;
            run_and_drain(command, &service, config.generation_timeout()).await
        }
    }
}

/// Run `command`, then give refreshes it started up to `limit` to finish
/// before the process exits.
async fn run_and_drain(command: Command, service: &AuditService, limit: Duration) -> Result<Value> {
    let output = run_with_service(command, service).await?;
    if !service.drain_refreshes(limit).await {
        tracing::warn!(
            active_refreshes = service.active_refreshes(),
            "Exiting with audit refreshes still running; they will not complete"
        );
    }
    Ok(output)
}

fn inspect(html: &str) -> Result<Value> {
    let output = InspectOutput {
        seo: siteaudit_client::inspect_html(html),
        technologies: siteaudit_client::detect_technologies(html),
    };
    Ok(serde_json::to_value(output)?)
}

async fn run_with_service(command: Command, service: &AuditService) -> Result<Value> {
    match command {
        Command::Get { url, refresh } => {
            let hit = service
                .get_audit(&url, refresh)
                .await
                .ok_or_else(|| anyhow!("no audit could be produced for {url}"))?;
            let output = GetOutput { status: hit.status, source: hit.source, record: &hit.record };
            Ok(serde_json::to_value(output)?)
        }
        Command::Invalidate { url } => {
            let removed = service.invalidate(&url).await?;
            Ok(json!({ "url": url, "removed": removed }))
        }
        Command::Sweep => {
            let memory_removed = service.cache().sweep_memory().await;
            let filesystem = service.cache().sweep_filesystem().await;
            tracing::info!(memory_removed, ?filesystem, "Manual sweep finished");
            Ok(json!({ "memoryRemoved": memory_removed, "filesystem": filesystem }))
        }
        Command::Stats => Ok(json!({
            "tiers": service.cache().stats().await,
            "activeRefreshes": service.active_refreshes(),
        })),
        Command::ReportId { .. } | Command::Inspect { .. } => Err(anyhow!("command does not use the audit service")),
    }
}
