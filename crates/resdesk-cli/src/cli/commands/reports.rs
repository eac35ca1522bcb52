//! Report command handlers.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use resdesk_core::report::{ReportFilters, ReportKind};

use crate::cli::context::AppContext;
use crate::cli::guards;

pub fn url(ctx: &AppContext, kind: ReportKind, filters: &ReportFilters) -> Result<()> {
    guards::require_privileged(&ctx.session.snapshot())?;
    println!("{}", ctx.api().report_url(kind, filters));
    Ok(())
}

pub fn open(ctx: &AppContext, kind: ReportKind, filters: &ReportFilters) -> Result<()> {
    guards::require_privileged(&ctx.session.snapshot())?;
    let url = ctx.api().report_url(kind, filters);
    open::that(&url).with_context(|| format!("open {url}"))?;
    println!("Opened {url}");
    Ok(())
}

pub async fn download(
    ctx: &AppContext,
    kind: ReportKind,
    filters: &ReportFilters,
    output: Option<PathBuf>,
) -> Result<()> {
    guards::require_privileged(&ctx.session.snapshot())?;

    let report = ctx
        .api()
        .fetch_report(kind, filters)
        .await
        .with_context(|| format!("fetch {kind} report"))?;

    let path = output
        .unwrap_or_else(|| PathBuf::from(format!("{kind}-report.{}", report.file_extension())));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(&path, &report.bytes)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    println!(
        "Saved {kind} report ({} bytes) to {}",
        report.bytes.len(),
        path.display()
    );
    Ok(())
}
