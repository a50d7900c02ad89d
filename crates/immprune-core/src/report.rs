use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Local, SecondsFormat};

use crate::asset::LocalAsset;
use crate::batch::ReportPlan;
use crate::locale::Locale;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// `date | N MB | filename | PHOTO|VIDEO | path`
pub fn format_line(asset: &LocalAsset, locale: Locale) -> String {
    let date = asset
        .date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    format!(
        "{} | {} MB | {} | {} | {}",
        date,
        asset.size / BYTES_PER_MB,
        asset.filename,
        locale.kind(asset.is_video),
        asset.path.as_deref().unwrap_or("")
    )
}

/// Serialize the plan, newest first, to any writer.
pub fn write_report<W: Write>(
    out: &mut W,
    plan: &ReportPlan,
    locale: Locale,
    scanned_at: DateTime<Local>,
) -> std::io::Result<()> {
    writeln!(out, "{}", locale.report_title(plan.len()))?;
    writeln!(
        out,
        "{}: {}",
        locale.scan_label(),
        scanned_at.to_rfc3339_opts(SecondsFormat::Secs, false)
    )?;
    writeln!(out)?;

    match plan {
        ReportPlan::Flat(assets) => {
            for asset in assets {
                writeln!(out, "{}", format_line(asset, locale))?;
            }
        }
        ReportPlan::Batched(groups) => {
            for group in groups {
                writeln!(out, "{}", locale.batch_header(group.batch, group.assets.len()))?;
                for asset in &group.assets {
                    writeln!(out, "{}", format_line(asset, locale))?;
                }
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

/// Truncate or create `path` and write the report into it.
pub fn write_report_file(
    path: &Path,
    plan: &ReportPlan,
    locale: Locale,
    scanned_at: DateTime<Local>,
) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create report file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_report(&mut writer, plan, locale, scanned_at)?;
    writer.flush()?;
    Ok(())
}
