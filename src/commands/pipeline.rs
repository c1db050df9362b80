use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::{CleaningOptions, RunArgs};
use crate::commands::{clean, enrich, normalize};
use crate::util::ensure_directory;

const NORMALIZED_FILENAME: &str = "feed2.csv";
const CLEANED_FILENAME: &str = "cleaned_output.csv";

/// Intermediate files handed from one stage to the next.
pub struct StagePaths {
    pub normalized: PathBuf,
    pub cleaned: PathBuf,
}

impl StagePaths {
    pub fn in_dir(work_dir: &Path) -> Self {
        Self {
            normalized: work_dir.join(NORMALIZED_FILENAME),
            cleaned: work_dir.join(CLEANED_FILENAME),
        }
    }
}

pub fn run(args: RunArgs) -> Result<()> {
    ensure_directory(&args.work_dir)?;
    let stages = StagePaths::in_dir(&args.work_dir);

    info!(
        input = %args.input_path.display(),
        layout = %args.layout_path.display(),
        work_dir = %args.work_dir.display(),
        "starting pipeline"
    );

    let rewritten = normalize::normalize_file(&args.input_path, &stages.normalized)
        .context("normalize stage failed")?;
    info!(output = %stages.normalized.display(), rewritten, "normalize stage done");

    let cleaning = CleaningOptions {
        source_column: args.join.source_column.clone(),
        strip_prefix: args.strip_prefix.clone(),
        strip_extension: args.strip_extension.clone(),
    };
    let changed = clean::clean_file(&stages.normalized, &stages.cleaned, &cleaning)
        .context("clean stage failed")?;
    info!(output = %stages.cleaned.display(), changed, "clean stage done");

    let outcome = enrich::enrich_files(
        &stages.cleaned,
        &args.layout_path,
        &args.output_path,
        &args.join,
    )
    .context("enrich stage failed")?;

    if let Some(report_path) = &args.report_path {
        enrich::write_report(
            report_path,
            &outcome,
            render_run_command(&args),
            &args.join,
            &args.input_path,
            &args.layout_path,
            &args.output_path,
        )?;
    }

    info!(output = %args.output_path.display(), "pipeline completed");
    Ok(())
}

fn render_run_command(args: &RunArgs) -> String {
    format!(
        "layout-enrich run --work-dir {} --input-path {} --layout-path {} --output-path {} --source-column {} --on-alias-collision {}",
        args.work_dir.display(),
        args.input_path.display(),
        args.layout_path.display(),
        args.output_path.display(),
        args.join.source_column,
        args.join.on_alias_collision.as_str(),
    )
}
