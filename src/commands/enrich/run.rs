use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{Level, info, trace};

use crate::cli::{EnrichArgs, JoinOptions};
use crate::model::{EnrichCounts, EnrichPaths, EnrichRunReport, SourceHash};
use crate::table::DelimitedTable;
use crate::util::{now_utc_string, sha256_file, utc_compact_string, write_json_pretty};

use super::index::LayoutIndex;
use super::merge::enrich_table;

const REPORT_VERSION: u32 = 1;

/// Counts from one enrichment pass plus the start time of the run.
pub struct EnrichOutcome {
    pub run_id: String,
    pub started_at: String,
    pub counts: EnrichCounts,
}

pub fn run(args: EnrichArgs) -> Result<()> {
    let outcome = enrich_files(
        &args.input_path,
        &args.layout_path,
        &args.output_path,
        &args.join,
    )?;

    if let Some(report_path) = &args.report_path {
        write_report(
            report_path,
            &outcome,
            render_enrich_command(&args),
            &args.join,
            &args.input_path,
            &args.layout_path,
            &args.output_path,
        )?;
    }

    Ok(())
}

pub fn enrich_files(
    input_path: &Path,
    layout_path: &Path,
    output_path: &Path,
    join: &JoinOptions,
) -> Result<EnrichOutcome> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    info!(
        run_id = %run_id,
        input = %input_path.display(),
        layout = %layout_path.display(),
        policy = join.on_alias_collision.as_str(),
        "starting enrich"
    );

    let layout_table = DelimitedTable::read(layout_path)?;
    let index = LayoutIndex::build(&layout_table, join.on_alias_collision)
        .with_context(|| format!("failed to index layout table: {}", layout_path.display()))?;

    if tracing::enabled!(Level::TRACE) {
        let mut aliases: Vec<&str> = index.aliases().collect();
        aliases.sort_unstable();
        trace!(aliases = ?aliases, "indexed layout aliases");
    }

    info!(
        layout_rows = index.entry_count(),
        aliases = index.alias_count(),
        collisions = index.collisions(),
        "layout index ready"
    );

    let simulation_table = DelimitedTable::read(input_path)?;
    let (enriched, stats) = enrich_table(&simulation_table, &index, &join.source_column)?;
    enriched
        .write(output_path)
        .with_context(|| format!("failed to write enriched table: {}", output_path.display()))?;

    let counts = EnrichCounts {
        layout_rows: index.entry_count(),
        aliases_indexed: index.alias_count(),
        alias_collisions: index.collisions(),
        records_total: stats.records_total,
        records_enriched: stats.records_enriched,
        records_passed_through: stats.records_passed_through,
        lookup_misses: stats.lookup_misses,
    };

    info!(
        output = %output_path.display(),
        records = counts.records_total,
        enriched = counts.records_enriched,
        passed_through = counts.records_passed_through,
        lookup_misses = counts.lookup_misses,
        "enrich completed"
    );

    Ok(EnrichOutcome {
        run_id,
        started_at,
        counts,
    })
}

pub fn write_report(
    report_path: &Path,
    outcome: &EnrichOutcome,
    command: String,
    join: &JoinOptions,
    input_path: &Path,
    layout_path: &Path,
    output_path: &Path,
) -> Result<()> {
    let mut source_hashes = Vec::with_capacity(2);
    for path in [input_path, layout_path] {
        source_hashes.push(SourceHash {
            path: path.display().to_string(),
            sha256: sha256_file(path)?,
        });
    }

    let report = EnrichRunReport {
        report_version: REPORT_VERSION,
        run_id: outcome.run_id.clone(),
        started_at: outcome.started_at.clone(),
        generated_at: now_utc_string(),
        command,
        alias_collision_policy: join.on_alias_collision.as_str().to_string(),
        paths: EnrichPaths {
            input_path: input_path.display().to_string(),
            layout_path: layout_path.display().to_string(),
            output_path: output_path.display().to_string(),
        },
        counts: outcome.counts.clone(),
        source_hashes,
    };

    write_json_pretty(report_path, &report)?;
    info!(path = %report_path.display(), "wrote run report");
    Ok(())
}

fn render_enrich_command(args: &EnrichArgs) -> String {
    format!(
        "layout-enrich enrich --input-path {} --layout-path {} --output-path {} --source-column {} --on-alias-collision {}",
        args.input_path.display(),
        args.layout_path.display(),
        args.output_path.display(),
        args.join.source_column,
        args.join.on_alias_collision.as_str(),
    )
}
