use camino::Utf8Path;
use log::info;
use simple_error::SimpleResult;
use thousands::Separable;

use crate::cli;
use crate::cluster_evidence::cluster_evidence;
use crate::evidence_io::{read_evidence_set, write_sv_calls};
use crate::run_stats::{ClusterRunStats, write_cluster_run_stats};

pub fn run_cluster(
    shared_settings: &cli::SharedSettings,
    settings: &cli::ClusterSettings,
) -> SimpleResult<()> {
    cli::write_cluster_settings(&settings.output_dir, settings);

    let mut evidence = read_evidence_set(Utf8Path::new(&settings.evidence_filename))?;
    let converted_count = evidence.prepare_for_clustering();
    if converted_count > 0 {
        info!(
            "Converted {} read pairs given from their upstream read to downstream read form",
            converted_count.separate_with_commas()
        );
    }

    info!(
        "Read {} paired-end and {} split-read evidence records",
        evidence.paired_end.len().separate_with_commas(),
        evidence.split_read.len().separate_with_commas()
    );

    let start = std::time::Instant::now();
    let results = cluster_evidence(settings, shared_settings.thread_count, &evidence);
    let total_cluster_time_secs = start.elapsed().as_secs_f64();

    let stats = &results.stats;
    info!(
        "Found {} SV calls supported by {} paired-end and {} split-read evidence records",
        stats.sv_call_count.separate_with_commas(),
        stats.assigned_paired_end_evidence_count.separate_with_commas(),
        stats.assigned_split_read_evidence_count.separate_with_commas()
    );
    if stats.ci_out_of_bounds_count > 0 {
        info!(
            "{} SV calls have a breakpoint outside of their supporting evidence range",
            stats.ci_out_of_bounds_count.separate_with_commas()
        );
    }

    write_sv_calls(&settings.output_dir, &evidence, &results);

    let run_stats = ClusterRunStats {
        cluster_stats: results.stats,
        total_cluster_time_secs,
    };
    write_cluster_run_stats(&settings.output_dir, &run_stats);

    Ok(())
}
