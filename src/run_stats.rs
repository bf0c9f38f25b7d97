//! Track stats for the whole svclique run
//!

use std::collections::BTreeMap;
use std::fs::File;

use camino::Utf8Path;
use log::info;
use serde::{Deserialize, Serialize};
use unwrap::unwrap;

use crate::filenames::RUN_STATS_FILENAME;

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ClusterStats {
    pub paired_end_evidence_count: usize,
    pub split_read_evidence_count: usize,

    /// One more than the highest chromosome index found in any evidence record
    pub chrom_count: usize,

    /// Number of (evidence type, chromosome, SV type) groups clustered independently
    pub cluster_unit_count: usize,

    /// Number of evidence graph components with at least one edge
    pub component_count: usize,

    /// Number of components which dropped edges after reaching the graph pruning limit
    pub capped_component_count: usize,

    pub sv_call_count: usize,

    /// SV call counts keyed on VCF-style SV type label
    pub sv_call_count_by_label: BTreeMap<String, usize>,

    /// SV calls with a breakpoint outside of the range of its supporting evidence
    pub ci_out_of_bounds_count: usize,

    pub assigned_paired_end_evidence_count: usize,
    pub assigned_split_read_evidence_count: usize,
}

impl ClusterStats {
    pub fn merge(&mut self, other: &Self) {
        self.paired_end_evidence_count += other.paired_end_evidence_count;
        self.split_read_evidence_count += other.split_read_evidence_count;
        self.chrom_count = std::cmp::max(self.chrom_count, other.chrom_count);
        self.cluster_unit_count += other.cluster_unit_count;
        self.component_count += other.component_count;
        self.capped_component_count += other.capped_component_count;
        self.sv_call_count += other.sv_call_count;
        for (label, count) in other.sv_call_count_by_label.iter() {
            *self.sv_call_count_by_label.entry(label.clone()).or_insert(0) += count;
        }
        self.ci_out_of_bounds_count += other.ci_out_of_bounds_count;
        self.assigned_paired_end_evidence_count += other.assigned_paired_end_evidence_count;
        self.assigned_split_read_evidence_count += other.assigned_split_read_evidence_count;
    }
}

#[derive(Deserialize, Serialize)]
pub struct ClusterRunStats {
    pub cluster_stats: ClusterStats,
    pub total_cluster_time_secs: f64,
}

/// Write run_stats structure out in json format
pub fn write_cluster_run_stats(output_dir: &Utf8Path, run_stats: &ClusterRunStats) {
    let filename = output_dir.join(RUN_STATS_FILENAME);

    info!("Writing run statistics to file: '{filename}'");

    let f = unwrap!(
        File::create(&filename),
        "Unable to create run statistics json file: '{filename}'"
    );

    unwrap!(
        serde_json::to_writer_pretty(&f, &run_stats),
        "Unable to write run statistics json file: '{filename}'"
    );
}
