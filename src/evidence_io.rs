//! Read SV evidence input and write clustered SV call output
//!

use std::fs::File;
use std::io::{BufReader, BufWriter};

use camino::Utf8Path;
use log::info;
use serde::{Deserialize, Serialize};
use simple_error::{SimpleResult, try_with};
use unwrap::unwrap;

use crate::cluster_evidence::ClusterResults;
use crate::evidence::{
    PairedEndEvidence, SplitReadEvidence, normalize_paired_end_evidence, sort_paired_end_evidence,
    sort_split_read_evidence,
};
use crate::filenames::SV_CALLS_FILENAME;
use crate::sv_record::{StructuralVariantRecord, SvIdTable};

/// All discordant SV evidence from one sample
///
#[derive(Default, Deserialize, Serialize)]
pub struct EvidenceSet {
    #[serde(default)]
    pub paired_end: Vec<PairedEndEvidence>,

    #[serde(default)]
    pub split_read: Vec<SplitReadEvidence>,
}

impl EvidenceSet {
    /// Convert read pairs to downstream read form and sort all evidence into breakpoint
    /// clustering order
    ///
    /// Returns the number of read pairs converted to downstream read form.
    ///
    pub fn prepare_for_clustering(&mut self) -> usize {
        let converted_count = normalize_paired_end_evidence(&mut self.paired_end);
        sort_paired_end_evidence(&mut self.paired_end);
        sort_split_read_evidence(&mut self.split_read);
        converted_count
    }
}

pub fn read_evidence_set(filename: &Utf8Path) -> SimpleResult<EvidenceSet> {
    info!("Reading SV evidence from file: '{filename}'");

    let file = try_with!(
        File::open(filename),
        "Unable to open SV evidence json file: '{filename}'"
    );

    let reader = BufReader::new(file);
    let evidence = try_with!(
        serde_json::from_reader(reader),
        "Unable to parse SV evidence from json file: '{filename}'"
    );

    Ok(evidence)
}

/// An evidence record annotated with the id of the SV call it supports
#[derive(Serialize)]
struct AssignedEvidence<'a, T> {
    #[serde(flatten)]
    evidence: &'a T,
    sv_id: Option<usize>,
}

fn get_assigned_evidence<'a, T>(
    evidence: &'a [T],
    sv_ids: &SvIdTable,
) -> Vec<AssignedEvidence<'a, T>> {
    evidence
        .iter()
        .enumerate()
        .map(|(index, evidence)| AssignedEvidence {
            evidence,
            sv_id: sv_ids.get(index),
        })
        .collect()
}

#[derive(Serialize)]
struct SvCallOutput<'a> {
    svs: &'a [StructuralVariantRecord],
    paired_end: Vec<AssignedEvidence<'a, PairedEndEvidence>>,
    split_read: Vec<AssignedEvidence<'a, SplitReadEvidence>>,
}

/// Write all SV calls, together with the SV id assigned to each evidence record, in json format
///
pub fn write_sv_calls(output_dir: &Utf8Path, evidence: &EvidenceSet, results: &ClusterResults) {
    let filename = output_dir.join(SV_CALLS_FILENAME);

    info!("Writing SV calls to file: '{filename}'");

    let output = SvCallOutput {
        svs: &results.svs,
        paired_end: get_assigned_evidence(&evidence.paired_end, &results.paired_end_sv_ids),
        split_read: get_assigned_evidence(&evidence.split_read, &results.split_read_sv_ids),
    };

    let f = unwrap!(
        File::create(&filename),
        "Unable to create SV calls json file: '{filename}'"
    );

    unwrap!(
        serde_json::to_writer_pretty(BufWriter::new(f), &output),
        "Unable to write SV calls json file: '{filename}'"
    );
}
