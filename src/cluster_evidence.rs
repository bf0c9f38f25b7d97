//! Partition sample evidence into independent cluster units and cluster each unit into SV calls
//!

use std::collections::BTreeMap;
use std::sync::mpsc::channel;

use log::{debug, info};

use crate::cli::ClusterSettings;
use crate::cluster_breakpoints::{
    CliqueCall, ClusterModel, ComponentBuildStats, PairedEndClusterModel, SplitReadClusterModel,
    build_components, search_clique,
};
use crate::evidence_io::EvidenceSet;
use crate::run_stats::ClusterStats;
use crate::sv_record::{StructuralVariantRecord, SvIdTable, emit_sv_calls};
use crate::sv_type::SVType;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum EvidenceType {
    SplitRead,
    PairedEnd,
}

/// A group of evidence records clustered independently of all other evidence
///
/// Each unit covers one evidence type, chromosome and SV type.
///
struct ClusterUnit {
    evidence_type: EvidenceType,
    chrom_index: usize,
    sv_type: SVType,

    /// Indices of the unit's records in the sorted input evidence
    evidence_indices: Vec<usize>,

    max_breakpoint_distance: i64,
}

struct ClusterUnitResult {
    /// Calls with members given as indices into the sorted input evidence
    calls: Vec<CliqueCall>,
    build_stats: ComponentBuildStats,
}

pub struct ClusterResults {
    /// All SV calls, where each call's id is its index in this list
    pub svs: Vec<StructuralVariantRecord>,

    pub paired_end_sv_ids: SvIdTable,
    pub split_read_sv_ids: SvIdTable,

    pub stats: ClusterStats,
}

/// Chromosome count needed to index all chromosomes found in the evidence
///
fn get_chrom_count(evidence: &EvidenceSet) -> usize {
    let pe_chroms = evidence
        .paired_end
        .iter()
        .flat_map(|x| [x.tid, x.mtid]);
    let sr_chroms = evidence
        .split_read
        .iter()
        .flat_map(|x| [x.chrom_index, x.chrom2_index]);
    pe_chroms.chain(sr_chroms).max().map_or(0, |x| x + 1)
}

/// Group the indices of sorted evidence by chromosome and then SV type, retaining sort order
///
fn group_evidence_indices(
    chrom_count: usize,
    keys: impl Iterator<Item = (usize, SVType)>,
) -> Vec<BTreeMap<SVType, Vec<usize>>> {
    let mut groups = vec![BTreeMap::new(); chrom_count];
    for (evidence_index, (chrom_index, sv_type)) in keys.enumerate() {
        groups[chrom_index]
            .entry(sv_type)
            .or_insert_with(Vec::new)
            .push(evidence_index);
    }
    groups
}

/// Default paired-end breakpoint distance for each SV type
///
/// This is the largest normal insert size among all read pairs of the given type.
///
fn get_pe_max_breakpoint_distances(evidence: &EvidenceSet) -> BTreeMap<SVType, i64> {
    let mut distances = BTreeMap::new();
    for pe in evidence.paired_end.iter() {
        let x = distances.entry(pe.get_sv_type()).or_insert(0);
        *x = std::cmp::max(*x, pe.max_normal_isize);
    }
    distances
}

/// Partition all evidence into cluster units
///
/// Units are returned in output order: split-read units first, then paired-end units, each ordered
/// by chromosome and then SV type.
///
fn get_cluster_units(
    settings: &ClusterSettings,
    chrom_count: usize,
    evidence: &EvidenceSet,
) -> Vec<ClusterUnit> {
    let mut units = Vec::new();

    let sr_groups = group_evidence_indices(
        chrom_count,
        evidence
            .split_read
            .iter()
            .map(|x| (x.chrom_index, x.sv_type)),
    );
    for (chrom_index, chrom_groups) in sr_groups.into_iter().enumerate() {
        for (sv_type, evidence_indices) in chrom_groups {
            units.push(ClusterUnit {
                evidence_type: EvidenceType::SplitRead,
                chrom_index,
                sv_type,
                evidence_indices,
                max_breakpoint_distance: settings.sr_max_breakpoint_distance,
            });
        }
    }

    let pe_default_distances = get_pe_max_breakpoint_distances(evidence);
    let pe_groups = group_evidence_indices(
        chrom_count,
        evidence.paired_end.iter().map(|x| (x.tid, x.get_sv_type())),
    );
    for (chrom_index, chrom_groups) in pe_groups.into_iter().enumerate() {
        for (sv_type, evidence_indices) in chrom_groups {
            let max_breakpoint_distance = settings
                .pe_max_breakpoint_distance
                .unwrap_or(pe_default_distances[&sv_type]);
            units.push(ClusterUnit {
                evidence_type: EvidenceType::PairedEnd,
                chrom_index,
                sv_type,
                evidence_indices,
                max_breakpoint_distance,
            });
        }
    }

    units
}

/// Find all SV calls for one cluster model
///
fn cluster_model_evidence<M: ClusterModel>(
    model: &M,
    max_component_edges: usize,
) -> (Vec<CliqueCall>, ComponentBuildStats) {
    let mut calls = Vec::new();
    let build_stats = build_components(model, max_component_edges, |edges| {
        if let Some(call) = search_clique(model, edges) {
            calls.push(call);
        }
    });
    (calls, build_stats)
}

fn cluster_unit(
    settings: &ClusterSettings,
    evidence: &EvidenceSet,
    unit: &ClusterUnit,
) -> ClusterUnitResult {
    let (mut calls, build_stats) = match unit.evidence_type {
        EvidenceType::SplitRead => {
            let model = SplitReadClusterModel::new(
                unit.evidence_indices
                    .iter()
                    .map(|&x| &evidence.split_read[x])
                    .collect(),
                unit.sv_type,
                unit.max_breakpoint_distance,
            );
            cluster_model_evidence(&model, settings.graph_pruning)
        }
        EvidenceType::PairedEnd => {
            let model = PairedEndClusterModel::new(
                unit.evidence_indices
                    .iter()
                    .map(|&x| &evidence.paired_end[x])
                    .collect(),
                unit.sv_type,
                unit.max_breakpoint_distance,
            );
            cluster_model_evidence(&model, settings.graph_pruning)
        }
    };

    // Convert unit vertex indices to input evidence indices, and number calls within the unit
    for (call_index, call) in calls.iter_mut().enumerate() {
        call.sv.id = call_index;
        for member in call.members.iter_mut() {
            *member = unit.evidence_indices[*member];
        }
    }

    debug!(
        "Clustered {:?} unit chrom_index: {} sv_type: {:?} evidence: {} components: {} flushes: {} calls: {}",
        unit.evidence_type,
        unit.chrom_index,
        unit.sv_type,
        unit.evidence_indices.len(),
        build_stats.component_count,
        build_stats.flush_count,
        calls.len()
    );

    ClusterUnitResult { calls, build_stats }
}

/// Cluster all paired-end and split-read evidence into SV calls
///
/// Both evidence lists must already be sorted into breakpoint clustering order. Cluster units are
/// processed concurrently, and their results are merged in a fixed unit order, so that output is
/// independent of thread count.
///
pub fn cluster_evidence(
    settings: &ClusterSettings,
    thread_count: usize,
    evidence: &EvidenceSet,
) -> ClusterResults {
    let chrom_count = get_chrom_count(evidence);
    let units = get_cluster_units(settings, chrom_count, evidence);

    info!(
        "Clustering SV evidence from {} chromosomes in {} cluster units",
        chrom_count,
        units.len()
    );

    let worker_pool = rayon::ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .unwrap();

    let (tx, rx) = channel();

    worker_pool.scope(|scope| {
        for (unit_index, unit) in units.iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move |_| {
                let result = cluster_unit(settings, evidence, unit);
                tx.send((unit_index, result)).unwrap();
            });
        }
    });
    drop(tx);

    let mut unit_results = rx.into_iter().collect::<Vec<_>>();
    unit_results.sort_by_key(|(unit_index, _)| *unit_index);

    let mut results = ClusterResults {
        svs: Vec::new(),
        paired_end_sv_ids: SvIdTable::new(evidence.paired_end.len()),
        split_read_sv_ids: SvIdTable::new(evidence.split_read.len()),
        stats: ClusterStats {
            paired_end_evidence_count: evidence.paired_end.len(),
            split_read_evidence_count: evidence.split_read.len(),
            chrom_count,
            cluster_unit_count: units.len(),
            ..Default::default()
        },
    };

    for (unit_index, unit_result) in unit_results {
        let mut sv_call_count_by_label = BTreeMap::new();
        if !unit_result.calls.is_empty() {
            let label = units[unit_index].sv_type.vcf_label().to_string();
            sv_call_count_by_label.insert(label, unit_result.calls.len());
        }
        let unit_stats = ClusterStats {
            component_count: unit_result.build_stats.component_count,
            capped_component_count: unit_result.build_stats.capped_component_count,
            sv_call_count: unit_result.calls.len(),
            sv_call_count_by_label,
            ci_out_of_bounds_count: unit_result
                .calls
                .iter()
                .filter(|x| !x.sv.is_ci_bracketing())
                .count(),
            ..Default::default()
        };
        results.stats.merge(&unit_stats);

        let sv_ids = match units[unit_index].evidence_type {
            EvidenceType::SplitRead => &mut results.split_read_sv_ids,
            EvidenceType::PairedEnd => &mut results.paired_end_sv_ids,
        };
        emit_sv_calls(unit_result.calls, &mut results.svs, sv_ids);
    }

    results.stats.assigned_paired_end_evidence_count = results.paired_end_sv_ids.assigned_count();
    results.stats.assigned_split_read_evidence_count = results.split_read_sv_ids.assigned_count();

    if results.stats.capped_component_count > 0 {
        info!(
            "{} evidence graph components reached the graph pruning limit of {} edges",
            results.stats.capped_component_count, settings.graph_pruning
        );
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::test_utils::{get_test_pe_evidence, get_test_sr_evidence};
    use crate::evidence::{PairedEndEvidence, SplitReadEvidence};

    fn get_test_evidence_set(
        paired_end: Vec<PairedEndEvidence>,
        split_read: Vec<SplitReadEvidence>,
    ) -> EvidenceSet {
        let mut evidence = EvidenceSet {
            paired_end,
            split_read,
        };
        evidence.prepare_for_clustering();
        evidence
    }

    #[test]
    fn test_simple_deletion() {
        let evidence = get_test_evidence_set(
            vec![
                get_test_pe_evidence(2006, 1000),
                get_test_pe_evidence(2000, 990),
                get_test_pe_evidence(2003, 995),
            ],
            Vec::new(),
        );
        let results = cluster_evidence(&ClusterSettings::default(), 1, &evidence);

        assert_eq!(results.svs.len(), 1);
        let sv = &results.svs[0];
        assert_eq!(sv.id, 0);
        assert_eq!(sv.sv_type, SVType::Deletion);
        assert_eq!((sv.start, sv.end), (1011, 2001));
        assert_eq!((sv.cipos_low, sv.cipos_high), (-50, 50));
        assert_eq!(sv.pe_support, 3);
        assert_eq!(sv.pe_map_quality, Some(60));
        assert_eq!(results.paired_end_sv_ids.as_slice(), &[Some(0); 3]);
        assert_eq!(results.stats.assigned_paired_end_evidence_count, 3);
        assert_eq!(results.stats.cluster_unit_count, 1);
    }

    #[test]
    fn test_simple_deletion_from_upstream_read() {
        // Each pair is given from its forward upstream read, with mate ends at 2000, 2003, 2006
        let paired_end = [(1000, 1990), (1005, 1993), (1010, 1996)]
            .into_iter()
            .map(|(pos, mpos)| {
                let mut pe = get_test_pe_evidence(pos, mpos);
                pe.flag = 0x20;
                pe
            })
            .collect();
        let evidence = get_test_evidence_set(paired_end, Vec::new());
        assert!(evidence.paired_end.iter().all(|x| x.pos > x.mpos));

        let results = cluster_evidence(&ClusterSettings::default(), 1, &evidence);

        assert_eq!(results.svs.len(), 1);
        let sv = &results.svs[0];
        assert_eq!(sv.sv_type, SVType::Deletion);
        assert_eq!((sv.start, sv.end), (1021, 1991));
        assert_eq!((sv.ciend_low, sv.ciend_high), (-50, 50));
        assert_eq!(sv.pe_support, 3);
        assert_eq!(sv.pe_map_quality, Some(60));
        assert_eq!(results.paired_end_sv_ids.as_slice(), &[Some(0); 3]);
    }

    #[test]
    fn test_isolated_record() {
        let evidence = get_test_evidence_set(
            vec![get_test_pe_evidence(2000, 990)],
            vec![get_test_sr_evidence(5000, 9000)],
        );
        let results = cluster_evidence(&ClusterSettings::default(), 2, &evidence);

        assert!(results.svs.is_empty());
        assert_eq!(results.paired_end_sv_ids.get(0), None);
        assert_eq!(results.split_read_sv_ids.get(0), None);
        assert_eq!(results.stats.component_count, 0);
        assert_eq!(results.stats.cluster_unit_count, 2);
    }

    #[test]
    fn test_edge_cap_truncation() {
        let split_read = (0..10)
            .map(|i| get_test_sr_evidence(1000 + i, 5000 + i))
            .collect::<Vec<_>>();
        let evidence = get_test_evidence_set(Vec::new(), split_read);
        let settings = ClusterSettings {
            graph_pruning: 3,
            ..Default::default()
        };
        let results = cluster_evidence(&settings, 1, &evidence);

        assert_eq!(results.svs.len(), 1);
        assert!(results.svs[0].sr_support <= 4);
        assert_eq!(results.stats.capped_component_count, 1);
        assert_eq!(
            results.stats.assigned_split_read_evidence_count,
            results.svs[0].sr_support
        );
    }

    #[test]
    fn test_unit_order_and_id_renumbering() {
        // Two deletion clusters on separate chromosomes, plus a split-read cluster on the second
        let mut paired_end = Vec::new();
        for tid in [1, 0] {
            for (pos, mpos) in [(2000, 990), (2003, 995), (2006, 1000)] {
                let mut pe = get_test_pe_evidence(pos, mpos);
                pe.tid = tid;
                pe.mtid = tid;
                paired_end.push(pe);
            }
        }
        let split_read = [(100, 700), (102, 701)]
            .into_iter()
            .map(|(pos, pos2)| {
                let mut sr = get_test_sr_evidence(pos, pos2);
                sr.chrom_index = 1;
                sr.chrom2_index = 1;
                sr
            })
            .collect();
        let evidence = get_test_evidence_set(paired_end, split_read);

        let results = cluster_evidence(&ClusterSettings::default(), 4, &evidence);
        assert_eq!(results.svs.len(), 3);
        let summary = results
            .svs
            .iter()
            .map(|x| (x.id, x.chrom_index, x.sr_support, x.pe_support))
            .collect::<Vec<_>>();
        assert_eq!(summary, vec![(0, 1, 2, 0), (1, 0, 0, 3), (2, 1, 0, 3)]);

        assert_eq!(
            results.paired_end_sv_ids.as_slice(),
            &[Some(1), Some(1), Some(1), Some(2), Some(2), Some(2)]
        );
        assert_eq!(results.split_read_sv_ids.as_slice(), &[Some(0), Some(0)]);
        assert_eq!(results.stats.chrom_count, 2);
        assert_eq!(results.stats.sv_call_count_by_label["DEL"], 3);
    }

    #[test]
    fn test_thread_count_independence() {
        let split_read = (0..40)
            .map(|i| get_test_sr_evidence(1000 + i * 37, 5000 + (i % 7) * 20))
            .collect::<Vec<_>>();
        let evidence = get_test_evidence_set(Vec::new(), split_read);
        let settings = ClusterSettings::default();

        let results1 = cluster_evidence(&settings, 1, &evidence);
        let results4 = cluster_evidence(&settings, 4, &evidence);
        assert_eq!(results1.svs, results4.svs);
        assert_eq!(
            results1.split_read_sv_ids.as_slice(),
            results4.split_read_sv_ids.as_slice()
        );
    }
}
