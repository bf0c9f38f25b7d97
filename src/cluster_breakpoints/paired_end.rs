use std::collections::BTreeSet;

use itertools::Itertools;

use super::ClusterModel;
use super::edge_graph::EdgeWeight;
use crate::evidence::PairedEndEvidence;
use crate::sv_consistency::{
    BreakpointConsensus, init_consensus, is_valid_sv_size, update_consensus,
};
use crate::sv_record::StructuralVariantRecord;
use crate::sv_type::SVType;

/// Minimum confidence interval half-width reported for paired-end SV calls
const MIN_CI_WIGGLE: i64 = 50;

/// Breakpoint geometry of one read pair used to test pair compatibility
///
struct PairGeometry {
    min: i64,
    max: i64,
    alen: i64,
    isize: i64,
}

impl PairGeometry {
    fn new(pe: &PairedEndEvidence, sv_type: SVType) -> Self {
        Self {
            min: pe.min_coord(sv_type),
            max: pe.max_coord(sv_type),
            alen: pe.alen,
            isize: pe.max_normal_isize,
        }
    }
}

/// Return true if the start side of two pairs can't come from one breakend, for reads anchored to
/// the left of the breakend
fn left_anchored_start_disagree(p1: &PairGeometry, p2: &PairGeometry) -> bool {
    p2.min + p2.alen - p1.min > p1.isize
}

fn right_anchored_start_disagree(p1: &PairGeometry, p2: &PairGeometry) -> bool {
    p2.min - p1.min > p1.isize
}

/// Test whether two read pairs could not support the same SV
///
/// `p1` is the pair earlier in clustering order.
///
fn pairs_disagree(p1: &PairGeometry, p2: &PairGeometry, sv_type: SVType) -> bool {
    if let Some(orientation) = sv_type.translocation_orientation() {
        let is_start_disagree = if orientation % 2 == 0 {
            left_anchored_start_disagree(p1, p2)
        } else {
            right_anchored_start_disagree(p1, p2)
        };
        return is_start_disagree
            || (p2.max - p1.max).abs() > std::cmp::max(p1.isize, p2.isize);
    }

    let is_inversion = matches!(sv_type, SVType::Inversion3to3 | SVType::Inversion5to5);
    if is_inversion && (p2.min > p1.max || p1.min > p2.max) {
        return true;
    }

    match sv_type {
        SVType::Inversion3to3 | SVType::Deletion => {
            left_anchored_start_disagree(p1, p2)
                || (p2.max < p1.max && p1.max + p1.alen - p2.max > p1.isize)
                || (p2.max >= p1.max && p2.max + p2.alen - p1.max > p2.isize)
        }
        _ => {
            right_anchored_start_disagree(p1, p2)
                || (p2.max < p1.max && p1.max - p2.max > p2.isize)
                || (p2.max >= p1.max && p2.max - p1.max > p1.isize)
        }
    }
}

/// Edge weight between two compatible read pairs
///
/// The weight is the log2-binned difference between the change in implied SV size between the two
/// pairs and the difference of their library insert size medians.
///
fn get_pair_edge_weight(
    pe1: &PairedEndEvidence,
    pe2: &PairedEndEvidence,
    sv_type: SVType,
) -> EdgeWeight {
    let min_delta = pe2.min_coord(sv_type) - pe1.min_coord(sv_type);
    let max_delta = pe2.max_coord(sv_type) - pe1.max_coord(sv_type);
    let size_delta = ((min_delta - max_delta).abs() - (pe2.median - pe1.median).abs()).abs();
    (size_delta as u64 + 1).ilog2()
}

/// Median of the supporting pair mapping qualities, taking the lower value for even counts
///
fn get_median_map_quality(map_qualities: impl Iterator<Item = u8>) -> Option<u8> {
    let sorted = map_qualities.sorted_unstable().collect::<Vec<_>>();
    if sorted.is_empty() {
        None
    } else {
        Some(sorted[(sorted.len() - 1) / 2])
    }
}

/// Breakpoint clustering rules for paired-end evidence
///
/// Read pairs only bound the location of each breakend, so cluster consistency is tracked as a
/// consensus breakpoint interval with remaining insert size slack, as defined in
/// [`crate::sv_consistency`].
///
pub struct PairedEndClusterModel<'a> {
    evidence: Vec<&'a PairedEndEvidence>,
    sv_type: SVType,
    max_breakpoint_distance: i64,
}

impl<'a> PairedEndClusterModel<'a> {
    /// `evidence` must all have type `sv_type`, sorted into paired-end clustering order
    pub fn new(
        evidence: Vec<&'a PairedEndEvidence>,
        sv_type: SVType,
        max_breakpoint_distance: i64,
    ) -> Self {
        Self {
            evidence,
            sv_type,
            max_breakpoint_distance,
        }
    }
}

pub struct PairedEndCliqueState {
    seed: usize,
    consensus: BreakpointConsensus,
}

impl ClusterModel for PairedEndClusterModel<'_> {
    type CliqueState = PairedEndCliqueState;

    fn vertex_count(&self) -> usize {
        self.evidence.len()
    }

    fn is_past_window(&self, i: usize, j: usize) -> bool {
        let pe1 = self.evidence[i];
        let pe2 = self.evidence[j];
        let dist = pe2.min_coord(self.sv_type) + pe2.alen - pe1.min_coord(self.sv_type);
        dist.abs() > self.max_breakpoint_distance
    }

    fn get_edge_weight(&self, i: usize, j: usize) -> Option<EdgeWeight> {
        let pe1 = self.evidence[i];
        let pe2 = self.evidence[j];
        if pe1.mtid != pe2.mtid {
            return None;
        }
        let p1 = PairGeometry::new(pe1, self.sv_type);
        let p2 = PairGeometry::new(pe2, self.sv_type);
        if pairs_disagree(&p1, &p2, self.sv_type) {
            return None;
        }
        Some(get_pair_edge_weight(pe1, pe2, self.sv_type))
    }

    fn seed_clique(&self, v: usize) -> Option<PairedEndCliqueState> {
        let pe = self.evidence[v];
        let consensus = init_consensus(pe, self.sv_type);
        if pe.tid == pe.mtid && consensus.start >= consensus.end {
            return None;
        }
        Some(PairedEndCliqueState { seed: v, consensus })
    }

    fn extend_clique(
        &self,
        state: &PairedEndCliqueState,
        v: usize,
    ) -> Option<PairedEndCliqueState> {
        let consensus = update_consensus(self.evidence[v], self.sv_type, &state.consensus)?;
        Some(PairedEndCliqueState {
            seed: state.seed,
            consensus,
        })
    }

    fn make_sv_record(
        &self,
        state: &PairedEndCliqueState,
        members: &BTreeSet<usize>,
    ) -> Option<StructuralVariantRecord> {
        let consensus = &state.consensus;
        if !is_valid_sv_size(consensus, self.sv_type) {
            return None;
        }

        let seed = self.evidence[state.seed];
        let mut sv = StructuralVariantRecord::new(
            self.sv_type,
            seed.tid,
            consensus.start + 1,
            seed.mtid,
            consensus.end + 1,
        );
        let ci_wiggle = std::cmp::max(consensus.wiggle.abs(), MIN_CI_WIGGLE);
        sv.cipos_low = -ci_wiggle;
        sv.cipos_high = ci_wiggle;
        sv.ciend_low = -ci_wiggle;
        sv.ciend_high = ci_wiggle;
        sv.pe_support = members.len();
        sv.pe_map_quality =
            get_median_map_quality(members.iter().map(|&v| self.evidence[v].map_quality));
        Some(sv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster_breakpoints::{build_components, search_clique};
    use crate::evidence::test_utils::get_test_pe_evidence;

    fn cluster_pairs(
        evidence: &[PairedEndEvidence],
        sv_type: SVType,
        max_breakpoint_distance: i64,
    ) -> Vec<(StructuralVariantRecord, Vec<usize>)> {
        let model =
            PairedEndClusterModel::new(evidence.iter().collect(), sv_type, max_breakpoint_distance);
        let mut calls = Vec::new();
        build_components(&model, 1000, |edges| {
            if let Some(call) = search_clique(&model, edges) {
                calls.push((call.sv, call.members));
            }
        });
        calls
    }

    /// Deletion pairs with mate end at 1000, 1005, 1010 and read start at 2000, 2003, 2006
    fn get_deletion_pairs() -> Vec<PairedEndEvidence> {
        vec![
            get_test_pe_evidence(2000, 990),
            get_test_pe_evidence(2003, 995),
            get_test_pe_evidence(2006, 1000),
        ]
    }

    #[test]
    fn test_deletion_cluster() {
        let mut evidence = get_deletion_pairs();
        evidence[0].map_quality = 20;
        evidence[2].map_quality = 40;
        assert!(evidence.iter().all(|x| x.get_sv_type() == SVType::Deletion));

        let calls = cluster_pairs(&evidence, SVType::Deletion, 50);
        assert_eq!(calls.len(), 1);

        let (sv, members) = &calls[0];
        assert_eq!(members, &vec![0, 1, 2]);
        assert_eq!(sv.sv_type, SVType::Deletion);
        assert_eq!(sv.start, 1011);
        assert_eq!(sv.end, 2001);
        assert_eq!((sv.cipos_low, sv.cipos_high), (-50, 50));
        assert_eq!((sv.ciend_low, sv.ciend_high), (-50, 50));
        assert_eq!(sv.pe_support, 3);
        assert_eq!(sv.sr_support, 0);
        assert_eq!(sv.pe_map_quality, Some(40));
        assert!(!sv.precise);
    }

    #[test]
    fn test_pair_edge_weight() {
        let evidence = get_deletion_pairs();
        assert_eq!(
            get_pair_edge_weight(&evidence[0], &evidence[1], SVType::Deletion),
            1
        );
        assert_eq!(
            get_pair_edge_weight(&evidence[0], &evidence[2], SVType::Deletion),
            2
        );

        let mut pe = get_test_pe_evidence(2003, 995);
        pe.median = 302;
        assert_eq!(get_pair_edge_weight(&evidence[0], &pe, SVType::Deletion), 0);
    }

    #[test]
    fn test_mate_chrom_mismatch() {
        let mut evidence = get_deletion_pairs();
        for pe in evidence.iter_mut() {
            pe.mtid = 1;
            pe.flag = 0;
        }
        evidence[1].mtid = 2;
        let sv_type = SVType::Translocation3to3;
        let model = PairedEndClusterModel::new(evidence.iter().collect(), sv_type, 50);
        assert_eq!(model.get_edge_weight(0, 1), None);
        assert!(model.get_edge_weight(0, 2).is_some());
    }

    #[test]
    fn test_pairs_disagree() {
        let geometry = |min: i64, max: i64| PairGeometry {
            min,
            max,
            alen: 10,
            isize: 50,
        };

        // Start side too far apart for a deletion
        assert!(pairs_disagree(
            &geometry(1000, 2000),
            &geometry(1045, 2000),
            SVType::Deletion
        ));
        assert!(!pairs_disagree(
            &geometry(1000, 2000),
            &geometry(1035, 2000),
            SVType::Deletion
        ));

        // End side too far apart for a deletion
        assert!(pairs_disagree(
            &geometry(1000, 2000),
            &geometry(1005, 2045),
            SVType::Deletion
        ));

        // Right-anchored types don't add the alignment length
        assert!(!pairs_disagree(
            &geometry(1000, 2000),
            &geometry(1045, 2045),
            SVType::Duplication
        ));

        // Inversion pairs with disjoint spans
        assert!(pairs_disagree(
            &geometry(1000, 1010),
            &geometry(1020, 1030),
            SVType::Inversion5to5
        ));

        // Translocation mate side is compared on the mate position only
        assert!(pairs_disagree(
            &geometry(1000, 5000),
            &geometry(1010, 4940),
            SVType::Translocation5to5
        ));
        assert!(!pairs_disagree(
            &geometry(1000, 5000),
            &geometry(1010, 4960),
            SVType::Translocation5to5
        ));
    }

    #[test]
    fn test_seed_skip() {
        // Duplication-oriented pair treated as a deletion implies an empty interval
        let pe = get_test_pe_evidence(1000, 995);
        let evidence = [pe];
        let model = PairedEndClusterModel::new(evidence.iter().collect(), SVType::Deletion, 50);
        assert!(model.seed_clique(0).is_none());
    }

    #[test]
    fn test_translocation_cluster() {
        let evidence = [(1000, 5000), (1050, 5080), (1150, 5100)]
            .into_iter()
            .map(|(pos, mpos)| {
                let mut pe = get_test_pe_evidence(pos, mpos);
                pe.mtid = 1;
                pe.flag = 0;
                pe.alen = 100;
                pe.malen = 100;
                pe.max_normal_isize = 300;
                pe
            })
            .collect::<Vec<_>>();
        assert!(
            evidence
                .iter()
                .all(|x| x.get_sv_type() == SVType::Translocation3to3)
        );

        let calls = cluster_pairs(&evidence, SVType::Translocation3to3, 300);
        assert_eq!(calls.len(), 1);
        let (sv, members) = &calls[0];
        assert_eq!(members, &vec![0, 1, 2]);
        assert_eq!((sv.chrom_index, sv.chrom2_index), (0, 1));
        assert_eq!((sv.start, sv.end), (1251, 5201));
        assert_eq!(sv.cipos_high, 50);
    }

    #[test]
    fn test_median_map_quality() {
        assert_eq!(get_median_map_quality([60, 20, 40].into_iter()), Some(40));
        assert_eq!(get_median_map_quality([60, 20, 40, 30].into_iter()), Some(30));
        assert_eq!(get_median_map_quality(std::iter::empty()), None);
    }
}
