use std::collections::BTreeSet;

use log::warn;

use super::ClusterModel;
use super::edge_graph::EdgeWeight;
use crate::evidence::SplitReadEvidence;
use crate::int_range::IntRange;
use crate::sv_record::StructuralVariantRecord;
use crate::sv_type::SVType;

/// Breakpoint clustering rules for split-read evidence
///
/// Split reads describe both breakends directly, so two split reads are compatible when both of
/// their breakend positions are close, and a clique is consistent while the range of each breakend
/// position over all clique members stays below the maximum breakpoint distance.
///
pub struct SplitReadClusterModel<'a> {
    evidence: Vec<&'a SplitReadEvidence>,
    sv_type: SVType,
    max_breakpoint_distance: i64,
}

impl<'a> SplitReadClusterModel<'a> {
    /// `evidence` must be sorted by `pos`
    pub fn new(
        evidence: Vec<&'a SplitReadEvidence>,
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

pub struct SplitReadCliqueState {
    seed: usize,

    /// Range of all member breakend1 positions
    pos_range: IntRange,

    /// Range of all member breakend2 positions
    pos2_range: IntRange,

    pos_sum: i64,
    pos2_sum: i64,
    ins_len_sum: i64,
}

impl ClusterModel for SplitReadClusterModel<'_> {
    type CliqueState = SplitReadCliqueState;

    fn vertex_count(&self) -> usize {
        self.evidence.len()
    }

    fn is_past_window(&self, i: usize, j: usize) -> bool {
        self.evidence[j].pos - self.evidence[i].pos > self.max_breakpoint_distance
    }

    fn get_edge_weight(&self, i: usize, j: usize) -> Option<EdgeWeight> {
        let sr1 = self.evidence[i];
        let sr2 = self.evidence[j];
        if sr1.chrom2_index != sr2.chrom2_index {
            return None;
        }
        let pos2_dist = (sr2.pos2 - sr1.pos2).abs();
        if pos2_dist >= self.max_breakpoint_distance {
            return None;
        }
        let dist = pos2_dist + (sr2.pos - sr1.pos).abs();
        Some(EdgeWeight::try_from(dist).unwrap_or(EdgeWeight::MAX))
    }

    fn seed_clique(&self, v: usize) -> Option<SplitReadCliqueState> {
        let sr = self.evidence[v];
        Some(SplitReadCliqueState {
            seed: v,
            pos_range: IntRange::from_int(sr.pos),
            pos2_range: IntRange::from_int(sr.pos2),
            pos_sum: sr.pos,
            pos2_sum: sr.pos2,
            ins_len_sum: sr.ins_len,
        })
    }

    fn extend_clique(
        &self,
        state: &SplitReadCliqueState,
        v: usize,
    ) -> Option<SplitReadCliqueState> {
        let sr = self.evidence[v];
        let pos_range = state.pos_range.including_pos(sr.pos);
        let pos2_range = state.pos2_range.including_pos(sr.pos2);
        if pos_range.span() < self.max_breakpoint_distance
            && pos2_range.span() < self.max_breakpoint_distance
        {
            Some(SplitReadCliqueState {
                seed: state.seed,
                pos_range,
                pos2_range,
                pos_sum: state.pos_sum + sr.pos,
                pos2_sum: state.pos2_sum + sr.pos2,
                ins_len_sum: state.ins_len_sum + sr.ins_len,
            })
        } else {
            None
        }
    }

    fn make_sv_record(
        &self,
        state: &SplitReadCliqueState,
        members: &BTreeSet<usize>,
    ) -> Option<StructuralVariantRecord> {
        let seed = self.evidence[state.seed];
        let count = members.len() as i64;
        let start = state.pos_sum.div_euclid(count);
        let end = state.pos2_sum.div_euclid(count);

        if !(state.pos_range.intersect_pos(start) && state.pos2_range.intersect_pos(end)) {
            warn!(
                "Confidence intervals out of bounds: {},{},{}:{},{},{}",
                state.pos_range.start,
                start,
                state.pos_range.last(),
                state.pos2_range.start,
                end,
                state.pos2_range.last()
            );
        }

        let mut sv = StructuralVariantRecord::new(
            self.sv_type,
            seed.chrom_index,
            start,
            seed.chrom2_index,
            end,
        );
        sv.cipos_low = state.pos_range.start - start;
        sv.cipos_high = state.pos_range.last() - start;
        sv.ciend_low = state.pos2_range.start - end;
        sv.ciend_high = state.pos2_range.last() - end;
        sv.sr_support = members.len();
        sv.ins_len = state.ins_len_sum.div_euclid(count);
        sv.precise = true;
        Some(sv)
    }
}
