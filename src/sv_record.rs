//! SV calls produced by breakpoint clustering, and their link back to the supporting evidence
//!

use serde::{Deserialize, Serialize};

use crate::cluster_breakpoints::CliqueCall;
use crate::sv_type::SVType;

/// A single SV call from one cluster of evidence
///
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct StructuralVariantRecord {
    /// Unique call id
    pub id: usize,

    pub sv_type: SVType,

    pub chrom_index: usize,
    pub start: i64,

    pub chrom2_index: usize,
    pub end: i64,

    /// Confidence interval around `start`, given as offsets from `start`
    pub cipos_low: i64,
    pub cipos_high: i64,

    /// Confidence interval around `end`, given as offsets from `end`
    pub ciend_low: i64,
    pub ciend_high: i64,

    /// Number of supporting read pairs
    pub pe_support: usize,

    /// Median mapping quality of supporting read pairs
    pub pe_map_quality: Option<u8>,

    /// Number of supporting split reads
    pub sr_support: usize,

    pub ins_len: i64,
    pub hom_len: i64,

    /// True if the breakpoint location is known to base-pair resolution
    pub precise: bool,
}

impl StructuralVariantRecord {
    /// Create a call with the given breakends, no support and an empty confidence interval
    ///
    pub fn new(
        sv_type: SVType,
        chrom_index: usize,
        start: i64,
        chrom2_index: usize,
        end: i64,
    ) -> Self {
        Self {
            id: 0,
            sv_type,
            chrom_index,
            start,
            chrom2_index,
            end,
            cipos_low: 0,
            cipos_high: 0,
            ciend_low: 0,
            ciend_high: 0,
            pe_support: 0,
            pe_map_quality: None,
            sr_support: 0,
            ins_len: 0,
            hom_len: 0,
            precise: false,
        }
    }

    /// Return true if both confidence intervals include their breakend position
    ///
    pub fn is_ci_bracketing(&self) -> bool {
        self.cipos_low <= 0 && self.cipos_high >= 0 && self.ciend_low <= 0 && self.ciend_high >= 0
    }
}

/// Side table linking each evidence record to the SV call it supports
///
/// Each evidence record may be assigned to at most one call.
///
pub struct SvIdTable {
    data: Vec<Option<usize>>,
}

impl SvIdTable {
    pub fn new(evidence_count: usize) -> Self {
        Self {
            data: vec![None; evidence_count],
        }
    }

    pub fn get(&self, evidence_index: usize) -> Option<usize> {
        self.data[evidence_index]
    }

    pub fn assign(&mut self, evidence_index: usize, sv_id: usize) {
        let x = &mut self.data[evidence_index];
        debug_assert!(
            x.is_none(),
            "Evidence record {evidence_index} assigned to SV {sv_id} was already assigned to SV {}",
            x.unwrap_or_default()
        );
        *x = Some(sv_id);
    }

    pub fn assigned_count(&self) -> usize {
        self.data.iter().filter(|x| x.is_some()).count()
    }

    #[cfg(test)]
    pub fn as_slice(&self) -> &[Option<usize>] {
        &self.data
    }
}

/// Append clique calls to the output SV list, and record the SV id of their supporting evidence
///
/// SV ids from each cluster unit are only unique within the unit, so every call is given a new id
/// from its position in the output list.
///
pub fn emit_sv_calls(
    calls: Vec<CliqueCall>,
    svs: &mut Vec<StructuralVariantRecord>,
    sv_ids: &mut SvIdTable,
) {
    for call in calls {
        let mut sv = call.sv;
        sv.id = svs.len();
        for evidence_index in call.members {
            sv_ids.assign(evidence_index, sv.id);
        }
        svs.push(sv);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_call(members: Vec<usize>, local_id: usize) -> CliqueCall {
        let mut sv = StructuralVariantRecord::new(SVType::Deletion, 0, 100, 0, 200);
        sv.id = local_id;
        sv.pe_support = members.len();
        CliqueCall { sv, members }
    }

    #[test]
    fn test_emit_sv_calls() {
        let mut svs = Vec::new();
        let mut sv_ids = SvIdTable::new(6);

        emit_sv_calls(
            vec![get_test_call(vec![0, 2], 0), get_test_call(vec![3, 4], 1)],
            &mut svs,
            &mut sv_ids,
        );

        // Unit-local ids restart from zero
        emit_sv_calls(vec![get_test_call(vec![5, 1], 0)], &mut svs, &mut sv_ids);

        assert_eq!(svs.iter().map(|x| x.id).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(
            sv_ids.as_slice(),
            &[Some(0), Some(2), Some(0), Some(1), Some(1), Some(2)]
        );
        assert_eq!(sv_ids.assigned_count(), 6);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn test_double_assignment() {
        let mut sv_ids = SvIdTable::new(2);
        sv_ids.assign(1, 0);
        sv_ids.assign(1, 1);
    }

    #[test]
    fn test_ci_bracketing() {
        let mut sv = StructuralVariantRecord::new(SVType::Deletion, 0, 100, 0, 200);
        assert!(sv.is_ci_bracketing());
        sv.cipos_low = 3;
        assert!(!sv.is_ci_bracketing());
    }
}
