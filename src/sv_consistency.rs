//! Breakpoint consistency rules for paired-end evidence clusters
//!
//! A cluster of read pairs implies a consensus breakpoint interval, together with a 'wiggle'
//! value describing how much slack is left under the pair insert size bounds after all pairs in the
//! cluster have been reconciled. Each SV type has its own geometry, so the seed and update rules
//! differ by type, and so does the sign convention of the wiggle.
//!

use crate::evidence::PairedEndEvidence;
use crate::sv_type::SVType;

/// Consensus breakpoint state of a paired-end evidence cluster
///
/// Coordinates are 0-indexed.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BreakpointConsensus {
    pub start: i64,
    pub end: i64,
    pub wiggle: i64,
}

/// Get the consensus state implied by a single seed read pair
///
pub fn init_consensus(pe: &PairedEndEvidence, sv_type: SVType) -> BreakpointConsensus {
    if let Some(orientation) = sv_type.translocation_orientation() {
        let (start, end) = if orientation % 2 == 0 {
            let end = if orientation >= 2 {
                pe.mpos
            } else {
                pe.mpos + pe.malen
            };
            (pe.pos + pe.alen, end)
        } else {
            let end = if orientation >= 2 {
                pe.mpos + pe.malen
            } else {
                pe.mpos
            };
            (pe.pos, end)
        };
        return BreakpointConsensus {
            start,
            end,
            wiggle: pe.max_normal_isize,
        };
    }

    match sv_type {
        SVType::Inversion3to3 => BreakpointConsensus {
            start: pe.mpos + pe.malen,
            end: pe.pos + pe.alen,
            wiggle: pe.max_normal_isize - std::cmp::max(pe.alen, pe.malen),
        },
        SVType::Inversion5to5 => BreakpointConsensus {
            start: pe.mpos,
            end: pe.pos,
            wiggle: pe.max_normal_isize - std::cmp::max(pe.alen, pe.malen),
        },
        SVType::Deletion => BreakpointConsensus {
            start: pe.mpos + pe.malen,
            end: pe.pos,
            wiggle: -pe.max_normal_isize,
        },
        SVType::Duplication => BreakpointConsensus {
            start: pe.mpos,
            end: pe.pos + pe.alen,
            wiggle: pe.max_normal_isize,
        },
        _ => unreachable!("Unexpected translocation type: {sv_type:?}"),
    }
}

fn update_translocation(
    pe: &PairedEndEvidence,
    orientation: u8,
    c: &BreakpointConsensus,
) -> Option<BreakpointConsensus> {
    use std::cmp::{max, min};

    let mut wiggle = c.wiggle;
    let (start, end) = if orientation % 2 == 0 {
        let start = max(c.start, pe.pos + pe.alen);
        wiggle -= start - c.start;
        let end = if orientation >= 2 {
            let end = min(c.end, pe.mpos);
            wiggle -= c.end - end;
            end
        } else {
            let end = max(c.end, pe.mpos + pe.malen);
            wiggle -= end - c.end;
            end
        };
        (start, end)
    } else {
        let start = min(c.start, pe.pos);
        wiggle -= c.start - start;
        let end = if orientation >= 2 {
            let end = max(c.end, pe.mpos + pe.malen);
            wiggle -= end - c.end;
            end
        } else {
            let end = min(c.end, pe.mpos);
            wiggle -= c.end - end;
            end
        };
        (start, end)
    };

    if wiggle > 0 {
        Some(BreakpointConsensus { start, end, wiggle })
    } else {
        None
    }
}

fn update_inversion(
    pe: &PairedEndEvidence,
    is_left_anchored: bool,
    c: &BreakpointConsensus,
) -> Option<BreakpointConsensus> {
    use std::cmp::{max, min};

    let isize = pe.max_normal_isize;
    let (start, end, wiggle, wiggle_change) = if is_left_anchored {
        let start = max(c.start, pe.mpos + pe.malen);
        let end = max(c.end, pe.pos + pe.alen);
        let wiggle = min(isize - (start - pe.mpos), isize - (end - pe.pos));
        let wiggle_change = c.wiggle - max(start - c.start, end - c.end);
        (start, end, wiggle, wiggle_change)
    } else {
        let start = min(c.start, pe.mpos);
        let end = min(c.end, pe.pos);
        let wiggle = min(
            isize - (pe.mpos + pe.malen - start),
            isize - (pe.pos + pe.alen - end),
        );
        let wiggle_change = c.wiggle - max(c.start - start, c.end - end);
        (start, end, wiggle, wiggle_change)
    };
    let wiggle = min(wiggle, wiggle_change);

    if start < end && wiggle >= 0 {
        Some(BreakpointConsensus { start, end, wiggle })
    } else {
        None
    }
}

fn update_deletion(pe: &PairedEndEvidence, c: &BreakpointConsensus) -> Option<BreakpointConsensus> {
    let start = std::cmp::max(c.start, pe.mpos + pe.malen);
    let end = std::cmp::min(c.end, pe.pos);
    let wiggle = pe.pos + pe.alen - pe.mpos - pe.max_normal_isize - (end - start);
    let wiggle_change = c.wiggle + (c.end - c.start) - (end - start);
    let wiggle = std::cmp::max(wiggle, wiggle_change);

    if start < end && wiggle <= 0 {
        Some(BreakpointConsensus { start, end, wiggle })
    } else {
        None
    }
}

fn update_duplication(
    pe: &PairedEndEvidence,
    c: &BreakpointConsensus,
) -> Option<BreakpointConsensus> {
    let start = std::cmp::min(c.start, pe.mpos);
    let end = std::cmp::max(c.end, pe.pos + pe.alen);
    let wiggle = pe.pos - (pe.mpos + pe.malen) + pe.max_normal_isize - (end - start);
    let wiggle_change = c.wiggle - ((end - start) - (c.end - c.start));
    let wiggle = std::cmp::min(wiggle, wiggle_change);

    if start < end && wiggle >= 0 {
        Some(BreakpointConsensus { start, end, wiggle })
    } else {
        None
    }
}

/// Attempt to add a read pair to a cluster's consensus breakpoint
///
/// Returns the tightened consensus if the read pair is consistent with the cluster, or None if it
/// is not. The input consensus is never modified.
///
pub fn update_consensus(
    pe: &PairedEndEvidence,
    sv_type: SVType,
    consensus: &BreakpointConsensus,
) -> Option<BreakpointConsensus> {
    if let Some(orientation) = sv_type.translocation_orientation() {
        return update_translocation(pe, orientation, consensus);
    }

    match sv_type {
        SVType::Inversion3to3 => update_inversion(pe, true, consensus),
        SVType::Inversion5to5 => update_inversion(pe, false, consensus),
        SVType::Deletion => update_deletion(pe, consensus),
        SVType::Duplication => update_duplication(pe, consensus),
        _ => unreachable!("Unexpected translocation type: {sv_type:?}"),
    }
}

/// Final check that a consensus breakpoint describes a usable SV
///
/// Translocation breakends are on different chromosomes so there is no interval to check.
///
pub fn is_valid_sv_size(consensus: &BreakpointConsensus, sv_type: SVType) -> bool {
    sv_type.is_translocation() || consensus.start < consensus.end
}
