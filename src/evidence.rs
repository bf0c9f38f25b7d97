//! Discordant SV evidence records
//!
//! These are produced by upstream alignment scanning and are treated as read-only input to
//! breakpoint clustering.
//!

use serde::{Deserialize, Serialize};

use crate::sv_type::{SVType, max_coord, min_coord};

/// SAM flag: read is reverse-complemented
const FLAG_REVERSE: u16 = 0x10;

/// SAM flag: mate is reverse-complemented
const FLAG_MATE_REVERSE: u16 = 0x20;

/// Reduced representation of one discordant read pair
///
/// Intra-chromosomal pairs are represented by their downstream read, so that `pos >= mpos`.
///
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PairedEndEvidence {
    /// Chromosome index of the read
    pub tid: usize,
    pub pos: i64,

    /// Chromosome index of the mate
    pub mtid: usize,
    pub mpos: i64,

    /// Reference alignment length of the read
    pub alen: i64,

    /// Reference alignment length of the mate
    pub malen: i64,

    /// Median insert size of the read's library
    pub median: i64,

    /// Median absolute deviation of the library insert size
    pub mad: i64,

    /// Largest insert size still considered to be a normal (non-SV) pair in the read's library
    pub max_normal_isize: i64,

    pub flag: u16,

    /// Pair mapping quality summary
    pub map_quality: u8,
}

impl PairedEndEvidence {
    fn is_fwd_strand(&self) -> bool {
        (self.flag & FLAG_REVERSE) == 0
    }

    fn is_mate_fwd_strand(&self) -> bool {
        (self.flag & FLAG_MATE_REVERSE) == 0
    }

    /// Classify the SV type implied by the pair orientation
    ///
    pub fn get_sv_type(&self) -> SVType {
        let is_fwd = self.is_fwd_strand();
        let is_mate_fwd = self.is_mate_fwd_strand();
        if self.tid != self.mtid {
            match (is_fwd, is_mate_fwd) {
                (true, true) => SVType::Translocation3to3,
                (false, false) => SVType::Translocation5to5,
                (true, false) => SVType::Translocation3to5,
                (false, true) => SVType::Translocation5to3,
            }
        } else {
            match (is_fwd, is_mate_fwd) {
                (true, true) => SVType::Inversion3to3,
                (false, false) => SVType::Inversion5to5,
                (true, false) => {
                    if self.pos < self.mpos {
                        SVType::Deletion
                    } else {
                        SVType::Duplication
                    }
                }
                (false, true) => {
                    if self.pos > self.mpos {
                        SVType::Deletion
                    } else {
                        SVType::Duplication
                    }
                }
            }
        }
    }

    /// Return true if this is an intra-chromosomal pair represented by its upstream read
    ///
    pub fn is_upstream_read_form(&self) -> bool {
        self.tid == self.mtid && self.pos < self.mpos
    }

    /// Convert an intra-chromosomal pair to be represented by its downstream read
    ///
    /// Breakpoint consistency rules assume `pos >= mpos` for intra-chromosomal pairs, so the read
    /// and mate alignments and strands are exchanged for pairs given from the upstream read.
    ///
    pub fn to_downstream_read_form(&mut self) {
        if !self.is_upstream_read_form() {
            return;
        }
        std::mem::swap(&mut self.pos, &mut self.mpos);
        std::mem::swap(&mut self.alen, &mut self.malen);

        let strand_flags = self.flag & (FLAG_REVERSE | FLAG_MATE_REVERSE);
        let mut swapped_strand_flags = 0;
        if strand_flags & FLAG_REVERSE != 0 {
            swapped_strand_flags |= FLAG_MATE_REVERSE;
        }
        if strand_flags & FLAG_MATE_REVERSE != 0 {
            swapped_strand_flags |= FLAG_REVERSE;
        }
        self.flag = (self.flag & !(FLAG_REVERSE | FLAG_MATE_REVERSE)) | swapped_strand_flags;
    }

    pub fn min_coord(&self, sv_type: SVType) -> i64 {
        min_coord(self.pos, self.mpos, sv_type)
    }

    pub fn max_coord(&self, sv_type: SVType) -> i64 {
        max_coord(self.pos, self.mpos, sv_type)
    }

    /// Key used to put paired-end evidence into clustering order
    ///
    fn sort_key(&self) -> (usize, i64, i64, i64) {
        if self.tid == self.mtid {
            (
                self.tid,
                std::cmp::min(self.pos, self.mpos),
                std::cmp::max(self.pos, self.mpos),
                self.max_normal_isize,
            )
        } else {
            (self.tid, self.pos, self.mpos, self.max_normal_isize)
        }
    }
}

/// A split read alignment describing both breakends of a candidate SV
///
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SplitReadEvidence {
    pub chrom_index: usize,
    pub pos: i64,
    pub chrom2_index: usize,
    pub pos2: i64,

    /// Length of sequence inserted between the two breakends
    pub ins_len: i64,

    pub sv_type: SVType,
}

impl SplitReadEvidence {
    fn sort_key(&self) -> (usize, i64, usize, i64) {
        (self.chrom_index, self.pos, self.chrom2_index, self.pos2)
    }
}

/// Convert all intra-chromosomal pairs to downstream read form
///
/// Returns the number of converted pairs.
///
pub fn normalize_paired_end_evidence(evidence: &mut [PairedEndEvidence]) -> usize {
    let mut count = 0;
    for pe in evidence.iter_mut().filter(|x| x.is_upstream_read_form()) {
        pe.to_downstream_read_form();
        count += 1;
    }
    count
}

/// Sort paired-end evidence into the order required for breakpoint clustering
///
/// Records are ordered by chromosome, then by their lower and upper breakpoint coordinates.
///
pub fn sort_paired_end_evidence(evidence: &mut [PairedEndEvidence]) {
    evidence.sort_by_key(|x| x.sort_key());
}

/// Sort split-read evidence into the order required for breakpoint clustering
///
pub fn sort_split_read_evidence(evidence: &mut [SplitReadEvidence]) {
    evidence.sort_by_key(|x| x.sort_key());
}

#[cfg(test)]
pub mod test_utils {
    use super::*;

    pub fn get_test_pe_evidence(pos: i64, mpos: i64) -> PairedEndEvidence {
        PairedEndEvidence {
            tid: 0,
            pos,
            mtid: 0,
            mpos,
            alen: 10,
            malen: 10,
            median: 300,
            mad: 30,
            max_normal_isize: 50,
            flag: FLAG_REVERSE,
            map_quality: 60,
        }
    }

    pub fn get_test_sr_evidence(pos: i64, pos2: i64) -> SplitReadEvidence {
        SplitReadEvidence {
            chrom_index: 0,
            pos,
            chrom2_index: 0,
            pos2,
            ins_len: 0,
            sv_type: SVType::Deletion,
        }
    }
}
