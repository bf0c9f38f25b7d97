use serde::{Deserialize, Serialize};

/// SV type codes used to select breakpoint consistency rules
///
/// The integer codes are stable and match the codes exchanged with upstream evidence extraction.
/// Code 4 is reserved for insertions, which are not clustered from discordant evidence.
///
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    strum::EnumIter,
    strum::FromRepr,
)]
#[repr(u8)]
pub enum SVType {
    /// Inversion with both reads anchored on the left side of their breakends
    Inversion3to3 = 0,
    /// Inversion with both reads anchored on the right side of their breakends
    Inversion5to5 = 1,
    Deletion = 2,
    Duplication = 3,
    Translocation3to3 = 5,
    Translocation5to5 = 6,
    Translocation3to5 = 7,
    Translocation5to3 = 8,
}

/// Code offset of the first translocation type
const TRANSLOCATION_CODE_OFFSET: u8 = 5;

impl SVType {
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn is_translocation(&self) -> bool {
        self.code() >= TRANSLOCATION_CODE_OFFSET
    }

    /// Breakend orientation code of a translocation, in [0,4)
    ///
    /// Even codes have the read anchored to the left of the first breakend, codes of 2 and above
    /// have the mate in the opposite orientation of the read.
    ///
    pub fn translocation_orientation(&self) -> Option<u8> {
        if self.is_translocation() {
            Some(self.code() - TRANSLOCATION_CODE_OFFSET)
        } else {
            None
        }
    }

    /// VCF-style SV type label
    pub fn vcf_label(&self) -> &'static str {
        match self {
            SVType::Inversion3to3 | SVType::Inversion5to5 => "INV",
            SVType::Deletion => "DEL",
            SVType::Duplication => "DUP",
            _ => "BND",
        }
    }
}

/// Lower breakpoint coordinate used to order and window paired-end evidence
///
pub fn min_coord(pos: i64, mate_pos: i64, sv_type: SVType) -> i64 {
    if sv_type.is_translocation() {
        pos
    } else {
        std::cmp::min(pos, mate_pos)
    }
}

/// Upper breakpoint coordinate used to order and window paired-end evidence
///
pub fn max_coord(pos: i64, mate_pos: i64, sv_type: SVType) -> i64 {
    if sv_type.is_translocation() {
        mate_pos
    } else {
        std::cmp::max(pos, mate_pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_sv_type_codes() {
        assert_eq!(SVType::from_repr(2), Some(SVType::Deletion));
        assert_eq!(SVType::from_repr(4), None);
        assert_eq!(SVType::from_repr(9), None);

        for sv_type in SVType::iter() {
            assert_eq!(SVType::from_repr(sv_type.code()), Some(sv_type));
        }
    }

    #[test]
    fn test_translocation_orientation() {
        assert_eq!(SVType::Deletion.translocation_orientation(), None);
        assert_eq!(SVType::Translocation3to3.translocation_orientation(), Some(0));
        assert_eq!(SVType::Translocation5to3.translocation_orientation(), Some(3));
    }

    #[test]
    fn test_vcf_label() {
        assert_eq!(SVType::Inversion5to5.vcf_label(), "INV");
        assert_eq!(SVType::Duplication.vcf_label(), "DUP");
        assert_eq!(SVType::Translocation3to5.vcf_label(), "BND");
    }

    #[test]
    fn test_min_max_coord() {
        assert_eq!(min_coord(200, 100, SVType::Deletion), 100);
        assert_eq!(max_coord(200, 100, SVType::Deletion), 200);
        assert_eq!(min_coord(200, 100, SVType::Translocation3to3), 200);
        assert_eq!(max_coord(200, 100, SVType::Translocation3to3), 100);
    }
}
