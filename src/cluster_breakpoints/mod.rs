//! Cluster discordant SV evidence into SV calls
//!
//! Evidence from one cluster unit (one chromosome and SV type) is streamed in sorted order to build
//! a graph of compatible evidence pairs. Each connected component of this graph is then reduced to
//! at most one SV call by greedily growing a clique of mutually consistent evidence.
//!

mod clique;
mod component_builder;
mod edge_graph;
mod paired_end;
mod split_read;

use std::collections::BTreeSet;

pub use clique::{CliqueCall, search_clique};
pub use component_builder::{ComponentBuildStats, build_components};
pub use paired_end::PairedEndClusterModel;
pub use split_read::SplitReadClusterModel;

use self::edge_graph::EdgeWeight;
use crate::sv_record::StructuralVariantRecord;

/// Evidence-type specific rules for building and clustering the evidence graph of one cluster unit
///
/// Vertices are indices into the unit's evidence, which is sorted on its primary breakpoint
/// position.
///
pub trait ClusterModel {
    /// Consensus breakpoint state of a clique under construction
    type CliqueState;

    fn vertex_count(&self) -> usize;

    /// Return true if vertex `j` is far enough downstream of vertex `i` that neither `j` nor any
    /// vertex after it can be connected to `i`
    ///
    fn is_past_window(&self, i: usize, j: usize) -> bool;

    /// Return the weight of the edge between `i` and `j`, or None if they can't support the same SV
    ///
    /// Lower weights indicate more similar breakpoints.
    ///
    fn get_edge_weight(&self, i: usize, j: usize) -> Option<EdgeWeight>;

    /// Start a new clique from vertex `v`, or return None if `v` can't seed an SV
    fn seed_clique(&self, v: usize) -> Option<Self::CliqueState>;

    /// Return the clique state after adding vertex `v`, or None if `v` is inconsistent with the clique
    fn extend_clique(&self, state: &Self::CliqueState, v: usize) -> Option<Self::CliqueState>;

    /// Convert a finished clique into an SV record, or None if the clique does not describe a
    /// valid SV
    ///
    /// The record id is left for the caller to set.
    ///
    fn make_sv_record(
        &self,
        state: &Self::CliqueState,
        members: &BTreeSet<usize>,
    ) -> Option<StructuralVariantRecord>;
}
