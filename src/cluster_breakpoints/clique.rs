use std::collections::BTreeSet;

use super::ClusterModel;
use super::edge_graph::Edge;
use crate::log_utils::debug_msg;
use crate::sv_record::StructuralVariantRecord;

/// An SV call together with the evidence vertices supporting it
#[derive(Debug)]
pub struct CliqueCall {
    pub sv: StructuralVariantRecord,

    /// Supporting evidence vertices in ascending order
    pub members: Vec<usize>,
}

/// Find a large clique of consistent evidence in one evidence graph component
///
/// This is a greedy approximation rather than a maximum clique search. The clique is seeded from
/// the source vertex of the lowest weight edge, then repeatedly extended by the first vertex
/// adjacent to the clique in edge order which the model accepts. Edges are ordered by weight, then
/// by source and target index. A vertex rejected by the model is never considered again for this
/// component.
///
/// Returns the SV call supported by the clique if the clique has at least two members and the model
/// accepts it as an SV.
///
pub fn search_clique<M: ClusterModel>(model: &M, mut edges: Vec<Edge>) -> Option<CliqueCall> {
    let debug = false;

    edges.sort_unstable();

    let seed = edges.first()?.source;
    let mut state = model.seed_clique(seed)?;

    let mut clique = BTreeSet::from([seed]);
    let mut incompatible = BTreeSet::new();

    loop {
        let mut is_clique_extended = false;
        for edge in edges.iter() {
            let v = match (clique.contains(&edge.source), clique.contains(&edge.target)) {
                (false, true) => edge.source,
                (true, false) => edge.target,
                _ => continue,
            };
            if incompatible.contains(&v) {
                continue;
            }
            match model.extend_clique(&state, v) {
                Some(new_state) => {
                    state = new_state;
                    clique.insert(v);
                    is_clique_extended = true;
                    break;
                }
                None => {
                    incompatible.insert(v);
                }
            }
        }
        if !is_clique_extended {
            break;
        }
    }

    debug_msg!(
        debug,
        "search_clique: component edges: {} clique size: {} incompatible vertices: {}",
        edges.len(),
        clique.len(),
        incompatible.len()
    );

    if clique.len() < 2 {
        return None;
    }

    let sv = model.make_sv_record(&state, &clique)?;
    Some(CliqueCall {
        sv,
        members: clique.into_iter().collect(),
    })
}
