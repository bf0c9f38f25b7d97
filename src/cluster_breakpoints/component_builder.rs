use log::debug;

use super::ClusterModel;
use super::edge_graph::{ComponentEdgeMap, ComponentLabel, Edge};

#[derive(Debug, Default)]
pub struct ComponentBuildStats {
    /// Total number of components with at least one edge
    pub component_count: usize,

    /// Number of components which dropped edges after reaching the edge cap
    pub capped_component_count: usize,

    /// Number of times the set of open components was flushed
    pub flush_count: usize,
}

/// Hand all open components over to the component processor and reset the edge map
///
fn flush_components(
    edge_map: &mut ComponentEdgeMap,
    stats: &mut ComponentBuildStats,
    process_component: &mut impl FnMut(Vec<Edge>),
) {
    let (components, capped_count) = edge_map.drain();
    debug!(
        "Flushing {} closed evidence components ({} capped)",
        components.len(),
        capped_count
    );
    stats.component_count += components.len();
    stats.capped_component_count += capped_count;
    stats.flush_count += 1;
    for edges in components {
        process_component(edges);
    }
}

/// Build connected components of the evidence graph for one cluster unit
///
/// Evidence is scanned in sorted order, and each vertex is connected to every downstream vertex
/// within the model's window for which the model provides an edge. Every connected component is
/// passed to `process_component` as its list of edges, as soon as the scan has moved far enough
/// that no further vertex could join it. Components are labeled with a flat label array, which
/// is relabeled over the currently open vertex range when two components merge.
///
/// Each component edge list is capped at `max_component_edges`, so dense components can be
/// passed on with only a subset of their edges.
///
/// Vertices which never share an edge with another vertex are not reported.
///
pub fn build_components<M: ClusterModel>(
    model: &M,
    max_component_edges: usize,
    mut process_component: impl FnMut(Vec<Edge>),
) -> ComponentBuildStats {
    let vertex_count = model.vertex_count();

    // Label 0 is reserved for vertices not yet in any component
    let mut labels: Vec<ComponentLabel> = vec![0; vertex_count];
    let mut label_count: ComponentLabel = 0;

    let mut edge_map = ComponentEdgeMap::new(max_component_edges);
    let mut stats = ComponentBuildStats::default();

    // Highest vertex index connected to any edge so far
    let mut last_connected_node = 0;

    // Start of the vertex range which could still hold labels of open components
    let mut last_connected_node_start = 0;

    for i in 0..vertex_count {
        // Nothing before i is connected beyond last_connected_node, so all open components are
        // complete once i passes it
        if i > last_connected_node && !edge_map.is_empty() {
            flush_components(&mut edge_map, &mut stats, &mut process_component);
            last_connected_node_start = last_connected_node;
        }

        for j in (i + 1)..vertex_count {
            if model.is_past_window(i, j) {
                break;
            }
            let Some(weight) = model.get_edge_weight(i, j) else {
                continue;
            };

            last_connected_node = std::cmp::max(last_connected_node, j);

            let label = match (labels[i], labels[j]) {
                (0, 0) => {
                    label_count += 1;
                    labels[i] = label_count;
                    labels[j] = label_count;
                    label_count
                }
                (0, label_j) => {
                    labels[i] = label_j;
                    label_j
                }
                (label_i, 0) => {
                    labels[j] = label_i;
                    label_i
                }
                (label_i, label_j) if label_i == label_j => label_i,
                (label_i, label_j) => {
                    let label = std::cmp::min(label_i, label_j);
                    let other = std::cmp::max(label_i, label_j);
                    for x in labels[last_connected_node_start..=last_connected_node].iter_mut() {
                        if *x == other {
                            *x = label;
                        }
                    }
                    edge_map.merge(label, other);
                    label
                }
            };

            edge_map.add_edge(label, Edge::new(i, j, weight));
        }
    }

    if !edge_map.is_empty() {
        flush_components(&mut edge_map, &mut stats, &mut process_component);
    }

    stats
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::cluster_breakpoints::edge_graph::EdgeWeight;
    use crate::sv_record::StructuralVariantRecord;

    /// Points on a line, connected to all other points within a fixed distance
    struct PointModel {
        positions: Vec<i64>,
        max_dist: i64,
    }

    impl ClusterModel for PointModel {
        type CliqueState = ();

        fn vertex_count(&self) -> usize {
            self.positions.len()
        }

        fn is_past_window(&self, i: usize, j: usize) -> bool {
            self.positions[j] - self.positions[i] > self.max_dist
        }

        fn get_edge_weight(&self, i: usize, j: usize) -> Option<EdgeWeight> {
            Some((self.positions[j] - self.positions[i]) as EdgeWeight)
        }

        fn seed_clique(&self, _v: usize) -> Option<()> {
            Some(())
        }

        fn extend_clique(&self, _state: &(), _v: usize) -> Option<()> {
            Some(())
        }

        fn make_sv_record(
            &self,
            _state: &(),
            _members: &BTreeSet<usize>,
        ) -> Option<StructuralVariantRecord> {
            None
        }
    }

    fn get_component_vertices(model: &PointModel, max_edges: usize) -> Vec<BTreeSet<usize>> {
        let mut components = Vec::new();
        build_components(model, max_edges, |edges| {
            let vertices = edges
                .iter()
                .flat_map(|x| [x.source, x.target])
                .collect::<BTreeSet<_>>();
            components.push(vertices);
        });
        components
    }

    #[test]
    fn test_separate_components() {
        let model = PointModel {
            positions: vec![0, 5, 10, 100, 200, 204],
            max_dist: 10,
        };
        let components = get_component_vertices(&model, 1000);
        assert_eq!(
            components,
            vec![
                BTreeSet::from([0, 1, 2]),
                BTreeSet::from([4, 5]),
            ]
        );
    }

    #[test]
    fn test_component_merge() {
        // Vertex 2 links to vertex 1 only after 0 and 1 have separately linked to other vertices
        struct MergeModel;

        impl ClusterModel for MergeModel {
            type CliqueState = ();

            fn vertex_count(&self) -> usize {
                5
            }

            fn is_past_window(&self, _i: usize, _j: usize) -> bool {
                false
            }

            fn get_edge_weight(&self, i: usize, j: usize) -> Option<EdgeWeight> {
                match (i, j) {
                    (0, 3) | (1, 4) | (3, 4) => Some(1),
                    _ => None,
                }
            }

            fn seed_clique(&self, _v: usize) -> Option<()> {
                Some(())
            }

            fn extend_clique(&self, _state: &(), _v: usize) -> Option<()> {
                Some(())
            }

            fn make_sv_record(
                &self,
                _state: &(),
                _members: &BTreeSet<usize>,
            ) -> Option<StructuralVariantRecord> {
                None
            }
        }

        let mut components = Vec::new();
        let stats = build_components(&MergeModel, 1000, |edges| {
            components.push(edges);
        });
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].len(), 3);
        assert_eq!(stats.component_count, 1);
        assert_eq!(stats.capped_component_count, 0);
    }

    #[test]
    fn test_components_flushed_in_stream() {
        let model = PointModel {
            positions: vec![0, 5, 100, 105, 200, 205],
            max_dist: 10,
        };
        let mut flushed_before_last = 0;
        let stats = build_components(&model, 1000, |edges| {
            if edges.iter().all(|x| x.target < 5) {
                flushed_before_last += 1;
            }
        });
        assert_eq!(stats.component_count, 3);
        assert_eq!(stats.flush_count, 3);
        assert_eq!(flushed_before_last, 2);
    }

    #[test]
    fn test_isolated_vertex() {
        let model = PointModel {
            positions: vec![1000],
            max_dist: 10,
        };
        let stats = build_components(&model, 1000, |_| panic!("Unexpected component"));
        assert_eq!(stats.component_count, 0);
    }

    #[test]
    fn test_edge_cap() {
        let model = PointModel {
            positions: (0..10).collect(),
            max_dist: 100,
        };
        let components = get_component_vertices(&model, 3);
        assert_eq!(components, vec![BTreeSet::from([0, 1, 2, 3])]);
    }
}
