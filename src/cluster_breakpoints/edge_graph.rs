use std::collections::BTreeMap;

pub type EdgeWeight = u32;

/// Evidence graph edge between two vertices of a cluster unit
///
/// Vertices are indices into the evidence records of the cluster unit. Field order defines the
/// derived ordering, so edges sort by weight first, then by source and target index.
///
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Edge {
    pub weight: EdgeWeight,
    pub source: usize,
    pub target: usize,
}

impl Edge {
    pub fn new(source: usize, target: usize, weight: EdgeWeight) -> Self {
        Self {
            weight,
            source,
            target,
        }
    }
}

pub type ComponentLabel = u32;

/// Edge lists of all open components, keyed on component label
///
/// Each edge list is capped at `max_component_edges`. Edges beyond the cap are dropped, so very
/// dense components are clustered from only their earliest edges.
///
pub struct ComponentEdgeMap {
    max_component_edges: usize,
    data: BTreeMap<ComponentLabel, Vec<Edge>>,

    /// Labels of components which have dropped at least one edge
    capped_labels: Vec<ComponentLabel>,
}

impl ComponentEdgeMap {
    pub fn new(max_component_edges: usize) -> Self {
        Self {
            max_component_edges,
            data: BTreeMap::new(),
            capped_labels: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[cfg(test)]
    pub fn edge_count(&self, label: ComponentLabel) -> usize {
        self.data.get(&label).map_or(0, |x| x.len())
    }

    fn mark_capped(&mut self, label: ComponentLabel) {
        if !self.capped_labels.contains(&label) {
            self.capped_labels.push(label);
        }
    }

    /// Add a new edge to the component, unless the component is already at the edge cap
    ///
    pub fn add_edge(&mut self, label: ComponentLabel, edge: Edge) {
        let edges = self.data.entry(label).or_default();
        if edges.len() < self.max_component_edges {
            edges.push(edge);
        } else {
            self.mark_capped(label);
        }
    }

    /// Merge the edges of component `other` into component `label`, removing `other`
    ///
    pub fn merge(&mut self, label: ComponentLabel, other: ComponentLabel) {
        let mut other_edges = self.data.remove(&other).unwrap_or_default();
        let edges = self.data.entry(label).or_default();
        edges.append(&mut other_edges);
        let is_capped = edges.len() > self.max_component_edges;
        if is_capped {
            edges.truncate(self.max_component_edges);
        }
        if is_capped || self.capped_labels.contains(&other) {
            self.mark_capped(label);
        }
    }

    /// Remove and return all components
    ///
    /// Returns a 2-tuple of (1) each component edge list in label order (2) the number of returned
    /// components that reached the edge cap
    ///
    pub fn drain(&mut self) -> (Vec<Vec<Edge>>, usize) {
        let data = std::mem::take(&mut self.data);
        let capped_count = self
            .capped_labels
            .drain(..)
            .filter(|x| data.contains_key(x))
            .count();
        (data.into_values().collect(), capped_count)
    }
}
