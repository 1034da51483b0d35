use crate::types::{ComposedGraph, EdgeData};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;
use std::sync::Arc;

/// Incoming and outgoing citations per publication of a composed graph
///
/// Nodes carry the publication id, edges the position of the citation in the
/// composed graph so queries answer in composition order.
pub struct NeighborIndex {
    graph: Arc<ComposedGraph>,
    topology: DiGraph<String, usize>,
    node_index: HashMap<String, NodeIndex>,
}

impl NeighborIndex {
    /// One pass over the nodes, one over the edges.
    pub fn build(graph: Arc<ComposedGraph>) -> Self {
        let mut topology = DiGraph::with_capacity(graph.node_count(), graph.edge_count());
        let mut node_index = HashMap::with_capacity(graph.node_count());

        for node in graph.nodes() {
            let idx = topology.add_node(node.id.clone());
            node_index.insert(node.id.clone(), idx);
        }

        for (position, element) in graph.elements().iter().enumerate() {
            let Some(edge) = element.as_edge() else {
                continue;
            };
            // Composed graphs never hold dangling edges.
            if let (Some(&from), Some(&to)) =
                (node_index.get(&edge.source), node_index.get(&edge.target))
            {
                topology.add_edge(from, to, position);
            }
        }

        log::debug!(
            "Built neighbor index: {} nodes, {} edges",
            topology.node_count(),
            topology.edge_count()
        );

        Self {
            graph,
            topology,
            node_index,
        }
    }

    pub fn empty() -> Self {
        Self::build(Arc::new(ComposedGraph::empty()))
    }

    /// Graph this index was built over
    pub fn graph(&self) -> &Arc<ComposedGraph> {
        &self.graph
    }

    /// Citations made by `node_id` (it is the source)
    pub fn outgoing(&self, node_id: &str) -> Vec<&EdgeData> {
        self.edges_directed(node_id, Direction::Outgoing)
    }

    /// Citations received by `node_id` (it is the target)
    pub fn incoming(&self, node_id: &str) -> Vec<&EdgeData> {
        self.edges_directed(node_id, Direction::Incoming)
    }

    fn edges_directed(&self, node_id: &str, direction: Direction) -> Vec<&EdgeData> {
        let Some(&idx) = self.node_index.get(node_id) else {
            return Vec::new();
        };

        let mut positions: Vec<usize> = self
            .topology
            .edges_directed(idx, direction)
            .map(|e| *e.weight())
            .collect();
        // petgraph walks adjacency lists newest-first.
        positions.sort_unstable();

        positions
            .into_iter()
            .filter_map(|position| self.graph.elements()[position].as_edge())
            .collect()
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.node_index.contains_key(node_id)
    }

    pub fn node_count(&self) -> usize {
        self.topology.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.topology.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::{edge, node};

    fn index() -> NeighborIndex {
        let elements = vec![
            node("n", Some("Santé")),
            node("m", None),
            node("k", None),
            edge("n->m", "n", "m"),
            edge("k->n", "k", "n"),
            edge("n->k", "n", "k"),
        ];
        NeighborIndex::build(Arc::new(ComposedGraph::from_elements(&elements).unwrap()))
    }

    fn ids(edges: Vec<&EdgeData>) -> Vec<&str> {
        edges.into_iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn splits_edges_by_direction_in_composition_order() {
        let index = index();
        assert_eq!(ids(index.outgoing("n")), vec!["n->m", "n->k"]);
        assert_eq!(ids(index.incoming("n")), vec!["k->n"]);
        assert_eq!(ids(index.incoming("k")), vec!["n->k"]);
        assert_eq!(ids(index.outgoing("k")), vec!["k->n"]);
    }

    #[test]
    fn unknown_node_has_no_neighbors() {
        let index = index();
        assert!(index.outgoing("missing").is_empty());
        assert!(index.incoming("missing").is_empty());
        assert!(!index.contains("missing"));
    }

    #[test]
    fn counts_match_graph() {
        let index = index();
        assert_eq!(index.node_count(), 3);
        assert_eq!(index.edge_count(), 3);
        assert_eq!(NeighborIndex::empty().node_count(), 0);
    }
}
