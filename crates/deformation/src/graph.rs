//! Weighted vertex adjacency graph over a triangle mesh.
//!
//! Edges connect vertices that share a face edge and are weighted by the
//! Euclidean distance between their positions at build time. The graph is
//! stored as a compressed adjacency arena: `offsets[v]..offsets[v + 1]`
//! indexes the `(neighbor, weight)` entries of vertex `v`, sorted by
//! neighbor index.

use crate::mesh::MeshStore;

/// Read-only view of a graph with non-negative edge weights.
pub trait WeightedGraph {
    /// Number of nodes; node ids are `0..node_count()`.
    fn node_count(&self) -> usize;

    /// Call `f(neighbor, weight)` for every edge leaving `node`.
    fn for_each_neighbor(&self, node: usize, f: impl FnMut(usize, f32));
}

/// Undirected surface graph, one node per mesh vertex.
#[derive(Debug, Clone)]
pub struct SurfaceGraph {
    offsets: Vec<usize>,
    adjacency: Vec<(u32, f32)>,
    edge_count: usize,
}

impl SurfaceGraph {
    /// Build the graph from the mesh's current positions and faces.
    pub fn build(mesh: &MeshStore) -> Self {
        let positions = mesh.positions();
        let node_count = positions.len();

        let mut edges: Vec<(u32, u32)> = Vec::with_capacity(mesh.face_count() * 3);
        for &[a, b, c] in mesh.faces() {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                edges.push((u.min(v), u.max(v)));
            }
        }
        edges.sort_unstable();
        edges.dedup();

        let mut offsets = vec![0usize; node_count + 1];
        for &(u, v) in &edges {
            offsets[u as usize + 1] += 1;
            offsets[v as usize + 1] += 1;
        }
        for i in 0..node_count {
            offsets[i + 1] += offsets[i];
        }

        // Edges are sorted by (min, max), so filling in edge order leaves
        // every neighbor list sorted.
        let mut cursor = offsets.clone();
        let mut adjacency = vec![(0u32, 0.0f32); edges.len() * 2];
        for &(u, v) in &edges {
            let weight = positions[u as usize].distance(positions[v as usize]);
            adjacency[cursor[u as usize]] = (v, weight);
            cursor[u as usize] += 1;
            adjacency[cursor[v as usize]] = (u, weight);
            cursor[v as usize] += 1;
        }

        tracing::debug!(
            "built surface graph: {} nodes, {} edges",
            node_count,
            edges.len()
        );

        Self {
            offsets,
            adjacency,
            edge_count: edges.len(),
        }
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// `(neighbor, weight)` pairs of a node, sorted by neighbor
    pub fn neighbors(&self, node: usize) -> &[(u32, f32)] {
        &self.adjacency[self.offsets[node]..self.offsets[node + 1]]
    }

    /// Weight of the edge between `u` and `v`, if they are adjacent
    pub fn edge_weight(&self, u: usize, v: usize) -> Option<f32> {
        let neighbors = self.neighbors(u);
        neighbors
            .binary_search_by_key(&(v as u32), |&(n, _)| n)
            .ok()
            .map(|i| neighbors[i].1)
    }

    /// Iterate every undirected edge once as `(u, v, weight)` with `u < v`
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        (0..self.node_count()).flat_map(move |u| {
            self.neighbors(u)
                .iter()
                .filter(move |&&(v, _)| (v as usize) > u)
                .map(move |&(v, w)| (u, v as usize, w))
        })
    }
}

impl WeightedGraph for SurfaceGraph {
    fn node_count(&self) -> usize {
        self.offsets.len() - 1
    }

    fn for_each_neighbor(&self, node: usize, mut f: impl FnMut(usize, f32)) {
        for &(neighbor, weight) in self.neighbors(node) {
            f(neighbor as usize, weight);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_meshes::{grid, single_triangle};
    use glam::Vec3;

    #[test]
    fn test_single_triangle_edges() {
        let mesh = single_triangle();
        let graph = SurfaceGraph::build(&mesh);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.edge_weight(0, 1), Some(1.0));
        assert!((graph.edge_weight(1, 2).unwrap() - 2f32.sqrt()).abs() < 1e-6);
        assert_eq!(graph.edge_weight(1, 0), graph.edge_weight(0, 1));
    }

    #[test]
    fn test_shared_edges_deduplicated() {
        let mesh = grid(10, 1.0);
        let graph = SurfaceGraph::build(&mesh);
        // 9*10 horizontal + 9*10 vertical + 9*9 diagonal
        assert_eq!(graph.edge_count(), 90 + 90 + 81);
        assert!(graph.edge_count() <= 3 * mesh.face_count());
    }

    #[test]
    fn test_edge_weights_match_positions() {
        let mesh = grid(6, 2.5);
        let graph = SurfaceGraph::build(&mesh);
        let positions = mesh.positions();
        let mut seen = 0;
        for (u, v, w) in graph.edges() {
            assert!((w - positions[u].distance(positions[v])).abs() < 1e-6);
            seen += 1;
        }
        assert_eq!(seen, graph.edge_count());
    }

    #[test]
    fn test_neighbors_sorted() {
        let graph = SurfaceGraph::build(&grid(5, 1.0));
        for node in 0..graph.node_count() {
            let neighbors = graph.neighbors(node);
            assert!(neighbors.windows(2).all(|w| w[0].0 < w[1].0));
        }
    }

    #[test]
    fn test_faceless_mesh_has_no_edges() {
        let mesh = MeshStore::new(vec![Vec3::ZERO, Vec3::X], Vec::new()).unwrap();
        let graph = SurfaceGraph::build(&mesh);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.neighbors(0).is_empty());
    }

    #[test]
    fn test_weights_frozen_at_build_time() {
        let mut mesh = single_triangle();
        let graph = SurfaceGraph::build(&mesh);
        mesh.set_position(crate::types::VertexId(1), Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(graph.edge_weight(0, 1), Some(1.0));
    }
}
