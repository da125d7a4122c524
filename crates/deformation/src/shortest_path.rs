//! Dijkstra shortest paths over a [`WeightedGraph`].
//!
//! The multi-source query is reduced to a single-source one by attaching an
//! ephemeral "virtual source" node to every source with zero-weight edges.
//! The virtual node lives only in a borrowed view; the surface graph is never
//! modified.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use crate::graph::WeightedGraph;
use crate::types::VertexId;

/// Result of a single-source query.
#[derive(Debug, Clone)]
pub struct ShortestPaths {
    /// Per-node distance, `f32::INFINITY` when unreachable
    pub distances: Vec<f32>,
    /// Previous node on the shortest path, `None` for the source and
    /// unreachable nodes
    pub predecessors: Vec<Option<u32>>,
}

/// Result of a multi-source query.
#[derive(Debug, Clone)]
pub struct MultiSourcePaths {
    /// Per-node distance to the closest source
    pub distances: Vec<f32>,
    /// Source at the start of each node's shortest path
    pub nearest_source: Vec<Option<VertexId>>,
}

/// Dijkstra from `source`.
///
/// The frontier is keyed by `(distance, node)`, so among equal tentative
/// distances the lowest node index is settled first and a node keeps the
/// first predecessor that reached its final distance.
pub fn single_source<G: WeightedGraph>(graph: &G, source: usize) -> ShortestPaths {
    let node_count = graph.node_count();
    let mut distances = vec![f32::INFINITY; node_count];
    let mut predecessors: Vec<Option<u32>> = vec![None; node_count];

    if source >= node_count {
        tracing::warn!(
            "shortest path source {} out of range for {} nodes",
            source,
            node_count
        );
        return ShortestPaths {
            distances,
            predecessors,
        };
    }

    let mut settled = vec![false; node_count];
    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f32>, usize)>> = BinaryHeap::new();

    distances[source] = 0.0;
    heap.push(Reverse((OrderedFloat(0.0), source)));

    while let Some(Reverse((OrderedFloat(dist), node))) = heap.pop() {
        if settled[node] {
            continue;
        }
        settled[node] = true;

        graph.for_each_neighbor(node, |neighbor, weight| {
            if settled[neighbor] {
                return;
            }
            let candidate = dist + weight;
            if candidate < distances[neighbor] {
                distances[neighbor] = candidate;
                predecessors[neighbor] = Some(node as u32);
                heap.push(Reverse((OrderedFloat(candidate), neighbor)));
            }
        });
    }

    ShortestPaths {
        distances,
        predecessors,
    }
}

/// Graph view that appends one virtual node joined to every source by a
/// zero-weight edge.
struct VirtualSourceView<'a, G> {
    graph: &'a G,
    sources: &'a [usize],
    is_source: Vec<bool>,
}

impl<'a, G: WeightedGraph> VirtualSourceView<'a, G> {
    fn new(graph: &'a G, sources: &'a [usize]) -> Self {
        let mut is_source = vec![false; graph.node_count()];
        for &s in sources {
            is_source[s] = true;
        }
        Self {
            graph,
            sources,
            is_source,
        }
    }

    fn virtual_node(&self) -> usize {
        self.graph.node_count()
    }
}

impl<G: WeightedGraph> WeightedGraph for VirtualSourceView<'_, G> {
    fn node_count(&self) -> usize {
        self.graph.node_count() + 1
    }

    fn for_each_neighbor(&self, node: usize, mut f: impl FnMut(usize, f32)) {
        let virtual_node = self.virtual_node();
        if node == virtual_node {
            for &s in self.sources {
                f(s, 0.0);
            }
            return;
        }
        self.graph.for_each_neighbor(node, &mut f);
        if self.is_source[node] {
            f(virtual_node, 0.0);
        }
    }
}

/// Distance from every node to the closest of `sources`, plus which source
/// that is.
///
/// An empty source set leaves every node unreachable. Source indices out of
/// range are ignored.
pub fn multi_source<G: WeightedGraph>(graph: &G, sources: &[VertexId]) -> MultiSourcePaths {
    let node_count = graph.node_count();
    let sources: Vec<usize> = sources
        .iter()
        .map(|s| s.index())
        .filter(|&s| s < node_count)
        .collect();

    if sources.is_empty() {
        tracing::debug!("multi-source query with empty source set");
        return MultiSourcePaths {
            distances: vec![f32::INFINITY; node_count],
            nearest_source: vec![None; node_count],
        };
    }

    let view = VirtualSourceView::new(graph, &sources);
    let virtual_node = view.virtual_node();
    let ShortestPaths {
        mut distances,
        predecessors,
    } = single_source(&view, virtual_node);

    distances.truncate(node_count);
    let nearest_source = resolve_sources(&predecessors[..node_count], virtual_node);

    MultiSourcePaths {
        distances,
        nearest_source,
    }
}

/// For every reachable node, the first real node on its predecessor chain
/// back to the virtual node.
fn resolve_sources(predecessors: &[Option<u32>], virtual_node: usize) -> Vec<Option<VertexId>> {
    let mut nearest: Vec<Option<VertexId>> = vec![None; predecessors.len()];
    let mut chain: Vec<usize> = Vec::new();

    for start in 0..predecessors.len() {
        if nearest[start].is_some() || predecessors[start].is_none() {
            continue;
        }

        let mut current = start;
        let root = loop {
            if let Some(known) = nearest[current] {
                break Some(known);
            }
            match predecessors[current] {
                Some(p) if p as usize == virtual_node => break Some(VertexId(current as u32)),
                Some(p) => {
                    chain.push(current);
                    current = p as usize;
                }
                None => break None,
            }
        };

        nearest[current] = nearest[current].or(root);
        for node in chain.drain(..) {
            nearest[node] = root;
        }
    }

    nearest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SurfaceGraph;
    use crate::mesh::MeshStore;
    use crate::test_meshes::{grid, strip};
    use glam::Vec3;

    #[test]
    fn test_source_distance_zero() {
        let graph = SurfaceGraph::build(&grid(4, 3.0));
        let paths = single_source(&graph, 5);
        assert_eq!(paths.distances[5], 0.0);
        assert_eq!(paths.predecessors[5], None);
    }

    #[test]
    fn test_distances_monotone_along_paths() {
        let graph = SurfaceGraph::build(&grid(7, 1.0));
        let paths = single_source(&graph, 0);
        for v in 0..graph.node_count() {
            let d = paths.distances[v];
            assert!(d >= 0.0);
            if let Some(p) = paths.predecessors[v] {
                let p = p as usize;
                assert!(paths.distances[p] <= d);
                let w = graph.edge_weight(p, v).unwrap();
                assert!((paths.distances[p] + w - d).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_straight_line_distance() {
        let graph = SurfaceGraph::build(&strip(6));
        let paths = single_source(&graph, 0);
        for col in 0..6 {
            assert!((paths.distances[col] - col as f32).abs() < 1e-5);
        }
    }

    #[test]
    fn test_unreachable_nodes() {
        // Two disconnected triangles
        let positions = vec![
            Vec3::ZERO,
            Vec3::X,
            Vec3::Y,
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::new(6.0, 0.0, 0.0),
            Vec3::new(5.0, 1.0, 0.0),
        ];
        let mesh = MeshStore::new(positions, vec![[0, 1, 2], [3, 4, 5]]).unwrap();
        let graph = SurfaceGraph::build(&mesh);
        let paths = single_source(&graph, 0);
        for v in 3..6 {
            assert!(paths.distances[v].is_infinite());
            assert_eq!(paths.predecessors[v], None);
        }
    }

    #[test]
    fn test_equal_paths_prefer_lowest_predecessor() {
        // Unit square split along the 1-2 diagonal: vertex 3 is reachable
        // through 1 or 2 at the same cost.
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::new(1.0, 1.0, 0.0)];
        let mesh = MeshStore::new(positions, vec![[0, 1, 2], [1, 3, 2]]).unwrap();
        let graph = SurfaceGraph::build(&mesh);
        let paths = single_source(&graph, 0);
        assert!((paths.distances[3] - 2.0).abs() < 1e-6);
        assert_eq!(paths.predecessors[3], Some(1));
    }

    #[test]
    fn test_multi_source_matches_single_source_minimum() {
        let graph = SurfaceGraph::build(&grid(8, 2.0));
        let sources = [VertexId(0), VertexId(27), VertexId(63)];
        let multi = multi_source(&graph, &sources);

        let singles: Vec<ShortestPaths> = sources
            .iter()
            .map(|s| single_source(&graph, s.index()))
            .collect();
        for v in 0..graph.node_count() {
            let expected = singles
                .iter()
                .map(|p| p.distances[v])
                .fold(f32::INFINITY, f32::min);
            assert!((multi.distances[v] - expected).abs() < 1e-5);

            let nearest = multi.nearest_source[v].unwrap();
            assert!(sources.contains(&nearest));
            let via_nearest = single_source(&graph, nearest.index()).distances[v];
            assert!((via_nearest - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn test_nearest_source_on_strip() {
        let graph = SurfaceGraph::build(&strip(10));
        let multi = multi_source(&graph, &[VertexId(0), VertexId(9)]);
        assert_eq!(multi.nearest_source[0], Some(VertexId(0)));
        assert_eq!(multi.nearest_source[9], Some(VertexId(9)));
        assert_eq!(multi.nearest_source[2], Some(VertexId(0)));
        assert_eq!(multi.nearest_source[7], Some(VertexId(9)));
        assert_eq!(multi.distances[0], 0.0);
        assert!((multi.distances[7] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_source_set() {
        let graph = SurfaceGraph::build(&grid(3, 1.0));
        let multi = multi_source(&graph, &[]);
        assert!(multi.distances.iter().all(|d| d.is_infinite()));
        assert!(multi.nearest_source.iter().all(Option::is_none));
    }

    #[test]
    fn test_multi_source_unreachable_component() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::new(9.0, 9.0, 9.0)];
        let mesh = MeshStore::new(positions, vec![[0, 1, 2]]).unwrap();
        let graph = SurfaceGraph::build(&mesh);
        let multi = multi_source(&graph, &[VertexId(1)]);
        assert_eq!(multi.distances.len(), 4);
        assert!(multi.distances[3].is_infinite());
        assert_eq!(multi.nearest_source[3], None);
        assert_eq!(multi.nearest_source[2], Some(VertexId(1)));
    }
}
