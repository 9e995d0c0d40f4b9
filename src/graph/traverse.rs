//! Lazy traversals and cycle detection over a [`DirectedGraph`]

use std::collections::{HashSet, VecDeque};

use super::{DirectedGraph, NodeHandle};

/// Breadth-first walk against edge direction, nearest node first
pub struct Ancestors<'g, N, L> {
    graph: &'g DirectedGraph<N, L>,
    labels: Vec<L>,
    queue: VecDeque<NodeHandle>,
    visited: HashSet<NodeHandle>,
}

impl<'g, N, L: Copy + PartialEq> Ancestors<'g, N, L> {
    pub(super) fn new(graph: &'g DirectedGraph<N, L>, start: NodeHandle, labels: &[L]) -> Self {
        let mut visited = HashSet::new();
        visited.insert(start);
        let mut walk = Self {
            graph,
            labels: labels.to_vec(),
            queue: VecDeque::new(),
            visited,
        };
        walk.enqueue_sources(start);
        walk
    }

    fn enqueue_sources(&mut self, node: NodeHandle) {
        for source in self.graph.edges_to(node, &self.labels) {
            if self.visited.insert(source) {
                self.queue.push_back(source);
            }
        }
    }
}

impl<N, L: Copy + PartialEq> Iterator for Ancestors<'_, N, L> {
    type Item = NodeHandle;

    fn next(&mut self) -> Option<NodeHandle> {
        let node = self.queue.pop_front()?;
        self.enqueue_sources(node);
        Some(node)
    }
}

/// Depth-first pre-order walk along edge direction
pub struct Descendants<'g, N, L> {
    graph: &'g DirectedGraph<N, L>,
    labels: Vec<L>,
    stack: Vec<NodeHandle>,
    visited: HashSet<NodeHandle>,
}

impl<'g, N, L: Copy + PartialEq> Descendants<'g, N, L> {
    pub(super) fn new(graph: &'g DirectedGraph<N, L>, start: NodeHandle, labels: &[L]) -> Self {
        let mut visited = HashSet::new();
        visited.insert(start);
        let mut walk = Self {
            graph,
            labels: labels.to_vec(),
            stack: Vec::new(),
            visited,
        };
        walk.push_targets(start);
        walk
    }

    fn push_targets(&mut self, node: NodeHandle) {
        // reversed so the first-inserted edge is popped first
        for target in self.graph.edges_from(node, &self.labels).into_iter().rev() {
            self.stack.push(target);
        }
    }
}

impl<N, L: Copy + PartialEq> Iterator for Descendants<'_, N, L> {
    type Item = NodeHandle;

    fn next(&mut self) -> Option<NodeHandle> {
        while let Some(node) = self.stack.pop() {
            if self.visited.insert(node) {
                self.push_targets(node);
                return Some(node);
            }
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

pub(super) fn find_cycles<N, L: Copy + PartialEq>(
    graph: &DirectedGraph<N, L>,
    labels: &[L],
) -> Vec<Vec<NodeHandle>> {
    let mut marks = vec![Mark::Unvisited; graph.node_count()];
    let mut path = Vec::new();
    let mut cycles = Vec::new();

    for start in graph.handles() {
        if marks[start.index()] == Mark::Unvisited {
            visit(graph, start, labels, &mut marks, &mut path, &mut cycles);
        }
    }
    cycles
}

fn visit<N, L: Copy + PartialEq>(
    graph: &DirectedGraph<N, L>,
    node: NodeHandle,
    labels: &[L],
    marks: &mut [Mark],
    path: &mut Vec<NodeHandle>,
    cycles: &mut Vec<Vec<NodeHandle>>,
) {
    marks[node.index()] = Mark::Visiting;
    path.push(node);

    for next in graph.edges_from(node, labels) {
        match marks[next.index()] {
            Mark::Unvisited => visit(graph, next, labels, marks, path, cycles),
            Mark::Visiting => {
                if let Some(start) = path.iter().position(|handle| *handle == next) {
                    cycles.push(path[start..].to_vec());
                }
            }
            Mark::Done => {}
        }
    }

    path.pop();
    marks[node.index()] = Mark::Done;
}

#[cfg(test)]
mod tests {
    use super::super::DirectedGraph;

    #[test]
    fn test_self_loop_is_a_cycle() {
        let mut graph: DirectedGraph<(), u8> = DirectedGraph::new();
        let a = graph.add_node("a", ()).unwrap();
        graph.add_edge(a, a, 0);
        assert_eq!(graph.find_cycles(&[0]), vec![vec![a]]);
        assert!(graph.find_cycles(&[1]).is_empty());
    }

    #[test]
    fn test_two_disjoint_cycles_reported_separately() {
        let mut graph: DirectedGraph<(), u8> = DirectedGraph::new();
        let a = graph.add_node("a", ()).unwrap();
        let b = graph.add_node("b", ()).unwrap();
        let c = graph.add_node("c", ()).unwrap();
        let d = graph.add_node("d", ()).unwrap();
        graph.add_edge(a, b, 0);
        graph.add_edge(b, a, 0);
        graph.add_edge(c, d, 0);
        graph.add_edge(d, c, 0);
        assert_eq!(graph.find_cycles(&[0]), vec![vec![a, b], vec![c, d]]);
    }

    #[test]
    fn test_diamond_visits_shared_node_once() {
        let mut graph: DirectedGraph<(), u8> = DirectedGraph::new();
        let top = graph.add_node("top", ()).unwrap();
        let left = graph.add_node("left", ()).unwrap();
        let right = graph.add_node("right", ()).unwrap();
        let bottom = graph.add_node("bottom", ()).unwrap();
        graph.add_edge(top, left, 0);
        graph.add_edge(top, right, 0);
        graph.add_edge(left, bottom, 0);
        graph.add_edge(right, bottom, 0);
        graph.seal_acyclic(&[0]).unwrap();

        let walk: Vec<_> = graph.descendants(top, &[0]).collect();
        assert_eq!(walk, vec![left, bottom, right]);
    }
}
