use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use tracing::debug;

use crate::errors::{ContainerError, Result};

/// Constructor dependency graph: class -> classes it needs.
///
/// Ordered collections keep cycle reports and topological order stable
/// between runs.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    dependencies: BTreeMap<String, BTreeSet<String>>,
    dependents: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node with no edges (leaf classes)
    pub fn add_node(&mut self, node: &str) {
        self.dependencies.entry(node.to_string()).or_default();
    }

    /// `dependent` needs `dependency`
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) {
        self.dependencies
            .entry(dependent.to_string())
            .or_default()
            .insert(dependency.to_string());
        self.dependents
            .entry(dependency.to_string())
            .or_default()
            .insert(dependent.to_string());
        self.add_node(dependency);
    }

    pub fn has_dependency(&self, dependent: &str, dependency: &str) -> bool {
        self.dependencies
            .get(dependent)
            .map(|deps| deps.contains(dependency))
            .unwrap_or(false)
    }

    pub fn dependencies_of(&self, node: &str) -> Vec<String> {
        self.dependencies
            .get(node)
            .map(|deps| deps.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn dependents_of(&self, node: &str) -> Vec<String> {
        self.dependents
            .get(node)
            .map(|deps| deps.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn node_count(&self) -> usize {
        self.dependencies.len()
    }

    /// Every cycle reachable by DFS, each closed with its first node
    /// (`[A, B, A]`).
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();
        let mut visited = BTreeSet::new();
        let mut on_stack = BTreeSet::new();
        let mut path = Vec::new();

        for node in self.dependencies.keys() {
            if !visited.contains(node.as_str()) {
                self.dfs_find_cycles(node, &mut visited, &mut on_stack, &mut path, &mut cycles);
            }
        }

        cycles
    }

    fn dfs_find_cycles<'a>(
        &'a self,
        node: &'a str,
        visited: &mut BTreeSet<&'a str>,
        on_stack: &mut BTreeSet<&'a str>,
        path: &mut Vec<&'a str>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        visited.insert(node);
        on_stack.insert(node);
        path.push(node);

        if let Some(deps) = self.dependencies.get(node) {
            for neighbor in deps {
                let neighbor = neighbor.as_str();
                if !visited.contains(neighbor) {
                    self.dfs_find_cycles(neighbor, visited, on_stack, path, cycles);
                } else if on_stack.contains(neighbor) {
                    if let Some(start) = path.iter().position(|&n| n == neighbor) {
                        let mut cycle: Vec<String> =
                            path[start..].iter().map(|n| n.to_string()).collect();
                        cycle.push(neighbor.to_string());
                        cycles.push(cycle);
                    }
                }
            }
        }

        on_stack.remove(node);
        path.pop();
    }

    /// Dependencies come before their dependents.
    pub fn topological_sort(&self) -> Result<Vec<String>> {
        // in-degree = number of dependencies not yet emitted
        let mut remaining: HashMap<&str, usize> = self
            .dependencies
            .iter()
            .map(|(node, deps)| (node.as_str(), deps.len()))
            .collect();

        let mut queue: VecDeque<&str> = self
            .dependencies
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(node, _)| node.as_str())
            .collect();

        let mut order = Vec::with_capacity(remaining.len());
        while let Some(node) = queue.pop_front() {
            order.push(node.to_string());

            if let Some(dependents) = self.dependents.get(node) {
                for dependent in dependents {
                    if let Some(count) = remaining.get_mut(dependent.as_str()) {
                        *count -= 1;
                        if *count == 0 {
                            queue.push_back(dependent.as_str());
                        }
                    }
                }
            }
        }

        if order.len() != remaining.len() {
            let chain = self
                .find_cycles()
                .into_iter()
                .next()
                .unwrap_or_default();
            return Err(ContainerError::CyclicDependency { chain });
        }

        debug!("Topological order over {} classes", order.len());
        Ok(order)
    }

    pub fn clear(&mut self) {
        self.dependencies.clear();
        self.dependents.clear();
    }
}
