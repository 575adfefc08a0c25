//! Dependency graph of compilation units

use rustc_hash::{FxHashMap, FxHashSet};

use crate::unit::{CompilationUnit, UnitId};

/// Arena of compilation units indexed by identity
#[derive(Debug, Default)]
pub struct UnitGraph {
    units: Vec<CompilationUnit>,
    index: FxHashMap<UnitId, usize>,
}

impl UnitGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit; an existing unit with the same identity is kept and its
    /// index returned.
    pub fn insert(&mut self, unit: CompilationUnit) -> usize {
        if let Some(&existing) = self.index.get(&unit.id) {
            return existing;
        }
        let idx = self.units.len();
        self.index.insert(unit.id.clone(), idx);
        self.units.push(unit);
        idx
    }

    /// Index of the unit with identity `id`
    pub fn lookup(&self, id: &UnitId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Get a unit by index
    pub fn get(&self, idx: usize) -> &CompilationUnit {
        &self.units[idx]
    }

    /// Get a unit by index, mutably
    pub fn get_mut(&mut self, idx: usize) -> &mut CompilationUnit {
        &mut self.units[idx]
    }

    /// Number of units
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the graph has no units
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Units in index order
    pub fn iter(&self) -> impl Iterator<Item = &CompilationUnit> {
        self.units.iter()
    }

    /// Whether `to` can be reached from `from` through import edges.
    /// A unit reaches itself.
    pub fn reaches(&self, from: usize, to: usize) -> bool {
        let mut visited = FxHashSet::default();
        let mut stack = vec![from];

        while let Some(idx) = stack.pop() {
            if idx == to {
                return true;
            }
            if visited.insert(idx) {
                stack.extend(self.units[idx].imports.iter().copied());
            }
        }
        false
    }

    /// Groups units by dependency depth (Kahn's algorithm, level by level).
    ///
    /// Every unit of a wave depends only on units of earlier waves, and each
    /// wave is sorted by index. Units on a cycle never reach in-degree zero;
    /// they are returned together as a final wave.
    pub fn waves(&self) -> Vec<Vec<usize>> {
        let mut in_degree: Vec<usize> = self.units.iter().map(|unit| unit.imports.len()).collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.units.len()];
        for (idx, unit) in self.units.iter().enumerate() {
            for &dep in &unit.imports {
                dependents[dep].push(idx);
            }
        }

        let mut waves = Vec::new();
        let mut placed = 0;
        let mut current: Vec<usize> = (0..self.units.len()).filter(|&idx| in_degree[idx] == 0).collect();

        while !current.is_empty() {
            placed += current.len();
            let mut next = Vec::new();
            for &idx in &current {
                for &dependent in &dependents[idx] {
                    in_degree[dependent] -= 1;
                    if in_degree[dependent] == 0 {
                        next.push(dependent);
                    }
                }
            }
            next.sort_unstable();
            waves.push(std::mem::replace(&mut current, next));
        }

        if placed != self.units.len() {
            waves.push((0..self.units.len()).filter(|&idx| in_degree[idx] > 0).collect());
        }

        waves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::Variant;
    use pretty_assertions::assert_eq;

    fn add(graph: &mut UnitGraph, name: &str, imports: &[usize]) -> usize {
        let mut unit = CompilationUnit::new(UnitId::new(format!("/w/{}", name), Variant::Normal), name, name);
        for &dep in imports {
            unit.add_import(dep);
        }
        graph.insert(unit)
    }

    #[test]
    fn test_simple_graph() {
        let mut graph = UnitGraph::new();

        // c imports b, b imports a
        let a = add(&mut graph, "a", &[]);
        let b = add(&mut graph, "b", &[a]);
        let c = add(&mut graph, "c", &[b]);

        assert_eq!(graph.waves(), vec![vec![a], vec![b], vec![c]]);
    }

    #[test]
    fn test_diamond_dependency() {
        let mut graph = UnitGraph::new();

        // Diamond: d -> b,c; b,c -> a
        let a = add(&mut graph, "a", &[]);
        let b = add(&mut graph, "b", &[a]);
        let c = add(&mut graph, "c", &[a]);
        let d = add(&mut graph, "d", &[b, c]);
        let lone = add(&mut graph, "lone", &[]);

        assert_eq!(graph.waves(), vec![vec![a, lone], vec![b, c], vec![d]]);
    }

    #[test]
    fn test_cycle_lands_in_last_wave() {
        let mut graph = UnitGraph::new();

        let a = add(&mut graph, "a", &[]);
        let b = add(&mut graph, "b", &[a]);
        // a imports b, b imports a (cycle)
        graph.get_mut(a).add_import(b);
        let c = add(&mut graph, "c", &[]);

        assert_eq!(graph.waves(), vec![vec![c], vec![a, b]]);
    }

    #[test]
    fn test_reachability() {
        let mut graph = UnitGraph::new();

        // c imports b, b imports a; d stands alone
        let a = add(&mut graph, "a", &[]);
        let b = add(&mut graph, "b", &[a]);
        let c = add(&mut graph, "c", &[b]);
        let d = add(&mut graph, "d", &[]);

        assert!(graph.reaches(c, a));
        assert!(graph.reaches(a, a));
        assert!(!graph.reaches(a, c));
        assert!(!graph.reaches(d, a));

        // cycle: a imports c
        graph.get_mut(a).add_import(c);
        assert!(graph.reaches(a, b));
        assert!(!graph.reaches(a, d));
    }

    #[test]
    fn test_identity_is_inserted_once() {
        let mut graph = UnitGraph::new();
        let first = add(&mut graph, "a", &[]);
        let second = add(&mut graph, "a", &[]);
        assert_eq!(first, second);
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.lookup(&UnitId::new("/w/a", Variant::Normal)), Some(first));
        assert_eq!(graph.lookup(&UnitId::new("/w/a", Variant::Test)), None);
    }
}
