use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

/// Which generated type refers to which.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: IndexMap<String, IndexSet<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_edge(&mut self, from: &str, to: &str) {
        if from == to {
            return;
        }
        self.edges
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
    }

    pub fn dependencies(&self, name: &str) -> impl Iterator<Item = &str> {
        self.edges
            .get(name)
            .into_iter()
            .flat_map(|deps| deps.iter().map(String::as_str))
    }

    /// Orders `names` so every name comes after the names it depends on.
    ///
    /// Only dependencies that are themselves in `names` are followed. A name
    /// met again while it is still on the DFS stack is skipped, so cycles yield
    /// some valid permutation instead of an error. Independent names keep
    /// their relative input order.
    pub fn topological_order(&self, names: &[String]) -> Vec<String> {
        let pool: IndexSet<&str> = names.iter().map(String::as_str).collect();
        let mut marks: HashMap<&str, Mark> = HashMap::with_capacity(pool.len());
        let mut order = Vec::with_capacity(pool.len());

        for &name in &pool {
            self.visit(name, &pool, &mut marks, &mut order);
        }

        order
    }

    fn visit<'a>(
        &'a self,
        name: &'a str,
        pool: &IndexSet<&'a str>,
        marks: &mut HashMap<&'a str, Mark>,
        order: &mut Vec<String>,
    ) {
        match marks.get(name) {
            Some(Mark::Done) => return,
            // Back edge: the cycle is cut here and `name` is placed by its
            // outer visit.
            Some(Mark::Visiting) => return,
            None => {}
        }
        marks.insert(name, Mark::Visiting);

        for dep in self.dependencies(name) {
            if let Some(&dep) = pool.get(dep) {
                self.visit(dep, pool, marks, order);
            }
        }

        marks.insert(name, Mark::Done);
        order.push(name.to_string());
    }
}
