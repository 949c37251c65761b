//! Cycle detection over a diagram.

use crate::graph::diagram::Diagram;
use ahash::{AHashMap, AHashSet};

/// A cycle in the diagram (entity names forming the cycle)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    pub entities: Vec<String>,
}

impl Cycle {
    /// Check if this is a self-referencing cycle (single entity)
    pub fn is_self_reference(&self) -> bool {
        self.entities.len() == 1
    }

    /// Format the cycle for display
    pub fn display(&self) -> String {
        if self.is_self_reference() {
            format!("{} -> {} (self-reference)", self.entities[0], self.entities[0])
        } else {
            let mut parts = self.entities.clone();
            parts.push(self.entities[0].clone());
            parts.join(" -> ")
        }
    }
}

/// Find all cycles using Tarjan's SCC algorithm
pub fn find_cycles(diagram: &Diagram) -> Vec<Cycle> {
    let mut finder = TarjanScc::new(diagram);
    finder.find_sccs();

    finder
        .sccs
        .into_iter()
        .filter(|scc| {
            scc.len() > 1
                || diagram
                    .edges
                    .iter()
                    .any(|e| e.from_entity == scc[0] && e.to_entity == scc[0])
        })
        .map(|entities| Cycle { entities })
        .collect()
}

/// Get all entities that are part of any cycle
pub fn cyclic_entities(diagram: &Diagram) -> AHashSet<String> {
    find_cycles(diagram)
        .into_iter()
        .flat_map(|c| c.entities)
        .collect()
}

struct TarjanScc<'a> {
    diagram: &'a Diagram,
    index_counter: usize,
    stack: Vec<String>,
    on_stack: AHashSet<String>,
    indices: AHashMap<String, usize>,
    lowlinks: AHashMap<String, usize>,
    sccs: Vec<Vec<String>>,
    adjacency: AHashMap<String, Vec<String>>,
}

impl<'a> TarjanScc<'a> {
    fn new(diagram: &'a Diagram) -> Self {
        let mut adjacency: AHashMap<String, Vec<String>> = diagram
            .entities
            .iter()
            .map(|e| (e.name.clone(), Vec::new()))
            .collect();
        for edge in &diagram.edges {
            if adjacency.contains_key(&edge.to_entity) {
                if let Some(targets) = adjacency.get_mut(&edge.from_entity) {
                    targets.push(edge.to_entity.clone());
                }
            }
        }

        Self {
            diagram,
            index_counter: 0,
            stack: Vec::new(),
            on_stack: AHashSet::new(),
            indices: AHashMap::new(),
            lowlinks: AHashMap::new(),
            sccs: Vec::new(),
            adjacency,
        }
    }

    fn find_sccs(&mut self) {
        // Declaration order keeps the cycle listing stable
        let nodes: Vec<String> = self.diagram.entities.iter().map(|e| e.name.clone()).collect();
        for node in nodes {
            if !self.indices.contains_key(&node) {
                self.strongconnect(&node);
            }
        }
    }

    fn strongconnect(&mut self, v: &str) {
        self.indices.insert(v.to_string(), self.index_counter);
        self.lowlinks.insert(v.to_string(), self.index_counter);
        self.index_counter += 1;
        self.stack.push(v.to_string());
        self.on_stack.insert(v.to_string());

        let neighbors = self.adjacency.get(v).cloned().unwrap_or_default();
        for w in neighbors {
            if !self.indices.contains_key(&w) {
                self.strongconnect(&w);
                let low = self.lowlinks[v].min(self.lowlinks[&w]);
                self.lowlinks.insert(v.to_string(), low);
            } else if self.on_stack.contains(&w) {
                let low = self.lowlinks[v].min(self.indices[&w]);
                self.lowlinks.insert(v.to_string(), low);
            }
        }

        // Root of an SCC: pop it off the stack
        if self.lowlinks[v] == self.indices[v] {
            let mut scc = Vec::new();
            while let Some(w) = self.stack.pop() {
                self.on_stack.remove(&w);
                let done = w == v;
                scc.push(w);
                if done {
                    break;
                }
            }
            scc.reverse();
            self.sccs.push(scc);
        }
    }
}
