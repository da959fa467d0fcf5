//! DDL dependency plan.
//!
//! Statements are nodes of a directed graph; an edge `a -> b` means `a` must
//! run before `b`. Ordering is Kahn's algorithm with ties broken by insertion
//! order, so the emitted script is deterministic.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::error::{CompileError, CompileResult};
use crate::sql::ddl::DdlStatement;

/// A statement plus a short label used in diagnostics.
#[derive(Debug, Clone)]
pub struct PlannedStatement {
    pub label: String,
    pub statement: DdlStatement,
}

/// Dependency graph over emitted statements.
#[derive(Debug, Default)]
pub struct DdlPlan {
    graph: DiGraph<PlannedStatement, ()>,
}

impl DdlPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a statement with no dependencies yet.
    pub fn add(&mut self, label: impl Into<String>, statement: impl Into<DdlStatement>) -> NodeIndex {
        self.graph.add_node(PlannedStatement {
            label: label.into(),
            statement: statement.into(),
        })
    }

    /// Record that `node` must run after `dependency`.
    pub fn depends_on(&mut self, node: NodeIndex, dependency: NodeIndex) {
        if self.graph.find_edge(dependency, node).is_none() {
            self.graph.add_edge(dependency, node, ());
        }
    }

    /// Add a statement that runs after `dependency`.
    pub fn add_after(
        &mut self,
        dependency: NodeIndex,
        label: impl Into<String>,
        statement: impl Into<DdlStatement>,
    ) -> NodeIndex {
        let node = self.add(label, statement);
        self.depends_on(node, dependency);
        node
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Statements in dependency order.
    pub fn ordered(&self) -> CompileResult<Vec<&PlannedStatement>> {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|n| self.graph.neighbors_directed(n, Direction::Incoming).count())
            .collect();

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut out = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse(i)) = ready.pop() {
            let node = NodeIndex::new(i);
            out.push(&self.graph[node]);
            for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
                let d = &mut in_degree[next.index()];
                *d -= 1;
                if *d == 0 {
                    ready.push(Reverse(next.index()));
                }
            }
        }

        if out.len() < self.graph.node_count() {
            return Err(CompileError::CyclicDependency(self.cycle_labels()));
        }
        Ok(out)
    }

    fn cycle_labels(&self) -> Vec<String> {
        tarjan_scc(&self.graph)
            .into_iter()
            .find(|scc| {
                scc.len() > 1 || self.graph.find_edge(scc[0], scc[0]).is_some()
            })
            .unwrap_or_default()
            .into_iter()
            .map(|idx| self.graph[idx].label.clone())
            .collect()
    }
}
