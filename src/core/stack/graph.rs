use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use indexmap::IndexMap;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap};

/// Order components so that every dependency precedes its dependents.
///
/// Components without a mutual ordering constraint keep their declaration
/// order.
pub(super) fn dependency_order(
    dependencies: &IndexMap<String, Vec<String>>,
) -> Result<Vec<String>, AppError> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();
    for id in dependencies.keys() {
        nodes.insert(id.as_str(), graph.add_node(id.as_str()));
    }

    for (id, requires) in dependencies {
        let dependent = nodes[id.as_str()];
        for dependency in requires {
            let Some(&required) = nodes.get(dependency.as_str()) else {
                return Err(AppError::new(
                    ErrorCategory::LookupError,
                    format!(
                        "component {} depends on unknown component {}",
                        id, dependency
                    ),
                )
                .with_code("STACK-DEP-001")
                .with_suggestion("declare the dependency as a component or fix the id"));
            };
            graph.update_edge(required, dependent, ());
        }
    }

    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|node| graph.neighbors_directed(node, Direction::Incoming).count())
        .collect();
    let mut ready: BTreeSet<NodeIndex> = graph
        .node_indices()
        .filter(|node| in_degree[node.index()] == 0)
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(next) = ready.pop_first() {
        order.push(graph[next].to_string());
        for dependent in graph.neighbors_directed(next, Direction::Outgoing) {
            in_degree[dependent.index()] -= 1;
            if in_degree[dependent.index()] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if order.len() != graph.node_count() {
        let cycles: Vec<String> = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
            .map(|mut scc| {
                scc.sort();
                scc.iter()
                    .map(|node| graph[*node])
                    .collect::<Vec<_>>()
                    .join(" <-> ")
            })
            .collect();
        return Err(AppError::new(
            ErrorCategory::ValidationError,
            format!("component dependency cycle: {}", cycles.join("; ")),
        )
        .with_code("STACK-DEP-002")
        .with_suggestion("remove one of the $dependencies entries forming the cycle"));
    }

    Ok(order)
}
