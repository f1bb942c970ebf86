//! ORQL batch executor
//!
//! A batch is validated header-first: every non-blank line must start with one
//! of the command keywords or `--` before anything runs. Lines then execute in
//! order, each parsed against the store as left by the previous line. The
//! first failure aborts the batch; earlier mutations stay applied.

use crate::grammar::PathSearch;
use crate::lexer::first_token;
use crate::parser::{
    Command, EdgeSelection, NodeSelection, edge_properties_update, node_properties_update,
    parse_line,
};
use crate::session::DisplayFlags;
use onering_core::filter::accepts;
use onering_core::{Direction, Error, NodeId, PropertyFilter, Result};
use onering_graph::{AdjacencyView, GraphStore, all_simple_paths, shortest_path};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

const COMMENT_PREFIX: &str = "--";

/// Executor settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorOptions {
    /// Adjacency view used by LINK
    pub direction: Direction,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Outgoing,
        }
    }
}

impl ExecutorOptions {
    /// Traverse the raw symmetric adjacency instead of following edge direction
    pub fn ignoring_direction(mut self, ignore: bool) -> Self {
        self.direction = if ignore {
            Direction::Both
        } else {
            Direction::Outgoing
        };
        self
    }
}

/// Rows produced by a READ or LINK line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "snake_case")]
pub enum ResultRows {
    /// Node names
    Names(Vec<String>),
    /// One rendered node or edge per row
    Records(Vec<String>),
    /// Paths as node names
    Paths(Vec<Vec<String>>),
}

impl ResultRows {
    pub fn len(&self) -> usize {
        match self {
            ResultRows::Names(rows) | ResultRows::Records(rows) => rows.len(),
            ResultRows::Paths(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Payload of one READ or LINK line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub line_no: usize,
    pub line: String,
    /// Human-readable description of what was selected
    pub label: String,
    pub rows: ResultRows,
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.label)?;
        match &self.rows {
            ResultRows::Names(rows) | ResultRows::Records(rows) => {
                for row in rows {
                    writeln!(f, "  {}", row)?;
                }
            }
            ResultRows::Paths(paths) => {
                for path in paths {
                    writeln!(f, "  {}", path.join(" -> "))?;
                }
            }
        }
        Ok(())
    }
}

/// Execution statistics for a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionStats {
    pub nodes_created: u64,
    pub nodes_deleted: u64,
    pub edges_created: u64,
    pub edges_deleted: u64,
    pub properties_set: u64,
    pub rows_returned: u64,
    pub lines_executed: u64,
    pub execution_time_ms: u64,
}

/// Everything a batch produced
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub results: Vec<QueryResult>,
    pub stats: ExecutionStats,
}

/// Query executor
#[derive(Debug, Clone, Default)]
pub struct QueryExecutor {
    options: ExecutorOptions,
}

impl QueryExecutor {
    /// Create a new query executor
    pub fn new(options: ExecutorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExecutorOptions {
        &self.options
    }

    /// Execute a batch of ORQL lines against the store
    pub fn execute(
        &self,
        batch: &str,
        store: &mut GraphStore,
        flags: &mut DisplayFlags,
    ) -> Result<BatchOutcome> {
        let start = Instant::now();
        let lines = clean_batch(batch)?;
        let mut outcome = BatchOutcome::default();

        for (line_no, line) in lines {
            debug!("Executing line {}: {}", line_no, line);
            let result = self
                .execute_line(line, store, flags, &mut outcome.stats)
                .map_err(|err| err.at_line(line_no, line))?;

            outcome.stats.lines_executed += 1;
            if let Some((label, rows)) = result {
                outcome.stats.rows_returned += rows.len() as u64;
                outcome.results.push(QueryResult {
                    line_no,
                    line: line.to_string(),
                    label,
                    rows,
                });
            }
        }

        outcome.stats.execution_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Executed {} lines: +{} nodes, -{} nodes, +{} edges, -{} edges, {} properties set, \
             {} rows",
            outcome.stats.lines_executed,
            outcome.stats.nodes_created,
            outcome.stats.nodes_deleted,
            outcome.stats.edges_created,
            outcome.stats.edges_deleted,
            outcome.stats.properties_set,
            outcome.stats.rows_returned
        );
        Ok(outcome)
    }

    fn execute_line(
        &self,
        line: &str,
        store: &mut GraphStore,
        flags: &mut DisplayFlags,
        stats: &mut ExecutionStats,
    ) -> Result<Option<(String, ResultRows)>> {
        match parse_line(line, store)? {
            Command::CreateNode {
                name,
                class,
                properties,
            } => {
                store.create_node(name, class.as_deref(), properties);
                stats.nodes_created += 1;
                Ok(None)
            }
            Command::CreateEdge {
                source,
                target,
                class,
                properties,
            } => {
                store.create_edge(source, target, class.as_deref(), properties)?;
                stats.edges_created += 1;
                Ok(None)
            }
            Command::ReadNodes { selection, filter } => {
                read_nodes(store, selection, filter.as_ref()).map(Some)
            }
            Command::ReadEdges { selection, filter } => {
                read_edges(store, selection, filter.as_ref()).map(Some)
            }
            Command::UpdateNode {
                id,
                applied,
                pending,
            } => {
                stats.properties_set += applied as u64;
                if let Some(pending) = pending {
                    stats.properties_set += pending.len() as u64;
                    store.update_node(id, node_properties_update(pending)?)?;
                }
                Ok(None)
            }
            Command::UpdateEdge {
                id,
                applied,
                pending,
            } => {
                stats.properties_set += applied as u64;
                if let Some(pending) = pending {
                    stats.properties_set += pending.len() as u64;
                    store.update_edge(id, edge_properties_update(pending)?)?;
                }
                Ok(None)
            }
            Command::DeleteNode(id) => {
                let incident = store.get_incident_edges(id).len() as u64;
                store.delete_node(id)?;
                stats.nodes_deleted += 1;
                stats.edges_deleted += incident;
                Ok(None)
            }
            Command::DeleteEdges(ids) => {
                for id in ids {
                    store.delete_edge(id)?;
                    stats.edges_deleted += 1;
                }
                Ok(None)
            }
            Command::Link {
                source,
                target,
                search,
            } => self.link(store, source, target, search).map(Some),
            Command::Display { flag, enabled } => {
                flags.set(flag, enabled);
                debug!("Display flag {:?} set to {}", flag, enabled);
                Ok(None)
            }
        }
    }

    fn link(
        &self,
        store: &GraphStore,
        source: NodeId,
        target: NodeId,
        search: PathSearch,
    ) -> Result<(String, ResultRows)> {
        let view = AdjacencyView::from_store(store, self.options.direction);
        let (source_name, target_name) = (store.node_name(source)?, store.node_name(target)?);

        let (label, paths) = match search {
            PathSearch::Shortest => {
                // An unreachable target yields no rows
                let path = shortest_path(&view, source, target);
                let found = Some(path).filter(|path| !path.is_empty());
                (
                    format!("Shortest path from {} to {}", source_name, target_name),
                    found.into_iter().collect(),
                )
            }
            PathSearch::AllSimple(bounds) => (
                format!("Paths from {} to {}", source_name, target_name),
                all_simple_paths(&view, source, target, bounds),
            ),
        };

        let paths = paths
            .iter()
            .map(|path| name_path(store, path))
            .collect::<Result<Vec<_>>>()?;
        Ok((label, ResultRows::Paths(paths)))
    }
}

/// Split a batch into `(line number, trimmed line)` pairs, checking every
/// header first. Blank and comment lines are dropped; numbering is 1-based
/// over the raw lines.
pub fn clean_batch(batch: &str) -> Result<Vec<(usize, &str)>> {
    let lines: Vec<(usize, &str)> = batch
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect();

    if let Some((line_no, line)) = lines.iter().find(|(_, line)| !has_valid_header(line)) {
        return Err(Error::syntax(
            *line,
            format!("line {} does not start with a query command", line_no),
        ));
    }

    Ok(lines
        .into_iter()
        .filter(|(_, line)| !line.starts_with(COMMENT_PREFIX))
        .collect())
}

fn has_valid_header(line: &str) -> bool {
    line.starts_with(COMMENT_PREFIX) || first_token(line).is_some_and(|token| token.is_command())
}

fn read_nodes(
    store: &GraphStore,
    selection: NodeSelection,
    filter: Option<&PropertyFilter>,
) -> Result<(String, ResultRows)> {
    let (label, nodes) = match selection {
        NodeSelection::All => ("All nodes".to_string(), store.get_all_nodes(filter)),
        NodeSelection::Class(class) => (
            format!("Nodes of class {}", class),
            store.get_nodes_by_class(&class, filter),
        ),
        NodeSelection::Hubs => {
            let hubs = store.get_nodes_by_hub(filter);
            if hubs.is_empty() {
                warn!("No hub nodes found; has clustering been run on this graph?");
            }
            ("Hub nodes".to_string(), hubs)
        }
        NodeSelection::Node(id) => {
            let node = store.get_node(id)?;
            let label = with_filter(format!("Node {}", node.name), filter);
            let records = if accepts(filter, &node.properties) {
                vec![node.to_string()]
            } else {
                Vec::new()
            };
            return Ok((label, ResultRows::Records(records)));
        }
    };

    let names = nodes.iter().map(|node| node.name.clone()).collect();
    Ok((with_filter(label, filter), ResultRows::Names(names)))
}

fn read_edges(
    store: &GraphStore,
    selection: EdgeSelection,
    filter: Option<&PropertyFilter>,
) -> Result<(String, ResultRows)> {
    let (label, edges) = match selection {
        EdgeSelection::All => ("All edges".to_string(), store.get_all_edges(filter)),
        EdgeSelection::Class(class) => (
            format!("Edges of class {}", class),
            store.get_edges_by_class(&class, filter),
        ),
        EdgeSelection::Edge(id) => {
            let edge = store.get_edge(id)?;
            let label = format!(
                "Edge {} -> {}",
                store.node_name(edge.source)?,
                store.node_name(edge.target)?
            );
            let matched = if accepts(filter, &edge.properties) {
                vec![edge]
            } else {
                Vec::new()
            };
            (label, matched)
        }
    };

    let records = edges
        .into_iter()
        .map(|edge| store.describe_edge(edge))
        .collect::<Result<Vec<_>>>()?;
    Ok((with_filter(label, filter), ResultRows::Records(records)))
}

fn with_filter(label: String, filter: Option<&PropertyFilter>) -> String {
    match filter {
        Some(filter) => format!("{} matching {}", label, filter),
        None => label,
    }
}

fn name_path(store: &GraphStore, path: &[NodeId]) -> Result<Vec<String>> {
    path.iter()
        .map(|id| store.node_name(*id).map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::DisplayFlag;
    use onering_core::{Properties, PropertyValue};

    fn create_test_store() -> GraphStore {
        let mut store = GraphStore::new();
        let a = store.create_node("A", Some("Human"), Properties::new());
        let b = store.create_node("B", Some("Human"), Properties::with("region", "Gondor"));
        let c = store.create_node("C", Some("Location"), Properties::new());
        store.create_edge(a, b, Some("FRIENDS_WITH"), Properties::new()).unwrap();
        store.create_edge(b, c, Some("TRAVELS_TO"), Properties::new()).unwrap();
        store
    }

    fn run(store: &mut GraphStore, batch: &str) -> Result<BatchOutcome> {
        let mut flags = DisplayFlags::new();
        QueryExecutor::default().execute(batch, store, &mut flags)
    }

    fn paths(outcome: &BatchOutcome, index: usize) -> &Vec<Vec<String>> {
        match &outcome.results[index].rows {
            ResultRows::Paths(paths) => paths,
            other => panic!("expected paths, got {:?}", other),
        }
    }

    #[test]
    fn test_link_then_delete_edge() {
        let mut store = create_test_store();
        let outcome = run(&mut store, "LINK [A, \"C\"]\nDELETE [A, B]\nLINK [A, \"C\"]").unwrap();

        assert_eq!(paths(&outcome, 0), &vec![vec!["A".to_string(), "B".into(), "C".into()]]);
        assert!(paths(&outcome, 1).is_empty());
        assert_eq!(outcome.stats.edges_deleted, 1);
        assert_eq!(outcome.stats.rows_returned, 1);
        assert_eq!(outcome.stats.lines_executed, 3);
    }

    #[test]
    fn test_link_respects_direction_unless_ignored() {
        let mut store = create_test_store();
        let outcome = run(&mut store, "LINK [C, A]").unwrap();
        assert!(paths(&outcome, 0).is_empty());
        assert_eq!(outcome.stats.rows_returned, 0);

        let executor = QueryExecutor::new(ExecutorOptions::default().ignoring_direction(true));
        let outcome = executor
            .execute("LINK [C, A]", &mut store, &mut DisplayFlags::new())
            .unwrap();
        assert_eq!(paths(&outcome, 0), &vec![vec!["C".to_string(), "B".into(), "A".into()]]);
    }

    #[test]
    fn test_link_all_paths_with_bounds() {
        let mut store = create_test_store();
        let a = store.get_node_by_name("A").unwrap().id;
        let c = store.get_node_by_name("C").unwrap().id;
        store.create_edge(a, c, Some("KNOWS"), Properties::new()).unwrap();

        let outcome = run(&mut store, "LINK [A, C] ALL\nLINK [A, C] MIN_LENGTH 2").unwrap();
        assert_eq!(paths(&outcome, 0).len(), 2);
        assert_eq!(paths(&outcome, 0)[0], vec!["A".to_string(), "C".into()]);
        assert_eq!(paths(&outcome, 1), &vec![vec!["A".to_string(), "B".into(), "C".into()]]);
        assert_eq!(outcome.results[1].label, "Paths from A to C");
    }

    #[test]
    fn test_reads_with_filters() {
        let mut store = create_test_store();
        let outcome = run(
            &mut store,
            "READ (:Human)\n\
             READ () WHERE region=Gondor\n\
             READ (A) WHERE region=Gondor\n\
             READ [:TRAVELS_TO]",
        )
        .unwrap();

        assert_eq!(outcome.results[0].rows, ResultRows::Names(vec!["A".into(), "B".into()]));
        assert_eq!(outcome.results[0].label, "Nodes of class Human");
        assert_eq!(outcome.results[1].rows, ResultRows::Names(vec!["B".into()]));
        assert!(outcome.results[1].label.starts_with("All nodes matching"));
        assert!(outcome.results[2].rows.is_empty());
        assert_eq!(
            outcome.results[3].rows,
            ResultRows::Records(vec!["B -[TRAVELS_TO]-> C".into()])
        );
        assert_eq!(outcome.stats.rows_returned, 4);
    }

    #[test]
    fn test_single_node_read_renders_record() {
        let mut store = create_test_store();
        let outcome = run(&mut store, "READ (B)\nREAD (B) WHERE region=Shire").unwrap();

        match &outcome.results[0].rows {
            ResultRows::Records(records) => {
                assert_eq!(records.len(), 1);
                assert!(records[0].starts_with(
                    "Node(name=B, class=Human, id=n2, properties={region: \"Gondor\"}"
                ));
            }
            other => panic!("expected a node record, got {:?}", other),
        }
        assert_eq!(outcome.results[0].label, "Node B");
        assert_eq!(outcome.results[1].rows, ResultRows::Records(Vec::new()));
        assert_eq!(outcome.stats.rows_returned, 1);
    }

    #[test]
    fn test_empty_hub_read_is_not_an_error() {
        let mut store = create_test_store();
        let outcome = run(&mut store, "READ (:Hubs)").unwrap();
        assert!(outcome.results[0].rows.is_empty());

        let b = store.get_node_by_name("B").unwrap().id;
        store.set_hub(b, true).unwrap();
        let outcome = run(&mut store, "READ (:Hubs)").unwrap();
        assert_eq!(outcome.results[0].rows, ResultRows::Names(vec!["B".into()]));
    }

    #[test]
    fn test_update_applies_both_passes() {
        let mut store = create_test_store();
        let outcome = run(&mut store, "UPDATE (A{age:30}) WHERE title=Steward AND age=31").unwrap();

        let a = store.get_node_by_name("A").unwrap();
        assert_eq!(a.get_property("age"), Some(&PropertyValue::Integer(31)));
        assert_eq!(a.get_property("title"), Some(&PropertyValue::from("Steward")));
        assert_eq!(outcome.stats.properties_set, 3);
    }

    #[test]
    fn test_invalid_header_rejects_whole_batch() {
        let mut store = create_test_store();
        let err = run(&mut store, "CREATE (X:Human{})\nBAD_LINE").unwrap_err();

        assert!(err.is_syntax());
        assert!(store.get_node_by_name("X").is_err());
    }

    #[test]
    fn test_failure_keeps_earlier_mutations() {
        let mut store = create_test_store();
        let err = run(&mut store, "CREATE (X:Human{})\nREAD (X\nCREATE (Y)").unwrap_err();

        assert!(err.is_syntax());
        assert!(store.get_node_by_name("X").is_ok());
        assert!(store.get_node_by_name("Y").is_err());
    }

    #[test]
    fn test_resolution_errors_carry_line_number() {
        let mut store = create_test_store();
        let err = run(&mut store, "\n-- friends\nCREATE [A, Nobody]").unwrap_err();

        assert!(err.is_not_found());
        assert!(matches!(err, Error::AtLine { line_no: 3, .. }));
    }

    #[test]
    fn test_display_flags_and_comments() {
        let mut store = create_test_store();
        let mut flags = DisplayFlags::new();
        QueryExecutor::default()
            .execute("-- toggle\nCOLOR\nCLUSTER\nCLUSTER NOT", &mut store, &mut flags)
            .unwrap();

        assert!(flags.get(DisplayFlag::Color));
        assert!(!flags.get(DisplayFlag::Cluster));
    }

    #[test]
    fn test_clean_batch() {
        let lines = clean_batch("  READ ()  \n\n-- note\n\tLINEARISE").unwrap();
        assert_eq!(lines, vec![(1, "READ ()"), (4, "LINEARISE")]);

        assert!(clean_batch("read ()").unwrap_err().is_syntax());
        assert!(clean_batch("").unwrap().is_empty());
    }

    #[test]
    fn test_delete_node_counts_incident_edges() {
        let mut store = create_test_store();
        let outcome = run(&mut store, "DELETE (B)").unwrap();

        assert_eq!(outcome.stats.nodes_deleted, 1);
        assert_eq!(outcome.stats.edges_deleted, 2);
        assert_eq!(store.edge_count(), 0);
    }

    #[test]
    fn test_outcome_serializes() {
        let mut store = create_test_store();
        let outcome = run(&mut store, "READ [A, B]\nLINK [A, C]").unwrap();
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["results"][0]["rows"]["kind"], "records");
        assert_eq!(json["results"][0]["label"], "Edge A -> B");
        assert_eq!(json["results"][1]["rows"]["rows"][0][2], "C");
        assert_eq!(json["stats"]["lines_executed"], 2);
    }
}
