//! Whole ORQL batches against the small LOTR dataset

use oneringdb::core::{Properties, PropertyValue};
use oneringdb::graph::NodeUpdate;
use oneringdb::{Engine, EngineConfig, ResultRows};
use std::io::Write;
use tempfile::NamedTempFile;

const LOTR_SMALL: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/lotr_small.json");

fn lotr_engine() -> Engine {
    Engine::new(EngineConfig::for_testing().dataset(LOTR_SMALL)).unwrap()
}

fn names(rows: &ResultRows) -> Vec<&str> {
    match rows {
        ResultRows::Names(rows) | ResultRows::Records(rows) => {
            rows.iter().map(String::as_str).collect()
        }
        ResultRows::Paths(_) => panic!("expected names, got paths"),
    }
}

fn paths(rows: &ResultRows) -> Vec<Vec<&str>> {
    match rows {
        ResultRows::Paths(paths) => paths
            .iter()
            .map(|path| path.iter().map(String::as_str).collect())
            .collect(),
        other => panic!("expected paths, got {:?}", other),
    }
}

#[test]
fn test_dataset_loads() {
    let engine = lotr_engine();
    assert_eq!(engine.store().node_count(), 24);
    assert_eq!(engine.store().edge_count(), 32);
    assert_eq!(engine.store().linearise().unwrap()[0], "Frodo --FRIENDS_WITH--> Sam");
}

#[test]
fn test_reads() {
    let mut engine = lotr_engine();
    let outcome = engine
        .execute(
            "READ (:Hobbit)\n\
             READ [] WHERE trust=high OR since=childhood\n\
             READ [:RULES] WHERE years=many AND missing=1\n\
             READ (Gandalf)",
        )
        .unwrap();

    assert_eq!(names(&outcome.results[0].rows), vec!["Frodo", "Sam", "Merry", "Pippin"]);

    let matched = names(&outcome.results[1].rows);
    assert_eq!(matched.len(), 5);
    assert!(matched[0].starts_with("Frodo -[FRIENDS_WITH]-> Merry"));

    assert!(outcome.results[2].rows.is_empty());
    let gandalf = names(&outcome.results[3].rows);
    assert_eq!(gandalf.len(), 1);
    assert!(gandalf[0].starts_with("Node(name=Gandalf, class=Wizard, id=n"));
    assert!(matches!(outcome.results[3].rows, ResultRows::Records(_)));
}

#[test]
fn test_link_paths() {
    let mut engine = lotr_engine();
    let outcome = engine
        .execute(
            "LINK [Frodo, \"Mordor\"]\n\
             LINK [Frodo, Mordor] MIN_LENGTH 2 MAX_LENGTH 2\n\
             LINK [Gollum, \"The One Ring\"]\n\
             LINK [Mordor, Frodo]",
        )
        .unwrap();

    assert_eq!(paths(&outcome.results[0].rows), vec![vec!["Frodo", "Mordor"]]);

    let two_hops = paths(&outcome.results[1].rows);
    assert_eq!(two_hops.len(), 2);
    assert!(two_hops.contains(&vec!["Frodo", "Sam", "Mordor"]));
    assert!(two_hops.contains(&vec!["Frodo", "The One Ring", "Mordor"]));

    assert_eq!(paths(&outcome.results[2].rows), vec![vec!["Gollum", "The One Ring"]]);
    assert!(paths(&outcome.results[3].rows).is_empty());
}

#[test]
fn test_link_ignoring_direction() {
    let mut engine = Engine::new(
        EngineConfig::for_testing()
            .dataset(LOTR_SMALL)
            .ignore_direction(true),
    )
    .unwrap();

    let outcome = engine.execute("LINK [Mordor, Frodo]").unwrap();
    assert_eq!(paths(&outcome.results[0].rows), vec![vec!["Mordor", "Frodo"]]);
}

#[test]
fn test_small_graph_link_then_delete() {
    let mut engine = Engine::in_memory();
    let outcome = engine
        .execute(
            "CREATE (A:Human)\n\
             CREATE (B:Human)\n\
             CREATE (C:Location)\n\
             CREATE [A, B:FRIENDS_WITH]\n\
             CREATE [B, C:TRAVELS_TO]\n\
             LINK [A, \"C\"]\n\
             DELETE [A, B]\n\
             LINK [A, \"C\"]",
        )
        .unwrap();

    assert_eq!(paths(&outcome.results[0].rows), vec![vec!["A", "B", "C"]]);
    assert!(paths(&outcome.results[1].rows).is_empty());
    assert_eq!(outcome.stats.rows_returned, 1);
    assert_eq!(outcome.stats.nodes_created, 3);
    assert_eq!(outcome.stats.edges_created, 2);
    assert_eq!(outcome.stats.edges_deleted, 1);
}

#[test]
fn test_two_phase_update() {
    let mut engine = lotr_engine();
    engine
        .execute(
            "UPDATE (Sam:Hobbit{age:38}) WHERE title=gardener\n\
             UPDATE [Frodo, Sam:FRIENDS_WITH{loyalty:eternal, since:1418}]",
        )
        .unwrap();

    let sam = engine.store().get_node_by_name("Sam").unwrap();
    assert_eq!(sam.get_property("age"), Some(&PropertyValue::Integer(38)));
    assert_eq!(sam.get_property("title"), Some(&PropertyValue::from("gardener")));

    let edge = engine.store().get_edge_by_nodes_names("Frodo", "Sam").unwrap();
    assert_eq!(edge.properties.get("loyalty"), Some(&PropertyValue::from("eternal")));
    assert_eq!(edge.properties.get("since"), Some(&PropertyValue::Integer(1418)));

    let err = engine.execute("UPDATE (Sam{age:39}) WHERE a=1 OR b=2").unwrap_err();
    assert!(err.is_syntax());
}

#[test]
fn test_deletes_cascade() {
    let mut engine = lotr_engine();
    let outcome = engine.execute("DELETE (Gollum)\nDELETE [:FRIENDS_WITH]").unwrap();

    assert_eq!(outcome.stats.nodes_deleted, 1);
    assert_eq!(outcome.stats.edges_deleted, 3 + 6);
    assert_eq!(engine.store().edge_count(), 32 - 9);
    assert!(engine.execute("READ (Gollum)").unwrap_err().is_not_found());
    assert!(engine.execute("READ [:FRIENDS_WITH]").unwrap().results[0].rows.is_empty());
}

#[test]
fn test_rename_rekeys_edges() {
    let mut engine = lotr_engine();
    let frodo = engine.store().get_node_by_name("Frodo").unwrap().id;
    engine
        .store_mut()
        .update_node(frodo, NodeUpdate::Name("Underhill".to_string()))
        .unwrap();

    let outcome = engine.execute("READ [Underhill, Sam]").unwrap();
    assert_eq!(
        names(&outcome.results[0].rows),
        vec!["Underhill -[FRIENDS_WITH]-> Sam {loyalty: \"unbreakable\"}"]
    );
    assert!(engine.execute("READ [Frodo, Sam]").unwrap_err().is_not_found());
    assert!(engine.execute("READ [Gandalf, Underhill]").is_ok());
}

#[test]
fn test_failing_line_keeps_earlier_mutations() {
    let mut engine = lotr_engine();
    let err = engine
        .execute(
            "CREATE (Bilbo:Hobbit{age:111})\n\
             CREATE [Bilbo, Rivendell:LIVES_IN]\n\
             UPDATE (Bilbo:Hobbit)\n\
             CREATE (Smaug:Dragon)",
        )
        .unwrap_err();

    assert!(err.is_syntax());
    assert!(engine.store().get_edge_by_nodes_names("Bilbo", "Rivendell").is_ok());
    assert!(engine.store().get_node_by_name("Smaug").is_err());
}

#[test]
fn test_bad_header_runs_nothing() {
    let mut engine = lotr_engine();
    let err = engine.execute("CREATE (X:Human{})\nBAD_LINE").unwrap_err();

    assert!(err.is_syntax());
    assert!(engine.store().get_node_by_name("X").is_err());
}

#[test]
fn test_hubs_and_display_flags() {
    let mut engine = lotr_engine();
    assert!(engine.execute("READ (:Hubs)").unwrap().results[0].rows.is_empty());

    let frodo = engine.store().get_node_by_name("Frodo").unwrap().id;
    engine.store_mut().set_hub(frodo, true).unwrap();
    let outcome = engine
        .execute("-- after clustering\nCLUSTER\nLINEARISE\nREAD (:Hubs)")
        .unwrap();

    assert_eq!(names(&outcome.results[0].rows), vec!["Frodo"]);
    assert_eq!(outcome.results[0].line_no, 4);
    assert!(engine.flags().cluster);
    assert!(engine.flags().linearise);
    assert!(!engine.flags().color);

    let views = engine.store().node_views();
    assert!(views.iter().any(|view| view.name == "Frodo" && view.hub));
}

#[test]
fn test_unicode_names() {
    let mut engine = Engine::in_memory();
    let outcome = engine
        .execute(
            "CREATE (Éowyn:Human{title:Shieldmaiden})\n\
             CREATE (Théoden:Human)\n\
             CREATE [Éowyn, Théoden:SERVES]\n\
             READ (Éowyn)\n\
             LINK [Éowyn, Théoden]",
        )
        .unwrap();

    assert!(names(&outcome.results[0].rows)[0].starts_with("Node(name=Éowyn, class=Human"));
    assert_eq!(paths(&outcome.results[1].rows), vec![vec!["Éowyn", "Théoden"]]);
}

#[test]
fn test_duplicate_names_keep_newest_edge_reachable() {
    let mut engine = Engine::in_memory();
    engine
        .execute(
            "CREATE (Frodo:Hobbit)\n\
             CREATE (Frodo:Hobbit)\n\
             CREATE (Bag:Location)",
        )
        .unwrap();
    let frodos: Vec<_> = engine
        .store()
        .get_nodes_by_name_prefix("Frodo")
        .unwrap()
        .iter()
        .map(|node| node.id)
        .collect();
    let bag = engine.store().get_node_by_name("Bag").unwrap().id;

    let store = engine.store_mut();
    store.create_edge(frodos[0], bag, Some("LIVES_IN"), Properties::new()).unwrap();
    let newer = store.create_edge(frodos[1], bag, Some("VISITS"), Properties::new()).unwrap();
    store
        .update_node(frodos[0], NodeUpdate::Name("Bilbo".to_string()))
        .unwrap();

    let outcome = engine.execute("READ [Frodo, Bag]\nREAD [Bilbo, Bag]").unwrap();
    assert_eq!(names(&outcome.results[0].rows), vec!["Frodo -[VISITS]-> Bag"]);
    assert_eq!(names(&outcome.results[1].rows), vec!["Bilbo -[LIVES_IN]-> Bag"]);
    assert_eq!(engine.store().get_edge_by_nodes_names("Frodo", "Bag").unwrap().id, newer);
}

#[test]
fn test_engine_from_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    let config = serde_json::json!({ "dataset": LOTR_SMALL, "ignore_direction": true });
    write!(file, "{}", config).unwrap();

    let config = EngineConfig::from_json_file(file.path()).unwrap();
    assert!(config.ignore_direction);
    assert_eq!(config.log_level, "info");

    let mut engine = Engine::new(config).unwrap();
    let outcome = engine.execute("LINK [Mordor, Frodo]\nREAD (Frodo)").unwrap();
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["results"][0]["rows"]["kind"], "paths");
    assert_eq!(json["results"][0]["rows"]["rows"][0][1], "Frodo");
    assert_eq!(json["results"][1]["rows"]["kind"], "records");
    assert_eq!(json["stats"]["lines_executed"], 2);
}
