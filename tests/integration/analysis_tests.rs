//! End-to-end analysis tests: fixture directory in, dependency graph out.

use pretty_assertions::assert_eq;

use crate::common::TestContext;

#[test]
fn test_linear_chain_classification() {
    let ctx = TestContext::new();
    ctx.add_file("a.sql", "create table t1 (id int);");
    ctx.add_file("b.sql", "create table t2 as select * from t1;");

    let graph = ctx.analyze();

    let a = graph.unit_by_name("a.sql").expect("a.sql analyzed");
    let b = graph.unit_by_name("b.sql").expect("b.sql analyzed");
    assert!(a.is_base());
    assert!(!a.is_root());
    assert!(b.is_root());
    assert!(!b.is_base());
    assert!(graph.missing_tables().is_empty());

    let root_names: Vec<&str> = graph.roots().map(|u| u.name.as_str()).collect();
    assert_eq!(root_names, vec!["b.sql"]);
    let base_names: Vec<&str> = graph.bases().map(|u| u.name.as_str()).collect();
    assert_eq!(base_names, vec!["a.sql"]);
}

#[test]
fn test_missing_table_surfaces_globally() {
    let ctx = TestContext::new();
    ctx.add_file("c.sql", "create table t3 as select * from t9;");

    let graph = ctx.analyze();

    assert_eq!(graph.unit_by_name("c.sql").unwrap().missing, vec!["t9"]);
    assert_eq!(graph.missing_tables(), ["t9"]);
}

#[test]
fn test_mutual_cycle_reported_and_retained() {
    let ctx = TestContext::new();
    ctx.add_file("a.sql", "create table t1 as select * from t2;");
    ctx.add_file("b.sql", "create table t2 as select * from t1;");

    let graph = ctx.analyze();

    let a = graph.unit_by_name("a.sql").unwrap();
    let b = graph.unit_by_name("b.sql").unwrap();
    assert_eq!(a.depends_on.len(), 1);
    assert_eq!(b.depends_on.len(), 1);
    assert_eq!(a.dependents.len(), 1);
    assert_eq!(b.dependents.len(), 1);
    // Mutually dependent units leave no root behind
    assert!(graph.root_ids().is_empty());
}

#[test]
fn test_duplicate_producer_resolves_once() {
    let ctx = TestContext::new();
    ctx.add_file("a.sql", "create table t1 (id int);");
    ctx.add_file("b.sql", "create table t1 (id int);");
    ctx.add_file("c.sql", "select * from t1;");

    let graph = ctx.analyze();

    let c = graph.unit_by_name("c.sql").unwrap();
    assert_eq!(c.resolved, vec!["t1"]);
    assert!(c.missing.is_empty());
}

#[test]
fn test_completeness_propagates_transitively() {
    let ctx = TestContext::new();
    ctx.add_file("c.sql", "create table t3 as select * from t9;");
    ctx.add_file("d.sql", "create table t4 as select * from t3;");
    ctx.add_file("x.sql", "create table tx (id int);");

    let mut graph = ctx.analyze();
    graph.mark_incomplete(&["t9".to_string()]);

    assert!(!graph.unit_by_name("c.sql").unwrap().complete);
    assert!(!graph.unit_by_name("d.sql").unwrap().complete);
    assert!(graph.unit_by_name("x.sql").unwrap().complete);
}

#[test]
fn test_scan_is_case_insensitive_and_filtered() {
    let ctx = TestContext::new();
    ctx.add_file("lower.sql", "create table t1 (id int);");
    ctx.add_file("UPPER.SQL", "create table t2 (id int);");
    ctx.add_file("readme.md", "create table not_sql (id int);");

    let graph = ctx.analyze();

    assert!(graph.unit_by_name("lower.sql").is_some());
    assert!(graph.unit_by_name("UPPER.SQL").is_some());
    assert_eq!(graph.units().len(), 2);
}

#[test]
fn test_recursive_scan_uses_relative_names() {
    let ctx = TestContext::new();
    ctx.add_file("top.sql", "create table t1 (id int);");
    ctx.add_file("jobs/daily.sql", "create table t2 as select * from t1;");

    let mut options = ctx.options();
    options.recursive = true;
    let graph = sqldep::analyze_directory(&options).unwrap();

    assert_eq!(graph.units().len(), 2);
    assert!(graph.unit_by_name("jobs/daily.sql").is_some());
}

#[test]
fn test_gbk_file_analyzed_via_fallback() {
    let ctx = TestContext::new();
    // GBK-encoded comment, not valid UTF-8
    ctx.add_bytes(
        "cn.sql",
        b"-- \xc4\xe3\xba\xc3\ncreate table t1 as select * from t0;",
    );

    let graph = ctx.analyze();

    let unit = graph.unit_by_name("cn.sql").expect("decoded via fallback");
    assert_eq!(unit.creates, vec!["t1"]);
    assert_eq!(unit.missing, vec!["t0"]);
}

#[test]
fn test_unreadable_entry_is_skipped() {
    let ctx = TestContext::new();
    ctx.add_file("good.sql", "create table t1 (id int);");
    // A directory matching the pattern cannot be read as a file
    std::fs::create_dir(ctx.dir.join("bad.sql")).unwrap();

    let graph = ctx.analyze();

    assert_eq!(graph.units().len(), 1);
    assert!(graph.unit_by_name("good.sql").is_some());
}

#[test]
fn test_empty_directory_yields_empty_graph() {
    let ctx = TestContext::new();
    let graph = ctx.analyze();
    assert!(graph.units().is_empty());
    assert!(graph.root_ids().is_empty());
    assert!(graph.missing_tables().is_empty());
}

#[test]
fn test_schema_qualifier_ignored_for_matching() {
    let ctx = TestContext::new();
    ctx.add_file("a.sql", "create table fact_sales (id int);");
    ctx.add_file("b.sql", "create table report as select * from warehouse::fact_sales;");

    let graph = ctx.analyze();

    // The qualifier does not stop the internal producer from matching
    let b = graph.unit_by_name("b.sql").unwrap();
    assert_eq!(b.resolved, vec!["fact_sales"]);
    assert!(b.missing.is_empty());
    assert_eq!(b.depends_on.len(), 1);
}

#[test]
fn test_diamond_dependency_binds_each_edge_once() {
    let ctx = TestContext::new();
    ctx.add_file("base.sql", "create table t0 (id int);");
    ctx.add_file("left.sql", "create table t1 as select * from t0;");
    ctx.add_file("right.sql", "create table t2 as select * from t0;");
    ctx.add_file("top.sql", "select * from t1 join t2 on 1=1;");

    let graph = ctx.analyze();

    let base = graph.unit_by_name("base.sql").unwrap();
    assert_eq!(base.dependents.len(), 2);
    let top = graph.unit_by_name("top.sql").unwrap();
    assert_eq!(top.depends_on.len(), 2);

    // Symmetry, and no duplicate edges anywhere
    for (id, unit) in graph.units().iter().enumerate() {
        for &dep in &unit.depends_on {
            let back = graph.unit(dep);
            assert_eq!(back.dependents.iter().filter(|&&d| d == id).count(), 1);
        }
    }
}
