//! Read-only rendering of graph query results
//!
//! Every function here formats the answer to one query as a string and
//! leaves the graph untouched. Tree walks follow `depends_on` edges and
//! guard against cycles, so rendering terminates even when binding
//! reported mutually dependent units.

use std::collections::HashSet;

use crate::error::SqlDepError;
use crate::graph::{DependencyGraph, DependencyUnit, UnitId};

/// The whole forest: summary header plus one tree per root.
///
/// With `block_incomplete` set, trees whose root lost its `complete` flag
/// are counted but not rendered.
pub fn render_forest(graph: &DependencyGraph, block_incomplete: bool) -> String {
    let total = graph.root_ids().len();
    let failed = graph.roots().filter(|root| !root.complete).count();
    let shown = if block_incomplete { total - failed } else { total };

    let mut out = String::new();
    out.push_str(&format!(
        "There are {} trees in total, in which {} trees failed\n",
        total, failed
    ));
    out.push_str(&format!("showing {} trees\n", shown));
    out.push_str("Each tree's Root is marked by '*'\n");

    for &root in graph.root_ids() {
        if block_incomplete && !graph.unit(root).complete {
            continue;
        }
        out.push_str(&render_tree(graph, root));
    }
    out
}

/// Waterfall-style tree below one root, deepest dependencies last.
///
/// The root is marked `*`; each level of depth adds a `\t |` rail. A unit
/// reached through two parents is printed under each of them, but a unit
/// already on the current descent path is not re-entered.
pub fn render_tree(graph: &DependencyGraph, root: UnitId) -> String {
    let mut out = String::new();
    let mut path = Vec::new();
    descend(graph, root, 0, &mut path, &mut out);
    out
}

fn descend(
    graph: &DependencyGraph,
    id: UnitId,
    depth: usize,
    path: &mut Vec<UnitId>,
    out: &mut String,
) {
    let prefix = if depth == 0 { "*" } else { "" };
    out.push_str(&format!(
        "{}{} {}\n",
        prefix,
        "\t |".repeat(depth),
        graph.unit(id).name
    ));

    if path.contains(&id) {
        return;
    }
    path.push(id);
    for &dep in &graph.unit(id).depends_on {
        descend(graph, dep, depth + 1, path, out);
    }
    path.pop();
}

/// Breadth-first layering below one root: layer 0 is the final task, each
/// further layer must run before the one above it.
pub fn render_layers(graph: &DependencyGraph, root: UnitId) -> String {
    let mut out = String::from("Layer 0 is the final task\n");
    let mut emitted = HashSet::new();
    let mut layer = vec![root];
    emitted.insert(root);
    let mut depth = 1;

    while !layer.is_empty() {
        out.push_str(&format!("=======Layer{} start=======\n", depth));
        let mut next = Vec::new();
        for &id in &layer {
            out.push_str(&graph.unit(id).name);
            out.push('\n');
            for &dep in &graph.unit(id).depends_on {
                if emitted.insert(dep) {
                    next.push(dep);
                }
            }
        }
        layer = next;
        depth += 1;
    }
    out.push_str("========Leaf Tasks========\n");
    out
}

/// One tree, chosen by the index printed by [`render_roots`].
pub fn render_tree_by_root_index(
    graph: &DependencyGraph,
    index: usize,
) -> Result<String, SqlDepError> {
    let count = graph.root_ids().len();
    let &root = graph
        .root_ids()
        .get(index)
        .ok_or(SqlDepError::RootIndexOutOfRange { index, count })?;
    Ok(render_tree(graph, root))
}

/// Numbered listing of the units that should be executed last.
pub fn render_roots(graph: &DependencyGraph) -> String {
    render_task_list(
        "following SQL should be executed At Last",
        "Final Tasks",
        graph.roots(),
    )
}

/// Numbered listing of the units that can safely be executed first.
pub fn render_bases(graph: &DependencyGraph) -> String {
    render_task_list(
        "following SQL can be executed Firstly safely",
        "Base Tasks",
        graph.bases(),
    )
}

fn render_task_list<'a>(
    header: &str,
    footer: &str,
    units: impl Iterator<Item = &'a DependencyUnit>,
) -> String {
    let mut out = format!("{}\n", header);
    let mut count = 0;
    for unit in units {
        out.push_str(&format!("[ {} ] {}\n", count, unit.name));
        count += 1;
    }
    out.push_str(&format!("{}: {}\n", footer, count));
    out
}

/// All tables required somewhere but created by no analyzed file.
pub fn render_missing(graph: &DependencyGraph) -> String {
    let mut out = String::new();
    for table in graph.missing_tables() {
        out.push_str(table);
        out.push('\n');
    }
    out
}

/// Detail for one analyzed file: what it creates, which references were
/// resolved internally, and what stays missing.
pub fn render_unit_detail(graph: &DependencyGraph, name: &str) -> Result<String, SqlDepError> {
    let unit = graph
        .unit_by_name(name)
        .ok_or_else(|| SqlDepError::UnknownFile {
            name: name.to_string(),
        })?;
    Ok(render_unit(unit))
}

fn render_unit(unit: &DependencyUnit) -> String {
    let uses: Vec<String> = unit
        .requires
        .iter()
        .filter(|r| !unit.unresolved.contains(&r.table))
        .map(|r| r.qualified())
        .collect();

    format!(
        "Filename: {}\nCreates: {}\nUses: {}\nMissing: {}\n",
        unit.name,
        unit.creates.join(", "),
        uses.join(", "),
        unit.missing.join(", ")
    )
}

/// Which analyzed files create `table`.
pub fn render_find(graph: &DependencyGraph, table: &str) -> String {
    let found = graph.find_table(table);
    if found.is_empty() {
        return "Table Not Found\n".to_string();
    }
    found
        .iter()
        .map(|unit| format!("Table found in {}\n", unit.name))
        .collect()
}

/// Detail for every bottleneck unit (incomplete, but all of its direct
/// dependencies complete).
pub fn render_bottlenecks(graph: &DependencyGraph) -> String {
    graph
        .bottlenecks()
        .into_iter()
        .map(render_unit)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drop statements for a generate target: `drop-all`, `drop-mid`, or the
/// name of one analyzed file.
pub fn render_drops(graph: &DependencyGraph, target: &str) -> Result<String, SqlDepError> {
    let statements = match target {
        "drop-all" => graph.drop_statements_all(),
        "drop-mid" => graph.drop_statements_mid(),
        name => match graph.drop_statements_for(name) {
            Ok(statements) => statements,
            Err(SqlDepError::UnknownFile { .. }) => {
                return Err(SqlDepError::UnknownGenerateTarget {
                    target: target.to_string(),
                })
            }
            Err(err) => return Err(err),
        },
    };

    let mut out = String::new();
    for statement in statements {
        out.push_str(&statement);
        out.push('\n');
    }
    Ok(out)
}
