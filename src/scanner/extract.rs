//! Table fact extraction
//!
//! Pattern-based recognition of table creation and table reference clauses.
//! This is deliberately not a SQL parser: subqueries, CTEs, comments and
//! quoting are beyond its reach, which matches how the batch job files it
//! targets are written.

use std::sync::LazyLock;

use regex::Regex;

/// `create table [if not exists] <name>`
static CREATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"create\s+table\s+(?:if\s+not\s+exists\s+)?(\w+)").unwrap());

/// `from`/`join` followed by an optional `schema ::` qualifier and a table name
static REQUIRE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:from|join)\s+(?:(\w+)\s*:\s*:)?\s*(\w+)").unwrap());

/// One table reference: optional schema qualifier plus table name.
///
/// `schema == None` means the reference was unqualified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub schema: Option<String>,
    pub table: String,
}

impl TableRef {
    pub fn new(schema: Option<&str>, table: &str) -> Self {
        Self {
            schema: schema.map(str::to_string),
            table: table.to_string(),
        }
    }

    /// Display form: `schema::table` when qualified, bare name otherwise.
    pub fn qualified(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}::{}", schema, self.table),
            None => self.table.clone(),
        }
    }
}

/// Extracted facts for one SQL source file.
#[derive(Debug, Clone, Default)]
pub struct TableFacts {
    /// Tables the file produces
    pub creates: Vec<String>,
    /// Tables the file reads, in reference order
    pub requires: Vec<TableRef>,
}

/// Extract created and referenced tables from SQL text.
///
/// The content is lowercased before matching, so table identity is
/// case-insensitive by construction. Idempotent and side-effect free.
pub fn extract_facts(content: &str) -> TableFacts {
    let content = content.to_lowercase();

    let creates = CREATE_RE
        .captures_iter(&content)
        .map(|caps| caps[1].to_string())
        .collect();

    let requires = REQUIRE_RE
        .captures_iter(&content)
        .map(|caps| TableRef::new(caps.get(1).map(|m| m.as_str()), &caps[2]))
        .collect();

    TableFacts { creates, requires }
}
