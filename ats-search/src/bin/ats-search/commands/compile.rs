use anyhow::Result;
use ats_search::{Predicate, compile};
use clap::Args;
use comfy_table::{Cell, Color as TableColor, Table};
use serde::Serialize;

use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, add_table_header, themed_table};
use crate::theme::ICONS;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Inspect a Query",
        commands: &[
            "ats-search compile 'rust AND NOT php'              # Show the predicate tree",
            "ats-search compile '\"staff engineer\" OR principal'  # Phrases stay a single term",
        ],
    },
    ExampleGroup {
        title: "Scripting",
        commands: &[
            "ats-search --output json compile 'go OR rust'      # Serialized predicate",
            "ats-search --output compact compile 'NOT  php rust' # Canonical query text",
        ],
    },
];

#[derive(Args)]
pub struct CompileArgs {
    /// Boolean search query (AND, OR, NOT, "quoted phrases")
    pub query: Option<String>,
}

/// A compiled predicate, rendered as an indented tree
#[derive(Serialize)]
#[serde(transparent)]
pub struct PredicateTree(pub Predicate);

struct TreeRow {
    label: String,
    kind: &'static str,
    negated: bool,
}

impl PredicateTree {
    fn rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        collect_rows(&self.0, "", None, false, &mut rows);
        rows
    }
}

/// `is_last` is `None` for the root, which gets no branch glyph.
fn collect_rows(predicate: &Predicate, prefix: &str, is_last: Option<bool>, negated: bool, rows: &mut Vec<TreeRow>) {
    let (label, kind, children): (String, &'static str, &[Predicate]) = match predicate {
        Predicate::MatchAll => ("*".to_string(), "match all", &[][..]),
        Predicate::Term(value) => (format!("\"{value}\""), "term", &[][..]),
        Predicate::And(children) => ("AND".to_string(), "and", children.as_slice()),
        Predicate::Or(children) => ("OR".to_string(), "or", children.as_slice()),
        Predicate::Not(inner) => ("NOT".to_string(), "not", std::slice::from_ref(inner.as_ref())),
    };
    let negated = negated || matches!(predicate, Predicate::Not(_));

    let (line, child_prefix) = match is_last {
        None => (label, String::new()),
        Some(last) => {
            let branch = if last { ICONS.last_branch } else { ICONS.branch };
            let extension = if last { "   " } else { ICONS.pipe };
            (format!("{prefix}{branch} {label}"), format!("{prefix}{extension:<3}"))
        }
    };
    rows.push(TreeRow { label: line, kind, negated });

    for (index, child) in children.iter().enumerate() {
        collect_rows(child, &child_prefix, Some(index + 1 == children.len()), negated, rows);
    }
}

impl TableDisplay for PredicateTree {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options);
        add_table_header(&mut table, options, &["Predicate", "Kind"]);
        for row in self.rows() {
            let mut label = Cell::new(row.label);
            if row.negated && !options.no_color {
                label = label.fg(TableColor::Red);
            }
            table.add_row(vec![label, Cell::new(row.kind)]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.0.to_string()
    }
}

pub fn handle_compile(args: CompileArgs, output: &OutputManager) -> Result<()> {
    let predicate = compile(args.query.as_deref());
    if predicate.is_match_all() {
        output.info("Query matches every candidate");
    }
    output.display(&PredicateTree(predicate))
}
