pub mod compile;
pub mod explain;
pub mod import;
pub mod index;
pub mod matching;
pub mod search;

use ats_search::Candidate;
use comfy_table::{Cell, Table};
use serde::Serialize;

use crate::output::{GlobalOptions, TableDisplay, add_table_header, themed_table};

/// Candidates rendered one per row
#[derive(Serialize)]
#[serde(transparent)]
pub struct CandidateList(pub Vec<Candidate>);

impl CandidateList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub(crate) fn candidate_rows(table: &mut Table, candidates: &[Candidate]) {
    for candidate in candidates {
        table.add_row(vec![
            Cell::new(&candidate.id),
            Cell::new(candidate.full_name()),
            Cell::new(&candidate.current_title),
            Cell::new(&candidate.current_company),
            Cell::new(&candidate.location),
            Cell::new(candidate.stage.as_str()),
            Cell::new(candidate.skills.join(", ")),
        ]);
    }
}

pub(crate) const CANDIDATE_HEADERS: &[&str] = &["ID", "Name", "Title", "Company", "Location", "Stage", "Skills"];

pub(crate) fn candidate_compact(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| format!("{}\t{}\t{}", c.id, c.full_name(), c.current_title))
        .collect::<Vec<_>>()
        .join("\n")
}

impl TableDisplay for CandidateList {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options);
        add_table_header(&mut table, options, CANDIDATE_HEADERS);
        candidate_rows(&mut table, &self.0);
        table
    }

    fn to_compact(&self) -> String {
        candidate_compact(&self.0)
    }
}
