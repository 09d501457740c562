use std::collections::{HashMap, HashSet};

/// One registration: an entity attached to the hierarchy under a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub entity_id: i64,
    pub kind: &'static str,
}

/// Per-course registry of entities added to the hierarchy during one run.
///
/// Modules, assignments and their files register here as they are
/// discovered; the generic Files section reads the registry afterwards to
/// skip files already represented elsewhere. Append-only during a run and
/// scoped to the lifetime of one `Synchronizer`.
#[derive(Debug, Default)]
pub struct CourseLedger {
    entries: HashMap<i64, Vec<LedgerEntry>>,
}

impl CourseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity under its owning course. Re-registering the same
    /// (course, entity, kind) triple is a no-op, so repeated runs within one
    /// process cannot inflate the ledger.
    pub fn register(&mut self, course_id: i64, entity_id: i64, kind: &'static str) {
        let entries = self.entries.entry(course_id).or_default();
        let entry = LedgerEntry { entity_id, kind };
        if !entries.contains(&entry) {
            entries.push(entry);
        }
    }

    /// Ids of every file registered under the course so far.
    pub fn file_exclusions(&self, course_id: i64) -> HashSet<i64> {
        self.entries
            .get(&course_id)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| e.kind == "file")
                    .map(|e| e.entity_id)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn entries_for(&self, course_id: i64) -> &[LedgerEntry] {
        self.entries.get(&course_id).map(Vec::as_slice).unwrap_or(&[])
    }
}
