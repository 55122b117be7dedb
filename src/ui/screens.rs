use std::collections::HashSet;

use crate::models::Student;

/// Snapshot of the `students` table as last returned by the gateway, plus the
/// selection and search highlights layered over it. The snapshot is replaced
/// wholesale after every mutation.
#[derive(Default)]
pub(crate) struct StudentTable {
    pub(crate) rows: Vec<Student>,
    pub(crate) selected: Option<usize>,
    pub(crate) highlighted: HashSet<i64>,
}

impl StudentTable {
    pub(crate) fn new(rows: Vec<Student>) -> Self {
        Self {
            rows,
            selected: None,
            highlighted: HashSet::new(),
        }
    }

    /// Swap in a fresh snapshot. Selection follows `focus_id` first, then the
    /// previously selected record, then the previous position. Highlights are
    /// dropped because they described the old snapshot.
    pub(crate) fn replace(&mut self, rows: Vec<Student>, focus_id: Option<i64>) {
        let previous_id = self.current().map(|student| student.id);
        let previous_index = self.selected;
        self.rows = rows;
        self.highlighted.clear();

        if self.rows.is_empty() {
            self.selected = None;
            return;
        }

        for id in focus_id.into_iter().chain(previous_id) {
            if let Some(idx) = self.position_of(id) {
                self.selected = Some(idx);
                return;
            }
        }

        self.selected = previous_index.map(|idx| idx.min(self.rows.len() - 1));
    }

    /// The record bound to the selected row.
    pub(crate) fn current(&self) -> Option<&Student> {
        self.selected.and_then(|idx| self.rows.get(idx))
    }

    pub(crate) fn position_of(&self, id: i64) -> Option<usize> {
        self.rows.iter().position(|student| student.id == id)
    }

    pub(crate) fn ids(&self) -> HashSet<i64> {
        self.rows.iter().map(|student| student.id).collect()
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.rows.is_empty() {
            return;
        }
        let Some(current) = self.selected else {
            self.selected = Some(if offset < 0 { self.rows.len() - 1 } else { 0 });
            return;
        };
        let len = self.rows.len() as isize;
        let new = (current as isize + offset).clamp(0, len - 1);
        self.selected = Some(new as usize);
    }

    pub(crate) fn select_first(&mut self) {
        if !self.rows.is_empty() {
            self.selected = Some(0);
        }
    }

    pub(crate) fn select_last(&mut self) {
        if !self.rows.is_empty() {
            self.selected = Some(self.rows.len() - 1);
        }
    }

    /// Mark the displayed rows whose ids appear in `matches` and select the
    /// first of them. Returns how many matches are not in this snapshot.
    pub(crate) fn highlight(&mut self, matches: &[Student]) -> usize {
        self.highlighted.clear();
        let mut missing = 0;
        for student in matches {
            if self.position_of(student.id).is_some() {
                self.highlighted.insert(student.id);
            } else {
                missing += 1;
            }
        }
        if let Some(first) = self
            .rows
            .iter()
            .position(|student| self.highlighted.contains(&student.id))
        {
            self.selected = Some(first);
        }
        missing
    }

    pub(crate) fn clear_highlight(&mut self) -> bool {
        let had_any = !self.highlighted.is_empty();
        self.highlighted.clear();
        had_any
    }

    pub(crate) fn is_highlighted(&self, id: i64) -> bool {
        self.highlighted.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: i64, name: &str) -> Student {
        Student {
            id,
            name: name.into(),
            course: "Physics".into(),
            mobile: "555".into(),
        }
    }

    #[test]
    fn nothing_is_selected_until_the_user_moves() {
        let mut table = StudentTable::new(vec![student(1, "Ada"), student(2, "Adam")]);
        assert!(table.current().is_none());
        table.move_selection(1);
        assert_eq!(table.current().map(|s| s.id), Some(1));
        table.move_selection(5);
        assert_eq!(table.current().map(|s| s.id), Some(2));
    }

    #[test]
    fn replace_keeps_the_selected_record_not_the_row_index() {
        let mut table = StudentTable::new(vec![student(1, "Ada"), student(2, "Adam")]);
        table.select_last();
        table.replace(vec![student(0, "Zed"), student(1, "Ada"), student(2, "Adam")], None);
        assert_eq!(table.current().map(|s| s.id), Some(2));
    }

    #[test]
    fn replace_prefers_the_focus_id() {
        let mut table = StudentTable::new(vec![student(1, "Ada"), student(2, "Adam")]);
        table.select_first();
        table.replace(vec![student(1, "Ada"), student(2, "Adam")], Some(2));
        assert_eq!(table.selected, Some(1));
    }

    #[test]
    fn replace_clamps_when_the_selected_record_is_gone() {
        let mut table = StudentTable::new(vec![student(1, "Ada"), student(2, "Adam")]);
        table.select_last();
        table.replace(vec![student(1, "Ada")], None);
        assert_eq!(table.selected, Some(0));
        table.replace(Vec::new(), None);
        assert_eq!(table.selected, None);
    }

    #[test]
    fn highlight_marks_rows_by_id_and_counts_missing() {
        let mut table = StudentTable::new(vec![student(1, "Ada"), student(2, "Adam")]);
        let missing = table.highlight(&[student(2, "Adam"), student(9, "Adam")]);
        assert_eq!(missing, 1);
        assert!(table.is_highlighted(2));
        assert!(!table.is_highlighted(1));
        assert_eq!(table.selected, Some(1));
        assert!(table.clear_highlight());
        assert!(!table.clear_highlight());
    }

    #[test]
    fn replace_drops_highlights() {
        let mut table = StudentTable::new(vec![student(1, "Ada")]);
        table.highlight(&[student(1, "Ada")]);
        table.replace(vec![student(1, "Ada")], None);
        assert!(table.highlighted.is_empty());
    }
}
