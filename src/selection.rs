use crate::domain::record::MailRecord;

/// The most recently loaded records and the subset the user picked.
///
/// Selection is kept in the order records were picked and never holds a
/// record that is not in `items`.
#[derive(Debug, Default, Clone)]
pub struct SelectableList {
    items: Vec<MailRecord>,
    selected: Vec<MailRecord>,
}

impl SelectableList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list. Selection always starts empty.
    pub fn load(&mut self, items: Vec<MailRecord>) {
        self.items = items;
        self.selected.clear();
    }

    /// Select if absent, deselect if present. Returns `false` for a record
    /// that is not part of the loaded list.
    pub fn toggle(&mut self, record: &MailRecord) -> bool {
        if !self.items.contains(record) {
            return false;
        }
        if let Some(pos) = self.selected.iter().position(|r| r == record) {
            self.selected.remove(pos);
        } else {
            self.selected.push(record.clone());
        }
        true
    }

    /// Toggle the record shown at `index`.
    pub fn toggle_at(&mut self, index: usize) -> bool {
        match self.items.get(index).cloned() {
            Some(rec) => self.toggle(&rec),
            None => false,
        }
    }

    pub fn select_all(&mut self) {
        for rec in &self.items {
            if !self.selected.contains(rec) {
                self.selected.push(rec.clone());
            }
        }
    }

    /// Empty the selection; the list stays.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, record: &MailRecord) -> bool {
        self.selected.contains(record)
    }

    pub fn selected_message_ids(&self) -> Vec<String> {
        self.selected.iter().map(|r| r.message_id.clone()).collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn records(&self) -> &[MailRecord] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
