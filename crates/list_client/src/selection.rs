use std::collections::BTreeSet;

use shared::domain::{Record, RecordId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<RecordId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, id: RecordId) -> bool {
        self.ids.insert(id)
    }

    pub fn deselect(&mut self, id: RecordId) -> bool {
        self.ids.remove(&id)
    }

    pub fn toggle(&mut self, id: RecordId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn select_all<'a>(&mut self, records: impl IntoIterator<Item = &'a Record>) {
        self.ids.extend(records.into_iter().map(|record| record.id));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> Vec<RecordId> {
        self.ids.iter().copied().collect()
    }

}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phrasing {
    pub determiner: &'static str,
    pub noun: &'static str,
}

pub fn pluralize(count: usize) -> Phrasing {
    if count == 1 {
        Phrasing {
            determiner: "this",
            noun: "item",
        }
    } else {
        Phrasing {
            determiner: "these",
            noun: "items",
        }
    }
}

pub fn confirmation_prompt(count: usize) -> String {
    let phrasing = pluralize(count);
    format!(
        "Do you want to delete {} {}?",
        phrasing.determiner, phrasing.noun
    )
}

pub fn selection_summary(count: usize) -> String {
    format!("Selected {count} items")
}
