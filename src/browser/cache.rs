use crate::types::InteractiveItem;

/// Items from the most recent listing, addressable by `id`.
///
/// Ids are positions in the current list. Every `replace` renumbers from 0 and
/// every `invalidate` forgets the list entirely; ids are never carried across.
#[derive(Debug, Default)]
pub struct InteractionCache {
    items: Vec<InteractiveItem>,
}

impl InteractionCache {
    /// Swap in a fresh listing, renumbering ids `0..n-1`
    pub fn replace(&mut self, items: Vec<InteractiveItem>) {
        self.items = items
            .into_iter()
            .enumerate()
            .map(|(id, item)| InteractiveItem { id, ..item })
            .collect();
    }

    pub fn invalidate(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, id: usize) -> Option<&InteractiveItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[InteractiveItem] {
        &self.items
    }
}
