use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Selection cardinality; the transform handle shows for `Single` and `Multi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMode {
    None,
    Single,
    Multi,
}

/// Ordered set of selected entity ids plus the hovered entity.
///
/// Insertion order is kept; the first id is the primary selection used by
/// single-edit forms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    ids: Vec<Uuid>,
    hovered: Option<Uuid>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[Uuid] {
        &self.ids
    }

    pub fn primary(&self) -> Option<Uuid> {
        self.ids.first().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn mode(&self) -> SelectionMode {
        match self.ids.len() {
            0 => SelectionMode::None,
            1 => SelectionMode::Single,
            _ => SelectionMode::Multi,
        }
    }

    pub fn is_selected(&self, id: Uuid) -> bool {
        self.ids.contains(&id)
    }

    /// Replace the selection with `id`, or clear it for `None`. Clearing is
    /// skipped while a multi-select modifier is held. Returns whether the
    /// selection changed.
    pub fn select_single(&mut self, id: Option<Uuid>, multi_held: bool) -> bool {
        match id {
            Some(id) => {
                if self.ids.len() == 1 && self.ids[0] == id {
                    return false;
                }
                self.ids.clear();
                self.ids.push(id);
                true
            }
            None if multi_held => false,
            None => self.clear(),
        }
    }

    /// Remove `id` if selected, otherwise append it.
    pub fn toggle(&mut self, id: Uuid) {
        if let Some(pos) = self.ids.iter().position(|s| *s == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id);
        }
    }

    /// A pointer click on an entity (or on empty space for `None`): toggles
    /// with the modifier held, replaces otherwise.
    pub fn click(&mut self, id: Option<Uuid>, multi_held: bool) -> bool {
        match (id, multi_held) {
            (Some(id), true) => {
                self.toggle(id);
                true
            }
            (id, held) => self.select_single(id, held),
        }
    }

    /// Bulk replace. Duplicates are dropped, first occurrence wins.
    pub fn set(&mut self, ids: impl IntoIterator<Item = Uuid>) -> bool {
        let mut next: Vec<Uuid> = Vec::new();
        for id in ids {
            if !next.contains(&id) {
                next.push(id);
            }
        }
        if next == self.ids {
            return false;
        }
        self.ids = next;
        true
    }

    pub fn clear(&mut self) -> bool {
        if self.ids.is_empty() {
            return false;
        }
        self.ids.clear();
        true
    }

    /// Drop ids that no longer name an entity. Returns whether any were dropped.
    pub fn retain_existing(&mut self, exists: impl Fn(Uuid) -> bool) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| exists(*id));
        if let Some(h) = self.hovered {
            if !exists(h) {
                self.hovered = None;
            }
        }
        self.ids.len() != before
    }

    pub fn hovered(&self) -> Option<Uuid> {
        self.hovered
    }

    pub fn is_hovered(&self, id: Uuid) -> bool {
        self.hovered == Some(id)
    }

    /// Returns whether the hovered entity changed.
    pub fn set_hovered(&mut self, id: Option<Uuid>) -> bool {
        if self.hovered == id {
            return false;
        }
        self.hovered = id;
        true
    }
}
