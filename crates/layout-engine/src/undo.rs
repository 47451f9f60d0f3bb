use iso_kernel::Vec3;
use iso_types::{Annotation, PipeSegment};
use uuid::Uuid;

/// A reversible command recorded by the layout.
#[derive(Debug, Clone)]
pub enum Command {
    AddPipe {
        pipe: Box<PipeSegment>,
        position: usize,
    },
    /// Removed entities with their former positions, ascending.
    RemoveEntities {
        pipes: Vec<(usize, PipeSegment)>,
        annotations: Vec<(usize, Annotation)>,
    },
    EditPipes {
        before: Vec<PipeSegment>,
        after: Vec<PipeSegment>,
    },
    AddAnnotation {
        annotation: Annotation,
        position: usize,
    },
    EditAnnotation {
        id: Uuid,
        old_text: String,
        new_text: String,
    },
    Translate {
        ids: Vec<Uuid>,
        delta: Vec3,
    },
    ImportPipes {
        pipes: Vec<PipeSegment>,
    },
}

/// Two-stack undo/redo history.
#[derive(Debug)]
pub struct UndoStack {
    undo: Vec<Command>,
    redo: Vec<Command>,
    /// When set, the next translation starts a new entry even if it moves
    /// the same ids as the top of the stack.
    sealed: bool,
}

impl UndoStack {
    pub fn new() -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            sealed: true,
        }
    }

    /// Push a command onto the undo stack, clearing the redo stack.
    pub fn push(&mut self, cmd: Command) {
        self.sealed = !matches!(cmd, Command::Translate { .. });
        self.undo.push(cmd);
        self.redo.clear();
    }

    /// Record a translation, folding it into the previous one when it moves
    /// the same ids and the history has not been sealed since.
    pub fn push_translate(&mut self, ids: &[Uuid], delta: Vec3) {
        if !self.sealed {
            if let Some(Command::Translate {
                ids: prev_ids,
                delta: prev_delta,
            }) = self.undo.last_mut()
            {
                if prev_ids.as_slice() == ids {
                    *prev_delta += delta;
                    self.redo.clear();
                    return;
                }
            }
        }
        self.push(Command::Translate {
            ids: ids.to_vec(),
            delta,
        });
    }

    /// End the current drag gesture.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Push a command onto the undo stack without clearing redo.
    /// Used by `redo()` to re-populate the undo stack.
    pub fn push_undo_only(&mut self, cmd: Command) {
        self.sealed = true;
        self.undo.push(cmd);
    }

    pub fn pop_undo(&mut self) -> Option<Command> {
        self.sealed = true;
        self.undo.pop()
    }

    pub fn push_redo(&mut self, cmd: Command) {
        self.redo.push(cmd);
    }

    pub fn pop_redo(&mut self) -> Option<Command> {
        self.redo.pop()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_translations_coalesce() {
        let ids = vec![Uuid::new_v4()];
        let mut stack = UndoStack::new();
        stack.push_translate(&ids, Vec3::X);
        stack.push_translate(&ids, Vec3::X);
        assert_eq!(stack.undo_len(), 1);
        match stack.pop_undo() {
            Some(Command::Translate { delta, .. }) => assert_eq!(delta, Vec3::new(2.0, 0.0, 0.0)),
            other => panic!("expected translate, got {:?}", other),
        }
    }

    #[test]
    fn seal_splits_translations() {
        let ids = vec![Uuid::new_v4()];
        let mut stack = UndoStack::new();
        stack.push_translate(&ids, Vec3::X);
        stack.seal();
        stack.push_translate(&ids, Vec3::X);
        assert_eq!(stack.undo_len(), 2);
    }

    #[test]
    fn different_ids_do_not_coalesce() {
        let mut stack = UndoStack::new();
        stack.push_translate(&[Uuid::new_v4()], Vec3::X);
        stack.push_translate(&[Uuid::new_v4()], Vec3::X);
        assert_eq!(stack.undo_len(), 2);
    }

    #[test]
    fn push_clears_redo() {
        let mut stack = UndoStack::new();
        stack.push_redo(Command::Translate {
            ids: vec![],
            delta: Vec3::X,
        });
        assert!(stack.can_redo());
        stack.push_translate(&[Uuid::new_v4()], Vec3::Z);
        assert!(!stack.can_redo());
        assert!(stack.can_undo());
    }
}
