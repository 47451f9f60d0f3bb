use iso_kernel::Vec3;
use iso_types::{Annotation, EntityKind, PipeSegment};
use uuid::Uuid;

use crate::types::LayoutDocument;

impl LayoutDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequential pipe name: `P-001`, `P-002`, ...
    pub fn next_name(&mut self) -> String {
        self.next_number += 1;
        format!("P-{:03}", self.next_number)
    }

    pub fn find_pipe(&self, id: Uuid) -> Option<&PipeSegment> {
        self.pipes.iter().find(|p| p.id == id)
    }

    pub fn find_pipe_mut(&mut self, id: Uuid) -> Option<&mut PipeSegment> {
        self.pipes.iter_mut().find(|p| p.id == id)
    }

    pub fn pipe_index(&self, id: Uuid) -> Option<usize> {
        self.pipes.iter().position(|p| p.id == id)
    }

    pub fn find_annotation(&self, id: Uuid) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn find_annotation_mut(&mut self, id: Uuid) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| a.id == id)
    }

    pub fn annotation_index(&self, id: Uuid) -> Option<usize> {
        self.annotations.iter().position(|a| a.id == id)
    }

    pub fn entity_kind(&self, id: Uuid) -> Option<EntityKind> {
        if self.find_pipe(id).is_some() {
            Some(EntityKind::Pipe)
        } else if self.find_annotation(id).is_some() {
            Some(EntityKind::Annotation)
        } else {
            None
        }
    }

    /// Insert a pipe, clamping the position to the list length.
    pub fn insert_pipe(&mut self, position: usize, pipe: PipeSegment) {
        let pos = position.min(self.pipes.len());
        self.pipes.insert(pos, pipe);
    }

    pub fn insert_annotation(&mut self, position: usize, annotation: Annotation) {
        let pos = position.min(self.annotations.len());
        self.annotations.insert(pos, annotation);
    }

    /// Remove every listed entity. Returns what was removed with the
    /// positions each held, ascending, so reinsertion in order restores them.
    pub fn remove_entities(
        &mut self,
        ids: &[Uuid],
    ) -> (Vec<(usize, PipeSegment)>, Vec<(usize, Annotation)>) {
        let mut pipe_positions: Vec<usize> = self
            .pipes
            .iter()
            .enumerate()
            .filter(|(_, p)| ids.contains(&p.id))
            .map(|(i, _)| i)
            .collect();
        pipe_positions.sort_unstable();

        let mut annotation_positions: Vec<usize> = self
            .annotations
            .iter()
            .enumerate()
            .filter(|(_, a)| ids.contains(&a.id))
            .map(|(i, _)| i)
            .collect();
        annotation_positions.sort_unstable();

        let mut pipes: Vec<(usize, PipeSegment)> = pipe_positions
            .iter()
            .rev()
            .map(|&i| (i, self.pipes.remove(i)))
            .collect();
        pipes.reverse();

        let mut annotations: Vec<(usize, Annotation)> = annotation_positions
            .iter()
            .rev()
            .map(|&i| (i, self.annotations.remove(i)))
            .collect();
        annotations.reverse();

        (pipes, annotations)
    }

    /// Restore entities removed by [`LayoutDocument::remove_entities`].
    pub fn restore_entities(&mut self, pipes: &[(usize, PipeSegment)], annotations: &[(usize, Annotation)]) {
        for (pos, pipe) in pipes {
            self.insert_pipe(*pos, pipe.clone());
        }
        for (pos, annotation) in annotations {
            self.insert_annotation(*pos, annotation.clone());
        }
    }

    /// Replace stored pipes with the given snapshots, matched by id.
    pub fn replace_pipes(&mut self, snapshots: &[PipeSegment]) {
        for snapshot in snapshots {
            if let Some(pipe) = self.find_pipe_mut(snapshot.id) {
                *pipe = snapshot.clone();
            }
        }
    }

    /// Move every listed entity by `delta`. Returns how many moved.
    pub fn translate(&mut self, ids: &[Uuid], delta: Vec3) -> usize {
        let mut moved = 0;
        for pipe in self.pipes.iter_mut().filter(|p| ids.contains(&p.id)) {
            pipe.translate(delta);
            moved += 1;
        }
        for annotation in self.annotations.iter_mut().filter(|a| ids.contains(&a.id)) {
            annotation.translate(delta);
            moved += 1;
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iso_kernel::Point3d;

    fn doc_with_pipes(n: usize) -> LayoutDocument {
        let mut doc = LayoutDocument::new();
        for i in 0..n {
            let name = doc.next_name();
            doc.pipes.push(PipeSegment::new(
                name,
                Point3d::new(i as f64, 0.0, 0.0),
                Point3d::new(i as f64 + 1.0, 0.0, 0.0),
                0.2,
            ));
        }
        doc
    }

    #[test]
    fn names_are_sequential() {
        let doc = doc_with_pipes(3);
        let names: Vec<&str> = doc.pipes.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["P-001", "P-002", "P-003"]);
    }

    #[test]
    fn remove_then_restore_keeps_order() {
        let mut doc = doc_with_pipes(4);
        let original: Vec<Uuid> = doc.pipes.iter().map(|p| p.id).collect();
        let (pipes, annotations) = doc.remove_entities(&[original[3], original[1]]);
        assert_eq!(doc.pipes.len(), 2);
        assert_eq!(pipes.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![1, 3]);

        doc.restore_entities(&pipes, &annotations);
        let restored: Vec<Uuid> = doc.pipes.iter().map(|p| p.id).collect();
        assert_eq!(restored, original);
    }

    #[test]
    fn translate_ignores_unknown_ids() {
        let mut doc = doc_with_pipes(1);
        let id = doc.pipes[0].id;
        let moved = doc.translate(&[id, Uuid::new_v4()], Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(moved, 1);
        assert_eq!(doc.pipes[0].start, Point3d::new(0.0, 1.0, 0.0));
        assert_eq!(doc.entity_kind(id), Some(EntityKind::Pipe));
        assert_eq!(doc.entity_kind(Uuid::new_v4()), None);
    }
}
