pub mod classify;
pub mod rebuild;
pub mod resolve;
pub mod tree;
pub mod types;
pub mod undo;

pub use classify::{classify, ElbowCurve, Fitting, FittingShape, JunctionKind, TrimCut};
pub use rebuild::{FittingCounts, Topology, Trim, VisibleSpan};
pub use resolve::{resolve, JunctionEntry, JunctionKey, JunctionMap, JunctionNode};
pub use types::{EngineError, LayoutDocument, TopologyConfig};
pub use undo::{Command, UndoStack};

use iso_kernel::{Point3d, Tolerance, Vec3};
use iso_types::{Annotation, EntityKind, PipePatch, PipeSegment};
use tracing::{debug, warn};
use uuid::Uuid;

/// The operations interactive tools use to change a layout.
///
/// Tools only ever see the layout through this trait, so a host can route
/// commits through its own store instead of [`Layout`].
pub trait LayoutCommands {
    fn pipes(&self) -> &[PipeSegment];
    fn annotations(&self) -> &[Annotation];
    fn add_pipe(&mut self, start: Point3d, end: Point3d) -> Result<Uuid, EngineError>;
    fn update_pipe(&mut self, id: Uuid, patch: &PipePatch) -> Result<(), EngineError>;
    fn update_pipes_batch(&mut self, ids: &[Uuid], patch: &PipePatch) -> Result<(), EngineError>;
    fn delete_pipes(&mut self, ids: &[Uuid]) -> usize;
    fn add_annotation(&mut self, position: Point3d) -> Uuid;
    fn update_annotation(&mut self, id: Uuid, text: &str) -> Result<(), EngineError>;
    fn delete_annotation(&mut self, id: Uuid) -> Result<(), EngineError>;
    /// Move every listed pipe and annotation by `delta`; unknown ids are skipped.
    fn translate_entities(&mut self, ids: &[Uuid], delta: Vec3);
}

/// The canonical pipe layout.
///
/// Owns the entity lists, keeps the derived topology current after every
/// mutation and records an undo history.
#[derive(Debug)]
pub struct Layout {
    doc: LayoutDocument,
    topology: Topology,
    config: TopologyConfig,
    tolerance: Tolerance,
    history: UndoStack,
}

impl Layout {
    pub fn new() -> Self {
        Self::with_config(TopologyConfig::default())
    }

    pub fn with_config(config: TopologyConfig) -> Self {
        Self {
            doc: LayoutDocument::new(),
            topology: Topology::build(&[], &config),
            config,
            tolerance: Tolerance::default(),
            history: UndoStack::new(),
        }
    }

    pub fn config(&self) -> &TopologyConfig {
        &self.config
    }

    /// Replace the topology configuration and rebuild.
    pub fn set_config(&mut self, config: TopologyConfig) {
        self.config = config;
        self.rebuild();
    }

    pub fn pipes(&self) -> &[PipeSegment] {
        &self.doc.pipes
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.doc.annotations
    }

    /// Topology for the current pipe list. Never stale.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn pipe(&self, id: Uuid) -> Option<&PipeSegment> {
        self.doc.find_pipe(id)
    }

    pub fn pipe_by_name(&self, name: &str) -> Option<&PipeSegment> {
        self.doc.pipes.iter().find(|p| p.name == name)
    }

    pub fn annotation(&self, id: Uuid) -> Option<&Annotation> {
        self.doc.find_annotation(id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.doc.entity_kind(id).is_some()
    }

    pub fn entity_kind(&self, id: Uuid) -> Option<EntityKind> {
        self.doc.entity_kind(id)
    }

    fn rebuild(&mut self) {
        self.topology = Topology::build(&self.doc.pipes, &self.config);
    }

    fn check_geometry(&self, pipe: &PipeSegment) -> Result<(), EngineError> {
        if pipe.diameter <= 0.0 || !pipe.diameter.is_finite() {
            return Err(EngineError::InvalidDiameter {
                diameter: pipe.diameter,
            });
        }
        if self.tolerance.is_zero_length(pipe.length()) || !pipe.length().is_finite() {
            return Err(EngineError::DegenerateSegment {
                length: pipe.length(),
            });
        }
        Ok(())
    }

    /// Add a pipe from `start` to `end` with a generated id and name.
    pub fn add_pipe(&mut self, start: Point3d, end: Point3d) -> Result<Uuid, EngineError> {
        let length = start.distance_to(&end);
        if self.tolerance.is_zero_length(length) || !length.is_finite() {
            warn!(length, "refusing degenerate segment");
            return Err(EngineError::DegenerateSegment { length });
        }
        let name = self.doc.next_name();
        let pipe = PipeSegment::new(name, start, end, self.config.default_diameter);
        let id = pipe.id;
        let position = self.doc.pipes.len();
        debug!(%id, name = %pipe.name, length, "pipe added");

        self.history.push(Command::AddPipe {
            pipe: Box::new(pipe.clone()),
            position,
        });
        self.doc.pipes.push(pipe);
        self.rebuild();
        Ok(id)
    }

    pub fn update_pipe(&mut self, id: Uuid, patch: &PipePatch) -> Result<(), EngineError> {
        self.update_pipes_batch(&[id], patch)
    }

    /// Apply `patch` to every listed pipe. Nothing is applied unless every
    /// id exists and every patched pipe is valid.
    pub fn update_pipes_batch(&mut self, ids: &[Uuid], patch: &PipePatch) -> Result<(), EngineError> {
        let mut before = Vec::with_capacity(ids.len());
        let mut after = Vec::with_capacity(ids.len());
        for &id in ids {
            let pipe = self.doc.find_pipe(id).ok_or(EngineError::PipeNotFound { id })?;
            let patched = patch.applied_to(pipe);
            self.check_geometry(&patched)?;
            before.push(pipe.clone());
            after.push(patched);
        }
        if after.is_empty() {
            return Ok(());
        }

        self.doc.replace_pipes(&after);
        debug!(count = after.len(), "pipes updated");
        self.history.push(Command::EditPipes { before, after });
        self.rebuild();
        Ok(())
    }

    /// Delete every listed pipe and annotation. Unknown ids are ignored.
    pub fn delete_entities(&mut self, ids: &[Uuid]) -> usize {
        let (pipes, annotations) = self.doc.remove_entities(ids);
        let removed = pipes.len() + annotations.len();
        if removed < ids.len() {
            warn!(requested = ids.len(), removed, "ignored unknown ids on delete");
        }
        if removed == 0 {
            return 0;
        }
        debug!(pipes = pipes.len(), annotations = annotations.len(), "entities deleted");
        self.history.push(Command::RemoveEntities { pipes, annotations });
        self.rebuild();
        removed
    }

    /// Delete the listed pipes; annotation ids in `ids` are left alone.
    pub fn delete_pipes(&mut self, ids: &[Uuid]) -> usize {
        let pipe_ids: Vec<Uuid> = ids
            .iter()
            .copied()
            .filter(|id| self.doc.find_pipe(*id).is_some())
            .collect();
        if pipe_ids.len() < ids.len() {
            warn!(requested = ids.len(), found = pipe_ids.len(), "ignored unknown pipe ids");
        }
        if pipe_ids.is_empty() {
            return 0;
        }
        self.delete_entities(&pipe_ids)
    }

    pub fn add_annotation(&mut self, position: Point3d) -> Uuid {
        let annotation = Annotation::new(position);
        let id = annotation.id;
        let index = self.doc.annotations.len();
        self.history.push(Command::AddAnnotation {
            annotation: annotation.clone(),
            position: index,
        });
        self.doc.annotations.push(annotation);
        debug!(%id, "annotation added");
        id
    }

    pub fn update_annotation(&mut self, id: Uuid, text: &str) -> Result<(), EngineError> {
        let annotation = self
            .doc
            .find_annotation_mut(id)
            .ok_or(EngineError::AnnotationNotFound { id })?;
        let old_text = std::mem::replace(&mut annotation.text, text.to_string());
        self.history.push(Command::EditAnnotation {
            id,
            old_text,
            new_text: text.to_string(),
        });
        Ok(())
    }

    pub fn delete_annotation(&mut self, id: Uuid) -> Result<(), EngineError> {
        if self.doc.find_annotation(id).is_none() {
            return Err(EngineError::AnnotationNotFound { id });
        }
        self.delete_entities(&[id]);
        Ok(())
    }

    /// Move pipes and annotations by `delta`. Consecutive moves of the same
    /// ids form one undo step until [`Layout::end_translate`] is called.
    pub fn translate_entities(&mut self, ids: &[Uuid], delta: Vec3) {
        let moved = self.doc.translate(ids, delta);
        if moved == 0 {
            return;
        }
        self.history.push_translate(ids, delta);
        self.rebuild();
    }

    /// Close the current drag so the next move starts a new undo step.
    pub fn end_translate(&mut self) {
        self.history.seal();
    }

    /// Append externally produced pipes. Lengths are recomputed; degenerate
    /// segments and invalid diameters are dropped. Returns how many were kept.
    pub fn import_pipes(&mut self, pipes: Vec<PipeSegment>) -> usize {
        let mut accepted = Vec::with_capacity(pipes.len());
        for mut pipe in pipes {
            pipe.recompute_length();
            if let Err(e) = self.check_geometry(&pipe) {
                warn!(id = %pipe.id, error = %e, "dropping imported pipe");
                continue;
            }
            if self.contains(pipe.id) || accepted.iter().any(|p: &PipeSegment| p.id == pipe.id) {
                warn!(id = %pipe.id, "dropping imported pipe with duplicate id");
                continue;
            }
            if pipe.name.is_empty() {
                pipe.name = self.doc.next_name();
            }
            accepted.push(pipe);
        }
        let count = accepted.len();
        if count == 0 {
            return 0;
        }
        self.doc.pipes.extend(accepted.iter().cloned());
        self.history.push(Command::ImportPipes { pipes: accepted });
        self.rebuild();
        count
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> Result<(), EngineError> {
        let cmd = self.history.pop_undo().ok_or(EngineError::NothingToUndo)?;
        match &cmd {
            Command::AddPipe { pipe, .. } => {
                self.doc.remove_entities(&[pipe.id]);
            }
            Command::RemoveEntities { pipes, annotations } => {
                self.doc.restore_entities(pipes, annotations);
            }
            Command::EditPipes { before, .. } => self.doc.replace_pipes(before),
            Command::AddAnnotation { annotation, .. } => {
                self.doc.remove_entities(&[annotation.id]);
            }
            Command::EditAnnotation { id, old_text, .. } => {
                if let Some(a) = self.doc.find_annotation_mut(*id) {
                    a.text = old_text.clone();
                }
            }
            Command::Translate { ids, delta } => {
                self.doc.translate(ids, -*delta);
            }
            Command::ImportPipes { pipes } => {
                let ids: Vec<Uuid> = pipes.iter().map(|p| p.id).collect();
                self.doc.remove_entities(&ids);
            }
        }
        self.history.push_redo(cmd);
        self.rebuild();
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), EngineError> {
        let cmd = self.history.pop_redo().ok_or(EngineError::NothingToRedo)?;
        match &cmd {
            Command::AddPipe { pipe, position } => {
                self.doc.insert_pipe(*position, (**pipe).clone());
            }
            Command::RemoveEntities { pipes, annotations } => {
                let ids: Vec<Uuid> = pipes
                    .iter()
                    .map(|(_, p)| p.id)
                    .chain(annotations.iter().map(|(_, a)| a.id))
                    .collect();
                self.doc.remove_entities(&ids);
            }
            Command::EditPipes { after, .. } => self.doc.replace_pipes(after),
            Command::AddAnnotation {
                annotation,
                position,
            } => {
                self.doc.insert_annotation(*position, annotation.clone());
            }
            Command::EditAnnotation { id, new_text, .. } => {
                if let Some(a) = self.doc.find_annotation_mut(*id) {
                    a.text = new_text.clone();
                }
            }
            Command::Translate { ids, delta } => {
                self.doc.translate(ids, *delta);
            }
            Command::ImportPipes { pipes } => {
                self.doc.pipes.extend(pipes.iter().cloned());
            }
        }
        self.history.push_undo_only(cmd);
        self.rebuild();
        Ok(())
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCommands for Layout {
    fn pipes(&self) -> &[PipeSegment] {
        Layout::pipes(self)
    }

    fn annotations(&self) -> &[Annotation] {
        Layout::annotations(self)
    }

    fn add_pipe(&mut self, start: Point3d, end: Point3d) -> Result<Uuid, EngineError> {
        Layout::add_pipe(self, start, end)
    }

    fn update_pipe(&mut self, id: Uuid, patch: &PipePatch) -> Result<(), EngineError> {
        Layout::update_pipe(self, id, patch)
    }

    fn update_pipes_batch(&mut self, ids: &[Uuid], patch: &PipePatch) -> Result<(), EngineError> {
        Layout::update_pipes_batch(self, ids, patch)
    }

    fn delete_pipes(&mut self, ids: &[Uuid]) -> usize {
        Layout::delete_pipes(self, ids)
    }

    fn add_annotation(&mut self, position: Point3d) -> Uuid {
        Layout::add_annotation(self, position)
    }

    fn update_annotation(&mut self, id: Uuid, text: &str) -> Result<(), EngineError> {
        Layout::update_annotation(self, id, text)
    }

    fn delete_annotation(&mut self, id: Uuid) -> Result<(), EngineError> {
        Layout::delete_annotation(self, id)
    }

    fn translate_entities(&mut self, ids: &[Uuid], delta: Vec3) {
        Layout::translate_entities(self, ids, delta)
    }
}
