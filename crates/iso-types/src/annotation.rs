use iso_kernel::{Point3d, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A point marker with a free-text note. Takes part in selection and group
/// moves like a pipe but has no topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: Uuid,
    pub position: Point3d,
    #[serde(default)]
    pub text: String,
}

impl Annotation {
    pub fn new(position: Point3d) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            text: String::new(),
        }
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }
}

/// Which kind of entity an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Pipe,
    Annotation,
}
