use iso_kernel::{Point3d, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::status::{InsulationStatus, PipeStatus};

/// Weld traceability recorded against a segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WelderInfo {
    pub welder_id: String,
    pub weld_date: String,
    pub electrode_batch: String,
    pub visual_inspection: bool,
}

/// A straight pipe run between two endpoints.
///
/// Geometry is authoritative; how segments join is always derived from
/// endpoints and never stored here. `length` is kept equal to the endpoint
/// distance by every mutator and cannot be set directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeSegment {
    pub id: Uuid,
    pub name: String,
    pub start: Point3d,
    pub end: Point3d,
    /// Outside diameter in meters.
    pub diameter: f64,
    pub status: PipeStatus,
    #[serde(default)]
    pub insulation_status: Option<InsulationStatus>,
    #[serde(default)]
    pub spool_id: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub general_info: Option<String>,
    #[serde(default)]
    pub welder_info: Option<WelderInfo>,
    #[serde(default)]
    length: f64,
}

impl PipeSegment {
    /// New PENDING segment with a fresh id.
    pub fn new(name: String, start: Point3d, end: Point3d, diameter: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            start,
            end,
            diameter,
            status: PipeStatus::Pending,
            insulation_status: None,
            spool_id: None,
            location: None,
            general_info: None,
            welder_info: None,
            length: start.distance_to(&end),
        }
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Recompute the derived length from the endpoints. Needed after a
    /// segment has been deserialized from untrusted input.
    pub fn recompute_length(&mut self) {
        self.length = self.start.distance_to(&self.end);
    }

    pub fn set_endpoints(&mut self, start: Point3d, end: Point3d) {
        self.start = start;
        self.end = end;
        self.recompute_length();
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.set_endpoints(self.start + delta, self.end + delta);
    }

    pub fn radius(&self) -> f64 {
        self.diameter * 0.5
    }

    pub fn midpoint(&self) -> Point3d {
        self.start.midpoint(&self.end)
    }

    /// Unit direction start→end; zero for a degenerate segment.
    pub fn direction(&self) -> Vec3 {
        (self.end - self.start).normalize_or_zero()
    }

    pub fn endpoint(&self, is_start: bool) -> Point3d {
        if is_start {
            self.start
        } else {
            self.end
        }
    }
}

/// A partial update to one or more segments. Every field is optional;
/// `None` leaves the field as it is. An empty string clears a text field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start: Option<Point3d>,
    #[serde(default)]
    pub end: Option<Point3d>,
    #[serde(default)]
    pub diameter: Option<f64>,
    #[serde(default)]
    pub status: Option<PipeStatus>,
    #[serde(default)]
    pub insulation_status: Option<InsulationStatus>,
    #[serde(default)]
    pub spool_id: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub general_info: Option<String>,
    #[serde(default)]
    pub welder_info: Option<WelderInfo>,
}

fn merge_text(target: &mut Option<String>, value: &Option<String>) {
    if let Some(v) = value {
        *target = if v.is_empty() { None } else { Some(v.clone()) };
    }
}

impl PipePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether applying the patch can change an endpoint.
    pub fn touches_geometry(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// A copy of `pipe` with the patch merged in and `length` recomputed.
    pub fn applied_to(&self, pipe: &PipeSegment) -> PipeSegment {
        let mut out = pipe.clone();
        if let Some(name) = &self.name {
            out.name = name.clone();
        }
        if let Some(diameter) = self.diameter {
            out.diameter = diameter;
        }
        if let Some(status) = self.status {
            out.status = status;
        }
        if let Some(insulation) = self.insulation_status {
            out.insulation_status = Some(insulation);
        }
        merge_text(&mut out.spool_id, &self.spool_id);
        merge_text(&mut out.location, &self.location);
        merge_text(&mut out.general_info, &self.general_info);
        if let Some(welder) = &self.welder_info {
            out.welder_info = Some(welder.clone());
        }
        out.set_endpoints(
            self.start.unwrap_or(pipe.start),
            self.end.unwrap_or(pipe.end),
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PipeSegment {
        PipeSegment::new(
            "P-001".to_string(),
            Point3d::ORIGIN,
            Point3d::new(3.0, 4.0, 0.0),
            0.2,
        )
    }

    #[test]
    fn new_pipe_has_derived_length() {
        let p = sample();
        assert!((p.length() - 5.0).abs() < 1e-12);
        assert_eq!(p.status, PipeStatus::Pending);
    }

    #[test]
    fn translate_keeps_length() {
        let mut p = sample();
        p.translate(Vec3::new(10.0, -2.0, 1.0));
        assert!((p.length() - 5.0).abs() < 1e-12);
        assert_eq!(p.start, Point3d::new(10.0, -2.0, 1.0));
    }

    #[test]
    fn patch_recomputes_length_on_endpoint_change() {
        let p = sample();
        let patch = PipePatch {
            end: Some(Point3d::new(0.0, 0.0, 2.0)),
            ..PipePatch::default()
        };
        let out = patch.applied_to(&p);
        assert!((out.length() - 2.0).abs() < 1e-12);
        assert!(patch.touches_geometry());
    }

    #[test]
    fn patch_merges_metadata_and_clears_with_empty_string() {
        let mut p = sample();
        p.spool_id = Some("SP-1".to_string());
        let patch = PipePatch {
            status: Some(PipeStatus::Welded),
            spool_id: Some(String::new()),
            location: Some("Rack 3".to_string()),
            ..PipePatch::default()
        };
        let out = patch.applied_to(&p);
        assert_eq!(out.status, PipeStatus::Welded);
        assert_eq!(out.spool_id, None);
        assert_eq!(out.location.as_deref(), Some("Rack 3"));
        assert_eq!(out.id, p.id);
        assert!(!patch.touches_geometry());
    }

    #[test]
    fn empty_patch_is_noop() {
        let p = sample();
        let patch = PipePatch::default();
        assert!(patch.is_empty());
        assert_eq!(patch.applied_to(&p), p);
    }

    #[test]
    fn deserialized_length_can_be_recomputed() {
        let p = sample();
        let mut json: serde_json::Value = serde_json::to_value(&p).unwrap();
        json["length"] = serde_json::json!(99.0);
        let mut back: PipeSegment = serde_json::from_value(json).unwrap();
        assert!((back.length() - 99.0).abs() < 1e-12);
        back.recompute_length();
        assert!((back.length() - 5.0).abs() < 1e-12);
    }
}
