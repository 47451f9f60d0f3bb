use serde::{Deserialize, Serialize};

use crate::pipe::PipeSegment;

/// Fabrication progress of a single pipe segment, in the order the work
/// happens on site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipeStatus {
    #[default]
    Pending,
    Mounted,
    Welded,
    Hydrotest,
}

impl PipeStatus {
    pub const ALL: [PipeStatus; 4] = [
        PipeStatus::Pending,
        PipeStatus::Mounted,
        PipeStatus::Welded,
        PipeStatus::Hydrotest,
    ];

    /// Comparable readiness ordinal: PENDING=0 < MOUNTED=1 < WELDED=2 < HYDROTEST=3.
    pub const fn level(self) -> u8 {
        match self {
            PipeStatus::Pending => 0,
            PipeStatus::Mounted => 1,
            PipeStatus::Welded => 2,
            PipeStatus::Hydrotest => 3,
        }
    }

    /// Inverse of [`PipeStatus::level`]; levels above 3 saturate to HYDROTEST.
    pub const fn from_level(level: u8) -> Self {
        match level {
            0 => PipeStatus::Pending,
            1 => PipeStatus::Mounted,
            2 => PipeStatus::Welded,
            _ => PipeStatus::Hydrotest,
        }
    }
}

/// Insulation progress, tracked independently of fabrication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InsulationStatus {
    #[default]
    None,
    Pending,
    Installing,
    Finished,
}

/// Combined status of a joint between two sides: a joint only reaches a
/// level once both sides have.
pub fn joint_status(level_a: u8, level_b: u8) -> PipeStatus {
    PipeStatus::from_level(level_a.min(level_b))
}

/// The side holding back progress at a joint. Ties resolve to `a`.
pub fn bottleneck_pipe<'a>(a: &'a PipeSegment, b: &'a PipeSegment) -> &'a PipeSegment {
    if b.status.level() < a.status.level() {
        b
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iso_kernel::Point3d;

    fn pipe(status: PipeStatus) -> PipeSegment {
        let mut p = PipeSegment::new(
            "P".to_string(),
            Point3d::ORIGIN,
            Point3d::new(1.0, 0.0, 0.0),
            0.2,
        );
        p.status = status;
        p
    }

    #[test]
    fn levels_are_ordered() {
        let levels: Vec<u8> = PipeStatus::ALL.iter().map(|s| s.level()).collect();
        assert_eq!(levels, vec![0, 1, 2, 3]);
        for s in PipeStatus::ALL {
            assert_eq!(PipeStatus::from_level(s.level()), s);
        }
        assert_eq!(PipeStatus::from_level(9), PipeStatus::Hydrotest);
    }

    #[test]
    fn joint_status_is_minimum_readiness() {
        assert_eq!(joint_status(3, 3), PipeStatus::Hydrotest);
        assert_eq!(joint_status(3, 2), PipeStatus::Welded);
        assert_eq!(joint_status(2, 1), PipeStatus::Mounted);
        assert_eq!(joint_status(0, 3), PipeStatus::Pending);
    }

    #[test]
    fn bottleneck_picks_lower_level() {
        let a = pipe(PipeStatus::Welded);
        let b = pipe(PipeStatus::Mounted);
        assert_eq!(bottleneck_pipe(&a, &b).id, b.id);
        assert_eq!(bottleneck_pipe(&b, &a).id, b.id);
    }

    #[test]
    fn bottleneck_tie_resolves_to_first() {
        let a = pipe(PipeStatus::Welded);
        let b = pipe(PipeStatus::Welded);
        assert_eq!(bottleneck_pipe(&a, &b).id, a.id);
    }

    #[test]
    fn status_serializes_screaming_case() {
        assert_eq!(serde_json::to_string(&PipeStatus::Hydrotest).unwrap(), "\"HYDROTEST\"");
        let s: InsulationStatus = serde_json::from_str("\"INSTALLING\"").unwrap();
        assert_eq!(s, InsulationStatus::Installing);
    }
}
