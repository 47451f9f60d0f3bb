//! Rich assertion helpers with diagnostic output.
//!
//! Every failure carries the context string, expected vs actual values and
//! enough of the layout to see what went wrong.

use iso_kernel::Point3d;
use iso_types::{PipeSegment, PipeStatus};
use layout_engine::{FittingCounts, JunctionKey, JunctionKind, Topology};

use crate::helpers::{fmt_point, HarnessError};

/// Length tolerance for the stored-length invariant.
pub const LENGTH_EPSILON: f64 = 1e-9;

/// Assert exact fitting counts per kind.
pub fn assert_fitting_counts(topology: &Topology, expected: FittingCounts, ctx: &str) -> Result<(), HarnessError> {
    let actual = topology.counts();
    if actual == expected {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!("[{}] expected {:?}, got {:?}", ctx, expected, actual),
        })
    }
}

/// Assert every pipe's stored length equals the distance between its ends.
pub fn assert_length_invariant(pipes: &[PipeSegment], ctx: &str) -> Result<(), HarnessError> {
    for p in pipes {
        let d = p.start.distance_to(&p.end);
        if (p.length() - d).abs() > LENGTH_EPSILON {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "[{}] pipe {} stores length {:.12}, ends are {:.12} apart",
                    ctx,
                    p.name,
                    p.length(),
                    d
                ),
            });
        }
    }
    Ok(())
}

/// Assert two points agree within `tol` on every axis.
pub fn assert_point_near(actual: &Point3d, expected: &Point3d, tol: f64, ctx: &str) -> Result<(), HarnessError> {
    let far = (actual.x - expected.x).abs() > tol
        || (actual.y - expected.y).abs() > tol
        || (actual.z - expected.z).abs() > tol;
    if far {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] expected {}, got {} (tol={})",
                ctx,
                fmt_point(expected),
                fmt_point(actual),
                tol
            ),
        })
    } else {
        Ok(())
    }
}

/// Assert the fitting at `point` has the given kind.
pub fn assert_fitting_kind(
    topology: &Topology,
    point: &Point3d,
    decimals: u32,
    expected: JunctionKind,
    ctx: &str,
) -> Result<(), HarnessError> {
    let key = JunctionKey::quantize(point, decimals);
    match topology.fitting_at(&key) {
        Some(f) if f.kind() == expected => Ok(()),
        Some(f) => Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] fitting at {} is {:?}, expected {:?}",
                ctx,
                fmt_point(point),
                f.kind(),
                expected
            ),
        }),
        None => Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] no fitting at {} ({} fittings total)",
                ctx,
                fmt_point(point),
                topology.fittings.len()
            ),
        }),
    }
}

/// Assert the joint status of the two-pipe fitting at `point`.
pub fn assert_joint_status(
    topology: &Topology,
    point: &Point3d,
    decimals: u32,
    expected: PipeStatus,
    ctx: &str,
) -> Result<(), HarnessError> {
    let key = JunctionKey::quantize(point, decimals);
    let status = topology.fitting_at(&key).and_then(|f| f.status);
    if status == Some(expected) {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] joint at {}: expected {:?}, got {:?}",
                ctx,
                fmt_point(point),
                expected,
                status
            ),
        })
    }
}

/// Assert the accumulated start and end trims of `pipe`.
pub fn assert_trim(
    topology: &Topology,
    pipe: &PipeSegment,
    start: f64,
    end: f64,
    tol: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    let trim = topology.trim(pipe.id);
    if (trim.start - start).abs() <= tol && (trim.end - end).abs() <= tol {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] pipe {} trims: expected ({}, {}), got ({}, {})",
                ctx, pipe.name, start, end, trim.start, trim.end
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::segment;

    #[test]
    fn length_invariant_reports_pipe_name() {
        let mut p = segment("P-9", [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        p.end = Point3d::new(3.0, 0.0, 0.0);
        let err = assert_length_invariant(&[p], "ctx").unwrap_err();
        assert!(err.to_string().contains("P-9"));
    }

    #[test]
    fn point_near_respects_tolerance() {
        let a = Point3d::new(1.0, 2.0, 3.0);
        assert!(assert_point_near(&a, &Point3d::new(1.0, 2.0, 3.0005), 1e-3, "t").is_ok());
        assert!(assert_point_near(&a, &Point3d::new(1.0, 2.1, 3.0), 1e-3, "t").is_err());
    }
}
