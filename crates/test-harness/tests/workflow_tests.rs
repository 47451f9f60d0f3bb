//! Tests for the LayoutBuilder workflow API.

use test_harness::{HarnessError, LayoutBuilder};

#[test]
fn pipe_registers_name() {
    let mut m = LayoutBuilder::new();
    let id = m.pipe("feed", [0., 0., 0.], [3., 0., 0.]).unwrap();
    assert_eq!(m.id("feed").unwrap(), id);
    assert_eq!(m.get_pipe("feed").unwrap().name, "feed");
    m.assert_pipe_count(1).unwrap();
}

#[test]
fn duplicate_name_returns_error() {
    let mut m = LayoutBuilder::new();
    m.pipe("a", [0., 0., 0.], [1., 0., 0.]).unwrap();
    let result = m.pipe("a", [0., 0., 2.], [1., 0., 2.]);
    assert!(matches!(result, Err(HarnessError::DuplicateName { .. })));
}

#[test]
fn unknown_name_is_not_found() {
    let m = LayoutBuilder::new();
    assert!(matches!(m.id("ghost"), Err(HarnessError::PipeNotFound { .. })));
}

#[test]
fn draw_run_names_each_segment() {
    let mut m = LayoutBuilder::new();
    let ids = m
        .draw_run(&["s1", "s2"], &[(0.0, 0.0), (2.0, 0.0), (2.0, 3.0)])
        .unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(m.id("s2").unwrap(), ids[1]);
    assert!(!m.state.is_drawing());
    // Layout names follow the sequence.
    assert_eq!(m.get_pipe("s1").unwrap().name, "P-001");
}

#[test]
fn draw_run_checks_arity() {
    let mut m = LayoutBuilder::new();
    assert!(m.draw_run(&["only"], &[(0.0, 0.0)]).is_err());
}

#[test]
fn dispatch_errors_surface() {
    let mut m = LayoutBuilder::new();
    let err = m.undo().unwrap_err();
    assert!(matches!(err, HarnessError::DispatchError { .. }));
    assert_eq!(m.history().last().unwrap().0, "Undo");
    assert_eq!(m.history().last().unwrap().1, "Error");
}

#[test]
fn history_records_response_types() {
    let mut m = LayoutBuilder::new();
    m.pipe("a", [0., 0., 0.], [1., 0., 0.]).unwrap();
    let (msg, responses) = &m.history()[0];
    assert_eq!(msg, "ImportPipes");
    assert_eq!(responses, "LayoutUpdated,SelectionChanged");
}

#[test]
fn auto_check_passes_on_edits() {
    let mut m = LayoutBuilder::new().with_auto_check();
    m.pipe("a", [0., 0., 0.], [1., 0., 0.]).unwrap();
    m.move_endpoint("a", false, [4., 0., 0.]).unwrap();
    assert!((m.get_pipe("a").unwrap().length() - 4.0).abs() < 1e-12);
}
