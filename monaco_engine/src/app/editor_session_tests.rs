//! Unit tests for editor_session.rs

use crate::app::EditorSession;

#[test]
fn test_defaults_show_all_panels() {
    let session = EditorSession::new();
    assert!(session.show_inspector && session.show_outliner && session.show_stats);
    assert_eq!(session.selected_actor, None);
}

#[test]
fn test_fps_over_one_second_window() {
    let mut session = EditorSession::new();

    for _ in 0..59 {
        session.record_frame(1.0 / 60.0);
    }
    assert_eq!(session.fps, 0.0);

    session.record_frame(1.0 / 60.0 + 0.001);
    assert_eq!(session.frame_count, 60);
    assert!((session.fps - 60.0).abs() < 0.1);
}

#[test]
fn test_select_bounds() {
    let mut session = EditorSession::new();
    assert!(session.select(1, 2));
    assert_eq!(session.selected_actor, Some(1));
    assert!(!session.select(2, 2));
    assert_eq!(session.selected_actor, Some(1));
}

#[test]
fn test_validate_selection_after_removal() {
    let mut session = EditorSession::new();
    session.select(3, 4);
    session.validate_selection(4);
    assert_eq!(session.selected_actor, Some(3));
    session.validate_selection(3);
    assert_eq!(session.selected_actor, None);
}
