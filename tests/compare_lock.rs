use profilescope::render::view_window::ViewWindow;
use profilescope::state::sync::CompareLink;
use profilescope::{MeasureMode, PointerEvent, Scan, ViewerOptions, ViewerState};

fn viewer(title: &str) -> ViewerState {
    let mut v = ViewerState::new(title, ViewerOptions::default());
    v.set_scans(
        (0..4)
            .map(|i| Scan::new(0.0, (0..100).map(|j| ((i + j) % 9) as f64).collect()))
            .collect(),
    );
    v
}

#[test]
fn locked_viewers_mirror_each_other() {
    let (mut left, mut right) = (viewer("Left"), viewer("Right"));
    let mut link = CompareLink::default();
    link.set_locked(true);

    left.select_scan(2);
    left.set_window(ViewWindow::new(2, 10));
    right.toggle_ruler();
    link.pump(&mut left, &mut right);

    assert_eq!(right.current(), 2);
    assert_eq!(right.window(), ViewWindow::new(2, 10));
    assert_eq!(left.mode(), MeasureMode::Ruler);
    assert_eq!(left.controller().ruler().levels, right.controller().ruler().levels);

    // Nothing echoes back on the next pump.
    assert_eq!(link.pump(&mut left, &mut right), 0);
}

#[test]
fn unlocked_viewers_stay_independent() {
    let (mut left, mut right) = (viewer("Left"), viewer("Right"));
    let link = CompareLink::default();

    left.select_scan(3);
    left.toggle_point();
    link.pump(&mut left, &mut right);
    assert_eq!(right.current(), 0);
    assert_eq!(right.mode(), MeasureMode::None);

    // Commands recorded while unlocked are discarded, not replayed later.
    let mut link = link;
    link.toggle();
    assert_eq!(link.pump(&mut left, &mut right), 0);
    assert_eq!(right.current(), 0);
}

#[test]
fn clicked_points_are_not_mirrored() {
    let (mut left, mut right) = (viewer("Left"), viewer("Right"));
    let mut link = CompareLink::default();
    link.set_locked(true);

    left.toggle_point();
    link.pump(&mut left, &mut right);
    assert_eq!(right.mode(), MeasureMode::Point);

    left.handle_pointer(PointerEvent::Click { x: 300.0, y: 100.0 });
    link.pump(&mut left, &mut right);
    assert_eq!(left.controller().points().len(), 1);
    assert!(right.controller().points().is_empty());
}
