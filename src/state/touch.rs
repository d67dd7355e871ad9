// Gesture recognition over raw pointer samples. The view layer feeds
// mouse/touch coordinates in; discrete gesture events come out. Pure state,
// no DOM types, so the classification rules are testable on the host.

use std::f64::consts::PI;

/// Max travel (px) for a press to still count as a tap.
pub const TAP_SLOP_PX: f64 = 10.0;
/// Min downward travel (px) for a swipe-down.
pub const SWIPE_MIN_DIST_PX: f64 = 60.0;
/// Max duration (s) for a swipe-down.
pub const SWIPE_MAX_SECS: f64 = 0.5;
/// Min accumulated two-finger rotation (rad) for the gesture to count as a
/// rotation when it ends.
pub const ROTATION_MIN_RAD: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    Tap { x: f64, y: f64 },
    SwipeDown,
    PanBegin { x: f64, y: f64 },
    PanMove { x: f64, y: f64 },
    PanEnd { x: f64, y: f64 },
    /// Scale delta re-based to 1.0 each sample; consumers multiply them up.
    Pinch { scale: f64 },
    RotationEnded,
}

#[derive(Debug, Clone, Copy)]
struct SinglePointer {
    start_x: f64,
    start_y: f64,
    start_t: f64,
    last_x: f64,
    last_y: f64,
    max_travel: f64,
    /// Started on a shape: the pointer drives a pan from the first sample.
    panning: bool,
}

#[derive(Debug, Clone, Copy)]
struct TwoPointer {
    last_dist: f64,
    last_angle: f64,
    rotation: f64,
}

/// Classifies pointer samples into gestures. One pointer starting on a shape
/// pans it (and still taps if it never really moved); one pointer on empty
/// canvas ends as a tap, a swipe-down, or nothing; two pointers stream pinch
/// deltas and may end as a rotation.
#[derive(Default, Debug, Clone)]
pub struct TouchTracker {
    single: Option<SinglePointer>,
    multi: Option<TwoPointer>,
}

fn dist(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    ((bx - ax).powi(2) + (by - ay).powi(2)).sqrt()
}

fn angle(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    (by - ay).atan2(bx - ax)
}

/// Smallest signed difference between two angles, in (-PI, PI].
fn angle_delta(a: f64, b: f64) -> f64 {
    let mut d = a - b;
    while d > PI {
        d -= 2.0 * PI;
    }
    while d <= -PI {
        d += 2.0 * PI;
    }
    d
}

impl TouchTracker {
    pub fn two_active(&self) -> bool {
        self.multi.is_some()
    }

    pub fn pointer_down(&mut self, x: f64, y: f64, t: f64, on_shape: bool) -> Vec<GestureEvent> {
        if self.multi.is_some() {
            return Vec::new();
        }
        self.single = Some(SinglePointer {
            start_x: x,
            start_y: y,
            start_t: t,
            last_x: x,
            last_y: y,
            max_travel: 0.0,
            panning: on_shape,
        });
        if on_shape {
            vec![GestureEvent::PanBegin { x, y }]
        } else {
            Vec::new()
        }
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Vec<GestureEvent> {
        let Some(s) = self.single.as_mut() else {
            return Vec::new();
        };
        s.max_travel = s.max_travel.max(dist(s.start_x, s.start_y, x, y));
        s.last_x = x;
        s.last_y = y;
        if s.panning {
            vec![GestureEvent::PanMove { x, y }]
        } else {
            Vec::new()
        }
    }

    pub fn pointer_up(&mut self, t: f64) -> Vec<GestureEvent> {
        let Some(s) = self.single.take() else {
            return Vec::new();
        };
        let mut events = Vec::new();
        if s.panning {
            events.push(GestureEvent::PanEnd {
                x: s.last_x,
                y: s.last_y,
            });
        }
        if s.max_travel <= TAP_SLOP_PX {
            events.push(GestureEvent::Tap {
                x: s.start_x,
                y: s.start_y,
            });
        } else if !s.panning {
            let dx = s.last_x - s.start_x;
            let dy = s.last_y - s.start_y;
            let quick = t - s.start_t <= SWIPE_MAX_SECS;
            if quick && dy >= SWIPE_MIN_DIST_PX && dy.abs() > dx.abs() {
                events.push(GestureEvent::SwipeDown);
            }
        }
        events
    }

    /// A second pointer landing: any single-pointer pan ends where it was,
    /// and pinch/rotation tracking starts from the current pair.
    pub fn two_pointer_down(&mut self, p0: (f64, f64), p1: (f64, f64)) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        if let Some(s) = self.single.take() {
            if s.panning {
                events.push(GestureEvent::PanEnd {
                    x: s.last_x,
                    y: s.last_y,
                });
            }
        }
        self.multi = Some(TwoPointer {
            last_dist: dist(p0.0, p0.1, p1.0, p1.1),
            last_angle: angle(p0.0, p0.1, p1.0, p1.1),
            rotation: 0.0,
        });
        events
    }

    pub fn two_pointer_move(&mut self, p0: (f64, f64), p1: (f64, f64)) -> Vec<GestureEvent> {
        let Some(m) = self.multi.as_mut() else {
            return Vec::new();
        };
        let mut events = Vec::new();
        let d = dist(p0.0, p0.1, p1.0, p1.1);
        if m.last_dist > 1.0 && d > 1.0 {
            events.push(GestureEvent::Pinch {
                scale: d / m.last_dist,
            });
        }
        let a = angle(p0.0, p0.1, p1.0, p1.1);
        m.rotation += angle_delta(a, m.last_angle);
        m.last_dist = d;
        m.last_angle = a;
        events
    }

    /// The pair broke up (fewer than two pointers remain). The remaining
    /// finger, if any, is ignored until everything lifts.
    pub fn two_pointer_up(&mut self) -> Vec<GestureEvent> {
        let Some(m) = self.multi.take() else {
            return Vec::new();
        };
        if m.rotation.abs() >= ROTATION_MIN_RAD {
            vec![GestureEvent::RotationEnded]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_press_is_a_tap() {
        let mut tr = TouchTracker::default();
        assert!(tr.pointer_down(50.0, 60.0, 0.0, false).is_empty());
        assert_eq!(tr.pointer_up(0.1), vec![GestureEvent::Tap { x: 50.0, y: 60.0 }]);
    }

    #[test]
    fn jitter_within_slop_is_still_a_tap() {
        let mut tr = TouchTracker::default();
        tr.pointer_down(50.0, 60.0, 0.0, false);
        assert!(tr.pointer_move(54.0, 63.0).is_empty());
        assert!(tr.pointer_move(51.0, 58.0).is_empty());
        assert_eq!(tr.pointer_up(0.2), vec![GestureEvent::Tap { x: 50.0, y: 60.0 }]);
    }

    #[test]
    fn press_on_shape_streams_a_pan() {
        let mut tr = TouchTracker::default();
        assert_eq!(
            tr.pointer_down(10.0, 10.0, 0.0, true),
            vec![GestureEvent::PanBegin { x: 10.0, y: 10.0 }]
        );
        assert_eq!(
            tr.pointer_move(30.0, 15.0),
            vec![GestureEvent::PanMove { x: 30.0, y: 15.0 }]
        );
        assert_eq!(
            tr.pointer_up(0.4),
            vec![GestureEvent::PanEnd { x: 30.0, y: 15.0 }]
        );
    }

    #[test]
    fn motionless_press_on_shape_still_taps() {
        let mut tr = TouchTracker::default();
        tr.pointer_down(10.0, 10.0, 0.0, true);
        assert_eq!(
            tr.pointer_up(0.1),
            vec![
                GestureEvent::PanEnd { x: 10.0, y: 10.0 },
                GestureEvent::Tap { x: 10.0, y: 10.0 },
            ]
        );
    }

    #[test]
    fn fast_downward_drag_is_a_swipe() {
        let mut tr = TouchTracker::default();
        tr.pointer_down(100.0, 50.0, 0.0, false);
        tr.pointer_move(102.0, 120.0);
        tr.pointer_move(104.0, 160.0);
        assert_eq!(tr.pointer_up(0.3), vec![GestureEvent::SwipeDown]);
    }

    #[test]
    fn slow_downward_drag_is_nothing() {
        let mut tr = TouchTracker::default();
        tr.pointer_down(100.0, 50.0, 0.0, false);
        tr.pointer_move(102.0, 160.0);
        assert!(tr.pointer_up(1.2).is_empty());
    }

    #[test]
    fn fast_sideways_drag_is_not_a_swipe() {
        let mut tr = TouchTracker::default();
        tr.pointer_down(100.0, 50.0, 0.0, false);
        tr.pointer_move(250.0, 140.0);
        assert!(tr.pointer_up(0.2).is_empty());
    }

    #[test]
    fn upward_drag_is_not_a_swipe() {
        let mut tr = TouchTracker::default();
        tr.pointer_down(100.0, 200.0, 0.0, false);
        tr.pointer_move(100.0, 50.0);
        assert!(tr.pointer_up(0.2).is_empty());
    }

    #[test]
    fn pinch_deltas_rebase_every_sample() {
        let mut tr = TouchTracker::default();
        tr.two_pointer_down((0.0, 0.0), (100.0, 0.0));
        let evs = tr.two_pointer_move((0.0, 0.0), (110.0, 0.0));
        assert_eq!(evs.len(), 1);
        let GestureEvent::Pinch { scale: s1 } = evs[0] else {
            panic!("expected pinch")
        };
        assert!((s1 - 1.1).abs() < 1e-9);
        let evs = tr.two_pointer_move((0.0, 0.0), (121.0, 0.0));
        let GestureEvent::Pinch { scale: s2 } = evs[0] else {
            panic!("expected pinch")
        };
        assert!((s2 - 1.1).abs() < 1e-9);
        assert!(tr.two_pointer_up().is_empty(), "no rotation accumulated");
    }

    #[test]
    fn accumulated_rotation_fires_on_gesture_end() {
        let mut tr = TouchTracker::default();
        let around = |theta: f64| {
            let (s, c) = theta.sin_cos();
            ((100.0 - 50.0 * c, 100.0 - 50.0 * s), (100.0 + 50.0 * c, 100.0 + 50.0 * s))
        };
        let (p0, p1) = around(0.0);
        tr.two_pointer_down(p0, p1);
        for step in 1..=3 {
            let (p0, p1) = around(0.15 * step as f64);
            tr.two_pointer_move(p0, p1);
        }
        assert_eq!(tr.two_pointer_up(), vec![GestureEvent::RotationEnded]);
    }

    #[test]
    fn small_rotation_stays_quiet() {
        let mut tr = TouchTracker::default();
        tr.two_pointer_down((50.0, 100.0), (150.0, 100.0));
        tr.two_pointer_move((50.0, 95.0), (150.0, 105.0));
        assert!(tr.two_pointer_up().is_empty());
    }

    #[test]
    fn second_pointer_ends_an_active_pan() {
        let mut tr = TouchTracker::default();
        tr.pointer_down(10.0, 10.0, 0.0, true);
        tr.pointer_move(40.0, 40.0);
        assert_eq!(
            tr.two_pointer_down((40.0, 40.0), (80.0, 80.0)),
            vec![GestureEvent::PanEnd { x: 40.0, y: 40.0 }]
        );
        assert!(tr.two_active());
        // The lone remaining finger after the pair breaks is ignored.
        tr.two_pointer_up();
        assert!(tr.pointer_move(90.0, 90.0).is_empty());
        assert!(tr.pointer_up(1.0).is_empty());
    }

    #[test]
    fn pointer_down_during_two_finger_gesture_is_ignored() {
        let mut tr = TouchTracker::default();
        tr.two_pointer_down((0.0, 0.0), (100.0, 0.0));
        assert!(tr.pointer_down(5.0, 5.0, 0.0, true).is_empty());
        assert!(tr.two_active());
    }
}
