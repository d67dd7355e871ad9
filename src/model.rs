//! Core interaction model for Shape Spawner.
//! Gesture-level actions mutate an ordered shape collection; the view layer
//! only draws what is here. Everything in this module runs on the host too,
//! so the interesting behavior is testable without a browser.

use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use yew::Reducible;

/// Fraction of the shorter canvas dimension used as spawn height.
pub const SPAWN_FRACTION: f64 = 0.2;
/// Seconds for a dying shape to fade from full opacity to gone.
pub const FADE_SECS: f64 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    Triangle,
    Oval,
    Rect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillColor {
    Red,
    Blue,
    Yellow,
    Green,
}

impl FillColor {
    pub const PALETTE: [FillColor; 4] = [
        FillColor::Red,
        FillColor::Blue,
        FillColor::Yellow,
        FillColor::Green,
    ];

    pub fn css(self) -> &'static str {
        match self {
            FillColor::Red => "#f85149",
            FillColor::Blue => "#58a6ff",
            FillColor::Yellow => "#d4af37",
            FillColor::Green => "#3fb950",
        }
    }
}

/// Axis-aligned bounding box in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }
}

/// A single drawable primitive. `kind` is fixed at construction; everything
/// else is mutated through the controller.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    id: u64,
    kind: ShapeKind,
    pub fill: FillColor,
    pub frame: Frame,
    /// Uniform visual scale about the frame center; pinch deltas multiply in.
    pub scale: f64,
    pub opacity: f64,
    pub dying: bool,
}

impl Shape {
    /// Picks a kind uniformly among the 3 variants, then a fill uniformly
    /// among the 4 palette entries. Never fails.
    pub fn create_random<R: RandomSource>(rng: &mut R, id: u64, frame: Frame) -> Self {
        let kind = match (rng.next_f64() * 3.0).floor() as u32 {
            0 => ShapeKind::Triangle,
            1 => ShapeKind::Oval,
            _ => ShapeKind::Rect,
        };
        let mut shape = Self {
            id,
            kind,
            fill: FillColor::Red,
            frame,
            scale: 1.0,
            opacity: 1.0,
            dying: false,
        };
        shape.choose_random_color(rng);
        shape
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Reassigns the fill uniformly at random; repeats are allowed.
    pub fn choose_random_color<R: RandomSource>(&mut self, rng: &mut R) {
        let idx = (rng.next_f64() * FillColor::PALETTE.len() as f64).floor() as usize;
        self.fill = FillColor::PALETTE[idx.min(FillColor::PALETTE.len() - 1)];
    }

    /// Composes a pinch delta into the visual scale. The gesture driver
    /// re-bases its reported factor to 1.0 after every sample, so repeated
    /// calls multiply up over a live pinch.
    pub fn pinch(&mut self, factor: f64) {
        self.scale *= factor;
    }

    pub fn begin_delete(&mut self) {
        self.dying = true;
    }

    /// The frame scaled by `scale` about its own center.
    pub fn scaled_frame(&self) -> Frame {
        let (cx, cy) = self.frame.center();
        let w = self.frame.width * self.scale;
        let h = self.frame.height * self.scale;
        Frame::new(cx - w / 2.0, cy - h / 2.0, w, h)
    }

    /// Dying shapes are already on their way out and no longer hit-testable.
    pub fn hit_test(&self, px: f64, py: f64) -> bool {
        !self.dying && self.scaled_frame().contains(px, py)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

/// The shape currently tracked by an in-progress pan: an id into `shapes`
/// plus the last observed gesture point. An id rather than an index, so a
/// shape vanishing mid-drag just drops the drag instead of retargeting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragState {
    pub shape_id: u64,
    pub last_x: f64,
    pub last_y: f64,
}

/// Persisted view preferences (not shapes; those never survive a reload).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewSettings {
    pub show_stats: bool,
    pub show_hints: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            show_stats: true,
            show_hints: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CanvasState {
    pub bounds: CanvasSize,
    /// Insertion order is z-order; later entries draw on top and win hits.
    pub shapes: Vec<Shape>,
    pub next_spawn_is_square: bool,
    pub drag: Option<DragState>,
    next_shape_id: u64,
    /// Bumped on every state change; effects depend on it to redraw.
    pub version: u64,
}

impl CanvasState {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            bounds: CanvasSize { width, height },
            shapes: Vec::new(),
            next_spawn_is_square: true,
            drag: None,
            next_shape_id: 0,
            version: 0,
        }
    }

    pub fn shape(&self, id: u64) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    fn shape_mut(&mut self, id: u64) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    /// Topmost live shape under a point (last-added wins on overlap).
    pub fn topmost_shape_at(&self, x: f64, y: f64) -> Option<u64> {
        self.shapes
            .iter()
            .rev()
            .find(|s| s.hit_test(x, y))
            .map(|s| s.id)
    }

    pub fn live_count(&self) -> usize {
        self.shapes.iter().filter(|s| !s.dying).count()
    }

    /// Spawns a random shape at a random in-bounds origin. Spawn height is
    /// 20% of the shorter canvas dimension; width alternates between square
    /// and double-wide. Skipped entirely (flag untouched) when the canvas
    /// cannot fit the shape with room to place it.
    pub fn on_tap<R: RandomSource>(&mut self, rng: &mut R) -> bool {
        let height = self.bounds.width.min(self.bounds.height) * SPAWN_FRACTION;
        let width = if self.next_spawn_is_square {
            height
        } else {
            height * 2.0
        };
        let max_x = self.bounds.width - width;
        let max_y = self.bounds.height - height;
        if height <= 0.0 || max_x <= 0.0 || max_y <= 0.0 {
            return false;
        }
        let x = (rng.next_f64() * max_x).floor();
        let y = (rng.next_f64() * max_y).floor();
        let id = self.next_shape_id;
        self.next_shape_id += 1;
        let shape = Shape::create_random(rng, id, Frame::new(x, y, width, height));
        self.shapes.push(shape);
        self.next_spawn_is_square = !self.next_spawn_is_square;
        true
    }

    /// Fired once when a two-finger rotation gesture ends: recolors every
    /// live shape, in collection order.
    pub fn on_rotation_ended<R: RandomSource>(&mut self, rng: &mut R) -> bool {
        let mut any = false;
        for shape in self.shapes.iter_mut().filter(|s| !s.dying) {
            shape.choose_random_color(rng);
            any = true;
        }
        any
    }

    /// Starts the fade-out on every live shape. Each one leaves the
    /// collection on its own once its fade completes.
    pub fn on_swipe_down(&mut self) -> bool {
        let mut any = false;
        for shape in self.shapes.iter_mut().filter(|s| !s.dying) {
            shape.begin_delete();
            any = true;
        }
        any
    }

    pub fn on_pan_begin(&mut self, x: f64, y: f64) -> bool {
        match self.topmost_shape_at(x, y) {
            Some(shape_id) => {
                self.drag = Some(DragState {
                    shape_id,
                    last_x: x,
                    last_y: y,
                });
                true
            }
            None => false,
        }
    }

    pub fn on_pan_move(&mut self, x: f64, y: f64) -> bool {
        self.apply_pan_delta(x, y)
    }

    pub fn on_pan_end(&mut self, x: f64, y: f64) -> bool {
        let moved = self.apply_pan_delta(x, y);
        let had_drag = self.drag.take().is_some();
        moved || had_drag
    }

    fn apply_pan_delta(&mut self, x: f64, y: f64) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        // Target gone mid-drag (faded out): drop the drag.
        let Some(shape) = self.shape_mut(drag.shape_id) else {
            self.drag = None;
            return true;
        };
        shape.frame.translate(x - drag.last_x, y - drag.last_y);
        self.drag = Some(DragState {
            shape_id: drag.shape_id,
            last_x: x,
            last_y: y,
        });
        true
    }

    /// Pinch deltas are routed straight to the shape hit at gesture start,
    /// not through hit-testing on every sample.
    pub fn on_pinch(&mut self, shape_id: u64, factor: f64) -> bool {
        match self.shape_mut(shape_id) {
            Some(shape) => {
                shape.pinch(factor);
                true
            }
            None => false,
        }
    }

    /// Advances all in-flight fades and evicts shapes whose fade completed.
    /// Removal is per-shape; shapes spawned after a swipe are untouched.
    pub fn on_fade_tick(&mut self, dt: f64) -> bool {
        if !self.shapes.iter().any(|s| s.dying) {
            return false;
        }
        for shape in self.shapes.iter_mut().filter(|s| s.dying) {
            shape.opacity = (shape.opacity - dt / FADE_SECS).max(0.0);
        }
        self.shapes.retain(|s| !(s.dying && s.opacity <= 0.0));
        if let Some(drag) = self.drag {
            if self.shape(drag.shape_id).is_none() {
                self.drag = None;
            }
        }
        true
    }

    pub fn on_resized(&mut self, width: f64, height: f64) -> bool {
        let new = CanvasSize { width, height };
        if new == self.bounds {
            return false;
        }
        self.bounds = new;
        true
    }
}

// ---------------- Reducer & Actions -----------------

#[derive(Clone, Debug, PartialEq)]
pub enum CanvasAction {
    Tap,
    RotationEnded,
    SwipeDown,
    PanBegin { x: f64, y: f64 },
    PanMove { x: f64, y: f64 },
    PanEnd { x: f64, y: f64 },
    Pinch { shape_id: u64, factor: f64 },
    FadeTick { dt: f64 },
    Resized { width: f64, height: f64 },
}

impl Reducible for CanvasState {
    type Action = CanvasAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        use CanvasAction::*;
        let mut rng = crate::rng::JsRandom;
        let mut new = (*self).clone();
        let changed = match action {
            Tap => new.on_tap(&mut rng),
            RotationEnded => new.on_rotation_ended(&mut rng),
            SwipeDown => new.on_swipe_down(),
            PanBegin { x, y } => new.on_pan_begin(x, y),
            PanMove { x, y } => new.on_pan_move(x, y),
            PanEnd { x, y } => new.on_pan_end(x, y),
            Pinch { shape_id, factor } => new.on_pinch(shape_id, factor),
            FadeTick { dt } => new.on_fade_tick(dt),
            Resized { width, height } => new.on_resized(width, height),
        };
        if !changed {
            return self;
        }
        new.version = new.version.wrapping_add(1);
        Rc::new(new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeqRandom;

    /// Small deterministic generator for the statistical checks.
    struct Lcg(u64);

    impl Lcg {
        fn new(seed: u64) -> Self {
            Self(seed)
        }
    }

    impl RandomSource for Lcg {
        fn next_f64(&mut self) -> f64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (self.0 >> 11) as f64 / (1u64 << 53) as f64
        }
    }

    fn state_300x200() -> CanvasState {
        CanvasState::new(300.0, 200.0)
    }

    /// Draw order per spawn is origin-x, origin-y, kind, color.
    fn zeros_rng() -> SeqRandom {
        SeqRandom::new(vec![0.0])
    }

    #[test]
    fn next_spawn_flag_alternates_from_true() {
        let mut st = state_300x200();
        let mut rng = Lcg::new(7);
        assert!(st.next_spawn_is_square);
        let mut expected = true;
        for _ in 0..6 {
            assert_eq!(st.next_spawn_is_square, expected);
            assert!(st.on_tap(&mut rng));
            expected = !expected;
        }
        assert_eq!(st.shapes.len(), 6);
    }

    #[test]
    fn scenario_square_then_wide_on_300x200() {
        let mut st = state_300x200();
        let mut rng = zeros_rng();
        assert!(st.on_tap(&mut rng));
        let first = st.shapes[0].frame;
        assert_eq!((first.width, first.height), (40.0, 40.0));
        assert!(st.on_tap(&mut rng));
        let second = st.shapes[1].frame;
        assert_eq!((second.width, second.height), (80.0, 40.0));
        assert!(st.next_spawn_is_square);
    }

    #[test]
    fn spawned_shapes_stay_in_bounds() {
        for (w, h) in [(300.0, 200.0), (1024.0, 768.0), (200.0, 900.0)] {
            let mut st = CanvasState::new(w, h);
            let mut rng = Lcg::new(42);
            for _ in 0..300 {
                assert!(st.on_tap(&mut rng));
            }
            for shape in &st.shapes {
                let f = shape.frame;
                assert!(f.x >= 0.0 && f.y >= 0.0);
                assert!(f.x + f.width <= w, "x={} width={} canvas={}", f.x, f.width, w);
                assert!(f.y + f.height <= h);
            }
        }
    }

    #[test]
    fn tap_on_empty_canvas_is_skipped() {
        let mut st = CanvasState::new(0.0, 0.0);
        let mut rng = zeros_rng();
        assert!(!st.on_tap(&mut rng));
        assert!(st.shapes.is_empty());
        assert!(st.next_spawn_is_square, "skipped spawn must not toggle");
    }

    #[test]
    fn kind_selection_is_uniform() {
        let mut rng = Lcg::new(1);
        let mut counts = [0usize; 3];
        for i in 0..3000 {
            let shape = Shape::create_random(&mut rng, i, Frame::new(0.0, 0.0, 10.0, 10.0));
            match shape.kind() {
                ShapeKind::Triangle => counts[0] += 1,
                ShapeKind::Oval => counts[1] += 1,
                ShapeKind::Rect => counts[2] += 1,
            }
        }
        for c in counts {
            assert!((800..=1200).contains(&c), "counts skewed: {:?}", counts);
        }
    }

    #[test]
    fn recolor_is_uniform_over_palette() {
        let mut rng = Lcg::new(2);
        let mut shape = Shape::create_random(&mut rng, 0, Frame::new(0.0, 0.0, 10.0, 10.0));
        let mut counts = [0usize; 4];
        for _ in 0..4000 {
            shape.choose_random_color(&mut rng);
            match shape.fill {
                FillColor::Red => counts[0] += 1,
                FillColor::Blue => counts[1] += 1,
                FillColor::Yellow => counts[2] += 1,
                FillColor::Green => counts[3] += 1,
            }
        }
        for c in counts {
            assert!((800..=1200).contains(&c), "counts skewed: {:?}", counts);
        }
    }

    #[test]
    fn rotation_recolors_every_live_shape_only() {
        let mut st = state_300x200();
        let mut rng = Lcg::new(3);
        for _ in 0..3 {
            st.on_tap(&mut rng);
        }
        st.shapes[0].begin_delete();
        let dying_fill = st.shapes[0].fill;
        // Recolor with a source pinned to the last palette slot.
        let mut pinned = SeqRandom::new(vec![0.99]);
        assert!(st.on_rotation_ended(&mut pinned));
        assert_eq!(st.shapes[0].fill, dying_fill);
        assert_eq!(st.shapes[1].fill, FillColor::Green);
        assert_eq!(st.shapes[2].fill, FillColor::Green);
    }

    #[test]
    fn rotation_with_no_shapes_is_noop() {
        let mut st = state_300x200();
        let mut rng = zeros_rng();
        assert!(!st.on_rotation_ended(&mut rng));
    }

    #[test]
    fn pan_translation_is_exact_sum_of_deltas() {
        let mut st = state_300x200();
        let mut rng = zeros_rng();
        st.on_tap(&mut rng);
        let start = st.shapes[0].frame;
        let (cx, cy) = start.center();
        assert!(st.on_pan_begin(cx, cy));
        let deltas = [(3.5, -1.25), (0.5, 10.0), (-2.0, 0.75), (8.25, -3.5)];
        let (mut px, mut py) = (cx, cy);
        for (i, (dx, dy)) in deltas.iter().enumerate() {
            px += dx;
            py += dy;
            if i + 1 < deltas.len() {
                assert!(st.on_pan_move(px, py));
            } else {
                assert!(st.on_pan_end(px, py));
            }
        }
        let sum: (f64, f64) = deltas
            .iter()
            .fold((0.0, 0.0), |acc, d| (acc.0 + d.0, acc.1 + d.1));
        let end = st.shapes[0].frame;
        assert!((end.x - (start.x + sum.0)).abs() < 1e-9);
        assert!((end.y - (start.y + sum.1)).abs() < 1e-9);
        assert!(st.drag.is_none());
    }

    #[test]
    fn pan_without_target_is_noop() {
        let mut st = state_300x200();
        assert!(!st.on_pan_begin(150.0, 100.0));
        assert!(!st.on_pan_move(160.0, 110.0));
        assert!(!st.on_pan_end(160.0, 110.0));
    }

    #[test]
    fn pan_begin_picks_topmost_of_overlapping_shapes() {
        let mut st = state_300x200();
        // Origins pinned to (0,0); kinds/colors don't matter here.
        let mut rng = zeros_rng();
        for _ in 0..3 {
            st.on_tap(&mut rng);
        }
        let top_id = st.shapes[2].id();
        assert!(st.on_pan_begin(10.0, 10.0));
        assert_eq!(st.drag.unwrap().shape_id, top_id);
    }

    #[test]
    fn swipe_down_eventually_empties_the_canvas() {
        let mut st = state_300x200();
        let mut rng = Lcg::new(4);
        for _ in 0..3 {
            st.on_tap(&mut rng);
        }
        assert!(st.on_swipe_down());
        assert_eq!(st.shapes.len(), 3, "removal is not immediate");
        let mut ticks = 0;
        while !st.shapes.is_empty() {
            assert!(st.on_fade_tick(0.016));
            ticks += 1;
            assert!(ticks < 40, "fade never completed");
        }
        // 0.3s at 16ms ticks.
        assert!(ticks >= 18);
    }

    #[test]
    fn shapes_spawned_during_fade_survive_it() {
        let mut st = state_300x200();
        let mut rng = Lcg::new(5);
        st.on_tap(&mut rng);
        st.on_swipe_down();
        st.on_tap(&mut rng);
        for _ in 0..30 {
            st.on_fade_tick(0.016);
        }
        assert_eq!(st.shapes.len(), 1);
        assert!(!st.shapes[0].dying);
    }

    #[test]
    fn fade_tick_with_nothing_dying_reports_no_change() {
        let mut st = state_300x200();
        let mut rng = Lcg::new(6);
        st.on_tap(&mut rng);
        assert!(!st.on_fade_tick(0.016));
        assert_eq!(st.shapes[0].opacity, 1.0);
    }

    #[test]
    fn drag_is_dropped_when_target_fades_out() {
        let mut st = state_300x200();
        let mut rng = zeros_rng();
        st.on_tap(&mut rng);
        let (cx, cy) = st.shapes[0].frame.center();
        assert!(st.on_pan_begin(cx, cy));
        st.on_swipe_down();
        for _ in 0..30 {
            st.on_fade_tick(0.016);
        }
        assert!(st.drag.is_none());
        assert!(!st.on_pan_move(cx + 5.0, cy + 5.0));
    }

    #[test]
    fn pinch_deltas_compose_multiplicatively() {
        let mut st = state_300x200();
        let mut rng = zeros_rng();
        st.on_tap(&mut rng);
        let id = st.shapes[0].id();
        assert!(st.on_pinch(id, 1.5));
        assert!(st.on_pinch(id, 2.0));
        assert!((st.shapes[0].scale - 3.0).abs() < 1e-12);
        assert!(!st.on_pinch(999, 2.0), "unknown target is a no-op");
    }

    #[test]
    fn scaled_frame_keeps_the_center() {
        let mut rng = zeros_rng();
        let mut shape = Shape::create_random(&mut rng, 0, Frame::new(10.0, 20.0, 40.0, 40.0));
        let before = shape.frame.center();
        shape.pinch(2.0);
        let scaled = shape.scaled_frame();
        assert_eq!(scaled.center(), before);
        assert_eq!((scaled.width, scaled.height), (80.0, 80.0));
        assert!(shape.hit_test(before.0 - 35.0, before.1));
    }

    #[test]
    fn dying_shapes_are_not_hit_testable() {
        let mut st = state_300x200();
        let mut rng = zeros_rng();
        st.on_tap(&mut rng);
        let (cx, cy) = st.shapes[0].frame.center();
        st.on_swipe_down();
        assert_eq!(st.topmost_shape_at(cx, cy), None);
        assert!(!st.on_pan_begin(cx, cy));
    }

    #[test]
    fn kind_is_fixed_but_color_always_in_palette() {
        let mut rng = Lcg::new(8);
        let mut shape = Shape::create_random(&mut rng, 0, Frame::new(0.0, 0.0, 10.0, 10.0));
        let kind = shape.kind();
        for _ in 0..100 {
            shape.choose_random_color(&mut rng);
            assert!(FillColor::PALETTE.contains(&shape.fill));
            assert_eq!(shape.kind(), kind);
        }
    }

    #[test]
    fn resize_updates_bounds_for_future_spawns() {
        let mut st = CanvasState::new(0.0, 0.0);
        let mut rng = zeros_rng();
        assert!(!st.on_tap(&mut rng));
        assert!(st.on_resized(300.0, 200.0));
        assert!(!st.on_resized(300.0, 200.0));
        assert!(st.on_tap(&mut rng));
        assert_eq!(st.shapes[0].frame.height, 40.0);
    }
}
