//! Analog countdown-timer face: a pure drawing engine that turns a
//! remaining-seconds value into a scene of drawing primitives, a channel
//! bridge that repaints on every timer emission, a gesture router that maps
//! input gestures onto timer commands, and a rasterizer that replays scenes
//! onto an RGBA framebuffer.

// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

pub mod config;
pub mod error;

// External crate imports
use rusttype::{point, Font, PositionedGlyph, Scale};
use tracing::debug;

// Standard library imports
use std::f64::consts::{FRAC_PI_2, TAU};
use std::sync::mpsc::Receiver;

pub use crate::config::{Color, FaceStyle, TickSpec};
pub use crate::error::{FaceError, Result};

/// Seconds represented by one full revolution of the primary band.
pub const FULL_DIAL_SECS: u32 = 3600;
/// Threshold below which the last-minute band is shown while running.
pub const LAST_MINUTE_SECS: u32 = 60;

// ============================================================================
// TIMER CONTRACT
// ============================================================================

/// Control surface of the timer collaborator. Mutations are fire-and-forget;
/// their visible effect arrives later through the tick stream.
pub trait TimerControl {
    fn initial_time(&self) -> u32;
    fn start(&self);
    fn increase_minute(&self);
    fn decrease_minute(&self);
    fn increase_second(&self);
    fn decrease_second(&self);
}

/// The two subscriptions the face holds between attach and detach. The timer
/// must emit at least one running-state value before or together with its
/// first tick, and both channels must be fed from a single producer so that
/// emissions arrive in order.
pub struct TimerStreams {
    pub running: Receiver<bool>,
    pub ticks: Receiver<u32>,
}

// ============================================================================
// SCENE MODEL
// ============================================================================

/// Vertical anchoring of a text label. Horizontal placement is always
/// centered on the label's x coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Bottom,
    Middle,
}

/// One drawing primitive in face-centered coordinates (origin at the pin,
/// y growing downward). Linear dimensions are already resolved to pixels;
/// angles are radians measured clockwise from the positive x axis.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    /// Stroked circular band centered on the face. The sweep runs from
    /// `from` down to `to` (counter-clockwise winding, `to <= from`).
    Arc {
        radius: f64,
        thickness: f64,
        from: f64,
        to: f64,
        color: Color,
    },
    /// Radial stroke between two distances from the center.
    Tick {
        angle: f64,
        inner: f64,
        outer: f64,
        width: f64,
        color: Color,
    },
    Label {
        x: f64,
        y: f64,
        text: String,
        size: u32,
        anchor: Anchor,
        color: Color,
    },
    /// Filled disc at the face center.
    Disc { radius: f64, color: Color },
}

/// The ordered primitive list one paint produces. Later commands draw over
/// earlier ones; two scenes compare equal exactly when they would render
/// identically.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// Angle of a seconds value on a band where `full_scale` seconds make one
/// revolution. Zero sits at 12 o'clock; growing values wind counter-clockwise.
pub fn band_angle(seconds: u32, full_scale: u32) -> f64 {
    -FRAC_PI_2 - TAU * (seconds as f64 / full_scale as f64)
}

/// Zero-padded "MM:SS" for a remaining-seconds value.
pub fn format_clock(second: u32) -> String {
    format!("{:02}:{:02}", second / 60, second % 60)
}

/// Point at `distance` from the center in the direction a 12-o'clock ray
/// takes after rotating by `angle`.
fn radial_point(angle: f64, distance: f64) -> (f64, f64) {
    (distance * angle.sin(), -distance * angle.cos())
}

// ============================================================================
// DRAWING ENGINE
// ============================================================================

/// Build the scene for one frame. Deterministic and stateless: identical
/// arguments always produce an identical command sequence.
pub fn render_face(second: u32, initial: u32, running: bool, radius: f64, style: &FaceStyle) -> Scene {
    let mut scene = Scene::new();
    scene.push(DrawCommand::Clear(style.background));
    push_time_bands(&mut scene, second, initial, radius, style);
    if running && second <= LAST_MINUTE_SECS {
        push_last_minute_band(&mut scene, second, radius, style);
    }
    push_time_label(&mut scene, second, radius, style);
    push_marks(&mut scene, &style.minute_marks, radius, style);
    push_marks(&mut scene, &style.hour_marks, radius, style);
    push_numerals(&mut scene, radius, style);
    scene.push(DrawCommand::Disc {
        radius: radius * style.pin_fraction,
        color: style.ink,
    });
    push_branding(&mut scene, radius, style);
    scene
}

fn push_time_bands(scene: &mut Scene, second: u32, initial: u32, radius: f64, style: &FaceStyle) {
    let thickness = radius * style.face_proportion;
    let band_radius = thickness / 2.0;
    let from = band_angle(0, FULL_DIAL_SECS);
    scene.push(DrawCommand::Arc {
        radius: band_radius,
        thickness,
        from,
        to: band_angle(initial, FULL_DIAL_SECS),
        color: style.initial_band,
    });
    scene.push(DrawCommand::Arc {
        radius: band_radius,
        thickness,
        from,
        to: band_angle(second, FULL_DIAL_SECS),
        color: style.elapsed_band,
    });
}

fn push_last_minute_band(scene: &mut Scene, second: u32, radius: f64, style: &FaceStyle) {
    let thickness = radius * style.last_minute_proportion;
    scene.push(DrawCommand::Arc {
        radius: thickness / 2.0,
        thickness,
        from: band_angle(0, LAST_MINUTE_SECS),
        to: band_angle(second, LAST_MINUTE_SECS),
        color: style.last_minute_band,
    });
}

fn push_time_label(scene: &mut Scene, second: u32, radius: f64, style: &FaceStyle) {
    let size = (radius * style.time_font_fraction).round() as u32;
    scene.push(DrawCommand::Label {
        x: 0.0,
        y: radius * style.time_offset_fraction + size as f64,
        text: format_clock(second),
        size,
        anchor: Anchor::Bottom,
        color: style.ink,
    });
}

fn push_marks(scene: &mut Scene, marks: &TickSpec, radius: f64, style: &FaceStyle) {
    let outer = radius * style.face_proportion;
    let inner = radius * (style.face_proportion - marks.length_fraction);
    let width = radius * marks.width_fraction;
    for step in 0..marks.count {
        scene.push(DrawCommand::Tick {
            angle: -(step as f64) * TAU / marks.count as f64,
            inner,
            outer,
            width,
            color: style.ink,
        });
    }
}

fn push_numerals(scene: &mut Scene, radius: f64, style: &FaceStyle) {
    let size = (radius * style.numeral_font_fraction).round() as u32;
    let ring = radius * style.numeral_ring_fraction;
    for num in 0..12u32 {
        let (x, y) = radial_point(-(num as f64) * TAU / 12.0, ring);
        scene.push(DrawCommand::Label {
            x,
            y,
            text: (num * 5).to_string(),
            size,
            anchor: Anchor::Middle,
            color: style.ink,
        });
    }
}

fn push_branding(scene: &mut Scene, radius: f64, style: &FaceStyle) {
    let size = (radius * style.branding_font_fraction).round() as u32;
    scene.push(DrawCommand::Label {
        x: 0.0,
        y: -(radius * style.branding_offset_fraction + size as f64),
        text: style.branding.clone(),
        size,
        anchor: Anchor::Bottom,
        color: style.ink,
    });
}

// ============================================================================
// GESTURE ROUTER
// ============================================================================

/// Discrete input gestures the face understands. Anything unrecognized maps
/// to `Other` and is silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    DoubleTap,
    PanUp,
    PanDown,
    PanLeft,
    PanRight,
    Other,
}

impl Gesture {
    /// Classify a tap by its tap count. Only a double tap carries meaning.
    pub fn from_tap_count(count: u32) -> Self {
        if count == 2 {
            Self::DoubleTap
        } else {
            Self::Other
        }
    }
}

// ============================================================================
// CLOCK FACE COMPONENT
// ============================================================================

/// The face component: owns the timer handle, the cached running flag, and
/// (while attached) the two timer subscriptions.
pub struct ClockFace<T: TimerControl> {
    timer: T,
    radius: f64,
    style: FaceStyle,
    is_running: bool,
    streams: Option<TimerStreams>,
}

impl<T: TimerControl> ClockFace<T> {
    pub fn new(timer: T, radius: f64, style: FaceStyle) -> Self {
        Self {
            timer,
            radius,
            style,
            is_running: false,
            streams: None,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn is_attached(&self) -> bool {
        self.streams.is_some()
    }

    /// Take ownership of the two timer subscriptions. A second attach
    /// replaces (and thereby releases) the previous pair.
    pub fn attach(&mut self, streams: TimerStreams) {
        debug!("attaching timer streams");
        self.streams = Some(streams);
    }

    /// Release both subscriptions. Safe to call repeatedly and before any
    /// attach; a detached face never paints again.
    pub fn detach(&mut self) {
        if self.streams.take().is_some() {
            debug!("released timer subscriptions");
        }
    }

    /// Paint one frame for the given remaining-seconds value, reading the
    /// initial time fresh from the timer.
    pub fn paint(&self, second: u32) -> Scene {
        render_face(
            second,
            self.timer.initial_time(),
            self.is_running,
            self.radius,
            &self.style,
        )
    }

    /// Drain pending emissions in order: every queued running-state value
    /// updates the cached flag, then every queued tick paints one scene and
    /// hands it to `present`. Returns the number of frames painted.
    pub fn pump<F: FnMut(&Scene)>(&mut self, mut present: F) -> usize {
        let (flags, ticks) = {
            let Some(streams) = self.streams.as_ref() else {
                return 0;
            };
            let flags: Vec<bool> = std::iter::from_fn(|| streams.running.try_recv().ok()).collect();
            let ticks: Vec<u32> = std::iter::from_fn(|| streams.ticks.try_recv().ok()).collect();
            (flags, ticks)
        };
        if let Some(latest) = flags.last() {
            self.is_running = *latest;
        }
        let painted = ticks.len();
        for second in ticks {
            let scene = self.paint(second);
            present(&scene);
        }
        painted
    }

    /// Map a gesture onto its timer command. Fire-and-forget: the timer's
    /// reaction, if any, arrives later through the tick stream.
    pub fn route_gesture(&self, gesture: Gesture) {
        match gesture {
            Gesture::DoubleTap => self.timer.start(),
            Gesture::PanUp => self.timer.decrease_minute(),
            Gesture::PanDown => self.timer.increase_minute(),
            Gesture::PanLeft => self.timer.increase_second(),
            Gesture::PanRight => self.timer.decrease_second(),
            Gesture::Other => {}
        }
    }
}

// ============================================================================
// RENDERING PRIMITIVES
// ============================================================================

/// An RGBA framebuffer with the face-center translation applied once at
/// construction. The face owns the frame's transform state for its lifetime.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
    cx: i32,
    cy: i32,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
            cx: (width / 2) as i32,
            cy: (height / 2) as i32,
        }
    }

    fn clear(&mut self, color: Color) {
        let (r, g, b) = color.as_tuple();
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[r, g, b, 0xff]);
        }
    }
}

impl Scene {
    /// Replay the scene onto a framebuffer. Total over any command list; a
    /// command that falls outside the frame simply clips away.
    pub fn rasterize(&self, canvas: &mut Canvas, font: &Font) {
        for command in &self.commands {
            match command {
                DrawCommand::Clear(color) => canvas.clear(*color),
                DrawCommand::Arc {
                    radius,
                    thickness,
                    from,
                    to,
                    color,
                } => fill_band(canvas, *radius, *thickness, *from, *to, *color),
                DrawCommand::Tick {
                    angle,
                    inner,
                    outer,
                    width,
                    color,
                } => {
                    let (x0, y0) = radial_point(*angle, *inner);
                    let (x1, y1) = radial_point(*angle, *outer);
                    let (cx, cy) = (canvas.cx, canvas.cy);
                    stroke_line(
                        canvas,
                        cx + x0.round() as i32,
                        cy + y0.round() as i32,
                        cx + x1.round() as i32,
                        cy + y1.round() as i32,
                        *width as f32,
                        *color,
                    );
                }
                DrawCommand::Label {
                    x,
                    y,
                    text,
                    size,
                    anchor,
                    color,
                } => draw_label(canvas, font, *x, *y, text, *size, *anchor, *color),
                DrawCommand::Disc { radius, color } => fill_disc(canvas, *radius, *color),
            }
        }
    }
}

fn blend_pixel(canvas: &mut Canvas, x: i32, y: i32, color: Color, alpha: f32) {
    if x < 0 || y < 0 || x >= canvas.width as i32 || y >= canvas.height as i32 {
        return;
    }
    let idx = (y as usize * canvas.width + x as usize) * 4;
    if idx + 4 > canvas.frame.len() {
        return;
    }
    let (r, g, b) = color.as_tuple();
    let a = alpha.clamp(0.0, 1.0);
    let dst = &mut canvas.frame[idx..idx + 4];
    dst[0] = (r as f32 * a + dst[0] as f32 * (1.0 - a)).round() as u8;
    dst[1] = (g as f32 * a + dst[1] as f32 * (1.0 - a)).round() as u8;
    dst[2] = (b as f32 * a + dst[2] as f32 * (1.0 - a)).round() as u8;
    dst[3] = 0xff;
}

fn stroke_line(canvas: &mut Canvas, x0: i32, y0: i32, x1: i32, y1: i32, thickness: f32, color: Color) {
    let reach = thickness.ceil() as i32 + 1;
    let min_x = x0.min(x1) - reach;
    let max_x = x0.max(x1) + reach;
    let min_y = y0.min(y1) - reach;
    let max_y = y0.max(y1) + reach;
    let dx = (x1 - x0) as f32;
    let dy = (y1 - y0) as f32;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f32::EPSILON {
        return;
    }
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let px = (x - x0) as f32;
            let py = (y - y0) as f32;
            let t = ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0);
            let lx = x0 as f32 + t * dx;
            let ly = y0 as f32 + t * dy;
            let dist = ((lx - x as f32).powi(2) + (ly - y as f32).powi(2)).sqrt();
            let aa = (1.0 - (dist - thickness / 2.0).clamp(0.0, 1.0)).clamp(0.0, 1.0);
            if aa > 0.01 {
                blend_pixel(canvas, x, y, color, aa);
            }
        }
    }
}

fn fill_band(canvas: &mut Canvas, radius: f64, thickness: f64, from: f64, to: f64, color: Color) {
    let sweep = from - to;
    if sweep <= 0.0 {
        return;
    }
    let full_turn = sweep >= TAU;
    let lo = to.rem_euclid(TAU);
    let hi = from.rem_euclid(TAU);
    let outer = radius + thickness / 2.0;
    let inner = (radius - thickness / 2.0).max(0.0);
    let (cx, cy) = (canvas.cx, canvas.cy);
    let reach = outer.ceil() as i32 + 1;
    let min_x = (cx - reach).max(0);
    let max_x = (cx + reach).min(canvas.width as i32 - 1);
    let min_y = (cy - reach).max(0);
    let max_y = (cy + reach).min(canvas.height as i32 - 1);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = (x - cx) as f64;
            let dy = (y - cy) as f64;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist > outer + 1.0 || dist < inner - 1.0 {
                continue;
            }
            if !full_turn {
                let mut angle = dy.atan2(dx);
                if angle < 0.0 {
                    angle += TAU;
                }
                let in_band = if lo <= hi {
                    angle >= lo && angle <= hi
                } else {
                    angle >= lo || angle <= hi
                };
                if !in_band {
                    continue;
                }
            }
            let aa = if dist > outer {
                1.0 - (dist - outer).min(1.0)
            } else if dist < inner {
                1.0 - (inner - dist).min(1.0)
            } else {
                1.0
            };
            if aa > 0.0 {
                blend_pixel(canvas, x, y, color, aa as f32);
            }
        }
    }
}

fn fill_disc(canvas: &mut Canvas, radius: f64, color: Color) {
    let (cx, cy) = (canvas.cx, canvas.cy);
    let reach = radius.ceil() as i32 + 1;
    for y in -reach..=reach {
        for x in -reach..=reach {
            let dist = ((x * x + y * y) as f64).sqrt();
            if dist > radius + 1.0 {
                continue;
            }
            let aa = if dist > radius {
                1.0 - (dist - radius).min(1.0)
            } else {
                1.0
            };
            if aa > 0.0 {
                blend_pixel(canvas, cx + x, cy + y, color, aa as f32);
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_label(
    canvas: &mut Canvas,
    font: &Font,
    x: f64,
    y: f64,
    text: &str,
    size: u32,
    anchor: Anchor,
    color: Color,
) {
    let scale = Scale::uniform(size as f32);
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> = font.layout(text, scale, point(0.0, v_metrics.ascent)).collect();
    let (min_x, max_x, min_y, max_y) = glyphs.iter().filter_map(|g| g.pixel_bounding_box()).fold(
        (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
        |(min_x, max_x, min_y, max_y), bb| {
            (
                min_x.min(bb.min.x),
                max_x.max(bb.max.x),
                min_y.min(bb.min.y),
                max_y.max(bb.max.y),
            )
        },
    );
    let width_px = if min_x < max_x { max_x - min_x } else { 0 };
    let height_px = if min_y < max_y { max_y - min_y } else { 0 };
    let device_x = canvas.cx + x.round() as i32;
    let device_y = canvas.cy + y.round() as i32;
    let offset_x = device_x - width_px / 2;
    let offset_y = match anchor {
        Anchor::Bottom => device_y - height_px,
        Anchor::Middle => device_y - height_px / 2,
    };
    for glyph in glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, coverage| {
                let px = offset_x + gx as i32 + bb.min.x - min_x;
                let py = offset_y + gy as i32 + bb.min.y - min_y;
                blend_pixel(canvas, px, py, color, coverage);
            });
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::mpsc::channel;

    #[derive(Default)]
    struct MockTimer {
        initial: Cell<u32>,
        starts: Cell<u32>,
        minute_up: Cell<u32>,
        minute_down: Cell<u32>,
        second_up: Cell<u32>,
        second_down: Cell<u32>,
    }

    impl MockTimer {
        fn with_initial(initial: u32) -> Self {
            let timer = Self::default();
            timer.initial.set(initial);
            timer
        }

        fn total_calls(&self) -> u32 {
            self.starts.get()
                + self.minute_up.get()
                + self.minute_down.get()
                + self.second_up.get()
                + self.second_down.get()
        }
    }

    impl TimerControl for MockTimer {
        fn initial_time(&self) -> u32 {
            self.initial.get()
        }
        fn start(&self) {
            self.starts.set(self.starts.get() + 1);
        }
        fn increase_minute(&self) {
            self.minute_up.set(self.minute_up.get() + 1);
        }
        fn decrease_minute(&self) {
            self.minute_down.set(self.minute_down.get() + 1);
        }
        fn increase_second(&self) {
            self.second_up.set(self.second_up.get() + 1);
        }
        fn decrease_second(&self) {
            self.second_down.set(self.second_down.get() + 1);
        }
    }

    fn face_with_initial(initial: u32) -> ClockFace<MockTimer> {
        ClockFace::new(MockTimer::with_initial(initial), 100.0, FaceStyle::default())
    }

    fn has_last_minute_band(scene: &Scene, style: &FaceStyle) -> bool {
        scene
            .commands()
            .iter()
            .any(|c| matches!(c, DrawCommand::Arc { color, .. } if *color == style.last_minute_band))
    }

    #[test]
    fn band_angle_matches_dial_formula() {
        for seconds in [0u32, 1, 60, 125, 900, 1800, 3599, 3600] {
            let expected = -FRAC_PI_2 - TAU * (seconds as f64 / 3600.0);
            assert!((band_angle(seconds, FULL_DIAL_SECS) - expected).abs() < 1e-12);
            let sweep = band_angle(0, FULL_DIAL_SECS) - band_angle(seconds, FULL_DIAL_SECS);
            assert!((sweep - TAU * seconds as f64 / 3600.0).abs() < 1e-12);
        }
    }

    #[test]
    fn clock_text_is_zero_padded() {
        assert_eq!(format_clock(125), "02:05");
        assert_eq!(format_clock(3599), "59:59");
        assert_eq!(format_clock(0), "00:00");
    }

    #[test]
    fn paint_is_idempotent() {
        let style = FaceStyle::default();
        let first = render_face(125, 600, true, 100.0, &style);
        let second = render_face(125, 600, true, 100.0, &style);
        assert_eq!(first, second);
    }

    #[test]
    fn last_minute_band_gated_on_running_and_threshold() {
        let style = FaceStyle::default();
        assert!(has_last_minute_band(&render_face(60, 600, true, 100.0, &style), &style));
        assert!(has_last_minute_band(&render_face(0, 600, true, 100.0, &style), &style));
        assert!(!has_last_minute_band(&render_face(61, 600, true, 100.0, &style), &style));
        assert!(!has_last_minute_band(&render_face(10, 600, false, 100.0, &style), &style));
    }

    #[test]
    fn scene_layers_follow_paint_order() {
        let style = FaceStyle::default();
        let scene = render_face(125, 600, false, 100.0, &style);
        let commands = scene.commands();
        assert_eq!(commands.len(), 90);
        assert!(matches!(commands[0], DrawCommand::Clear(_)));
        assert!(
            matches!(&commands[1], DrawCommand::Arc { color, thickness, .. }
                if *color == style.initial_band && (*thickness - 80.0).abs() < 1e-9)
        );
        assert!(matches!(&commands[2], DrawCommand::Arc { color, .. } if *color == style.elapsed_band));
        assert!(
            matches!(&commands[3], DrawCommand::Label { text, size, y, anchor, .. }
                if text == "02:05" && *size == 20 && (*y - 35.0).abs() < 1e-9 && *anchor == Anchor::Bottom)
        );
        let ticks = commands.iter().filter(|c| matches!(c, DrawCommand::Tick { .. })).count();
        assert_eq!(ticks, 72);
        let labels = commands.iter().filter(|c| matches!(c, DrawCommand::Label { .. })).count();
        assert_eq!(labels, 14);
        assert!(
            matches!(commands.last(), Some(DrawCommand::Label { text, size, y, .. })
                if text == "BAYO's Timer" && *size == 5 && (*y + 35.0).abs() < 1e-9)
        );
    }

    #[test]
    fn numerals_ring_counter_clockwise() {
        let style = FaceStyle::default();
        let scene = render_face(0, 600, false, 100.0, &style);
        let numerals: Vec<&DrawCommand> = scene
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Label { anchor: Anchor::Middle, .. }))
            .collect();
        assert_eq!(numerals.len(), 12);
        // "0" at 12 o'clock, "15" a quarter turn to the left of it.
        assert!(matches!(numerals[0], DrawCommand::Label { text, x, y, .. }
            if text == "0" && x.abs() < 1e-9 && (*y + 90.0).abs() < 1e-9));
        assert!(matches!(numerals[3], DrawCommand::Label { text, x, y, .. }
            if text == "15" && (*x + 90.0).abs() < 1e-9 && y.abs() < 1e-9));
    }

    #[test]
    fn pump_paints_once_per_tick_in_order() {
        let (running_tx, running_rx) = channel();
        let (tick_tx, tick_rx) = channel();
        let mut face = face_with_initial(600);
        face.attach(TimerStreams {
            running: running_rx,
            ticks: tick_rx,
        });

        running_tx.send(true).unwrap();
        for second in (0..=600).rev() {
            tick_tx.send(second).unwrap();
        }

        let style = FaceStyle::default();
        let mut scenes = Vec::new();
        let painted = face.pump(|scene| scenes.push(scene.clone()));
        assert_eq!(painted, 601);
        for (index, scene) in scenes.iter().enumerate() {
            let second = 600 - index as u32;
            assert_eq!(
                has_last_minute_band(scene, &style),
                second <= 60,
                "band mismatch at {second}s"
            );
        }
    }

    #[test]
    fn running_updates_apply_before_later_ticks() {
        let (running_tx, running_rx) = channel();
        let (tick_tx, tick_rx) = channel();
        let mut face = face_with_initial(600);
        face.attach(TimerStreams {
            running: running_rx,
            ticks: tick_rx,
        });

        running_tx.send(true).unwrap();
        assert_eq!(face.pump(|_| {}), 0);

        tick_tx.send(30).unwrap();
        let style = FaceStyle::default();
        let mut last = None;
        face.pump(|scene| last = Some(scene.clone()));
        assert!(has_last_minute_band(&last.unwrap(), &style));
    }

    #[test]
    fn detach_releases_both_subscriptions() {
        let (running_tx, running_rx) = channel();
        let (tick_tx, tick_rx) = channel();
        let mut face = face_with_initial(600);
        face.attach(TimerStreams {
            running: running_rx,
            ticks: tick_rx,
        });
        assert!(face.is_attached());

        face.detach();
        assert!(!face.is_attached());
        assert!(running_tx.send(true).is_err());
        assert!(tick_tx.send(1).is_err());
        // A second detach, like one before any attach, is a no-op.
        face.detach();
    }

    #[test]
    fn detached_face_never_paints() {
        let (_running_tx, running_rx) = channel();
        let (tick_tx, tick_rx) = channel();
        let mut face = face_with_initial(600);

        assert_eq!(face.pump(|_| panic!("painted without subscriptions")), 0);

        face.attach(TimerStreams {
            running: running_rx,
            ticks: tick_rx,
        });
        tick_tx.send(10).unwrap();
        face.detach();
        assert_eq!(face.pump(|_| panic!("painted after detach")), 0);
    }

    #[test]
    fn single_tap_routes_nothing() {
        let face = face_with_initial(0);
        face.route_gesture(Gesture::from_tap_count(1));
        assert_eq!(face.timer().total_calls(), 0);
    }

    #[test]
    fn double_tap_starts_once() {
        let face = face_with_initial(0);
        face.route_gesture(Gesture::from_tap_count(2));
        assert_eq!(face.timer().starts.get(), 1);
        assert_eq!(face.timer().total_calls(), 1);
    }

    #[test]
    fn pans_route_to_their_commands() {
        let face = face_with_initial(0);
        face.route_gesture(Gesture::PanUp);
        assert_eq!(face.timer().minute_down.get(), 1);
        assert_eq!(face.timer().total_calls(), 1);

        face.route_gesture(Gesture::PanDown);
        face.route_gesture(Gesture::PanLeft);
        face.route_gesture(Gesture::PanRight);
        assert_eq!(face.timer().minute_up.get(), 1);
        assert_eq!(face.timer().second_up.get(), 1);
        assert_eq!(face.timer().second_down.get(), 1);

        face.route_gesture(Gesture::Other);
        assert_eq!(face.timer().total_calls(), 4);
    }

    #[test]
    fn clear_floods_the_frame() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut canvas = Canvas::new(&mut frame, 4, 4);
        canvas.clear(Color::new(1, 2, 3));
        for chunk in frame.chunks_exact(4) {
            assert_eq!(chunk, [1, 2, 3, 0xff]);
        }
    }

    #[test]
    fn blend_respects_alpha_and_bounds() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut canvas = Canvas::new(&mut frame, 4, 4);
        blend_pixel(&mut canvas, 1, 1, Color::new(0xff, 0x00, 0x00), 1.0);
        blend_pixel(&mut canvas, 2, 2, Color::new(0xff, 0x00, 0x00), 0.0);
        blend_pixel(&mut canvas, -1, 0, Color::new(0xff, 0x00, 0x00), 1.0);
        blend_pixel(&mut canvas, 0, 9, Color::new(0xff, 0x00, 0x00), 1.0);
        assert_eq!(&frame[(1 * 4 + 1) * 4..(1 * 4 + 1) * 4 + 4], [0xff, 0, 0, 0xff]);
        assert_eq!(&frame[(2 * 4 + 2) * 4..(2 * 4 + 2) * 4 + 4], [0, 0, 0, 0xff]);
        assert_eq!(&frame[0..4], [0, 0, 0, 0]);
    }

    #[test]
    fn half_turn_band_covers_left_side_only() {
        let mut frame = vec![0u8; 41 * 41 * 4];
        let mut canvas = Canvas::new(&mut frame, 41, 41);
        let red = Color::new(0xff, 0x00, 0x00);
        // Sweep from 12 o'clock counter-clockwise through 6 o'clock.
        fill_band(&mut canvas, 10.0, 4.0, -FRAC_PI_2, -FRAC_PI_2 - TAU / 2.0, red);
        let left = ((20 * 41 + 10) * 4) as usize;
        let right = ((20 * 41 + 30) * 4) as usize;
        let center = ((20 * 41 + 20) * 4) as usize;
        assert_eq!(frame[left], 0xff);
        assert_eq!(frame[right], 0);
        assert_eq!(frame[center], 0);
    }

    #[test]
    fn zero_sweep_band_draws_nothing() {
        let mut frame = vec![0u8; 41 * 41 * 4];
        let mut canvas = Canvas::new(&mut frame, 41, 41);
        fill_band(&mut canvas, 10.0, 4.0, -FRAC_PI_2, -FRAC_PI_2, Color::new(0xff, 0, 0));
        assert!(frame.iter().all(|&b| b == 0));
    }

    #[test]
    fn full_turn_band_ignores_angle_test() {
        let mut frame = vec![0u8; 41 * 41 * 4];
        let mut canvas = Canvas::new(&mut frame, 41, 41);
        let red = Color::new(0xff, 0x00, 0x00);
        fill_band(&mut canvas, 10.0, 4.0, -FRAC_PI_2, -FRAC_PI_2 - TAU, red);
        for (x, y) in [(20, 10), (20, 30), (10, 20), (30, 20)] {
            let idx = ((y * 41 + x) * 4) as usize;
            assert_eq!(frame[idx], 0xff, "ring not covered at ({x},{y})");
        }
        assert_eq!(frame[((20 * 41 + 20) * 4) as usize], 0);
    }

    #[test]
    fn disc_fills_the_center() {
        let mut frame = vec![0u8; 21 * 21 * 4];
        let mut canvas = Canvas::new(&mut frame, 21, 21);
        fill_disc(&mut canvas, 3.0, Color::new(0, 0xff, 0));
        assert_eq!(frame[((10 * 21 + 10) * 4 + 1) as usize], 0xff);
        assert_eq!(frame[((10 * 21 + 18) * 4 + 1) as usize], 0);
    }

    #[test]
    fn tick_stroke_runs_radially() {
        let mut frame = vec![0u8; 41 * 41 * 4];
        let mut canvas = Canvas::new(&mut frame, 41, 41);
        let ink = Color::new(0, 0, 0xff);
        // A 12-o'clock tick between 10 and 18 pixels from the center.
        let (x0, y0) = radial_point(0.0, 10.0);
        let (x1, y1) = radial_point(0.0, 18.0);
        stroke_line(
            &mut canvas,
            20 + x0.round() as i32,
            20 + y0.round() as i32,
            20 + x1.round() as i32,
            20 + y1.round() as i32,
            2.0,
            ink,
        );
        assert_eq!(frame[((6 * 41 + 20) * 4 + 2) as usize], 0xff);
        assert_eq!(frame[((34 * 41 + 20) * 4 + 2) as usize], 0);
    }
}
