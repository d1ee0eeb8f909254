use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use pixels::{Pixels, SurfaceTexture};
use rusttype::Font;
use tracing_subscriber::EnvFilter;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use countdown_face::{
    Canvas, ClockFace, FaceError, FaceStyle, Gesture, TimerControl, TimerStreams, FULL_DIAL_SECS,
};

const TARGET_FPS: f64 = 60.0;
const PAN_THRESHOLD_PX: f64 = 24.0;
const DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(350);

#[derive(Parser, Debug)]
#[command(author, version, about = "Analog countdown timer face", long_about = None)]
struct Cli {
    /// Face radius in pixels; the window is sized to twice this value.
    #[arg(long, default_value_t = 150.0)]
    radius: f64,
    /// Initial countdown minutes.
    #[arg(long, default_value_t = 10)]
    minutes: u32,
    /// Additional initial seconds.
    #[arg(long, default_value_t = 0)]
    seconds: u32,
    /// Path to a TTF/OTF font used for the face labels.
    #[arg(long)]
    font: PathBuf,
    /// Window title.
    #[arg(long, default_value = "Countdown")]
    title: String,
}

fn main() -> countdown_face::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let font_data = std::fs::read(&cli.font)?;
    let font = Font::try_from_vec(font_data).ok_or(FaceError::Font)?;

    let initial = (cli.minutes * 60 + cli.seconds).min(FULL_DIAL_SECS);
    tracing::info!(radius = cli.radius, initial, "starting countdown face");

    let (timer, streams) = spawn_timer(initial);
    let mut face = ClockFace::new(timer, cli.radius, FaceStyle::default());
    face.attach(streams);

    run_window(face, font, &cli.title)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

// ============================================================================
// REFERENCE TIMER
// ============================================================================

enum TimerCommand {
    Start,
    IncreaseMinute,
    DecreaseMinute,
    IncreaseSecond,
    DecreaseSecond,
}

/// Control handle for the countdown worker. Mutations are one-way sends; the
/// worker keeps the shared initial-time value current for queries.
struct TimerLink {
    commands: Sender<TimerCommand>,
    initial: Arc<AtomicU32>,
}

impl TimerControl for TimerLink {
    fn initial_time(&self) -> u32 {
        self.initial.load(Ordering::Relaxed)
    }
    fn start(&self) {
        let _ = self.commands.send(TimerCommand::Start);
    }
    fn increase_minute(&self) {
        let _ = self.commands.send(TimerCommand::IncreaseMinute);
    }
    fn decrease_minute(&self) {
        let _ = self.commands.send(TimerCommand::DecreaseMinute);
    }
    fn increase_second(&self) {
        let _ = self.commands.send(TimerCommand::IncreaseSecond);
    }
    fn decrease_second(&self) {
        let _ = self.commands.send(TimerCommand::DecreaseSecond);
    }
}

/// Spawn the countdown worker. The run-state emission and the first tick are
/// queued before the worker starts, so subscribers never see a tick ahead of
/// a run-state value.
fn spawn_timer(initial: u32) -> (TimerLink, TimerStreams) {
    let (command_tx, command_rx) = channel();
    let (running_tx, running_rx) = channel();
    let (tick_tx, tick_rx) = channel();

    let shared_initial = Arc::new(AtomicU32::new(initial));
    let _ = running_tx.send(false);
    let _ = tick_tx.send(initial);

    let worker_initial = shared_initial.clone();
    thread::spawn(move || timer_loop(initial, worker_initial, command_rx, running_tx, tick_tx));

    (
        TimerLink {
            commands: command_tx,
            initial: shared_initial,
        },
        TimerStreams {
            running: running_rx,
            ticks: tick_rx,
        },
    )
}

fn timer_loop(
    mut remaining: u32,
    initial: Arc<AtomicU32>,
    commands: Receiver<TimerCommand>,
    running_tx: Sender<bool>,
    tick_tx: Sender<u32>,
) {
    let mut running = false;
    let mut next_tick = Instant::now();
    loop {
        let timeout = if running {
            next_tick.saturating_duration_since(Instant::now())
        } else {
            Duration::from_millis(250)
        };
        match commands.recv_timeout(timeout) {
            Ok(TimerCommand::Start) => {
                if !running && remaining > 0 {
                    running = true;
                    next_tick = Instant::now() + Duration::from_secs(1);
                    if running_tx.send(true).is_err() {
                        break;
                    }
                    tracing::info!(remaining, "countdown started");
                }
            }
            Ok(command) => {
                // Adjustments only apply while paused.
                if running {
                    continue;
                }
                let delta: i64 = match command {
                    TimerCommand::Start => 0,
                    TimerCommand::IncreaseMinute => 60,
                    TimerCommand::DecreaseMinute => -60,
                    TimerCommand::IncreaseSecond => 1,
                    TimerCommand::DecreaseSecond => -1,
                };
                let adjusted = (remaining as i64 + delta).clamp(0, FULL_DIAL_SECS as i64) as u32;
                if adjusted != remaining {
                    remaining = adjusted;
                    initial.store(remaining, Ordering::Relaxed);
                    if tick_tx.send(remaining).is_err() {
                        break;
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if running && Instant::now() >= next_tick {
                    remaining = remaining.saturating_sub(1);
                    next_tick += Duration::from_secs(1);
                    if tick_tx.send(remaining).is_err() {
                        break;
                    }
                    if remaining == 0 {
                        running = false;
                        if running_tx.send(false).is_err() {
                            break;
                        }
                        tracing::info!("countdown finished");
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

// ============================================================================
// GESTURE RECOGNITION
// ============================================================================

/// Turns raw mouse input into the face's discrete gestures: a short
/// press/release is a tap (two within the window make a double tap), a long
/// drag classifies as a pan along its dominant axis.
struct GestureDetector {
    cursor: PhysicalPosition<f64>,
    pressed_at: Option<PhysicalPosition<f64>>,
    last_tap: Option<Instant>,
}

impl GestureDetector {
    fn new() -> Self {
        Self {
            cursor: PhysicalPosition::new(0.0, 0.0),
            pressed_at: None,
            last_tap: None,
        }
    }

    fn cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.cursor = position;
    }

    fn mouse_input(&mut self, state: ElementState, button: MouseButton) -> Option<Gesture> {
        if button != MouseButton::Left {
            return None;
        }
        match state {
            ElementState::Pressed => {
                self.pressed_at = Some(self.cursor);
                None
            }
            ElementState::Released => {
                let pressed = self.pressed_at.take()?;
                let dx = self.cursor.x - pressed.x;
                let dy = self.cursor.y - pressed.y;
                if dx.abs() < PAN_THRESHOLD_PX && dy.abs() < PAN_THRESHOLD_PX {
                    let now = Instant::now();
                    let count = match self.last_tap {
                        Some(previous) if now.duration_since(previous) <= DOUBLE_TAP_WINDOW => 2,
                        _ => 1,
                    };
                    self.last_tap = if count == 2 { None } else { Some(now) };
                    Some(Gesture::from_tap_count(count))
                } else if dx.abs() >= dy.abs() {
                    Some(if dx > 0.0 { Gesture::PanRight } else { Gesture::PanLeft })
                } else {
                    Some(if dy > 0.0 { Gesture::PanDown } else { Gesture::PanUp })
                }
            }
        }
    }
}

fn key_gesture(key: &Key) -> Option<Gesture> {
    match key {
        Key::Named(NamedKey::ArrowUp) => Some(Gesture::PanUp),
        Key::Named(NamedKey::ArrowDown) => Some(Gesture::PanDown),
        Key::Named(NamedKey::ArrowLeft) => Some(Gesture::PanLeft),
        Key::Named(NamedKey::ArrowRight) => Some(Gesture::PanRight),
        Key::Named(NamedKey::Space) | Key::Named(NamedKey::Enter) => Some(Gesture::DoubleTap),
        _ => None,
    }
}

// ============================================================================
// WINDOW LOOP
// ============================================================================

fn run_window<T: TimerControl>(
    mut face: ClockFace<T>,
    font: Font<'static>,
    title: &str,
) -> countdown_face::Result<()> {
    let side = (face.radius() * 2.0).round().max(1.0);

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(title)
        .with_inner_size(LogicalSize::new(side, side))
        .with_resizable(false)
        .build(&event_loop)?;
    let window = Arc::new(window);
    let window_clone = window.clone();

    let size = window.inner_size();
    let mut fb_width = size.width as usize;
    let mut fb_height = size.height as usize;
    let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
    let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;

    let mut gestures = GestureDetector::new();
    let frame_duration = Duration::from_secs_f64(1.0 / TARGET_FPS);
    let mut last_frame = Instant::now();

    event_loop.run(move |event, window_target| {
        window_target.set_control_flow(ControlFlow::Poll);
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    face.detach();
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    fb_width = new_size.width as usize;
                    fb_height = new_size.height as usize;
                    let _ = pixels.resize_buffer(new_size.width, new_size.height);
                    let _ = pixels.resize_surface(new_size.width, new_size.height);
                }
                WindowEvent::CursorMoved { position, .. } => gestures.cursor_moved(position),
                WindowEvent::MouseInput { state, button, .. } => {
                    if let Some(gesture) = gestures.mouse_input(state, button) {
                        tracing::debug!(?gesture, "gesture recognized");
                        face.route_gesture(gesture);
                    }
                }
                WindowEvent::KeyboardInput { event: key_event, .. } => {
                    if key_event.state == ElementState::Pressed && !key_event.repeat {
                        if let Some(gesture) = key_gesture(&key_event.logical_key) {
                            tracing::debug!(?gesture, "key gesture");
                            face.route_gesture(gesture);
                        }
                    }
                }
                WindowEvent::RedrawRequested => {
                    let frame = pixels.frame_mut();
                    let mut canvas = Canvas::new(frame, fb_width, fb_height);
                    face.pump(|scene| scene.rasterize(&mut canvas, &font));
                    if let Err(err) = pixels.render() {
                        tracing::error!(%err, "surface present failed");
                        window_target.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                if last_frame.elapsed() >= frame_duration {
                    window_clone.request_redraw();
                    last_frame = Instant::now();
                }
            }
            _ => {}
        }
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release_after_drag(detector: &mut GestureDetector, dx: f64, dy: f64) -> Option<Gesture> {
        detector.cursor_moved(PhysicalPosition::new(100.0, 100.0));
        detector.mouse_input(ElementState::Pressed, MouseButton::Left);
        detector.cursor_moved(PhysicalPosition::new(100.0 + dx, 100.0 + dy));
        detector.mouse_input(ElementState::Released, MouseButton::Left)
    }

    #[test]
    fn drags_classify_by_dominant_axis() {
        let mut detector = GestureDetector::new();
        assert_eq!(release_after_drag(&mut detector, 80.0, 10.0), Some(Gesture::PanRight));
        assert_eq!(release_after_drag(&mut detector, -80.0, 10.0), Some(Gesture::PanLeft));
        assert_eq!(release_after_drag(&mut detector, 5.0, 60.0), Some(Gesture::PanDown));
        assert_eq!(release_after_drag(&mut detector, 5.0, -60.0), Some(Gesture::PanUp));
    }

    #[test]
    fn two_quick_taps_make_a_double_tap() {
        let mut detector = GestureDetector::new();
        assert_eq!(release_after_drag(&mut detector, 0.0, 0.0), Some(Gesture::Other));
        assert_eq!(release_after_drag(&mut detector, 0.0, 0.0), Some(Gesture::DoubleTap));
        // The pair is consumed; a third tap starts a new sequence.
        assert_eq!(release_after_drag(&mut detector, 0.0, 0.0), Some(Gesture::Other));
    }

    #[test]
    fn right_button_is_ignored() {
        let mut detector = GestureDetector::new();
        assert_eq!(detector.mouse_input(ElementState::Pressed, MouseButton::Right), None);
        assert_eq!(detector.mouse_input(ElementState::Released, MouseButton::Right), None);
    }

    #[test]
    fn worker_emits_state_before_first_tick() {
        let (link, streams) = spawn_timer(90);
        assert_eq!(streams.running.recv_timeout(Duration::from_secs(1)), Ok(false));
        assert_eq!(streams.ticks.recv_timeout(Duration::from_secs(1)), Ok(90));

        link.increase_minute();
        assert_eq!(streams.ticks.recv_timeout(Duration::from_secs(1)), Ok(150));
        assert_eq!(link.initial_time(), 150);

        link.start();
        assert_eq!(streams.running.recv_timeout(Duration::from_secs(1)), Ok(true));
    }
}
