//! The animation player.
//!
//! A [`Player`] owns the compositor surfaces and the decoded rasters, and
//! sequences frames according to the configured playback mode. All state
//! transitions happen on the caller's thread: the host either drives
//! [`Player::step`] itself or hands a [`Clock`] to [`Player::run`]. Events
//! are delivered to one listener sink installed at construction.

use crate::compositor::{Compositor, DebugOverlay};
use apngkit_core::animation::Animation;
use apngkit_core::error::{Error, Result};
use apngkit_core::surface::DrawSurface;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Frame ordering for playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    /// Frames in demuxed order.
    #[default]
    Forward,
    /// Frames in reverse order.
    Backward,
    /// Frames forward then backward; the sequence doubles in length and the
    /// boundary frames repeat.
    PingPong,
}

/// Player configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerOptions {
    /// Iteration count: `< 0` inherits the animation's own count, `0` loops
    /// forever, `> 0` overrides.
    pub iterations: i64,
    /// Loop forever regardless of the iteration count.
    pub ignore_iterations: bool,
    /// Use the vsync wait for every frame, not only for delays near one
    /// display refresh.
    pub force_vsync: bool,
    /// Playback mode.
    pub mode: PlaybackMode,
    /// Draw the debug overlay on every rendered frame.
    pub debug: bool,
    /// Debug overlay configuration.
    pub overlay: DebugOverlay,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            iterations: -1,
            ignore_iterations: false,
            force_vsync: false,
            mode: PlaybackMode::Forward,
            debug: false,
            overlay: DebugOverlay::default(),
        }
    }
}

impl PlayerOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the iteration count.
    pub fn with_iterations(mut self, iterations: i64) -> Self {
        self.iterations = iterations;
        self
    }

    /// Loop forever regardless of the iteration count.
    pub fn with_ignore_iterations(mut self, ignore: bool) -> Self {
        self.ignore_iterations = ignore;
        self
    }

    /// Force the vsync wait for every frame.
    pub fn with_force_vsync(mut self, force: bool) -> Self {
        self.force_vsync = force;
        self
    }

    /// Set the playback mode.
    pub fn with_mode(mut self, mode: PlaybackMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable the debug overlay.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Events emitted by the player, in strict per-player order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    /// Playback started.
    Play,
    /// Playback paused.
    Pause,
    /// Playback stopped and rewound.
    Stop,
    /// One full traversal of the sequence completed.
    Iteration {
        /// Completed iterations so far.
        loops: u32,
    },
    /// Playback finished its final iteration.
    Ended,
    /// The canvas now reflects the frame at this sequence position.
    Frame {
        /// Sequence position of the rendered frame.
        index: usize,
    },
}

/// What the player wants to wait for before advancing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WaitRequest {
    /// Plain timer wait, in milliseconds.
    Timer(f64),
    /// Wait for the display's next vertical sync.
    VSync,
}

/// Monotonic time source and wait primitive driving the playback loop.
///
/// Tests drive the player with a manual clock; hosts with a real display
/// map [`WaitRequest::VSync`] onto their frame scheduler.
pub trait Clock {
    /// Current monotonic time in milliseconds.
    fn now_ms(&self) -> f64;

    /// Block until the requested wait elapses.
    fn wait(&mut self, request: WaitRequest);
}

/// Wall-clock [`Clock`] backed by `std::time`, with a 60 Hz vsync interval.
#[derive(Debug)]
pub struct SystemClock {
    epoch: Instant,
    vsync_interval_ms: f64,
}

impl SystemClock {
    /// Create a clock with the standard 60 Hz vsync interval.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            vsync_interval_ms: 1000.0 / 60.0,
        }
    }

    /// Create a clock with a custom vsync interval.
    pub fn with_vsync_interval(vsync_interval_ms: f64) -> Self {
        Self {
            epoch: Instant::now(),
            vsync_interval_ms,
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    fn wait(&mut self, request: WaitRequest) {
        let ms = match request {
            WaitRequest::Timer(ms) => ms,
            WaitRequest::VSync => self.vsync_interval_ms,
        };
        if ms > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(ms / 1000.0));
        }
    }
}

/// Delays within this window prefer the vsync wait over a plain timer.
const VSYNC_DELAY_WINDOW_MS: std::ops::RangeInclusive<f64> = 16.0..=17.0;

type Listener<'a> = Box<dyn FnMut(PlayerEvent) + 'a>;

/// Composites and sequences an [`Animation`] with mode-aware playback.
///
/// The player borrows the animation for its lifetime, which also keeps the
/// retiming utilities from mutating delays mid-playback.
pub struct Player<'a, S: DrawSurface> {
    animation: &'a Animation,
    rasters: Vec<Option<S::Raster>>,
    compositor: Compositor<S>,
    sequence: Vec<usize>,
    mode: PlaybackMode,
    cursor: usize,
    loops: u32,
    running: bool,
    commit: bool,
    iterations: u32,
    infinite: bool,
    force_vsync: bool,
    debug: bool,
    overlay: DebugOverlay,
    start_time: f64,
    current_time: f64,
    listener: Option<Listener<'a>>,
}

impl<'a, S: DrawSurface> Player<'a, S> {
    /// Create a player over a demuxed animation.
    ///
    /// `rasters[i]` is the decoded raster for `animation.frames[i]`, or
    /// `None` for a frame whose pixels failed to decode. The two host
    /// surfaces are resized to the animation's canvas.
    pub fn new(
        animation: &'a Animation,
        rasters: Vec<Option<S::Raster>>,
        canvas: S,
        restore: S,
        options: PlayerOptions,
    ) -> Result<Self> {
        if rasters.len() != animation.frame_count() {
            return Err(Error::UnsupportedInput(format!(
                "{} rasters for {} frames",
                rasters.len(),
                animation.frame_count()
            )));
        }

        let (iterations, infinite) = resolve_iterations(animation, &options);
        debug!(
            frames = animation.frame_count(),
            iterations, infinite, ?options.mode, "player created"
        );

        Ok(Self {
            compositor: Compositor::new(canvas, restore, animation.width, animation.height),
            sequence: build_sequence(options.mode, animation.frame_count()),
            mode: options.mode,
            rasters,
            animation,
            cursor: 0,
            loops: 0,
            running: false,
            commit: true,
            iterations,
            infinite,
            force_vsync: options.force_vsync,
            debug: options.debug,
            overlay: options.overlay,
            start_time: 0.0,
            current_time: 0.0,
            listener: None,
        })
    }

    /// Install the event listener. At most one listener is supported.
    pub fn on_event<F>(mut self, listener: F) -> Self
    where
        F: FnMut(PlayerEvent) + 'a,
    {
        self.listener = Some(Box::new(listener));
        self
    }

    /// The animation being played.
    pub fn animation(&self) -> &Animation {
        self.animation
    }

    /// The composed output canvas.
    pub fn canvas(&self) -> &S {
        self.compositor.canvas()
    }

    /// The playback-ordered frame indices.
    pub fn sequence(&self) -> &[usize] {
        &self.sequence
    }

    /// Length of the playback sequence.
    pub fn sequence_len(&self) -> usize {
        self.sequence.len()
    }

    /// Current playback mode.
    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Current sequence position.
    pub fn current_frame(&self) -> usize {
        self.cursor
    }

    /// Completed iterations.
    pub fn loops(&self) -> u32 {
        self.loops
    }

    /// Whether playback is running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether rendering and frame events are enabled.
    pub fn commit(&self) -> bool {
        self.commit
    }

    /// Enable or disable rendering. When disabled the scheduler still
    /// advances but skips drawing and frame events.
    pub fn set_commit(&mut self, commit: bool) {
        self.commit = commit;
    }

    /// Switch the playback mode, rebuilding the sequence. The cursor is
    /// preserved when still in range, else reset to 0.
    pub fn set_mode(&mut self, mode: PlaybackMode) {
        self.mode = mode;
        self.sequence = build_sequence(mode, self.animation.frame_count());
        if self.cursor >= self.sequence.len() {
            self.cursor = 0;
        }
    }

    /// Seek to a sequence position, clamped to `[0, len - 1]`.
    ///
    /// Rebuilds the canvas from the initial state by re-rendering every
    /// frame up to and including the target, then emits
    /// [`PlayerEvent::Frame`].
    pub fn set_current_frame(&mut self, index: i64) {
        if self.sequence.is_empty() {
            return;
        }
        let target = index.clamp(0, self.sequence.len() as i64 - 1) as usize;

        self.compositor.reset();
        for pos in 0..=target {
            self.render_at(pos);
        }
        self.cursor = target;
        self.emit(PlayerEvent::Frame { index: target });
    }

    /// Seek to a playback time in milliseconds.
    ///
    /// Scans delays from sequence position 0; the first position where the
    /// cumulative delay reaches `time_ms` becomes the current frame
    /// (clamped to the last position).
    pub fn set_current_time(&mut self, time_ms: f64) {
        if self.sequence.is_empty() {
            return;
        }
        let mut acc = 0.0;
        let mut target = self.sequence.len() - 1;
        for (pos, &idx) in self.sequence.iter().enumerate() {
            acc += self.animation.frame_info[idx].delay_ms;
            if acc >= time_ms {
                target = pos;
                break;
            }
        }
        self.current_time = time_ms;
        self.set_current_frame(target as i64);
    }

    /// Start playback.
    pub fn play(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.emit(PlayerEvent::Play);
    }

    /// Pause playback. The pending tick is canceled: no frame event fires
    /// until playback resumes.
    pub fn pause(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.emit(PlayerEvent::Pause);
    }

    /// Stop playback: rewind to the first frame, render it once, and emit
    /// [`PlayerEvent::Stop`].
    pub fn stop(&mut self) {
        self.running = false;
        self.cursor = 0;
        if self.commit && !self.sequence.is_empty() {
            self.render_at(0);
        }
        self.emit(PlayerEvent::Stop);
    }

    /// What the playback loop should wait for before advancing past the
    /// current frame.
    pub fn wait_request(&self) -> WaitRequest {
        let Some(&idx) = self.sequence.get(self.cursor) else {
            return WaitRequest::Timer(0.0);
        };
        let delay = self.animation.frame_info[idx].delay_ms;
        if self.force_vsync || VSYNC_DELAY_WINDOW_MS.contains(&delay) {
            WaitRequest::VSync
        } else {
            WaitRequest::Timer(delay.max(0.0))
        }
    }

    /// Execute one playback tick: render the current frame, wait its delay,
    /// then advance the cursor (wrapping per the iteration rules).
    pub fn step<C: Clock>(&mut self, clock: &mut C) {
        if self.sequence.is_empty() || !self.running {
            return;
        }
        if self.commit {
            self.render_at(self.cursor);
            self.emit(PlayerEvent::Frame { index: self.cursor });
        }
        let request = self.wait_request();
        clock.wait(request);
        self.current_time = clock.now_ms();
        self.advance();
    }

    /// Run the playback loop until it ends or is stopped.
    ///
    /// The loop is a single task owning both surfaces; with an infinite
    /// iteration count this only returns when the listener state machine
    /// is driven externally, so hosts that need mid-playback control should
    /// call [`Player::step`] themselves.
    pub fn run<C: Clock>(&mut self, clock: &mut C) {
        if self.sequence.is_empty() {
            return;
        }
        self.play();
        self.start_time = clock.now_ms();
        self.current_time = self.start_time;
        while self.running {
            self.step(clock);
        }
    }

    /// Timestamp of the last `run` start, in clock milliseconds.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Timestamp of the last completed tick, in clock milliseconds.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    fn advance(&mut self) {
        self.cursor += 1;
        if self.cursor >= self.sequence.len() {
            self.cursor = 0;
            self.loops += 1;
            self.emit(PlayerEvent::Iteration { loops: self.loops });
            if !self.infinite && self.loops >= self.iterations {
                self.running = false;
                self.emit(PlayerEvent::Ended);
            }
        }
    }

    fn render_at(&mut self, pos: usize) {
        let idx = self.sequence[pos];
        let info = &self.animation.frame_info[idx];
        let overlay = if self.debug { Some(&self.overlay) } else { None };
        self.compositor
            .render(idx, info, self.rasters[idx].as_ref(), overlay);
    }

    fn emit(&mut self, event: PlayerEvent) {
        if let Some(listener) = self.listener.as_mut() {
            listener(event);
        }
    }
}

/// Build the playback-ordered frame indices for a mode.
fn build_sequence(mode: PlaybackMode, frame_count: usize) -> Vec<usize> {
    match mode {
        PlaybackMode::Forward => (0..frame_count).collect(),
        PlaybackMode::Backward => (0..frame_count).rev().collect(),
        PlaybackMode::PingPong => (0..frame_count).chain((0..frame_count).rev()).collect(),
    }
}

/// Resolve the effective iteration count and the infinite-loop flag.
fn resolve_iterations(animation: &Animation, options: &PlayerOptions) -> (u32, bool) {
    if options.iterations < 0 {
        if animation.is_apng {
            let inherited = animation.iterations;
            (
                inherited,
                inherited == 0 || options.ignore_iterations,
            )
        } else {
            // A plain PNG renders once and stops; ignore_iterations is
            // forced off for this case.
            (0, false)
        }
    } else if options.iterations == 0 {
        (0, true)
    } else {
        (options.iterations as u32, options.ignore_iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_sequence() {
        assert_eq!(build_sequence(PlaybackMode::Forward, 3), vec![0, 1, 2]);
        assert_eq!(build_sequence(PlaybackMode::Backward, 3), vec![2, 1, 0]);
        assert_eq!(
            build_sequence(PlaybackMode::PingPong, 3),
            vec![0, 1, 2, 2, 1, 0]
        );
        assert!(build_sequence(PlaybackMode::Forward, 0).is_empty());
    }

    #[test]
    fn test_options_builder_defaults() {
        let opts = PlayerOptions::new();
        assert_eq!(opts.iterations, -1);
        assert!(!opts.ignore_iterations);
        assert!(!opts.force_vsync);
        assert_eq!(opts.mode, PlaybackMode::Forward);
        assert!(!opts.debug);

        let opts = PlayerOptions::new()
            .with_iterations(3)
            .with_mode(PlaybackMode::PingPong)
            .with_force_vsync(true);
        assert_eq!(opts.iterations, 3);
        assert_eq!(opts.mode, PlaybackMode::PingPong);
        assert!(opts.force_vsync);
    }

    #[test]
    fn test_playback_mode_serde() {
        let json = serde_json::to_string(&PlaybackMode::PingPong).unwrap();
        assert_eq!(json, "\"pingpong\"");
        let back: PlaybackMode = serde_json::from_str("\"backward\"").unwrap();
        assert_eq!(back, PlaybackMode::Backward);
    }
}
