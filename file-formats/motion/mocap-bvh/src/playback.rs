//! Playback state machine
//!
//! Tracks the play head of a clip and decides which frame, if any, has to be
//! evaluated on each tick. It knows nothing about skeletons; the player feeds
//! the returned index into forward kinematics.

/// Slack in frames when mapping a play head to a frame index, so that
/// `i * frame_time` resolves to `i` despite float rounding
const INDEX_EPSILON: f32 = 1e-3;

/// Play head and frame selection for a clip of `frame_count` frames
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackController {
    frame_count: usize,
    frame_time: f32,
    play_head: f32,
    rate: f32,
    playing: bool,
    looping: bool,
    /// Resolved frame index
    frame: usize,
    /// Set by every accepted index change, cleared by `resolve`
    pending: bool,
    frame_new: bool,
}

impl PlaybackController {
    /// Controller for a clip whose first frame is already evaluated
    pub fn new(frame_count: usize, frame_time: f32) -> Self {
        Self {
            frame_count,
            frame_time,
            play_head: 0.0,
            rate: 1.0,
            playing: false,
            looping: false,
            frame: 0,
            pending: false,
            frame_new: false,
        }
    }

    /// Controller with no clip; every operation is a no-op
    pub fn idle() -> Self {
        Self::new(0, 0.0)
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn is_loop(&self) -> bool {
        self.looping
    }

    /// Playback speed multiplier; negative values play backwards
    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate;
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Jump to `index`, clamped to the last frame
    pub fn set_frame(&mut self, index: usize) {
        if self.frame_count == 0 {
            return;
        }

        let index = index.min(self.frame_count - 1);
        if index != self.frame {
            self.frame = index;
            self.play_head = index as f32 * self.frame_time;
            self.pending = true;
        }
    }

    /// Resolved frame index
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Jump to a normalized position; `p` is clamped to `[0, 1]`
    pub fn set_position(&mut self, p: f32) {
        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        let index = (p * self.frame_count as f32).round() as usize;
        self.set_frame(index);
    }

    /// Normalized play head in `[0, 1]`; 0 for an empty clip
    pub fn position(&self) -> f32 {
        let duration = self.duration();
        if duration > 0.0 {
            (self.play_head / duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Clip length in seconds
    pub fn duration(&self) -> f32 {
        self.frame_count as f32 * self.frame_time
    }

    /// Play head in seconds
    pub fn play_head(&self) -> f32 {
        self.play_head
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn frame_time(&self) -> f32 {
        self.frame_time
    }

    /// True when the frame index changed since the last resolve
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// True only for the tick that handed out a new frame
    pub fn is_frame_new(&self) -> bool {
        self.frame_new
    }

    /// Move the play head by `dt` seconds scaled by the rate
    ///
    /// Does nothing while stopped. Running past the last frame wraps to the
    /// start when looping and otherwise stops on the last frame. The play
    /// head never goes below zero.
    pub fn advance(&mut self, dt: f32) {
        if !self.playing || self.frame_count == 0 {
            return;
        }

        self.play_head = (self.play_head + dt * self.rate).max(0.0);

        let index = self.index_at(self.play_head);
        if index == self.frame {
            return;
        }

        let previous = self.frame;
        if index >= self.frame_count {
            if self.looping {
                self.play_head = 0.0;
                self.frame = 0;
            } else {
                let last = self.frame_count - 1;
                log::debug!("Playback reached last frame {last}, stopping");
                self.playing = false;
                self.play_head = last as f32 * self.frame_time;
                self.frame = last;
            }
        } else {
            self.frame = index;
        }

        if self.frame != previous {
            self.pending = true;
        }
    }

    /// Hand out the resolved frame if an index change is pending
    ///
    /// Sets the frame-new pulse for the current tick.
    pub fn resolve(&mut self) -> Option<usize> {
        self.frame_new = std::mem::take(&mut self.pending);
        self.frame_new.then_some(self.frame)
    }

    /// One update step: advance when playing, then resolve
    ///
    /// Returns the frame index to evaluate, if any.
    pub fn tick(&mut self, dt: f32) -> Option<usize> {
        self.frame_new = false;
        self.advance(dt);
        self.resolve()
    }

    /// Back to the state right after [`new`](Self::new) for the same clip
    pub fn reset(&mut self) {
        *self = Self::new(self.frame_count, self.frame_time);
    }

    fn index_at(&self, play_head: f32) -> usize {
        // `as` saturates, so an infinite play head maps past the end
        (play_head / self.frame_time + INDEX_EPSILON).floor() as usize
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::idle()
    }
}
