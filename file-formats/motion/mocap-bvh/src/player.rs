//! Motion clip player
//!
//! Owns one parsed skeleton and clip, drives the playback state machine and
//! keeps the skeleton posed at the current frame. Consumers only ever get
//! read-only joint views, borrowed from the player.

use std::path::Path;

use crate::error::{BvhError, Result, Warning};
use crate::kinematics;
use crate::motion::MotionClip;
use crate::parser::{BvhFile, BvhParser, ParserOptions};
use crate::playback::PlaybackController;
use crate::skeleton::{JointPose, JointView, Skeleton};

#[derive(Debug)]
struct Loaded {
    skeleton: Skeleton,
    clip: MotionClip,
    warnings: Vec<Warning>,
}

/// Plays a BVH clip and exposes the posed skeleton
///
/// # Examples
///
/// ```
/// use mocap_bvh::MotionClipPlayer;
///
/// let source = "HIERARCHY
/// ROOT Hips
/// {
///     OFFSET 0 0 0
///     CHANNELS 3 Xposition Yposition Zposition
///     End Site
///     {
///         OFFSET 0 10 0
///     }
/// }
/// MOTION
/// Frames: 2
/// Frame Time: 0.5
/// 0 0 0
/// 4 0 0
/// ";
///
/// let mut player = MotionClipPlayer::new();
/// player.load(source).unwrap();
/// player.play();
///
/// player.update(0.5).unwrap();
/// assert!(player.is_frame_new());
/// assert_eq!(player.frame(), 1);
///
/// let tip = player.joint(1).unwrap();
/// assert_eq!(tip.position().x, 4.0);
/// ```
#[derive(Debug, Default)]
pub struct MotionClipPlayer {
    loaded: Option<Loaded>,
    playback: PlaybackController,
}

impl MotionClipPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `source` and install it, replacing anything loaded before
    ///
    /// On error the player is left unloaded.
    pub fn load(&mut self, source: &str) -> Result<()> {
        self.load_with_options(source, ParserOptions::default())
    }

    /// Like [`load`](Self::load) with explicit parser options
    pub fn load_with_options(&mut self, source: &str, options: ParserOptions) -> Result<()> {
        self.unload();
        let file = BvhParser::with_options(options).parse_str(source)?;
        self.install(file)
    }

    /// Read, parse and install a BVH file
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.unload();
        let file = BvhParser::new().parse_file(path)?;
        self.install(file)
    }

    fn install(&mut self, file: BvhFile) -> Result<()> {
        let (mut skeleton, clip, warnings) = file.into_parts();
        if let Some(first) = clip.frame(0) {
            kinematics::evaluate(&mut skeleton, first)?;
        }

        log::debug!(
            "Loaded clip: {} joints, {} frames, {:.3}s",
            skeleton.len(),
            clip.len(),
            clip.duration()
        );

        self.playback = PlaybackController::new(clip.len(), clip.frame_time());
        self.loaded = Some(Loaded {
            skeleton,
            clip,
            warnings,
        });
        Ok(())
    }

    /// Drop the skeleton and clip and stop playback
    pub fn unload(&mut self) {
        self.loaded = None;
        self.playback = PlaybackController::idle();
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn play(&mut self) {
        self.playback.play();
    }

    pub fn stop(&mut self) {
        self.playback.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub fn set_loop(&mut self, looping: bool) {
        self.playback.set_loop(looping);
    }

    pub fn is_loop(&self) -> bool {
        self.playback.is_loop()
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.playback.set_rate(rate);
    }

    pub fn rate(&self) -> f32 {
        self.playback.rate()
    }

    /// Jump to a frame; the pose follows on the next [`update`](Self::update)
    pub fn set_frame(&mut self, index: usize) {
        self.playback.set_frame(index);
    }

    pub fn frame(&self) -> usize {
        self.playback.frame()
    }

    /// Jump to a normalized position in `[0, 1]`
    pub fn set_position(&mut self, position: f32) {
        self.playback.set_position(position);
    }

    pub fn position(&self) -> f32 {
        self.playback.position()
    }

    /// Clip length in seconds; 0 when nothing is loaded
    pub fn duration(&self) -> f32 {
        self.playback.duration()
    }

    pub fn frame_count(&self) -> usize {
        self.playback.frame_count()
    }

    pub fn frame_time(&self) -> f32 {
        self.playback.frame_time()
    }

    /// Number of joints, end sites included; 0 when nothing is loaded
    pub fn num_joints(&self) -> usize {
        self.loaded.as_ref().map_or(0, |loaded| loaded.skeleton.len())
    }

    pub fn joint(&self, index: usize) -> Result<JointView<'_>> {
        match &self.loaded {
            Some(loaded) => loaded.skeleton.joint(index),
            None => Err(BvhError::JointIndexOutOfRange { index, len: 0 }),
        }
    }

    pub fn joint_by_name(&self, name: &str) -> Result<JointView<'_>> {
        match &self.loaded {
            Some(loaded) => loaded.skeleton.joint_by_name(name),
            None => Err(BvhError::JointNotFound(name.to_string())),
        }
    }

    /// Joints in pre-order; empty when nothing is loaded
    pub fn joints(&self) -> impl Iterator<Item = JointView<'_>> {
        self.skeleton().into_iter().flat_map(|skeleton| skeleton.iter())
    }

    pub fn skeleton(&self) -> Option<&Skeleton> {
        self.loaded.as_ref().map(|loaded| &loaded.skeleton)
    }

    /// Snapshot of the current pose
    pub fn pose(&self) -> Vec<JointPose> {
        self.skeleton().map(Skeleton::pose).unwrap_or_default()
    }

    /// Warnings from the last successful load
    pub fn warnings(&self) -> &[Warning] {
        self.loaded
            .as_ref()
            .map(|loaded| loaded.warnings.as_slice())
            .unwrap_or_default()
    }

    /// True only for the update that moved to a new frame
    pub fn is_frame_new(&self) -> bool {
        self.playback.is_frame_new()
    }

    /// Advance playback by `dt` seconds and re-pose the skeleton if needed
    pub fn update(&mut self, dt: f32) -> Result<()> {
        let Some(index) = self.playback.tick(dt) else {
            return Ok(());
        };

        if let Some(loaded) = &mut self.loaded
            && let Some(frame) = loaded.clip.frame(index)
        {
            kinematics::evaluate(&mut loaded.skeleton, frame)?;
        }
        Ok(())
    }
}
