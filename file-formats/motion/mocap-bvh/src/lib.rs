//! Parser, forward kinematics and playback for BVH motion capture files.
//!
//! A BVH file has two sections: `HIERARCHY` describes a skeleton of joints
//! with rest offsets and animated channels, and `MOTION` lists frames of
//! channel values sampled at a fixed rate. This crate parses both into a
//! [`Skeleton`] and a [`MotionClip`], evaluates joint transforms for any frame
//! and drives playback through [`MotionClipPlayer`].
//!
//! # Examples
//!
//! ```
//! use mocap_bvh::MotionClipPlayer;
//!
//! let source = "HIERARCHY
//! ROOT Hips
//! {
//!     OFFSET 0 0 0
//!     CHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation
//!     JOINT Spine
//!     {
//!         OFFSET 0 5 0
//!         CHANNELS 3 Zrotation Xrotation Yrotation
//!         End Site
//!         {
//!             OFFSET 0 5 0
//!         }
//!     }
//! }
//! MOTION
//! Frames: 2
//! Frame Time: 0.0333
//! 0 0 0 0 0 0 0 0 0
//! 1 0 0 0 0 0 0 0 0
//! ";
//!
//! let mut player = MotionClipPlayer::new();
//! player.load(source)?;
//! assert_eq!(player.num_joints(), 3);
//!
//! player.set_frame(1);
//! player.update(0.0)?;
//! assert!(player.is_frame_new());
//!
//! for joint in player.joints() {
//!     println!("{} at {}", joint.name(), joint.position());
//! }
//! # Ok::<(), mocap_bvh::BvhError>(())
//! ```

#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod channel;
pub mod error;
pub mod hierarchy;
pub mod kinematics;
pub mod motion;
pub mod parser;
pub mod playback;
pub mod player;
pub mod skeleton;
pub mod tokenizer;

pub use glam;

pub use channel::{Axis, ChannelKind};
pub use error::{BvhError, FormatError, Result, Warning};
pub use hierarchy::MAX_JOINT_DEPTH;
pub use motion::{Frame, MotionClip};
pub use parser::{BvhFile, BvhParser, ParserOptions};
pub use playback::PlaybackController;
pub use player::MotionClipPlayer;
pub use skeleton::{Joint, JointId, JointPose, JointRole, JointView, Skeleton};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
