//! Forward kinematics
//!
//! Turns one frame of channel values into local and global joint transforms.
//! Matrices use glam's column-vector convention: a joint's local transform is
//! `T * R` and its global transform is `parent_global * local`.

use glam::{Mat4, Quat, Vec3};

use crate::channel::ChannelKind;
use crate::error::{BvhError, Result};
use crate::motion::Frame;
use crate::skeleton::Skeleton;

/// Local translation and rotation of one joint from its channel values
///
/// `values` must hold exactly one value per channel. Rotations are in
/// degrees and are composed in declaration order, so `Zrotation Xrotation
/// Yrotation` yields `Rz * Rx * Ry`.
pub fn channel_transform(channels: &[ChannelKind], values: &[f32]) -> (Vec3, Quat) {
    let mut translation = Vec3::ZERO;
    let mut rotation = Quat::IDENTITY;

    for (&channel, &value) in channels.iter().zip(values) {
        match channel {
            ChannelKind::XPosition => translation.x = value,
            ChannelKind::YPosition => translation.y = value,
            ChannelKind::ZPosition => translation.z = value,
            ChannelKind::XRotation | ChannelKind::YRotation | ChannelKind::ZRotation => {
                rotation *= Quat::from_axis_angle(channel.axis().unit(), value.to_radians());
            }
        }
    }

    (translation, rotation)
}

/// Pose every joint of `skeleton` with the values of `frame`
///
/// Joints are stored in pre-order, so each parent is final before any of its
/// children is visited and a single pass suffices.
pub fn evaluate(skeleton: &mut Skeleton, frame: &Frame) -> Result<()> {
    let expected = skeleton.total_channel_count();
    if frame.len() != expected {
        return Err(BvhError::FrameSizeMismatch {
            expected,
            found: frame.len(),
        });
    }

    let values = frame.values();
    let joints = skeleton.joints_mut();
    for i in 0..joints.len() {
        let joint = &joints[i];
        let start = joint.channel_offset();
        let end = start + joint.channel_count();
        let (translation, rotation) = channel_transform(joint.channels(), &values[start..end]);

        let offset = translation + joint.rest_offset();
        let local = Mat4::from_rotation_translation(rotation, offset);
        let global = match joint.parent_id() {
            Some(parent) => joints[parent.index()].global_transform() * local,
            None => local,
        };

        joints[i].set_pose(offset, local, global);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::HierarchyParser;
    use crate::motion::MotionParser;

    const EPSILON: f32 = 1e-4;

    fn assert_vec_eq(actual: Vec3, expected: Vec3) {
        assert!(
            actual.abs_diff_eq(expected, EPSILON),
            "expected {expected:?}, got {actual:?}"
        );
    }

    fn load(hierarchy: &str, motion: &str) -> (Skeleton, Vec<Frame>) {
        let skeleton = HierarchyParser::new(hierarchy).parse().unwrap();
        let (clip, _) = MotionParser::new(skeleton.total_channel_count())
            .parse(motion)
            .unwrap();
        (skeleton, clip.frames().to_vec())
    }

    #[test]
    fn test_translation_chain() {
        let (mut skeleton, frames) = load(
            "ROOT Hips { OFFSET 1 0 0 CHANNELS 3 Xposition Yposition Zposition \
             JOINT Spine { OFFSET 0 10 0 End Site { OFFSET 0 5 0 } } }",
            "MOTION\nFrames: 1\nFrame Time: 0.1\n2 3 4\n",
        );
        evaluate(&mut skeleton, &frames[0]).unwrap();

        assert_vec_eq(skeleton.root().position(), Vec3::new(3.0, 3.0, 4.0));
        assert_vec_eq(skeleton.root().offset(), Vec3::new(3.0, 3.0, 4.0));
        assert_vec_eq(skeleton.joint(1).unwrap().position(), Vec3::new(3.0, 13.0, 4.0));
        assert_vec_eq(skeleton.joint(2).unwrap().position(), Vec3::new(3.0, 18.0, 4.0));
    }

    #[test]
    fn test_parent_rotation_carries_children() {
        let (mut skeleton, frames) = load(
            "ROOT Hips { OFFSET 0 0 0 CHANNELS 1 Zrotation End Site { OFFSET 0 10 0 } }",
            "MOTION\nFrames: 1\nFrame Time: 0.1\n90\n",
        );
        evaluate(&mut skeleton, &frames[0]).unwrap();

        // +90 degrees about Z takes +Y to -X
        assert_vec_eq(skeleton.joint(1).unwrap().position(), Vec3::new(-10.0, 0.0, 0.0));
    }

    #[test]
    fn test_rotation_order_follows_declaration() {
        let zx = channel_transform(
            &[ChannelKind::ZRotation, ChannelKind::XRotation],
            &[90.0, 90.0],
        )
        .1;
        let xz = channel_transform(
            &[ChannelKind::XRotation, ChannelKind::ZRotation],
            &[90.0, 90.0],
        )
        .1;

        let rz = Quat::from_rotation_z(90f32.to_radians());
        let rx = Quat::from_rotation_x(90f32.to_radians());
        assert!(zx.abs_diff_eq(rz * rx, EPSILON));
        assert!(xz.abs_diff_eq(rx * rz, EPSILON));
        assert!(!zx.abs_diff_eq(xz, EPSILON));
    }

    #[test]
    fn test_global_composition() {
        let (mut skeleton, frames) = load(
            "ROOT Hips { OFFSET 0 0 0 CHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation \
             JOINT Spine { OFFSET 0 10 0 CHANNELS 3 Zrotation Xrotation Yrotation End Site { OFFSET 0 5 0 } } }",
            "MOTION\nFrames: 1\nFrame Time: 0.1\n1 2 3 10 20 30 40 50 60\n",
        );
        evaluate(&mut skeleton, &frames[0]).unwrap();

        let root = skeleton.root();
        assert_eq!(root.global_transform(), root.local_transform());

        for joint in skeleton.iter().skip(1) {
            let parent = joint.parent().unwrap();
            let expected = parent.global_transform() * joint.local_transform();
            assert!(joint.global_transform().abs_diff_eq(expected, EPSILON));
        }
    }

    #[test]
    fn test_frame_size_mismatch() {
        let (mut skeleton, _) = load(
            "ROOT Hips { OFFSET 0 0 0 CHANNELS 1 Xposition }",
            "MOTION\nFrames: 1\nFrame Time: 0.1\n0\n",
        );
        let (wide, _) = MotionParser::new(2)
            .parse("Frames: 1\nFrame Time: 0.1\n0 0\n")
            .unwrap();

        assert!(matches!(
            evaluate(&mut skeleton, &wide.frames()[0]),
            Err(BvhError::FrameSizeMismatch {
                expected: 1,
                found: 2
            })
        ));
    }
}
