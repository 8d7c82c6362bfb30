//! Joint hierarchy
//!
//! Joints live in a flat arena in pre-order; parent and child links are
//! [`JointId`] indices into it. A parent always precedes its children, which
//! lets forward kinematics run as a single linear pass.

use glam::{Mat4, Quat, Vec3};
use std::collections::HashMap;
use std::ops::Deref;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::channel::ChannelKind;
use crate::error::{BvhError, FormatError, Result};

/// Index of a joint inside its skeleton
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointId(usize);

impl JointId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// How a joint sits in the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JointRole {
    /// Top of the hierarchy, with at least one child
    Root,
    /// Exactly one child
    Chain,
    /// Two or more children
    Branch,
    /// End effector (no children)
    Site,
}

/// A single joint of a skeleton
#[derive(Debug, Clone)]
pub struct Joint {
    name: String,
    rest_offset: Vec3,
    offset: Vec3,
    channels: Vec<ChannelKind>,
    channel_offset: usize,
    parent: Option<JointId>,
    children: Vec<JointId>,
    local_transform: Mat4,
    global_transform: Mat4,
}

impl Joint {
    fn new(name: String, parent: Option<JointId>) -> Self {
        Self {
            name,
            rest_offset: Vec3::ZERO,
            offset: Vec3::ZERO,
            channels: Vec::new(),
            channel_offset: 0,
            parent,
            children: Vec::new(),
            local_transform: Mat4::IDENTITY,
            global_transform: Mat4::IDENTITY,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Translation relative to the parent in the rest pose (`OFFSET`)
    pub fn rest_offset(&self) -> Vec3 {
        self.rest_offset
    }

    /// Translation relative to the parent in the last evaluated frame
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Declared channels, in file order
    pub fn channels(&self) -> &[ChannelKind] {
        &self.channels
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Index of this joint's first value inside a frame
    pub fn channel_offset(&self) -> usize {
        self.channel_offset
    }

    pub fn parent_id(&self) -> Option<JointId> {
        self.parent
    }

    pub fn child_ids(&self) -> &[JointId] {
        &self.children
    }

    pub fn local_transform(&self) -> Mat4 {
        self.local_transform
    }

    pub fn global_transform(&self) -> Mat4 {
        self.global_transform
    }

    /// Global position of the joint
    pub fn position(&self) -> Vec3 {
        self.global_transform.w_axis.truncate()
    }

    /// Global rotation of the joint
    pub fn rotation(&self) -> Quat {
        let (_, rotation, _) = self.global_transform.to_scale_rotation_translation();
        rotation
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_site(&self) -> bool {
        self.children.is_empty()
    }

    pub fn role(&self) -> JointRole {
        match self.children.len() {
            0 => JointRole::Site,
            _ if self.is_root() => JointRole::Root,
            1 => JointRole::Chain,
            _ => JointRole::Branch,
        }
    }

    pub(crate) fn set_pose(&mut self, offset: Vec3, local: Mat4, global: Mat4) {
        self.offset = offset;
        self.local_transform = local;
        self.global_transform = global;
    }
}

/// Serializable snapshot of one evaluated joint
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointPose {
    pub index: usize,
    pub name: String,
    pub parent: Option<usize>,
    pub position: Vec3,
    pub rotation: Quat,
    pub offset: Vec3,
}

/// A complete joint hierarchy
#[derive(Debug, Clone)]
pub struct Skeleton {
    joints: Vec<Joint>,
    names: HashMap<String, JointId>,
    total_channels: usize,
}

impl Skeleton {
    /// The root joint
    pub fn root(&self) -> JointView<'_> {
        JointView {
            skeleton: self,
            id: JointId(0),
        }
    }

    /// Number of joints, end sites included
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Always false for a parsed skeleton, which has at least a root
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Width of every frame driving this skeleton
    pub fn total_channel_count(&self) -> usize {
        self.total_channels
    }

    /// Joint by pre-order index
    pub fn joint(&self, index: usize) -> Result<JointView<'_>> {
        if index < self.joints.len() {
            Ok(JointView {
                skeleton: self,
                id: JointId(index),
            })
        } else {
            Err(BvhError::JointIndexOutOfRange {
                index,
                len: self.joints.len(),
            })
        }
    }

    /// Joint by name; with duplicate names the last declared joint wins
    pub fn joint_by_name(&self, name: &str) -> Result<JointView<'_>> {
        self.names
            .get(name)
            .map(|&id| JointView { skeleton: self, id })
            .ok_or_else(|| BvhError::JointNotFound(name.to_string()))
    }

    /// All joints in pre-order
    pub fn iter(&self) -> impl Iterator<Item = JointView<'_>> {
        (0..self.joints.len()).map(move |i| JointView {
            skeleton: self,
            id: JointId(i),
        })
    }

    /// Raw joint storage, in pre-order
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub(crate) fn joints_mut(&mut self) -> &mut [Joint] {
        &mut self.joints
    }

    /// Depth of the deepest joint (the root has depth 0)
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.joints.len()];
        for (i, joint) in self.joints.iter().enumerate() {
            if let Some(parent) = joint.parent {
                depths[i] = depths[parent.0] + 1;
            }
        }
        depths.into_iter().max().unwrap_or(0)
    }

    /// Snapshot of every joint's evaluated transform
    pub fn pose(&self) -> Vec<JointPose> {
        self.joints
            .iter()
            .enumerate()
            .map(|(index, joint)| JointPose {
                index,
                name: joint.name.clone(),
                parent: joint.parent.map(JointId::index),
                position: joint.position(),
                rotation: joint.rotation(),
                offset: joint.offset,
            })
            .collect()
    }
}

/// Read-only handle to a joint that can walk the hierarchy
#[derive(Debug, Clone, Copy)]
pub struct JointView<'a> {
    skeleton: &'a Skeleton,
    id: JointId,
}

impl<'a> JointView<'a> {
    pub fn id(&self) -> JointId {
        self.id
    }

    pub fn index(&self) -> usize {
        self.id.0
    }

    /// The skeleton this joint belongs to
    pub fn skeleton(&self) -> &'a Skeleton {
        self.skeleton
    }

    pub fn joint(&self) -> &'a Joint {
        &self.skeleton.joints[self.id.0]
    }

    pub fn parent(self) -> Option<JointView<'a>> {
        let skeleton = self.skeleton;
        self.joint().parent.map(|id| JointView { skeleton, id })
    }

    pub fn children(self) -> impl Iterator<Item = JointView<'a>> {
        let skeleton = self.skeleton;
        self.joint()
            .children
            .iter()
            .map(move |&id| JointView { skeleton, id })
    }
}

impl Deref for JointView<'_> {
    type Target = Joint;

    fn deref(&self) -> &Self::Target {
        self.joint()
    }
}

/// Incremental construction used by the hierarchy parser
#[derive(Debug, Default)]
pub(crate) struct SkeletonBuilder {
    joints: Vec<Joint>,
    names: HashMap<String, JointId>,
}

impl SkeletonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Append a joint; it becomes the last child of `parent`
    pub fn add_joint(&mut self, name: &str, parent: Option<JointId>) -> JointId {
        let id = JointId(self.joints.len());
        self.joints.push(Joint::new(name.to_string(), parent));
        if let Some(parent) = parent {
            self.joints[parent.0].children.push(id);
        }
        self.names.insert(name.to_string(), id);
        id
    }

    pub fn set_rest_offset(&mut self, id: JointId, offset: Vec3) {
        let joint = &mut self.joints[id.0];
        joint.rest_offset = offset;
        joint.offset = offset;
    }

    pub fn push_channel(&mut self, id: JointId, channel: ChannelKind) {
        self.joints[id.0].channels.push(channel);
    }

    pub fn name(&self, id: JointId) -> &str {
        &self.joints[id.0].name
    }

    /// Freeze the hierarchy and lay out frame offsets in pre-order
    pub fn build(mut self) -> std::result::Result<Skeleton, FormatError> {
        if self.joints.is_empty() {
            return Err(FormatError::MissingRoot);
        }

        let mut total_channels = 0;
        for i in 0..self.joints.len() {
            let local = Mat4::from_translation(self.joints[i].rest_offset);
            let global = match self.joints[i].parent {
                Some(parent) => self.joints[parent.0].global_transform * local,
                None => local,
            };

            let joint = &mut self.joints[i];
            joint.channel_offset = total_channels;
            joint.local_transform = local;
            joint.global_transform = global;
            total_channels += joint.channels.len();
        }

        Ok(Skeleton {
            joints: self.joints,
            names: self.names,
            total_channels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Skeleton {
        let mut builder = SkeletonBuilder::new();
        let hips = builder.add_joint("Hips", None);
        builder.push_channel(hips, ChannelKind::XPosition);
        builder.push_channel(hips, ChannelKind::ZRotation);
        let spine = builder.add_joint("Spine", Some(hips));
        builder.push_channel(spine, ChannelKind::XRotation);
        builder.add_joint("Site", Some(spine));
        let leg = builder.add_joint("Leg", Some(hips));
        builder.push_channel(leg, ChannelKind::YRotation);
        builder.add_joint("Site", Some(leg));
        builder.build().unwrap()
    }

    #[test]
    fn test_build_lays_out_channels_in_pre_order() {
        let skeleton = sample();
        assert_eq!(skeleton.len(), 5);
        assert_eq!(skeleton.total_channel_count(), 4);

        let offsets: Vec<_> = skeleton.iter().map(|j| j.channel_offset()).collect();
        assert_eq!(offsets, vec![0, 2, 3, 3, 4]);
    }

    #[test]
    fn test_navigation() {
        let skeleton = sample();
        let root = skeleton.root();
        assert!(root.is_root());
        assert_eq!(root.role(), JointRole::Root);

        let names: Vec<_> = root.children().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["Spine", "Leg"]);

        let spine = skeleton.joint(1).unwrap();
        assert_eq!(spine.role(), JointRole::Chain);
        assert_eq!(spine.parent().unwrap().name(), "Hips");

        let site = skeleton.joint(2).unwrap();
        assert!(site.is_site());
        assert_eq!(site.role(), JointRole::Site);
        assert_eq!(skeleton.depth(), 2);
    }

    #[test]
    fn test_parent_precedes_children() {
        let skeleton = sample();
        for joint in skeleton.iter() {
            for child in joint.children() {
                assert!(child.index() > joint.index());
            }
        }
    }

    #[test]
    fn test_duplicate_names_last_wins() {
        let skeleton = sample();
        assert_eq!(skeleton.joint_by_name("Site").unwrap().index(), 4);
    }

    #[test]
    fn test_lookup_errors() {
        let skeleton = sample();
        assert!(matches!(
            skeleton.joint(5),
            Err(BvhError::JointIndexOutOfRange { index: 5, len: 5 })
        ));
        assert!(matches!(
            skeleton.joint_by_name("Head"),
            Err(BvhError::JointNotFound(name)) if name == "Head"
        ));
    }

    #[test]
    fn test_empty_builder_has_no_root() {
        assert_eq!(
            SkeletonBuilder::new().build().unwrap_err(),
            FormatError::MissingRoot
        );
    }

    #[test]
    fn test_childless_root_is_site() {
        let mut builder = SkeletonBuilder::new();
        builder.add_joint("Lonely", None);
        let skeleton = builder.build().unwrap();
        assert_eq!(skeleton.root().role(), JointRole::Site);
        assert!(skeleton.root().is_root());
    }
}
