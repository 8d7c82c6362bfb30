//! Channel declarations
//!
//! A channel names one float of a motion frame: a translation along, or a
//! rotation about, one coordinate axis.

use glam::Vec3;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Coordinate axis of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Unit vector along this axis
    pub fn unit(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'x' => Some(Self::X),
            'y' => Some(Self::Y),
            'z' => Some(Self::Z),
            _ => None,
        }
    }
}

/// One declared channel of a joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChannelKind {
    XPosition,
    YPosition,
    ZPosition,
    XRotation,
    YRotation,
    ZRotation,
}

impl ChannelKind {
    /// Parse a channel token such as `Xposition` or `zROTATION`
    ///
    /// Only the first two characters are significant: the axis and the
    /// first letter of the kind (`p` or `r`), both case-insensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use mocap_bvh::ChannelKind;
    ///
    /// assert_eq!(ChannelKind::from_token("Zrotation"), Some(ChannelKind::ZRotation));
    /// assert_eq!(ChannelKind::from_token("xPos"), Some(ChannelKind::XPosition));
    /// assert_eq!(ChannelKind::from_token("Wrotation"), None);
    /// ```
    pub fn from_token(token: &str) -> Option<Self> {
        let mut chars = token.chars();
        let axis = Axis::from_char(chars.next()?)?;
        match chars.next()?.to_ascii_lowercase() {
            'p' => Some(Self::position(axis)),
            'r' => Some(Self::rotation(axis)),
            _ => None,
        }
    }

    /// Position channel for an axis
    pub fn position(axis: Axis) -> Self {
        match axis {
            Axis::X => Self::XPosition,
            Axis::Y => Self::YPosition,
            Axis::Z => Self::ZPosition,
        }
    }

    /// Rotation channel for an axis
    pub fn rotation(axis: Axis) -> Self {
        match axis {
            Axis::X => Self::XRotation,
            Axis::Y => Self::YRotation,
            Axis::Z => Self::ZRotation,
        }
    }

    /// The axis this channel acts along
    pub fn axis(self) -> Axis {
        match self {
            Self::XPosition | Self::XRotation => Axis::X,
            Self::YPosition | Self::YRotation => Axis::Y,
            Self::ZPosition | Self::ZRotation => Axis::Z,
        }
    }

    pub fn is_rotation(self) -> bool {
        matches!(self, Self::XRotation | Self::YRotation | Self::ZRotation)
    }

    pub fn is_position(self) -> bool {
        !self.is_rotation()
    }

    /// Canonical BVH spelling
    pub fn as_str(self) -> &'static str {
        match self {
            Self::XPosition => "Xposition",
            Self::YPosition => "Yposition",
            Self::ZPosition => "Zposition",
            Self::XRotation => "Xrotation",
            Self::YRotation => "Yrotation",
            Self::ZRotation => "Zrotation",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Xposition", ChannelKind::XPosition)]
    #[test_case("Yposition", ChannelKind::YPosition)]
    #[test_case("Zposition", ChannelKind::ZPosition)]
    #[test_case("Xrotation", ChannelKind::XRotation)]
    #[test_case("yROTATION", ChannelKind::YRotation)]
    #[test_case("zr", ChannelKind::ZRotation)]
    fn test_parse_channel_token(token: &str, expected: ChannelKind) {
        assert_eq!(ChannelKind::from_token(token), Some(expected));
    }

    #[test_case("" ; "empty")]
    #[test_case("X" ; "too short")]
    #[test_case("Wposition" ; "bad axis")]
    #[test_case("Xscale" ; "bad kind")]
    fn test_reject_channel_token(token: &str) {
        assert_eq!(ChannelKind::from_token(token), None);
    }

    #[test]
    fn test_channel_classification() {
        assert!(ChannelKind::XRotation.is_rotation());
        assert!(ChannelKind::ZPosition.is_position());
        assert_eq!(ChannelKind::YRotation.axis(), Axis::Y);
        assert_eq!(ChannelKind::ZRotation.axis().unit(), Vec3::Z);
    }
}
