//! Whole-file BVH parsing

use memchr::{memchr_iter, memmem};
use std::fs;
use std::path::Path;

use crate::error::{FormatError, Result, Warning};
use crate::hierarchy::HierarchyParser;
use crate::motion::{MotionClip, MotionParser};
use crate::skeleton::Skeleton;

const HIERARCHY: &str = "HIERARCHY";
const MOTION: &str = "MOTION";

/// Parser configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    /// Fail instead of warning when `Frames:` disagrees with the row count
    pub strict_frame_count: bool,
}

impl ParserOptions {
    /// Options with every check promoted to an error
    pub fn strict() -> Self {
        Self {
            strict_frame_count: true,
        }
    }
}

/// A parsed BVH file
#[derive(Debug, Clone)]
pub struct BvhFile {
    skeleton: Skeleton,
    clip: MotionClip,
    warnings: Vec<Warning>,
}

impl BvhFile {
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn clip(&self) -> &MotionClip {
        &self.clip
    }

    /// Non-fatal problems found while parsing
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_parts(self) -> (Skeleton, MotionClip, Vec<Warning>) {
        (self.skeleton, self.clip, self.warnings)
    }
}

/// Splits a BVH document into its sections and parses both
///
/// # Examples
///
/// ```
/// use mocap_bvh::BvhParser;
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
/// 1 0 0
/// ";
///
/// let file = BvhParser::new().parse_str(source).unwrap();
/// assert_eq!(file.skeleton().len(), 2);
/// assert_eq!(file.clip().len(), 2);
/// assert_eq!(file.clip().duration(), 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BvhParser {
    options: ParserOptions,
}

impl BvhParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ParserOptions {
        self.options
    }

    /// Parse BVH source text
    pub fn parse_str(&self, source: &str) -> Result<BvhFile> {
        let bytes = source.as_bytes();
        let hierarchy_start =
            memmem::find(bytes, HIERARCHY.as_bytes()).ok_or(FormatError::MissingSection {
                section: HIERARCHY,
            })?;
        let motion_start = memmem::find(&bytes[hierarchy_start..], MOTION.as_bytes())
            .map(|offset| hierarchy_start + offset)
            .ok_or(FormatError::MissingSection { section: MOTION })?;

        let skeleton = HierarchyParser::new(&source[hierarchy_start..motion_start]).parse()?;

        let first_line = 1 + memchr_iter(b'\n', &bytes[..motion_start]).count();
        let (clip, warnings) = MotionParser::new(skeleton.total_channel_count())
            .starting_at_line(first_line)
            .parse(&source[motion_start..])?;

        if self.options.strict_frame_count
            && let Some(Warning::FrameCountMismatch { declared, parsed }) = warnings.first()
        {
            return Err(FormatError::FrameCountMismatch {
                declared: *declared,
                parsed: *parsed,
            }
            .into());
        }

        log::debug!(
            "Parsed BVH: {} joints, {} channels, {} frames",
            skeleton.len(),
            skeleton.total_channel_count(),
            clip.len()
        );

        Ok(BvhFile {
            skeleton,
            clip,
            warnings,
        })
    }

    /// Read and parse a BVH file
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<BvhFile> {
        let path = path.as_ref();
        log::debug!("Reading BVH file {}", path.display());
        let source = fs::read_to_string(path)?;
        self.parse_str(&source)
    }
}
