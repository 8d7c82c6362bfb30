//! Parser for the HIERARCHY section

use glam::Vec3;

use crate::channel::ChannelKind;
use crate::error::FormatError;
use crate::skeleton::{JointId, Skeleton, SkeletonBuilder};
use crate::tokenizer::Tokens;

const JOINT_BLOCK: &str = "OFFSET, CHANNELS, JOINT, End or '}'";
const END_SITE_BLOCK: &str = "OFFSET, CHANNELS or '}'";

/// Deepest joint nesting accepted below the root
pub const MAX_JOINT_DEPTH: usize = 1024;

/// Builds a [`Skeleton`] from the text of a HIERARCHY section
///
/// The text may start with the `HIERARCHY` keyword itself. Exactly one
/// `ROOT` block is accepted; anything after its closing brace is an error.
///
/// # Examples
///
/// ```
/// use mocap_bvh::hierarchy::HierarchyParser;
///
/// let skeleton = HierarchyParser::new(
///     "HIERARCHY ROOT Hips { OFFSET 0 0 0 CHANNELS 3 Xposition Yposition Zposition \
///      End Site { OFFSET 0 1 0 } }",
/// )
/// .parse()
/// .unwrap();
///
/// assert_eq!(skeleton.len(), 2);
/// assert_eq!(skeleton.total_channel_count(), 3);
/// ```
#[derive(Debug)]
pub struct HierarchyParser<'a> {
    tokens: Tokens<'a>,
    builder: SkeletonBuilder,
}

impl<'a> HierarchyParser<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            tokens: Tokens::new(text),
            builder: SkeletonBuilder::new(),
        }
    }

    /// Consume the token stream and build the skeleton
    pub fn parse(mut self) -> Result<Skeleton, FormatError> {
        if self.tokens.peek() == Some("HIERARCHY") {
            self.tokens.next();
        }

        match self.tokens.next() {
            Some("ROOT") => {}
            Some(token) => {
                return Err(FormatError::UnexpectedToken {
                    expected: "ROOT",
                    found: token.to_string(),
                });
            }
            None => return Err(FormatError::MissingRoot),
        }

        self.parse_root()?;

        if let Some(token) = self.tokens.next() {
            return Err(FormatError::UnexpectedToken {
                expected: "end of hierarchy",
                found: token.to_string(),
            });
        }

        log::debug!(
            "Parsed hierarchy: {} joints from {} tokens",
            self.builder.len(),
            self.tokens.consumed()
        );
        self.builder.build()
    }

    /// Parse the ROOT block and everything nested in it
    ///
    /// Open blocks live on an explicit stack, so nesting depth is bounded by
    /// [`MAX_JOINT_DEPTH`] rather than by the call stack.
    fn parse_root(&mut self) -> Result<(), FormatError> {
        let mut open = vec![self.open_block(None, false)?];

        while let Some(&(id, end_site)) = open.last() {
            let token = self.tokens.expect_any("joint block")?;
            match token {
                "OFFSET" => {
                    let x = self.tokens.parse("OFFSET")?;
                    let y = self.tokens.parse("OFFSET")?;
                    let z = self.tokens.parse("OFFSET")?;
                    self.builder.set_rest_offset(id, Vec3::new(x, y, z));
                }
                "CHANNELS" => self.parse_channels(id)?,
                "JOINT" | "End" if !end_site => {
                    if open.len() > MAX_JOINT_DEPTH {
                        return Err(FormatError::HierarchyTooDeep {
                            limit: MAX_JOINT_DEPTH,
                        });
                    }
                    open.push(self.open_block(Some(id), token == "End")?);
                }
                "}" => {
                    open.pop();
                }
                _ => {
                    return Err(FormatError::UnexpectedToken {
                        expected: if end_site { END_SITE_BLOCK } else { JOINT_BLOCK },
                        found: token.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Parse `<name> {` after a ROOT, JOINT or End keyword
    fn open_block(
        &mut self,
        parent: Option<JointId>,
        end_site: bool,
    ) -> Result<(JointId, bool), FormatError> {
        let name = self.tokens.expect_any("joint name")?;
        let id = self.builder.add_joint(name, parent);
        self.tokens.expect("{")?;
        Ok((id, end_site))
    }

    /// Parse `<n> <channel>*n` after a CHANNELS keyword
    fn parse_channels(&mut self, id: JointId) -> Result<(), FormatError> {
        let count: usize = self.tokens.parse("CHANNELS")?;
        for _ in 0..count {
            let token = self.tokens.expect_any("CHANNELS")?;
            let channel =
                ChannelKind::from_token(token).ok_or_else(|| FormatError::UnknownChannelToken {
                    token: token.to_string(),
                    joint: self.builder.name(id).to_string(),
                })?;
            self.builder.push_channel(id, channel);
        }
        Ok(())
    }
}
