//! MOTION section: frame data and its parser

use crate::error::{FormatError, Warning};
use crate::tokenizer::{Line, lines, parse_number};

/// Upper bound on capacity reserved from the untrusted `Frames:` header
const MAX_PREALLOCATED_FRAMES: usize = 1 << 16;

/// One sample of every channel of a skeleton
///
/// Value `i` belongs to the `i`-th channel in pre-order joint/channel order.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    values: Vec<f32>,
}

impl Frame {
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered frames sampled at a constant rate
#[derive(Debug, Clone, PartialEq)]
pub struct MotionClip {
    frames: Vec<Frame>,
    frame_time: f32,
    declared_frames: usize,
}

impl MotionClip {
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Number of parsed frames; this is what playback uses
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false for a parsed clip
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Seconds per frame
    pub fn frame_time(&self) -> f32 {
        self.frame_time
    }

    /// Frame count as written in the `Frames:` header
    pub fn declared_frames(&self) -> usize {
        self.declared_frames
    }

    /// Total length in seconds
    pub fn duration(&self) -> f32 {
        self.frames.len() as f32 * self.frame_time
    }
}

/// Parses the MOTION section for a skeleton of known width
#[derive(Debug, Clone)]
pub struct MotionParser {
    channels: usize,
    first_line: usize,
}

impl MotionParser {
    /// Create a parser expecting `channels` values per frame
    pub fn new(channels: usize) -> Self {
        Self {
            channels,
            first_line: 1,
        }
    }

    /// Source line number of the first line handed to [`parse`](Self::parse)
    pub fn starting_at_line(mut self, line: usize) -> Self {
        self.first_line = line;
        self
    }

    /// Parse the section text, which may start with the `MOTION` keyword
    ///
    /// Returns the clip and any non-fatal warnings. A row of the wrong width
    /// fails the whole parse.
    pub fn parse(&self, text: &str) -> Result<(MotionClip, Vec<Warning>), FormatError> {
        let mut lines = lines(text, self.first_line).peekable();
        if lines.peek().is_some_and(|line| line.text == "MOTION") {
            lines.next();
        }

        let declared_frames: usize = parse_header(lines.next(), "Frames:")?;
        let frame_time: f32 = parse_header(lines.next(), "Frame Time:")?;
        if !frame_time.is_finite() || frame_time <= 0.0 {
            return Err(FormatError::InvalidFrameTime(frame_time));
        }

        let mut frames = Vec::with_capacity(declared_frames.min(MAX_PREALLOCATED_FRAMES));
        for line in lines {
            frames.push(self.parse_row(line)?);
        }

        if frames.is_empty() {
            return Err(FormatError::EmptyMotion);
        }

        let mut warnings = Vec::new();
        if declared_frames != frames.len() {
            let warning = Warning::FrameCountMismatch {
                declared: declared_frames,
                parsed: frames.len(),
            };
            log::warn!("{warning}");
            warnings.push(warning);
        }

        log::debug!(
            "Parsed motion: {} frames at {}s per frame",
            frames.len(),
            frame_time
        );

        Ok((
            MotionClip {
                frames,
                frame_time,
                declared_frames,
            },
            warnings,
        ))
    }

    fn parse_row(&self, line: Line<'_>) -> Result<Frame, FormatError> {
        let tokens: Vec<&str> = line.text.split_whitespace().collect();
        if tokens.len() != self.channels {
            return Err(FormatError::ChannelCountMismatch {
                line: line.number,
                expected: self.channels,
                found: tokens.len(),
            });
        }

        let values = tokens
            .into_iter()
            .map(|token| parse_number(token, format!("frame on line {}", line.number)))
            .collect::<Result<Vec<f32>, _>>()?;

        Ok(Frame { values })
    }
}

fn parse_header<T: std::str::FromStr>(
    line: Option<Line<'_>>,
    header: &'static str,
) -> Result<T, FormatError> {
    let line = line.ok_or(FormatError::MissingMotionHeader { header })?;
    let value = line
        .text
        .strip_prefix(header)
        .ok_or(FormatError::MissingMotionHeader { header })?;
    parse_number(value.trim(), format!("'{}' header on line {}", header, line.number))
}
