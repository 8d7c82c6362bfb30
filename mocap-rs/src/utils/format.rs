//! Formatting utilities

use humansize::{DECIMAL, format_size};
use mocap_bvh::{ChannelKind, glam::Quat, glam::Vec3};

/// Format file size in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Format a duration given in seconds
pub fn format_seconds(seconds: f32) -> String {
    if seconds >= 60.0 {
        let minutes = (seconds / 60.0).floor();
        format!("{}m {:.3}s", minutes as u32, seconds - minutes * 60.0)
    } else {
        format!("{seconds:.3}s")
    }
}

/// Frames per second for a frame time, or "N/A" for a degenerate one
pub fn format_frame_rate(frame_time: f32) -> String {
    if frame_time > 0.0 {
        format!("{:.2} fps", 1.0 / frame_time)
    } else {
        "N/A".to_string()
    }
}

pub fn format_vec3(v: Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

/// Quaternion as `[x, y, z, w]`
pub fn format_quat(q: Quat) -> String {
    format!("[{:.3}, {:.3}, {:.3}, {:.3}]", q.x, q.y, q.z, q.w)
}

/// Channels in declaration order, e.g. `Xposition Zrotation`
pub fn format_channels(channels: &[ChannelKind]) -> String {
    if channels.is_empty() {
        "-".to_string()
    } else {
        channels
            .iter()
            .map(|channel| channel.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
