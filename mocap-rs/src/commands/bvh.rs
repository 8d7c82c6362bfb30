//! BVH motion capture command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use console::style;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use mocap_bvh::{
    BvhFile, BvhParser, JointPose, JointView, MotionClipPlayer, ParserOptions, Warning,
};

use crate::utils::{
    NodeType, TreeNode, TreeOptions, add_table_row, create_table, format_bytes, format_channels,
    format_frame_rate, format_quat, format_seconds, format_vec3, render_tree,
};

#[derive(Subcommand)]
pub enum BvhCommands {
    /// Display information about a BVH file
    Info {
        /// Path to the BVH file
        file: PathBuf,

        /// Show a per-joint table
        #[arg(short, long)]
        detailed: bool,
    },

    /// Show the joint hierarchy as a tree
    Tree {
        /// Path to the BVH file
        file: PathBuf,

        /// Maximum depth to display
        #[arg(long)]
        depth: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Show offsets and channels inline
        #[arg(long)]
        compact: bool,
    },

    /// Validate a BVH file
    Validate {
        /// Path to the BVH file
        file: PathBuf,

        /// Treat a wrong `Frames:` header as an error
        #[arg(long)]
        strict: bool,
    },

    /// Print the global pose of every joint at one frame
    Pose {
        /// Path to the BVH file
        file: PathBuf,

        /// Frame index
        #[arg(short, long, default_value = "0")]
        frame: usize,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Simulate playback at a fixed tick rate and report each new frame
    Play {
        /// Path to the BVH file
        file: PathBuf,

        /// Ticks per second
        #[arg(long, default_value = "60")]
        fps: f32,

        /// Simulated wall-clock time; defaults to one pass over the clip
        #[arg(long)]
        seconds: Option<f32>,

        /// Playback rate multiplier
        #[arg(long, default_value = "1.0", allow_hyphen_values = true)]
        rate: f32,

        /// Wrap around at the end of the clip
        #[arg(long = "loop")]
        looping: bool,

        /// Joint to report; defaults to the root
        #[arg(long)]
        joint: Option<String>,
    },
}

pub fn execute(command: BvhCommands) -> Result<()> {
    match command {
        BvhCommands::Info { file, detailed } => execute_info(&file, detailed),
        BvhCommands::Tree {
            file,
            depth,
            no_color,
            compact,
        } => execute_tree(&file, depth, no_color, compact),
        BvhCommands::Validate { file, strict } => execute_validate(&file, strict),
        BvhCommands::Pose { file, frame, json } => execute_pose(&file, frame, json),
        BvhCommands::Play {
            file,
            fps,
            seconds,
            rate,
            looping,
            joint,
        } => execute_play(&file, fps, seconds, rate, looping, joint.as_deref()),
    }
}

fn parse(path: &Path, options: ParserOptions) -> Result<BvhFile> {
    BvhParser::with_options(options)
        .parse_file(path)
        .with_context(|| format!("Failed to parse BVH file: {}", path.display()))
}

fn print_warnings(warnings: &[Warning]) {
    for warning in warnings {
        println!("{} {}", style("⚠").yellow(), warning);
    }
}

fn execute_info(path: &Path, detailed: bool) -> Result<()> {
    let size = fs::metadata(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?
        .len();
    let bvh = parse(path, ParserOptions::default())?;
    let skeleton = bvh.skeleton();
    let clip = bvh.clip();

    println!("\n{}", style("BVH File Information").bold().underlined());
    println!("File: {}", style(path.display()).cyan());
    println!("Size: {}", format_bytes(size));

    println!("\n{}", style("Skeleton").bold());
    println!("Joints: {}", style(skeleton.len()).green());
    println!(
        "End Sites: {}",
        style(skeleton.iter().filter(|j| j.is_site()).count()).green()
    );
    println!("Channels: {}", style(skeleton.total_channel_count()).green());
    println!("Depth: {}", style(skeleton.depth()).green());

    println!("\n{}", style("Motion").bold());
    println!(
        "Frames: {} (declared {})",
        style(clip.len()).green(),
        clip.declared_frames()
    );
    println!(
        "Frame Time: {}s ({})",
        clip.frame_time(),
        format_frame_rate(clip.frame_time())
    );
    println!("Duration: {}", style(format_seconds(clip.duration())).yellow());

    if !bvh.warnings().is_empty() {
        println!("\n{}", style("Warnings").bold());
        print_warnings(bvh.warnings());
    }

    if detailed {
        println!("\n{}", style("Joints").bold());
        let mut table = create_table(&["Index", "Joint", "Role", "Parent", "Offset", "Channels"]);
        for joint in skeleton.iter() {
            add_table_row(
                &mut table,
                vec![
                    joint.index().to_string(),
                    joint.name().to_string(),
                    format!("{:?}", joint.role()),
                    joint
                        .parent()
                        .map_or_else(|| "-".to_string(), |p| p.name().to_string()),
                    format_vec3(joint.rest_offset()),
                    format_channels(joint.channels()),
                ],
            );
        }
        table.printstd();
    }

    Ok(())
}

/// Parsed skeletons nest at most `MAX_JOINT_DEPTH` levels, which bounds this recursion
fn joint_node(joint: JointView<'_>) -> TreeNode {
    let mut node = TreeNode::new(joint.name().to_string(), NodeType::from(joint.role()))
        .with_metadata("offset", &format_vec3(joint.rest_offset()));
    if joint.channel_count() > 0 {
        node = node.with_metadata("channels", &format_channels(joint.channels()));
    }

    joint
        .children()
        .fold(node, |node, child| node.add_child(joint_node(child)))
}

fn execute_tree(path: &Path, depth: Option<usize>, no_color: bool, compact: bool) -> Result<()> {
    let bvh = parse(path, ParserOptions::default())?;
    let skeleton = bvh.skeleton();

    let file_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().to_string());
    let root = TreeNode::new(file_name, NodeType::File)
        .with_metadata("joints", &skeleton.len().to_string())
        .with_metadata("channels", &skeleton.total_channel_count().to_string())
        .with_metadata("frames", &bvh.clip().len().to_string())
        .add_child(joint_node(skeleton.root()));

    let options = TreeOptions {
        max_depth: depth,
        no_color,
        show_metadata: true,
        compact,
    };
    print!("{}", render_tree(&root, &options));

    Ok(())
}

fn execute_validate(path: &Path, strict: bool) -> Result<()> {
    let options = ParserOptions {
        strict_frame_count: strict,
    };

    match BvhParser::with_options(options).parse_file(path) {
        Ok(bvh) => {
            println!(
                "✓ BVH file '{}' is valid ({} joints, {} channels, {} frames)",
                style(path.display()).cyan(),
                bvh.skeleton().len(),
                bvh.skeleton().total_channel_count(),
                bvh.clip().len()
            );
            print_warnings(bvh.warnings());
            Ok(())
        }
        Err(err) => anyhow::bail!("Validation failed: {}", err),
    }
}

#[derive(Serialize)]
struct PoseReport<'a> {
    file: String,
    frame: usize,
    frame_count: usize,
    time: f32,
    joints: &'a [JointPose],
}

fn execute_pose(path: &Path, frame: usize, json: bool) -> Result<()> {
    let mut player = MotionClipPlayer::new();
    player
        .load_file(path)
        .with_context(|| format!("Failed to load BVH file: {}", path.display()))?;

    if frame >= player.frame_count() {
        anyhow::bail!(
            "Frame {} out of range (clip has {} frames)",
            frame,
            player.frame_count()
        );
    }

    player.set_frame(frame);
    player.update(0.0).context("Failed to evaluate frame")?;
    let pose = player.pose();

    if json {
        let report = PoseReport {
            file: path.display().to_string(),
            frame,
            frame_count: player.frame_count(),
            time: frame as f32 * player.frame_time(),
            joints: &pose,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Frame {}/{} at {}",
        style(frame).green(),
        player.frame_count(),
        format_seconds(frame as f32 * player.frame_time())
    );
    let mut table = create_table(&["Index", "Joint", "Position", "Rotation"]);
    for joint in &pose {
        add_table_row(
            &mut table,
            vec![
                joint.index.to_string(),
                joint.name.clone(),
                format_vec3(joint.position),
                format_quat(joint.rotation),
            ],
        );
    }
    table.printstd();

    Ok(())
}

fn execute_play(
    path: &Path,
    fps: f32,
    seconds: Option<f32>,
    rate: f32,
    looping: bool,
    joint: Option<&str>,
) -> Result<()> {
    if !fps.is_finite() || fps <= 0.0 {
        anyhow::bail!("Tick rate must be positive, got {}", fps);
    }

    let mut player = MotionClipPlayer::new();
    player
        .load_file(path)
        .with_context(|| format!("Failed to load BVH file: {}", path.display()))?;

    let tracked = match joint {
        Some(name) => player.joint_by_name(name)?.index(),
        None => 0,
    };

    let seconds = match seconds {
        Some(seconds) => seconds,
        None if rate == 0.0 => anyhow::bail!("--seconds is required when --rate is 0"),
        None => player.duration() / rate.abs(),
    };
    let step = 1.0 / fps;
    let ticks = (seconds * fps).ceil() as usize;
    log::info!("Simulating {ticks} ticks of {step:.4}s at rate {rate}");

    player.set_loop(looping);
    player.set_rate(rate);
    player.play();

    let report = |time: f32, player: &MotionClipPlayer| -> Result<()> {
        let position = player.joint(tracked)?.position();
        println!(
            "t={:.3}s frame {} {}",
            time,
            player.frame(),
            format_vec3(position)
        );
        Ok(())
    };

    report(0.0, &player)?;
    let mut pulses = 0usize;
    for tick in 1..=ticks {
        player.update(step)?;
        if player.is_frame_new() {
            pulses += 1;
            report(tick as f32 * step, &player)?;
        }
        if !player.is_playing() {
            log::info!("Playback stopped at frame {}", player.frame());
            break;
        }
    }

    println!(
        "{} new frames, ended on frame {} of {}",
        style(pulses).green(),
        player.frame(),
        player.frame_count()
    );

    Ok(())
}
