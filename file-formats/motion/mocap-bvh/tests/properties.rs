//! Property tests for parsing, kinematics and playback invariants

use mocap_bvh::{BvhParser, MotionClipPlayer, PlaybackController};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Play,
    Stop,
    Loop(bool),
    Rate(f32),
    SetFrame(usize),
    SetPosition(f32),
    Tick(f32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Play),
        Just(Op::Stop),
        any::<bool>().prop_map(Op::Loop),
        (-4.0f32..4.0).prop_map(Op::Rate),
        (0usize..64).prop_map(Op::SetFrame),
        (-1.0f32..2.0).prop_map(Op::SetPosition),
        (0.0f32..0.5).prop_map(Op::Tick),
    ]
}

fn apply(playback: &mut PlaybackController, op: &Op) -> Option<usize> {
    match *op {
        Op::Play => playback.play(),
        Op::Stop => playback.stop(),
        Op::Loop(looping) => playback.set_loop(looping),
        Op::Rate(rate) => playback.set_rate(rate),
        Op::SetFrame(index) => playback.set_frame(index),
        Op::SetPosition(p) => playback.set_position(p),
        Op::Tick(dt) => return playback.tick(dt),
    }
    None
}

/// Chain skeleton with `bones` rotating joints below a translating root
fn chain_source(bones: usize, rows: &[Vec<f32>]) -> String {
    let mut source = String::from(
        "HIERARCHY\nROOT Hips\n{\nOFFSET 0 0 0\nCHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation\n",
    );
    for i in 0..bones {
        source.push_str(&format!(
            "JOINT Bone{i}\n{{\nOFFSET 0 2 1\nCHANNELS 3 Zrotation Xrotation Yrotation\n"
        ));
    }
    source.push_str("End Site\n{\nOFFSET 0 1 0\n}\n");
    source.push_str(&"}\n".repeat(bones + 1));

    source.push_str(&format!("MOTION\nFrames: {}\nFrame Time: 0.04\n", rows.len()));
    for row in rows {
        let row: Vec<String> = row.iter().map(f32::to_string).collect();
        source.push_str(&row.join(" "));
        source.push('\n');
    }
    source
}

fn chain_file() -> impl Strategy<Value = (usize, Vec<Vec<f32>>)> {
    (0usize..5).prop_flat_map(|bones| {
        let width = 6 + 3 * bones;
        (
            Just(bones),
            prop::collection::vec(prop::collection::vec(-180.0f32..180.0, width), 1..6),
        )
    })
}

proptest! {
    #[test]
    fn frame_stays_in_range(frames in 1usize..40, ops in prop::collection::vec(op(), 0..60)) {
        let mut playback = PlaybackController::new(frames, 1.0 / 30.0);
        for op in &ops {
            if let Some(index) = apply(&mut playback, op) {
                prop_assert!(index < frames);
                prop_assert!(playback.is_frame_new());
            }
            prop_assert!(playback.frame() < frames);
            prop_assert!(playback.play_head() >= 0.0);
            prop_assert!((0.0..=1.0).contains(&playback.position()));
        }
    }

    #[test]
    fn pulse_exactly_when_frame_changes(frames in 1usize..40, ops in prop::collection::vec(op(), 0..60)) {
        let mut playback = PlaybackController::new(frames, 1.0 / 30.0);
        let mut changed = false;
        for op in &ops {
            let before = playback.frame();
            let pulse = apply(&mut playback, op);
            changed |= playback.frame() != before;

            if matches!(op, Op::Tick(_)) {
                prop_assert_eq!(pulse.is_some(), changed);
                prop_assert_eq!(playback.is_frame_new(), changed);
                if let Some(index) = pulse {
                    prop_assert_eq!(index, playback.frame());
                }
                changed = false;
            }
        }
        // A follow-up tick without time never produces another pulse
        playback.stop();
        playback.tick(0.0);
        prop_assert_eq!(playback.tick(0.0), None);
        prop_assert!(!playback.is_frame_new());
    }

    #[test]
    fn channel_layout_matches_frames((bones, rows) in chain_file()) {
        let file = BvhParser::new().parse_str(&chain_source(bones, &rows)).unwrap();
        let skeleton = file.skeleton();

        let sum: usize = skeleton.iter().map(|j| j.channel_count()).sum();
        prop_assert_eq!(sum, skeleton.total_channel_count());
        prop_assert_eq!(skeleton.len(), bones + 2);
        prop_assert_eq!(file.clip().len(), rows.len());
        for frame in file.clip().frames() {
            prop_assert_eq!(frame.len(), skeleton.total_channel_count());
        }
    }

    #[test]
    fn globals_compose_from_parents((bones, rows) in chain_file(), pick in any::<prop::sample::Index>()) {
        let mut player = MotionClipPlayer::new();
        player.load(&chain_source(bones, &rows)).unwrap();
        player.set_frame(pick.index(rows.len()));
        player.update(0.0).unwrap();

        for joint in player.joints() {
            match joint.parent() {
                None => prop_assert_eq!(joint.global_transform(), joint.local_transform()),
                Some(parent) => {
                    let expected = parent.global_transform() * joint.local_transform();
                    prop_assert!(joint.global_transform().abs_diff_eq(expected, 1e-2));
                }
            }
        }
    }
}
