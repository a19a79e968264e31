//! End-to-end extraction from bag files on disk.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

mod common;

use approx::assert_relative_eq;
use common::{BagBuilder, GRIPPER_DEFINITION, at, ee_pose, gripper, tf_message};
use tempfile::TempDir;
use traj_bag::{
    BagError, BagReader, ExtractConfig, MessageSource, Stores, TfMessage, extract_eef_trajectory,
    extract_eef_trajectory_with, extract_from_source,
};
use traj_types::TargetZone;

const TOPIC: &str = "/imu_raw/Imu";

fn write(builder: &BagBuilder, dir: &TempDir, name: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    builder.write(&path);
    path
}

/// Three transforms (two for the end effector) and two gripper readings
/// bracketing them.
fn session() -> BagBuilder {
    let mut bag = BagBuilder::new();
    let tf = bag.connection(TOPIC, "tf2_msgs/TFMessage");
    let grip = bag.connection_with_definition(TOPIC, "ur5e_move/gripper_pos", GRIPPER_DEFINITION);

    bag.message(grip, at(0, 0), &gripper(20.0))
        .message(tf, at(1, 0), &ee_pose([0.1, 0.2, 0.3]))
        .message(
            tf,
            at(1, 500_000_000),
            &tf_message(&[("wrist_3_link", "base", [9.0, 9.0, 9.0])]),
        )
        .message(grip, at(2, 0), &gripper(85.0))
        .message(tf, at(3, 0), &ee_pose([0.4, 0.5, 0.6]));
    bag
}

#[test]
fn extracts_two_rows_from_session() {
    let dir = TempDir::new().unwrap();
    let path = write(&session(), &dir, "session.bag");

    let traj = extract_eef_trajectory(&path).unwrap();

    assert_eq!(traj.len(), 2);
    assert_eq!(traj.x(), vec![0.1, 0.4]);
    assert_eq!(traj.y(), vec![0.2, 0.5]);
    assert_eq!(traj.z(), vec![0.3, 0.6]);
    assert_relative_eq!(traj.gripper()[0], 0.2);
    assert_relative_eq!(traj.gripper()[1], 0.85);
    assert_eq!(traj.timestamps(), vec![at(1, 0), at(3, 0)]);

    let local = traj.local_timestamps().unwrap();
    assert_eq!(local[0].offset().local_minus_utc(), -5 * 3600);
}

#[test]
fn extraction_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = write(&session(), &dir, "session.bag");

    let first = extract_eef_trajectory(&path).unwrap();
    let second = extract_eef_trajectory(&path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn multiple_chunks_match_single_chunk() {
    let dir = TempDir::new().unwrap();
    let single = write(&session(), &dir, "single.bag");
    let split = write(&session().messages_per_chunk(2), &dir, "split.bag");

    assert_eq!(
        extract_eef_trajectory(&single).unwrap(),
        extract_eef_trajectory(&split).unwrap()
    );
}

#[test]
fn unindexed_bag_reads_connections_from_chunks() {
    let dir = TempDir::new().unwrap();
    let path = write(&session().unindexed(), &dir, "unindexed.bag");

    let reader = BagReader::open(&path).unwrap();
    assert_eq!(reader.connections().len(), 2);
    assert_eq!(extract_eef_trajectory(&path).unwrap().len(), 2);
}

#[test]
fn mismatched_frames_give_no_rows() {
    let mut bag = BagBuilder::new();
    let tf = bag.connection(TOPIC, "tf2_msgs/TFMessage");
    let grip = bag.connection_with_definition(TOPIC, "ur5e_move/gripper_pos", GRIPPER_DEFINITION);
    bag.message(grip, at(0, 0), &gripper(50.0))
        .message(tf, at(1, 0), &tf_message(&[("tool0_controller", "world", [1.0; 3])]))
        .message(tf, at(2, 0), &tf_message(&[("tool0", "base", [1.0; 3])]));

    let dir = TempDir::new().unwrap();
    let traj = extract_eef_trajectory(write(&bag, &dir, "frames.bag")).unwrap();
    assert!(traj.is_empty());
}

#[test]
fn messages_on_other_topics_are_ignored() {
    let mut bag = BagBuilder::new();
    let tf = bag.connection(TOPIC, "tf2_msgs/TFMessage");
    let tf_other = bag.connection("/tf", "tf2_msgs/TFMessage");
    let grip = bag.connection_with_definition(TOPIC, "ur5e_move/gripper_pos", GRIPPER_DEFINITION);
    bag.message(grip, at(0, 0), &gripper(10.0))
        .message(tf_other, at(1, 0), &ee_pose([7.0; 3]))
        .message(tf, at(2, 0), &ee_pose([1.0; 3]));

    let dir = TempDir::new().unwrap();
    let path = write(&bag, &dir, "topics.bag");

    let traj = extract_eef_trajectory(&path).unwrap();
    assert_eq!(traj.x(), vec![1.0]);

    let reader = BagReader::open(&path).unwrap();
    let topics = reader.topics().unwrap();
    assert_eq!(topics.len(), 2);
    assert_eq!(topics[0].topic, "/imu_raw/Imu");
    assert_eq!(topics[0].connections, 2);
    assert_eq!(topics[0].message_count, 2);
    assert_eq!(topics[1].topic, "/tf");
    assert_eq!(topics[1].msgtype, "tf2_msgs/msg/TFMessage");
    assert_eq!(topics[1].message_count, 1);
}

#[test]
fn gripper_without_definition_is_unknown() {
    let mut bag = BagBuilder::new();
    let grip = bag.connection_with_definition(TOPIC, "ur5e_move/gripper_pos", "");
    bag.raw_message(grip, at(0, 0), 42.0f64.to_le_bytes().to_vec());

    let dir = TempDir::new().unwrap();
    let err = extract_eef_trajectory(write(&bag, &dir, "nodef.bag")).unwrap_err();
    assert!(matches!(err, BagError::UnknownMessageType(ref t) if t == "ur5e_move/msg/gripper_pos"));
}

#[test]
fn empty_store_still_uses_embedded_definitions() {
    let dir = TempDir::new().unwrap();
    let path = write(&session(), &dir, "session.bag");
    let config = ExtractConfig::default().with_store(Stores::Empty);

    assert_eq!(extract_eef_trajectory_with(&path, &config).unwrap().len(), 2);
}

#[test]
fn truncated_payload_is_a_decode_error() {
    let mut bag = BagBuilder::new();
    let tf = bag.connection(TOPIC, "tf2_msgs/TFMessage");
    bag.raw_message(tf, at(0, 0), vec![1, 0, 0, 0, 9]);

    let dir = TempDir::new().unwrap();
    let err = extract_eef_trajectory(write(&bag, &dir, "short.bag")).unwrap_err();
    assert!(matches!(err, BagError::Decode { .. }));
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = extract_eef_trajectory(dir.path().join("absent.bag")).unwrap_err();
    assert!(matches!(err, BagError::Io(_)));
}

#[test]
fn not_a_bag_is_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.bag");
    std::fs::write(&path, b"plain text, not a bag").unwrap();
    assert!(matches!(BagReader::open(&path), Err(BagError::Io(_))));
}

#[test]
fn custom_config_and_stats() {
    let dir = TempDir::new().unwrap();
    let path = write(&session(), &dir, "session.bag");
    let reader = BagReader::open(&path).unwrap();

    let config = ExtractConfig::default()
        .with_gripper_divisor(255.0)
        .with_zone(TargetZone::utc());
    let (traj, stats) = extract_from_source(&reader, &config).unwrap();

    assert_relative_eq!(traj.gripper()[1], 85.0 / 255.0);
    assert_eq!(traj.zone(), &TargetZone::utc());
    assert_eq!(stats.messages, 5);
    assert_eq!(stats.transforms_seen, 3);
    assert_eq!(stats.transforms_accepted, 2);
    assert_eq!(stats.gripper_samples, 2);
    assert_eq!(stats.rows_dropped, 0);
}

#[test]
fn raw_messages_decode_through_reader() {
    let dir = TempDir::new().unwrap();
    let path = write(&session(), &dir, "session.bag");
    let reader = BagReader::open(&path).unwrap();

    let tf_ids: Vec<u32> = reader
        .connections()
        .iter()
        .filter(|c| c.msgtype == "tf2_msgs/msg/TFMessage")
        .map(|c| c.id)
        .collect();
    assert_eq!(reader.count_messages(&tf_ids).unwrap(), 3);

    let mut children = Vec::new();
    reader
        .visit_messages(&tf_ids, &mut |raw| {
            let tf = TfMessage::try_from(&reader.deserialize(&raw)?)?;
            children.push(tf.first()?.child_frame_id.clone());
            Ok(())
        })
        .unwrap();
    assert_eq!(children, vec!["tool0_controller", "wrist_3_link", "tool0_controller"]);
}

#[test]
fn csv_export_of_extracted_trajectory() {
    let dir = TempDir::new().unwrap();
    let path = write(&session(), &dir, "session.bag");
    let traj = extract_eef_trajectory(&path).unwrap();

    let mut buf = Vec::new();
    traj.write_csv(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "x,y,z,gripper,timestamp");
    // 1_690_000_001 s is 2023-07-22T04:26:41Z.
    assert!(lines[1].ends_with(",2023-07-21T23:26:41.000000000-05:00"));
}

/// Pose at 5 s stored before the gripper at 0 s and the pose at 2 s.
fn stored_out_of_order() -> BagBuilder {
    let mut bag = BagBuilder::new();
    let tf = bag.connection(TOPIC, "tf2_msgs/TFMessage");
    let grip = bag.connection_with_definition(TOPIC, "ur5e_move/gripper_pos", GRIPPER_DEFINITION);
    bag.message(tf, at(5, 0), &ee_pose([5.0, 0.0, 0.0]))
        .message(grip, at(0, 0), &gripper(30.0))
        .message(tf, at(2, 0), &ee_pose([2.0, 0.0, 0.0]));
    bag
}

#[test]
fn rows_are_chronological_when_stored_out_of_order() {
    let dir = TempDir::new().unwrap();
    let path = write(&stored_out_of_order(), &dir, "unordered.bag");

    let traj = extract_eef_trajectory(&path).unwrap();
    assert_eq!(traj.x(), vec![2.0, 5.0]);
    assert_eq!(traj.timestamps(), vec![at(2, 0), at(5, 0)]);
    assert_relative_eq!(traj.gripper()[0], 0.3);
    assert_relative_eq!(traj.gripper()[1], 0.3);
}

#[test]
fn out_of_order_across_chunks_is_sorted() {
    let dir = TempDir::new().unwrap();
    let path = write(&stored_out_of_order().messages_per_chunk(1), &dir, "unordered_split.bag");
    let reader = BagReader::open(&path).unwrap();

    let ids: Vec<u32> = reader.connections().iter().map(|c| c.id).collect();
    let mut times = Vec::new();
    reader
        .visit_messages(&ids, &mut |raw| {
            times.push(raw.time);
            Ok(())
        })
        .unwrap();
    assert_eq!(times, vec![at(0, 0), at(2, 0), at(5, 0)]);
    assert_eq!(reader.count_messages(&ids).unwrap(), 3);
}

#[test]
fn rows_with_nan_fields_are_dropped() {
    let mut bag = BagBuilder::new();
    let tf = bag.connection(TOPIC, "tf2_msgs/TFMessage");
    let grip = bag.connection_with_definition(TOPIC, "ur5e_move/gripper_pos", GRIPPER_DEFINITION);
    bag.message(grip, at(0, 0), &gripper(f64::NAN))
        .message(tf, at(1, 0), &ee_pose([1.0, 2.0, 3.0]))
        .message(grip, at(2, 0), &gripper(50.0))
        .message(tf, at(3, 0), &ee_pose([f64::NAN, 2.0, 3.0]))
        .message(tf, at(4, 0), &ee_pose([4.0, 5.0, 6.0]));

    let dir = TempDir::new().unwrap();
    let reader = BagReader::open(write(&bag, &dir, "nan.bag")).unwrap();
    let (traj, stats) = extract_from_source(&reader, &ExtractConfig::default()).unwrap();

    assert_eq!(traj.x(), vec![4.0]);
    assert_relative_eq!(traj.gripper()[0], 0.5);
    assert_eq!(stats.rows_dropped, 0);
    assert_eq!(stats.rows_incomplete, 2);
}
