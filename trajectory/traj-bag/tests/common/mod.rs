//! Minimal ROS1 v2.0 bag writer for tests.
//!
//! Writes uncompressed chunks and an index section holding the connection
//! records, which is everything `BagReader` needs.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;

use traj_bag::{MessageValue, RosTime, TypeStore, Value};
use traj_types::Timestamp;

const MAGIC: &[u8] = b"#ROSBAG V2.0\n";
const OP_MESSAGE_DATA: u8 = 0x02;
const OP_BAG_HEADER: u8 = 0x03;
const OP_CHUNK: u8 = 0x05;
const OP_CONNECTION: u8 = 0x07;

struct ConnectionSpec {
    id: u32,
    topic: String,
    msgtype: String,
    definition: String,
}

/// Builds a bag in memory and writes it to disk.
pub struct BagBuilder {
    store: TypeStore,
    connections: Vec<ConnectionSpec>,
    messages: Vec<(u32, Timestamp, Vec<u8>)>,
    messages_per_chunk: usize,
    indexed: bool,
}

impl BagBuilder {
    pub fn new() -> Self {
        Self {
            store: TypeStore::ros1_noetic(),
            connections: Vec::new(),
            messages: Vec::new(),
            messages_per_chunk: usize::MAX,
            indexed: true,
        }
    }

    /// Splits messages into chunks of at most `n`.
    pub fn messages_per_chunk(mut self, n: usize) -> Self {
        self.messages_per_chunk = n.max(1);
        self
    }

    /// Leaves connection records out of the index section.
    pub fn unindexed(mut self) -> Self {
        self.indexed = false;
        self
    }

    /// Adds a connection for a type the built-in store knows.
    pub fn connection(&mut self, topic: &str, msgtype: &str) -> u32 {
        let definition = self.store.generate_msgdef(msgtype).unwrap();
        self.connection_with_definition(topic, msgtype, &definition)
    }

    /// Adds a connection with explicit definition text.
    pub fn connection_with_definition(&mut self, topic: &str, msgtype: &str, definition: &str) -> u32 {
        if !definition.trim().is_empty() {
            self.store.register_text(msgtype, definition).unwrap();
        }
        let id = u32::try_from(self.connections.len()).unwrap();
        self.connections.push(ConnectionSpec {
            id,
            topic: topic.to_string(),
            msgtype: msgtype.replacen("/msg/", "/", 1),
            definition: definition.to_string(),
        });
        id
    }

    /// Serializes `value` with the connection's type and appends it.
    pub fn message(&mut self, conn: u32, time: Timestamp, value: &Value) -> &mut Self {
        let msgtype = self.connections[conn as usize].msgtype.clone();
        let data = self.store.serialize(value, &msgtype).unwrap();
        self.raw_message(conn, time, data)
    }

    /// Appends a pre-serialized payload.
    pub fn raw_message(&mut self, conn: u32, time: Timestamp, data: Vec<u8>) -> &mut Self {
        self.messages.push((conn, time, data));
        self
    }

    pub fn write(&self, path: &Path) {
        std::fs::write(path, self.to_bytes()).unwrap();
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut chunks = Vec::new();
        let mut chunk_count = 0u32;
        let mut written = vec![false; self.connections.len()];

        for batch in self.messages.chunks(self.messages_per_chunk) {
            let mut data = Vec::new();
            for (conn, time, payload) in batch {
                let idx = *conn as usize;
                if !written[idx] {
                    data.extend(self.connection_record(&self.connections[idx]));
                    written[idx] = true;
                }
                data.extend(message_record(*conn, *time, payload));
            }
            let header = [
                field("op", &[OP_CHUNK]),
                field("compression", b"none"),
                field("size", &u32::try_from(data.len()).unwrap().to_le_bytes()),
            ]
            .concat();
            chunks.extend(record(&header, &data));
            chunk_count += 1;
        }

        let mut index = Vec::new();
        if self.indexed {
            for spec in &self.connections {
                index.extend(self.connection_record(spec));
            }
        }

        let conn_count = u32::try_from(self.connections.len()).unwrap();
        let header_len = record(&bag_header(0, conn_count, chunk_count), &[]).len();
        let index_pos = (MAGIC.len() + header_len + chunks.len()) as u64;

        let mut out = MAGIC.to_vec();
        out.extend(record(&bag_header(index_pos, conn_count, chunk_count), &[]));
        out.extend(chunks);
        out.extend(index);
        out
    }

    fn connection_record(&self, spec: &ConnectionSpec) -> Vec<u8> {
        let header = [
            field("op", &[OP_CONNECTION]),
            field("conn", &spec.id.to_le_bytes()),
            field("topic", spec.topic.as_bytes()),
        ]
        .concat();
        let data = [
            field("topic", spec.topic.as_bytes()),
            field("type", spec.msgtype.as_bytes()),
            field("md5sum", &[b'0'; 32]),
            field("message_definition", spec.definition.as_bytes()),
            field("callerid", b"/ur_driver"),
        ]
        .concat();
        record(&header, &data)
    }
}

fn field(name: &str, value: &[u8]) -> Vec<u8> {
    let len = u32::try_from(name.len() + 1 + value.len()).unwrap();
    let mut out = len.to_le_bytes().to_vec();
    out.extend_from_slice(name.as_bytes());
    out.push(b'=');
    out.extend_from_slice(value);
    out
}

fn record(header: &[u8], data: &[u8]) -> Vec<u8> {
    let mut out = u32::try_from(header.len()).unwrap().to_le_bytes().to_vec();
    out.extend_from_slice(header);
    out.extend_from_slice(&u32::try_from(data.len()).unwrap().to_le_bytes());
    out.extend_from_slice(data);
    out
}

fn bag_header(index_pos: u64, conn_count: u32, chunk_count: u32) -> Vec<u8> {
    [
        field("op", &[OP_BAG_HEADER]),
        field("index_pos", &index_pos.to_le_bytes()),
        field("conn_count", &conn_count.to_le_bytes()),
        field("chunk_count", &chunk_count.to_le_bytes()),
    ]
    .concat()
}

fn message_record(conn: u32, time: Timestamp, payload: &[u8]) -> Vec<u8> {
    let secs = u32::try_from(time.secs()).unwrap();
    let mut stamp = secs.to_le_bytes().to_vec();
    stamp.extend_from_slice(&time.subsec_nanos().to_le_bytes());
    let header = [
        field("op", &[OP_MESSAGE_DATA]),
        field("conn", &conn.to_le_bytes()),
        field("time", &stamp),
    ]
    .concat();
    record(&header, payload)
}

// =============================================================================
// Message builders
// =============================================================================

/// `tf2_msgs/TFMessage` with one transform per `(child, parent, xyz)`.
pub fn tf_message(transforms: &[(&str, &str, [f64; 3])]) -> Value {
    let items = transforms
        .iter()
        .map(|(child, parent, xyz)| {
            let header = MessageValue::new("std_msgs/msg/Header")
                .with("seq", Value::UInt(0))
                .with("stamp", Value::Time(RosTime::default()))
                .with("frame_id", Value::String((*parent).to_string()));
            let translation = MessageValue::new("geometry_msgs/msg/Vector3")
                .with("x", Value::Float(xyz[0]))
                .with("y", Value::Float(xyz[1]))
                .with("z", Value::Float(xyz[2]));
            let rotation = MessageValue::new("geometry_msgs/msg/Quaternion")
                .with("x", Value::Float(0.0))
                .with("y", Value::Float(0.0))
                .with("z", Value::Float(0.0))
                .with("w", Value::Float(1.0));
            let transform = MessageValue::new("geometry_msgs/msg/Transform")
                .with("translation", translation.into())
                .with("rotation", rotation.into());
            MessageValue::new("geometry_msgs/msg/TransformStamped")
                .with("header", header.into())
                .with("child_frame_id", Value::String((*child).to_string()))
                .with("transform", transform.into())
                .into()
        })
        .collect();
    MessageValue::new("tf2_msgs/msg/TFMessage")
        .with("transforms", Value::Array(items))
        .into()
}

/// End-effector transform in the base frame.
pub fn ee_pose(xyz: [f64; 3]) -> Value {
    tf_message(&[("tool0_controller", "base", xyz)])
}

/// Gripper definition as the UR5e driver publishes it.
pub const GRIPPER_DEFINITION: &str = "# Robotiq gripper position, 0-255 scaled to percent\nfloat64 gripper_pos\n";

/// `ur5e_move/gripper_pos` reading.
pub fn gripper(raw: f64) -> Value {
    MessageValue::new("ur5e_move/msg/gripper_pos")
        .with("gripper_pos", Value::Float(raw))
        .into()
}

/// Seconds after a fixed epoch, with an optional nanosecond offset.
pub fn at(secs: u64, nanos: u32) -> Timestamp {
    Timestamp::from_secs_nanos(1_690_000_000 + secs, nanos)
}
