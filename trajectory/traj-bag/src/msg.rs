//! Typed views over decoded transform messages.

use crate::error::{BagError, Result};
use crate::value::{MessageValue, RosTime, Value};

fn field<'a>(msg: &'a MessageValue, name: &str) -> Result<&'a Value> {
    msg.get(name)
        .ok_or_else(|| BagError::decode(&msg.msgtype, format!("missing field `{name}`")))
}

fn float_field(msg: &MessageValue, name: &str) -> Result<f64> {
    field(msg, name)?
        .as_f64()
        .ok_or_else(|| BagError::decode(&msg.msgtype, format!("field `{name}` is not numeric")))
}

fn string_field(msg: &MessageValue, name: &str) -> Result<String> {
    field(msg, name)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| BagError::decode(&msg.msgtype, format!("field `{name}` is not a string")))
}

fn message_field<'a>(msg: &'a MessageValue, name: &str) -> Result<&'a MessageValue> {
    field(msg, name)?
        .as_message()
        .ok_or_else(|| BagError::decode(&msg.msgtype, format!("field `{name}` is not a message")))
}

fn as_message<'a>(value: &'a Value, expected: &str) -> Result<&'a MessageValue> {
    value
        .as_message()
        .ok_or_else(|| BagError::decode(expected, format!("expected message, found {}", value.kind())))
}

/// `std_msgs/Header`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Sequence number.
    pub seq: u32,
    /// Stamp set by the publisher.
    pub stamp: RosTime,
    /// Frame the data is expressed in.
    pub frame_id: String,
}

impl TryFrom<&Value> for Header {
    type Error = BagError;

    fn try_from(value: &Value) -> Result<Self> {
        let msg = as_message(value, "std_msgs/msg/Header")?;
        let seq = match field(msg, "seq")? {
            Value::UInt(v) => u32::try_from(*v).ok(),
            _ => None,
        }
        .ok_or_else(|| BagError::decode(&msg.msgtype, "field `seq` is not uint32"))?;
        let stamp = field(msg, "stamp")?
            .as_time()
            .ok_or_else(|| BagError::decode(&msg.msgtype, "field `stamp` is not a time"))?;
        Ok(Self {
            seq,
            stamp,
            frame_id: string_field(msg, "frame_id")?,
        })
    }
}

/// `geometry_msgs/Vector3`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl TryFrom<&Value> for Vector3 {
    type Error = BagError;

    fn try_from(value: &Value) -> Result<Self> {
        let msg = as_message(value, "geometry_msgs/msg/Vector3")?;
        Ok(Self {
            x: float_field(msg, "x")?,
            y: float_field(msg, "y")?,
            z: float_field(msg, "z")?,
        })
    }
}

/// `geometry_msgs/Quaternion`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
    /// Scalar component.
    pub w: f64,
}

impl TryFrom<&Value> for Quaternion {
    type Error = BagError;

    fn try_from(value: &Value) -> Result<Self> {
        let msg = as_message(value, "geometry_msgs/msg/Quaternion")?;
        Ok(Self {
            x: float_field(msg, "x")?,
            y: float_field(msg, "y")?,
            z: float_field(msg, "z")?,
            w: float_field(msg, "w")?,
        })
    }
}

/// `geometry_msgs/Transform`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation in meters.
    pub translation: Vector3,
    /// Rotation.
    pub rotation: Quaternion,
}

impl TryFrom<&Value> for Transform {
    type Error = BagError;

    fn try_from(value: &Value) -> Result<Self> {
        let msg = as_message(value, "geometry_msgs/msg/Transform")?;
        Ok(Self {
            translation: Vector3::try_from(field(msg, "translation")?)?,
            rotation: Quaternion::try_from(field(msg, "rotation")?)?,
        })
    }
}

/// `geometry_msgs/TransformStamped`: pose of `child_frame_id` in
/// `header.frame_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformStamped {
    /// Header; `frame_id` is the parent frame.
    pub header: Header,
    /// Child frame.
    pub child_frame_id: String,
    /// Child pose in the parent frame.
    pub transform: Transform,
}

impl TransformStamped {
    /// Returns true if this transform links `child` to `parent`.
    #[must_use]
    pub fn links(&self, child: &str, parent: &str) -> bool {
        self.child_frame_id == child && self.header.frame_id == parent
    }
}

impl TryFrom<&Value> for TransformStamped {
    type Error = BagError;

    fn try_from(value: &Value) -> Result<Self> {
        let msg = as_message(value, "geometry_msgs/msg/TransformStamped")?;
        Ok(Self {
            header: Header::try_from(field(msg, "header")?)?,
            child_frame_id: string_field(msg, "child_frame_id")?,
            transform: Transform::try_from(field(msg, "transform")?)?,
        })
    }
}

/// `tf2_msgs/TFMessage`.
#[derive(Debug, Clone, PartialEq)]
pub struct TfMessage {
    /// Transforms in message order.
    pub transforms: Vec<TransformStamped>,
}

impl TfMessage {
    /// Returns the first transform.
    ///
    /// # Errors
    ///
    /// Returns [`BagError::Decode`] if the message carries no transforms.
    pub fn first(&self) -> Result<&TransformStamped> {
        self.transforms
            .first()
            .ok_or_else(|| BagError::decode("tf2_msgs/msg/TFMessage", "message has no transforms"))
    }
}

impl TryFrom<&Value> for TfMessage {
    type Error = BagError;

    fn try_from(value: &Value) -> Result<Self> {
        let msg = as_message(value, "tf2_msgs/msg/TFMessage")?;
        let items = field(msg, "transforms")?
            .as_array()
            .ok_or_else(|| BagError::decode(&msg.msgtype, "field `transforms` is not an array"))?;
        let transforms = items
            .iter()
            .map(TransformStamped::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { transforms })
    }
}

/// Reads a numeric field of a decoded message as `f64`.
///
/// # Errors
///
/// Returns [`BagError::Decode`] if the value is not a message, lacks the
/// field, or the field is not numeric.
pub fn numeric_field(value: &Value, name: &str) -> Result<f64> {
    let msg = as_message(value, "message")?;
    float_field(msg, name)
}

/// Reads a nested message field.
///
/// # Errors
///
/// Returns [`BagError::Decode`] if the field is missing or not a message.
pub fn nested_field<'a>(value: &'a Value, name: &str) -> Result<&'a MessageValue> {
    let msg = as_message(value, "message")?;
    message_field(msg, name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn vec3(x: f64, y: f64, z: f64) -> Value {
        MessageValue::new("geometry_msgs/msg/Vector3")
            .with("x", Value::Float(x))
            .with("y", Value::Float(y))
            .with("z", Value::Float(z))
            .into()
    }

    fn stamped(child: &str, parent: &str, xyz: [f64; 3]) -> Value {
        let header = MessageValue::new("std_msgs/msg/Header")
            .with("seq", Value::UInt(0))
            .with("stamp", Value::Time(RosTime::default()))
            .with("frame_id", Value::String(parent.into()));
        let rotation = MessageValue::new("geometry_msgs/msg/Quaternion")
            .with("x", Value::Float(0.0))
            .with("y", Value::Float(0.0))
            .with("z", Value::Float(0.0))
            .with("w", Value::Float(1.0));
        let transform = MessageValue::new("geometry_msgs/msg/Transform")
            .with("translation", vec3(xyz[0], xyz[1], xyz[2]))
            .with("rotation", rotation.into());
        MessageValue::new("geometry_msgs/msg/TransformStamped")
            .with("header", header.into())
            .with("child_frame_id", Value::String(child.into()))
            .with("transform", transform.into())
            .into()
    }

    #[test]
    fn tf_message_view() {
        let value: Value = MessageValue::new("tf2_msgs/msg/TFMessage")
            .with(
                "transforms",
                Value::Array(vec![
                    stamped("tool0_controller", "base", [1.0, 2.0, 3.0]),
                    stamped("wrist", "base", [0.0, 0.0, 0.0]),
                ]),
            )
            .into();

        let tf = TfMessage::try_from(&value).unwrap();
        assert_eq!(tf.transforms.len(), 2);
        let first = tf.first().unwrap();
        assert!(first.links("tool0_controller", "base"));
        assert!(!first.links("base", "tool0_controller"));
        assert_eq!(first.transform.translation.z, 3.0);
        assert_eq!(first.transform.rotation.w, 1.0);
    }

    #[test]
    fn tf_message_empty_has_no_first() {
        let value: Value = MessageValue::new("tf2_msgs/msg/TFMessage")
            .with("transforms", Value::Array(Vec::new()))
            .into();
        let tf = TfMessage::try_from(&value).unwrap();
        assert!(matches!(tf.first(), Err(BagError::Decode { .. })));
    }

    #[test]
    fn vector3_wrong_kind() {
        let err = Vector3::try_from(&Value::Float(1.0)).unwrap_err();
        assert!(err.to_string().contains("expected message"));
    }

    #[test]
    fn numeric_field_reads_ints() {
        let value: Value = MessageValue::new("ur5e_move/msg/gripper_pos")
            .with("gripper_pos", Value::Int(42))
            .into();
        assert_eq!(numeric_field(&value, "gripper_pos").unwrap(), 42.0);
        assert!(numeric_field(&value, "other").is_err());
    }

    #[test]
    fn nested_field_lookup() {
        let value = stamped("a", "b", [0.0; 3]);
        let header = nested_field(&value, "header").unwrap();
        assert_eq!(header.get("frame_id").and_then(Value::as_str), Some("b"));
    }
}
