//! Message schema registry.
//!
//! A [`TypeStore`] maps normalized type names (`pkg/msg/Type`) to field
//! layouts and decodes ROS1 payloads into [`Value`] trees. Layouts come from
//! the built-in ROS1 Noetic set or from `.msg` definition text, as embedded
//! in bag connection records.

use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{BagError, Result};
use crate::value::{MessageValue, Value};
use crate::wire::{WireReader, WireWriter};

/// Line separating dependency sections in concatenated definition text.
const SECTION_SEPARATOR: &str =
    "================================================================================";

/// Built-in field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// `bool`.
    Bool,
    /// `int8` (alias `byte`).
    Int8,
    /// `uint8` (alias `char`).
    Uint8,
    /// `int16`.
    Int16,
    /// `uint16`.
    Uint16,
    /// `int32`.
    Int32,
    /// `uint32`.
    Uint32,
    /// `int64`.
    Int64,
    /// `uint64`.
    Uint64,
    /// `float32`.
    Float32,
    /// `float64`.
    Float64,
    /// `string`.
    String,
    /// `time`.
    Time,
    /// `duration`.
    Duration,
}

impl Primitive {
    /// Parses a primitive type token.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "bool" => Self::Bool,
            "int8" | "byte" => Self::Int8,
            "uint8" | "char" => Self::Uint8,
            "int16" => Self::Int16,
            "uint16" => Self::Uint16,
            "int32" => Self::Int32,
            "uint32" => Self::Uint32,
            "int64" => Self::Int64,
            "uint64" => Self::Uint64,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "string" => Self::String,
            "time" => Self::Time,
            "duration" => Self::Duration,
            _ => return None,
        })
    }

    /// Canonical `.msg` name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::String => "string",
            Self::Time => "time",
            Self::Duration => "duration",
        }
    }

    /// Returns true for integer and float types.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::Bool | Self::String | Self::Time | Self::Duration)
    }
}

/// Type of a message field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Built-in type.
    Primitive(Primitive),
    /// Nested message, by normalized name.
    Message(String),
    /// Array of a non-array type; `Some(n)` for fixed length.
    Array(Box<FieldType>, Option<usize>),
}

impl FieldType {
    /// Shorthand for a nested message field.
    #[must_use]
    pub fn message(msgtype: &str) -> Self {
        Self::Message(normalize_msgtype(msgtype))
    }

    /// Shorthand for a variable-length array.
    #[must_use]
    pub fn sequence(inner: Self) -> Self {
        Self::Array(Box::new(inner), None)
    }

    /// Shorthand for a fixed-length array.
    #[must_use]
    pub fn fixed(inner: Self, len: usize) -> Self {
        Self::Array(Box::new(inner), Some(len))
    }

    fn collect_dependencies<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Primitive(_) => {}
            Self::Message(name) => out.push(name),
            Self::Array(inner, _) => inner.collect_dependencies(out),
        }
    }
}

impl From<Primitive> for FieldType {
    fn from(p: Primitive) -> Self {
        Self::Primitive(p)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => f.write_str(p.name()),
            Self::Message(name) if name == "std_msgs/msg/Header" => f.write_str("Header"),
            // Text form uses the two-part name.
            Self::Message(name) => f.write_str(&name.replacen("/msg/", "/", 1)),
            Self::Array(inner, None) => write!(f, "{inner}[]"),
            Self::Array(inner, Some(n)) => write!(f, "{inner}[{n}]"),
        }
    }
}

/// A named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Field type.
    pub ty: FieldType,
}

impl FieldDef {
    /// Creates a field.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: impl Into<FieldType>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// Field layout of one message type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDefinition {
    /// Normalized type name.
    pub msgtype: String,
    /// Fields in wire order.
    pub fields: Vec<FieldDef>,
}

impl MessageDefinition {
    /// Creates a definition; the type name is normalized.
    #[must_use]
    pub fn new(msgtype: &str, fields: Vec<FieldDef>) -> Self {
        Self {
            msgtype: normalize_msgtype(msgtype),
            fields,
        }
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Renders the fields as `.msg` text (no constants or comments).
    #[must_use]
    pub fn to_msg_text(&self) -> String {
        self.fields
            .iter()
            .map(|f| format!("{} {}\n", f.ty, f.name))
            .collect()
    }
}

/// Normalizes a type name to `pkg/msg/Type`.
///
/// # Example
///
/// ```
/// use traj_bag::normalize_msgtype;
///
/// assert_eq!(normalize_msgtype("tf2_msgs/TFMessage"), "tf2_msgs/msg/TFMessage");
/// assert_eq!(normalize_msgtype("tf2_msgs/msg/TFMessage"), "tf2_msgs/msg/TFMessage");
/// assert_eq!(normalize_msgtype("Header"), "std_msgs/msg/Header");
/// ```
#[must_use]
pub fn normalize_msgtype(name: &str) -> String {
    let name = name.trim();
    if name == "Header" {
        return "std_msgs/msg/Header".to_string();
    }
    let parts: Vec<&str> = name.split('/').collect();
    match parts.as_slice() {
        [pkg, ty] => format!("{pkg}/msg/{ty}"),
        _ => name.to_string(),
    }
}

/// Resolves a type token from a definition of a type in package `pkg`.
fn resolve_type_name(token: &str, pkg: &str) -> String {
    if token == "Header" {
        "std_msgs/msg/Header".to_string()
    } else if token.contains('/') {
        normalize_msgtype(token)
    } else {
        format!("{pkg}/msg/{token}")
    }
}

fn package_of(msgtype: &str) -> &str {
    msgtype.split('/').next().unwrap_or_default()
}

fn parse_field_type(token: &str, pkg: &str, msgtype: &str) -> Result<FieldType> {
    let (base, array) = match token.find('[') {
        Some(open) => {
            let close = token
                .strip_suffix(']')
                .ok_or_else(|| BagError::invalid_definition(msgtype, format!("bad type `{token}`")))?;
            (&token[..open], Some(&close[open + 1..]))
        }
        None => (token, None),
    };

    // ROS2-style bounded strings are accepted and treated as plain strings.
    let base = base.split("<=").next().unwrap_or(base);

    let element = match Primitive::parse(base) {
        Some(p) => FieldType::Primitive(p),
        None if base.is_empty() => {
            return Err(BagError::invalid_definition(msgtype, format!("bad type `{token}`")));
        }
        None => FieldType::Message(resolve_type_name(base, pkg)),
    };

    match array {
        None => Ok(element),
        Some("") => Ok(FieldType::sequence(element)),
        Some(len) => {
            let n = len.parse::<usize>().map_err(|_| {
                BagError::invalid_definition(msgtype, format!("bad array length in `{token}`"))
            })?;
            Ok(FieldType::fixed(element, n))
        }
    }
}

fn parse_section(msgtype: &str, text: &str) -> Result<MessageDefinition> {
    let msgtype = normalize_msgtype(msgtype);
    let pkg = package_of(&msgtype).to_string();
    let mut fields = Vec::new();

    for raw_line in text.lines() {
        let line = raw_line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let Some((ty, rest)) = line.split_once(char::is_whitespace) else {
            return Err(BagError::invalid_definition(
                &msgtype,
                format!("cannot parse line `{line}`"),
            ));
        };
        // Constants do not occupy space on the wire.
        if rest.contains('=') {
            continue;
        }
        fields.push(FieldDef {
            name: rest.trim().to_string(),
            ty: parse_field_type(ty, &pkg, &msgtype)?,
        });
    }

    Ok(MessageDefinition { msgtype, fields })
}

/// Parses `.msg` text, including concatenated dependency sections.
///
/// The first section belongs to `msgtype`; each following section starts
/// with a `MSG: pkg/Type` line.
///
/// # Errors
///
/// Returns [`BagError::InvalidDefinition`] on malformed lines.
pub fn parse_message_definition(msgtype: &str, text: &str) -> Result<Vec<MessageDefinition>> {
    let mut sections: Vec<(String, String)> = vec![(msgtype.to_string(), String::new())];

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.len() >= 3 && trimmed.chars().all(|c| c == '=') {
            sections.push((String::new(), String::new()));
            continue;
        }
        let Some((name, body)) = sections.last_mut() else {
            continue;
        };
        if name.is_empty() {
            if let Some(dep) = trimmed.strip_prefix("MSG:") {
                *name = dep.trim().to_string();
                continue;
            }
        }
        body.push_str(line);
        body.push('\n');
    }

    sections
        .iter()
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, body)| parse_section(name, body))
        .collect()
}

/// Named schema sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Stores {
    /// Standard ROS1 Noetic message types.
    #[default]
    Ros1Noetic,
    /// No types; everything comes from embedded definitions.
    Empty,
}

/// Returns the type store for a named schema set.
#[must_use]
pub fn get_typestore(store: Stores) -> TypeStore {
    match store {
        Stores::Ros1Noetic => TypeStore::ros1_noetic(),
        Stores::Empty => TypeStore::new(),
    }
}

/// Registry of message layouts with ROS1 decode and encode.
///
/// # Example
///
/// ```
/// use traj_bag::TypeStore;
///
/// let mut store = TypeStore::new();
/// store
///     .register_text("ur5e_move/msg/gripper_pos", "float64 gripper_pos\n")
///     .unwrap();
///
/// let value = store
///     .deserialize(&42.0f64.to_le_bytes(), "ur5e_move/gripper_pos")
///     .unwrap();
/// let msg = value.as_message().unwrap();
/// assert_eq!(msg.get("gripper_pos").and_then(|v| v.as_f64()), Some(42.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeStore {
    types: BTreeMap<String, MessageDefinition>,
}

impl TypeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard ROS1 Noetic types used by robot logs: `std_msgs`,
    /// `geometry_msgs` transforms, `tf2_msgs` and `sensor_msgs/Imu`.
    #[must_use]
    pub fn ros1_noetic() -> Self {
        use FieldType as T;
        use Primitive as P;

        fn f(name: &str, ty: impl Into<FieldType>) -> FieldDef {
            FieldDef::new(name, ty)
        }

        let mut store = Self::new();

        store.register(MessageDefinition::new(
            "std_msgs/Header",
            vec![
                f("seq", P::Uint32),
                f("stamp", P::Time),
                f("frame_id", P::String),
            ],
        ));
        for (name, ty) in [
            ("Bool", P::Bool),
            ("Int32", P::Int32),
            ("Int64", P::Int64),
            ("UInt8", P::Uint8),
            ("Float32", P::Float32),
            ("Float64", P::Float64),
            ("String", P::String),
            ("Time", P::Time),
        ] {
            store.register(MessageDefinition::new(
                &format!("std_msgs/{name}"),
                vec![f("data", ty)],
            ));
        }

        let xyz = |p: Primitive| vec![f("x", p), f("y", p), f("z", p)];
        store.register(MessageDefinition::new("geometry_msgs/Vector3", xyz(P::Float64)));
        store.register(MessageDefinition::new("geometry_msgs/Point", xyz(P::Float64)));
        store.register(MessageDefinition::new("geometry_msgs/Point32", xyz(P::Float32)));
        store.register(MessageDefinition::new(
            "geometry_msgs/Quaternion",
            vec![
                f("x", P::Float64),
                f("y", P::Float64),
                f("z", P::Float64),
                f("w", P::Float64),
            ],
        ));
        store.register(MessageDefinition::new(
            "geometry_msgs/Pose",
            vec![
                f("position", T::message("geometry_msgs/Point")),
                f("orientation", T::message("geometry_msgs/Quaternion")),
            ],
        ));
        store.register(MessageDefinition::new(
            "geometry_msgs/PoseStamped",
            vec![
                f("header", T::message("Header")),
                f("pose", T::message("geometry_msgs/Pose")),
            ],
        ));
        store.register(MessageDefinition::new(
            "geometry_msgs/Transform",
            vec![
                f("translation", T::message("geometry_msgs/Vector3")),
                f("rotation", T::message("geometry_msgs/Quaternion")),
            ],
        ));
        store.register(MessageDefinition::new(
            "geometry_msgs/TransformStamped",
            vec![
                f("header", T::message("Header")),
                f("child_frame_id", P::String),
                f("transform", T::message("geometry_msgs/Transform")),
            ],
        ));
        store.register(MessageDefinition::new(
            "geometry_msgs/Twist",
            vec![
                f("linear", T::message("geometry_msgs/Vector3")),
                f("angular", T::message("geometry_msgs/Vector3")),
            ],
        ));
        store.register(MessageDefinition::new(
            "geometry_msgs/Wrench",
            vec![
                f("force", T::message("geometry_msgs/Vector3")),
                f("torque", T::message("geometry_msgs/Vector3")),
            ],
        ));
        store.register(MessageDefinition::new(
            "geometry_msgs/WrenchStamped",
            vec![
                f("header", T::message("Header")),
                f("wrench", T::message("geometry_msgs/Wrench")),
            ],
        ));
        store.register(MessageDefinition::new(
            "tf2_msgs/TFMessage",
            vec![f(
                "transforms",
                T::sequence(T::message("geometry_msgs/TransformStamped")),
            )],
        ));

        let covariance = || T::fixed(T::Primitive(P::Float64), 9);
        store.register(MessageDefinition::new(
            "sensor_msgs/Imu",
            vec![
                f("header", T::message("Header")),
                f("orientation", T::message("geometry_msgs/Quaternion")),
                f("orientation_covariance", covariance()),
                f("angular_velocity", T::message("geometry_msgs/Vector3")),
                f("angular_velocity_covariance", covariance()),
                f("linear_acceleration", T::message("geometry_msgs/Vector3")),
                f("linear_acceleration_covariance", covariance()),
            ],
        ));
        store.register(MessageDefinition::new(
            "sensor_msgs/JointState",
            vec![
                f("header", T::message("Header")),
                f("name", T::sequence(T::Primitive(P::String))),
                f("position", T::sequence(T::Primitive(P::Float64))),
                f("velocity", T::sequence(T::Primitive(P::Float64))),
                f("effort", T::sequence(T::Primitive(P::Float64))),
            ],
        ));

        store
    }

    /// Adds or replaces a definition.
    pub fn register(&mut self, definition: MessageDefinition) {
        self.types.insert(definition.msgtype.clone(), definition);
    }

    /// Parses `.msg` text and registers every section it contains.
    ///
    /// # Errors
    ///
    /// Returns [`BagError::InvalidDefinition`] if the text cannot be parsed.
    pub fn register_text(&mut self, msgtype: &str, text: &str) -> Result<()> {
        for definition in parse_message_definition(msgtype, text)? {
            self.register(definition);
        }
        Ok(())
    }

    /// Returns the definition for a type name (normalized first).
    #[must_use]
    pub fn get(&self, msgtype: &str) -> Option<&MessageDefinition> {
        self.types.get(&normalize_msgtype(msgtype))
    }

    /// Returns true if the type is known.
    #[must_use]
    pub fn contains(&self, msgtype: &str) -> bool {
        self.get(msgtype).is_some()
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    fn require(&self, msgtype: &str) -> Result<&MessageDefinition> {
        self.get(msgtype)
            .ok_or_else(|| BagError::unknown_type(normalize_msgtype(msgtype)))
    }

    /// Renders full definition text: the type's fields followed by one
    /// `MSG:` section per nested dependency, as stored in bag connections.
    ///
    /// # Errors
    ///
    /// Returns [`BagError::UnknownMessageType`] if the type or any
    /// dependency is missing.
    pub fn generate_msgdef(&self, msgtype: &str) -> Result<String> {
        let root = self.require(msgtype)?;
        let mut text = root.to_msg_text();

        let mut seen = vec![root.msgtype.as_str()];
        let mut pending: Vec<&str> = Vec::new();
        for field in &root.fields {
            field.ty.collect_dependencies(&mut pending);
        }
        // Stack, so the first dependency is emitted first.
        pending.reverse();

        let mut order = Vec::new();
        while let Some(name) = pending.pop() {
            if seen.contains(&name) {
                continue;
            }
            seen.push(name);
            let dep = self.require(name)?;
            order.push(dep);
            let mut nested = Vec::new();
            for field in &dep.fields {
                field.ty.collect_dependencies(&mut nested);
            }
            pending.extend(nested.into_iter().rev());
        }

        for dep in order {
            text.push_str(SECTION_SEPARATOR);
            text.push('\n');
            text.push_str(&format!("MSG: {}\n", dep.msgtype.replacen("/msg/", "/", 1)));
            text.push_str(&dep.to_msg_text());
        }
        Ok(text)
    }

    /// Decodes a ROS1 payload.
    ///
    /// # Errors
    ///
    /// Returns [`BagError::UnknownMessageType`] if the type or a nested type
    /// is not registered, or [`BagError::Decode`] if the payload is shorter
    /// than the layout requires.
    pub fn deserialize(&self, data: &[u8], msgtype: &str) -> Result<Value> {
        let msgtype = normalize_msgtype(msgtype);
        let mut reader = WireReader::new(data, &msgtype);
        Ok(Value::Message(self.decode_message(&msgtype, &mut reader)?))
    }

    fn decode_message(&self, msgtype: &str, reader: &mut WireReader<'_>) -> Result<MessageValue> {
        let definition = self.require(msgtype)?;
        let mut fields = Vec::with_capacity(definition.fields.len());
        for field in &definition.fields {
            fields.push((field.name.clone(), self.decode_field(&field.ty, reader)?));
        }
        Ok(MessageValue {
            msgtype: definition.msgtype.clone(),
            fields,
        })
    }

    fn decode_field(&self, ty: &FieldType, reader: &mut WireReader<'_>) -> Result<Value> {
        match ty {
            FieldType::Primitive(p) => decode_primitive(*p, reader),
            FieldType::Message(name) => Ok(Value::Message(self.decode_message(name, reader)?)),
            FieldType::Array(inner, len) => {
                let count = match len {
                    Some(n) => *n,
                    None => reader.read_len()?,
                };
                if **inner == FieldType::Primitive(Primitive::Uint8) {
                    return Ok(Value::Bytes(reader.read_bytes(count)?));
                }
                // Every element takes at least one byte on the wire, except
                // empty messages, so cap the reservation at what remains.
                let mut items = Vec::with_capacity(count.min(reader.remaining()));
                for _ in 0..count {
                    items.push(self.decode_field(inner, reader)?);
                }
                Ok(Value::Array(items))
            }
        }
    }

    /// Encodes a message value as a ROS1 payload.
    ///
    /// # Errors
    ///
    /// Returns [`BagError::UnknownMessageType`] for unregistered types and
    /// [`BagError::Encode`] if a field is missing or has the wrong kind.
    pub fn serialize(&self, value: &Value, msgtype: &str) -> Result<Vec<u8>> {
        let msgtype = normalize_msgtype(msgtype);
        let mut writer = WireWriter::new();
        self.encode_field(&FieldType::Message(msgtype.clone()), value, &msgtype, &mut writer)?;
        Ok(writer.into_inner())
    }

    fn encode_field(
        &self,
        ty: &FieldType,
        value: &Value,
        msgtype: &str,
        writer: &mut WireWriter,
    ) -> Result<()> {
        match (ty, value) {
            (FieldType::Primitive(p), _) => encode_primitive(*p, value, msgtype, writer),
            (FieldType::Message(name), Value::Message(msg)) => {
                let definition = self.require(name)?;
                for field in &definition.fields {
                    let field_value = msg.get(&field.name).ok_or_else(|| {
                        BagError::encode(msgtype, format!("missing field `{}`", field.name))
                    })?;
                    self.encode_field(&field.ty, field_value, name, writer)?;
                }
                Ok(())
            }
            (FieldType::Array(inner, len), Value::Bytes(bytes))
                if **inner == FieldType::Primitive(Primitive::Uint8) =>
            {
                check_array_len(*len, bytes.len(), msgtype, writer)?;
                writer.put(bytes);
                Ok(())
            }
            (FieldType::Array(inner, len), Value::Array(items)) => {
                check_array_len(*len, items.len(), msgtype, writer)?;
                for item in items {
                    self.encode_field(inner, item, msgtype, writer)?;
                }
                Ok(())
            }
            _ => Err(BagError::encode(
                msgtype,
                format!("expected {ty}, found {}", value.kind()),
            )),
        }
    }
}

fn check_array_len(
    expected: Option<usize>,
    actual: usize,
    msgtype: &str,
    writer: &mut WireWriter,
) -> Result<()> {
    match expected {
        None => writer.put_len(actual, msgtype),
        Some(n) if n == actual => Ok(()),
        Some(n) => Err(BagError::encode(
            msgtype,
            format!("fixed array needs {n} elements, found {actual}"),
        )),
    }
}

fn decode_primitive(p: Primitive, reader: &mut WireReader<'_>) -> Result<Value> {
    Ok(match p {
        Primitive::Bool => Value::Bool(reader.read_bool()?),
        Primitive::Int8 => Value::Int(i64::from(reader.read_i8()?)),
        Primitive::Uint8 => Value::UInt(u64::from(reader.read_u8()?)),
        Primitive::Int16 => Value::Int(i64::from(reader.read_i16()?)),
        Primitive::Uint16 => Value::UInt(u64::from(reader.read_u16()?)),
        Primitive::Int32 => Value::Int(i64::from(reader.read_i32()?)),
        Primitive::Uint32 => Value::UInt(u64::from(reader.read_u32()?)),
        Primitive::Int64 => Value::Int(reader.read_i64()?),
        Primitive::Uint64 => Value::UInt(reader.read_u64()?),
        Primitive::Float32 => Value::Float(f64::from(reader.read_f32()?)),
        Primitive::Float64 => Value::Float(reader.read_f64()?),
        Primitive::String => Value::String(reader.read_string()?),
        Primitive::Time => Value::Time(reader.read_time()?),
        Primitive::Duration => Value::Duration(reader.read_duration()?),
    })
}

fn integer_of(value: &Value) -> Option<i128> {
    match value {
        Value::Int(v) => Some(i128::from(*v)),
        Value::UInt(v) => Some(i128::from(*v)),
        Value::Bool(b) => Some(i128::from(*b)),
        _ => None,
    }
}

fn encode_integer<T, const N: usize>(
    value: &Value,
    p: Primitive,
    msgtype: &str,
    to_bytes: fn(T) -> [u8; N],
    writer: &mut WireWriter,
) -> Result<()>
where
    T: TryFrom<i128>,
{
    let wide = integer_of(value).ok_or_else(|| {
        BagError::encode(msgtype, format!("expected {}, found {}", p.name(), value.kind()))
    })?;
    let narrow = T::try_from(wide)
        .map_err(|_| BagError::encode(msgtype, format!("{wide} out of range for {}", p.name())))?;
    writer.put(&to_bytes(narrow));
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn encode_primitive(
    p: Primitive,
    value: &Value,
    msgtype: &str,
    writer: &mut WireWriter,
) -> Result<()> {
    let mismatch = || BagError::encode(msgtype, format!("expected {}, found {}", p.name(), value.kind()));
    match p {
        Primitive::Bool => match value {
            Value::Bool(b) => writer.put(&[u8::from(*b)]),
            _ => return Err(mismatch()),
        },
        Primitive::Int8 => encode_integer(value, p, msgtype, i8::to_le_bytes, writer)?,
        Primitive::Uint8 => encode_integer(value, p, msgtype, u8::to_le_bytes, writer)?,
        Primitive::Int16 => encode_integer(value, p, msgtype, i16::to_le_bytes, writer)?,
        Primitive::Uint16 => encode_integer(value, p, msgtype, u16::to_le_bytes, writer)?,
        Primitive::Int32 => encode_integer(value, p, msgtype, i32::to_le_bytes, writer)?,
        Primitive::Uint32 => encode_integer(value, p, msgtype, u32::to_le_bytes, writer)?,
        Primitive::Int64 => encode_integer(value, p, msgtype, i64::to_le_bytes, writer)?,
        Primitive::Uint64 => encode_integer(value, p, msgtype, u64::to_le_bytes, writer)?,
        Primitive::Float32 => {
            let v = value.as_f64().ok_or_else(mismatch)?;
            writer.put(&(v as f32).to_le_bytes());
        }
        Primitive::Float64 => {
            let v = value.as_f64().ok_or_else(mismatch)?;
            writer.put(&v.to_le_bytes());
        }
        Primitive::String => {
            let s = value.as_str().ok_or_else(mismatch)?;
            writer.put_string(s, msgtype)?;
        }
        Primitive::Time => match value {
            Value::Time(t) => writer.put_time(*t),
            _ => return Err(mismatch()),
        },
        Primitive::Duration => match value {
            Value::Duration(d) => writer.put_duration(*d),
            _ => return Err(mismatch()),
        },
    }
    Ok(())
}
