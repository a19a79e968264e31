//! Dynamically typed message values.

/// ROS `time`: seconds and nanoseconds since the UNIX epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RosTime {
    /// Whole seconds.
    pub sec: u32,
    /// Nanosecond remainder.
    pub nsec: u32,
}

/// ROS `duration`: signed seconds and nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RosDuration {
    /// Whole seconds.
    pub sec: i32,
    /// Nanosecond part.
    pub nsec: i32,
}

/// A decoded field value.
///
/// Integer primitives widen to [`Value::Int`] or [`Value::UInt`] and both
/// float widths to [`Value::Float`]. `uint8[]` arrays decode to
/// [`Value::Bytes`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `bool`.
    Bool(bool),
    /// Signed integers.
    Int(i64),
    /// Unsigned integers.
    UInt(u64),
    /// `float32` and `float64`.
    Float(f64),
    /// `string`.
    String(String),
    /// `time`.
    Time(RosTime),
    /// `duration`.
    Duration(RosDuration),
    /// `uint8[]` and `char[]`.
    Bytes(Vec<u8>),
    /// Any other array.
    Array(Vec<Value>),
    /// Nested message.
    Message(MessageValue),
}

impl Value {
    /// Returns the value as `f64` for any numeric variant.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::UInt(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string payload.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns array elements.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the nested message.
    #[must_use]
    pub const fn as_message(&self) -> Option<&MessageValue> {
        match self {
            Self::Message(msg) => Some(msg),
            _ => None,
        }
    }

    /// Returns the time payload.
    #[must_use]
    pub const fn as_time(&self) -> Option<RosTime> {
        match self {
            Self::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Time(_) => "time",
            Self::Duration(_) => "duration",
            Self::Bytes(_) => "bytes",
            Self::Array(_) => "array",
            Self::Message(_) => "message",
        }
    }
}

/// A decoded message: its normalized type and fields in definition order.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageValue {
    /// Normalized message type (`pkg/msg/Type`).
    pub msgtype: String,
    /// Field names and values, in definition order.
    pub fields: Vec<(String, Value)>,
}

impl MessageValue {
    /// Creates an empty message of the given type.
    #[must_use]
    pub fn new(msgtype: impl Into<String>) -> Self {
        Self {
            msgtype: msgtype.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.push((name.into(), value));
        self
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}

impl From<MessageValue> for Value {
    fn from(msg: MessageValue) -> Self {
        Self::Message(msg)
    }
}
