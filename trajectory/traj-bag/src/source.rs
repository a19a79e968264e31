//! Message sources.
//!
//! [`MessageSource`] is the seam between extraction and storage: a bag file
//! on disk ([`crate::BagReader`]) and an in-memory log ([`MemorySource`])
//! both stream raw payloads with their connection and record time.

use traj_types::Timestamp;

use crate::error::{BagError, Result};
use crate::typesys::{TypeStore, normalize_msgtype};
use crate::value::Value;

/// A topic connection: one publisher's stream of one message type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Connection ID, unique within a source.
    pub id: u32,
    /// Topic name.
    pub topic: String,
    /// Normalized message type (`pkg/msg/Type`).
    pub msgtype: String,
    /// Embedded `.msg` definition text; empty if absent.
    pub definition: String,
}

impl Connection {
    /// Creates a connection; the type name is normalized.
    #[must_use]
    pub fn new(id: u32, topic: impl Into<String>, msgtype: &str) -> Self {
        Self {
            id,
            topic: topic.into(),
            msgtype: normalize_msgtype(msgtype),
            definition: String::new(),
        }
    }

    /// Sets the embedded definition text.
    #[must_use]
    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = definition.into();
        self
    }
}

/// A serialized message with its connection and record time.
#[derive(Debug, Clone, Copy)]
pub struct RawMessage<'a> {
    /// Connection the message was recorded on.
    pub connection: &'a Connection,
    /// Record (receive) time.
    pub time: Timestamp,
    /// Serialized payload.
    pub data: &'a [u8],
}

/// Visitor over messages of a source.
pub type Visitor<'v> = dyn for<'m> FnMut(RawMessage<'m>) -> Result<()> + 'v;

/// A readable collection of recorded messages.
pub trait MessageSource {
    /// All connections, ordered by ID.
    fn connections(&self) -> &[Connection];

    /// Schemas used to decode payloads.
    fn typestore(&self) -> &TypeStore;

    /// Calls `visitor` for every message on the given connections, in
    /// record time order. Messages with equal times keep their stored
    /// order. Stops at the first error.
    ///
    /// # Errors
    ///
    /// Propagates storage errors and any error returned by `visitor`.
    fn visit_messages(&self, connection_ids: &[u32], visitor: &mut Visitor<'_>) -> Result<()>;

    /// Connections on `topic`.
    fn connections_on(&self, topic: &str) -> Vec<&Connection> {
        self.connections()
            .iter()
            .filter(|c| c.topic == topic)
            .collect()
    }

    /// Number of messages on the given connections.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    fn count_messages(&self, connection_ids: &[u32]) -> Result<usize> {
        let mut count = 0usize;
        self.visit_messages(connection_ids, &mut |_| {
            count += 1;
            Ok(())
        })?;
        Ok(count)
    }

    /// Decodes a payload using its connection's type.
    ///
    /// # Errors
    ///
    /// Returns [`BagError::UnknownMessageType`] or [`BagError::Decode`].
    fn deserialize(&self, raw: &RawMessage<'_>) -> Result<Value> {
        self.typestore()
            .deserialize(raw.data, &raw.connection.msgtype)
    }
}

/// Builds a type store from `base`, overlaid with the definitions embedded
/// in `connections`.
///
/// # Errors
///
/// Returns [`BagError::InvalidDefinition`] if an embedded definition cannot
/// be parsed.
pub fn overlay_definitions(base: TypeStore, connections: &[Connection]) -> Result<TypeStore> {
    let mut store = base;
    for connection in connections {
        if connection.definition.trim().is_empty() {
            continue;
        }
        store.register_text(&connection.msgtype, &connection.definition)?;
    }
    Ok(store)
}

/// In-memory message source.
///
/// # Example
///
/// ```
/// use traj_bag::{Connection, MemorySource, MessageSource, TypeStore};
/// use traj_types::Timestamp;
///
/// let mut source = MemorySource::new(TypeStore::ros1_noetic());
/// source.add_connection(Connection::new(0, "/chatter", "std_msgs/String")).unwrap();
/// source.push(0, Timestamp::from_nanos(1), vec![0, 0, 0, 0]).unwrap();
///
/// assert_eq!(source.count_messages(&[0]).unwrap(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    connections: Vec<Connection>,
    messages: Vec<(u32, Timestamp, Vec<u8>)>,
    typestore: TypeStore,
}

impl MemorySource {
    /// Creates an empty source decoding with `typestore`.
    #[must_use]
    pub fn new(typestore: TypeStore) -> Self {
        Self {
            connections: Vec::new(),
            messages: Vec::new(),
            typestore,
        }
    }

    /// Adds a connection, registering its embedded definition if any.
    ///
    /// # Errors
    ///
    /// Returns [`BagError::InvalidConfig`] if the ID is taken, or
    /// [`BagError::InvalidDefinition`] if the definition cannot be parsed.
    pub fn add_connection(&mut self, connection: Connection) -> Result<()> {
        if self.connections.iter().any(|c| c.id == connection.id) {
            return Err(BagError::invalid_config(format!(
                "duplicate connection id {}",
                connection.id
            )));
        }
        if !connection.definition.trim().is_empty() {
            self.typestore
                .register_text(&connection.msgtype, &connection.definition)?;
        }
        let index = self.connections.partition_point(|c| c.id < connection.id);
        self.connections.insert(index, connection);
        Ok(())
    }

    /// Inserts a serialized message, keeping messages in time order.
    /// Messages with equal times keep insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`BagError::InvalidConfig`] if the connection is unknown.
    pub fn push(&mut self, connection_id: u32, time: Timestamp, data: Vec<u8>) -> Result<()> {
        if !self.connections.iter().any(|c| c.id == connection_id) {
            return Err(BagError::invalid_config(format!(
                "unknown connection id {connection_id}"
            )));
        }
        let index = self.messages.partition_point(|(_, t, _)| *t <= time);
        self.messages.insert(index, (connection_id, time, data));
        Ok(())
    }

    /// Serializes `value` with the connection's type and inserts it.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is unknown or encoding fails.
    pub fn push_value(&mut self, connection_id: u32, time: Timestamp, value: &Value) -> Result<()> {
        let msgtype = self
            .connections
            .iter()
            .find(|c| c.id == connection_id)
            .map(|c| c.msgtype.clone())
            .ok_or_else(|| {
                BagError::invalid_config(format!("unknown connection id {connection_id}"))
            })?;
        let data = self.typestore.serialize(value, &msgtype)?;
        self.push(connection_id, time, data)
    }

    /// Number of stored messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if no messages are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl MessageSource for MemorySource {
    fn connections(&self) -> &[Connection] {
        &self.connections
    }

    fn typestore(&self) -> &TypeStore {
        &self.typestore
    }

    fn visit_messages(&self, connection_ids: &[u32], visitor: &mut Visitor<'_>) -> Result<()> {
        for (id, time, data) in &self.messages {
            if !connection_ids.contains(id) {
                continue;
            }
            let Some(connection) = self.connections.iter().find(|c| c.id == *id) else {
                continue;
            };
            visitor(RawMessage {
                connection,
                time: *time,
                data,
            })?;
        }
        Ok(())
    }
}
