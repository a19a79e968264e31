//! ROS1 bag file reader.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rosbag::{ChunkRecord, IndexRecord, MessageRecord, RosBag};
use tracing::debug;
use traj_types::Timestamp;

use crate::error::{BagError, Result};
use crate::source::{Connection, MessageSource, RawMessage, Visitor, overlay_definitions};
use crate::typesys::{Stores, TypeStore, get_typestore};

/// Per-topic summary of a bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicInfo {
    /// Topic name.
    pub topic: String,
    /// Normalized message type; the first connection's type if several
    /// connections share the topic.
    pub msgtype: String,
    /// Number of connections on the topic.
    pub connections: usize,
    /// Number of messages on the topic.
    pub message_count: usize,
}

/// An open ROS1 bag.
///
/// The file is memory-mapped on open and unmapped when the reader is
/// dropped.
///
/// # Example
///
/// ```no_run
/// use traj_bag::{BagReader, MessageSource};
///
/// let reader = BagReader::open("session_01.bag")?;
/// for info in reader.topics()? {
///     println!("{} [{}]: {}", info.topic, info.msgtype, info.message_count);
/// }
/// # Ok::<(), traj_bag::BagError>(())
/// ```
pub struct BagReader {
    path: PathBuf,
    bag: RosBag,
    connections: Vec<Connection>,
    typestore: TypeStore,
}

impl std::fmt::Debug for BagReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BagReader")
            .field("path", &self.path)
            .field("connections", &self.connections.len())
            .field("types", &self.typestore.len())
            .finish_non_exhaustive()
    }
}

impl BagReader {
    /// Opens a bag, decoding with the ROS1 Noetic store plus the
    /// definitions embedded in the bag.
    ///
    /// # Errors
    ///
    /// Returns [`BagError::Io`] if the file cannot be opened or is not a
    /// ROS1 v2.0 bag, [`BagError::Container`] if its index is corrupt, or
    /// [`BagError::InvalidDefinition`] if an embedded definition is invalid.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_store(path, Stores::Ros1Noetic)
    }

    /// Opens a bag using a named store for types the bag does not define.
    ///
    /// # Errors
    ///
    /// See [`BagReader::open`].
    pub fn open_with_store(path: impl AsRef<Path>, store: Stores) -> Result<Self> {
        Self::open_with_typestore(path, get_typestore(store))
    }

    /// Opens a bag using `typestore` for types the bag does not define.
    ///
    /// # Errors
    ///
    /// See [`BagReader::open`].
    pub fn open_with_typestore(path: impl AsRef<Path>, typestore: TypeStore) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bag = RosBag::new(&path)
            .map_err(|e| BagError::Io(format!("{}: {e}", path.display())))?;

        let connections = read_connections(&bag)?;
        let typestore = overlay_definitions(typestore, &connections)?;

        debug!(
            path = %path.display(),
            connections = connections.len(),
            chunks = bag.get_chunk_count(),
            "opened bag"
        );

        Ok(Self {
            path,
            bag,
            connections,
            typestore,
        })
    }

    /// Path the bag was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Summarizes topics, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`BagError::Container`] if a chunk cannot be read.
    pub fn topics(&self) -> Result<Vec<TopicInfo>> {
        let ids: Vec<u32> = self.connections.iter().map(|c| c.id).collect();
        let mut per_connection: BTreeMap<u32, usize> = BTreeMap::new();
        self.visit_stored(&ids, &mut |raw| {
            *per_connection.entry(raw.connection.id).or_default() += 1;
            Ok(())
        })?;

        let mut topics: BTreeMap<&str, TopicInfo> = BTreeMap::new();
        for connection in &self.connections {
            let info = topics
                .entry(connection.topic.as_str())
                .or_insert_with(|| TopicInfo {
                    topic: connection.topic.clone(),
                    msgtype: connection.msgtype.clone(),
                    connections: 0,
                    message_count: 0,
                });
            info.connections += 1;
            info.message_count += per_connection.get(&connection.id).copied().unwrap_or(0);
        }
        Ok(topics.into_values().collect())
    }

    fn connection(&self, id: u32) -> Result<&Connection> {
        self.connections
            .binary_search_by_key(&id, |c| c.id)
            .ok()
            .and_then(|i| self.connections.get(i))
            .ok_or_else(|| {
                BagError::container(format!("message references unknown connection {id}"))
            })
    }

    /// Visits messages in the order they are stored in the chunks.
    fn visit_stored(&self, connection_ids: &[u32], visitor: &mut Visitor<'_>) -> Result<()> {
        if connection_ids.is_empty() {
            return Ok(());
        }
        for record in self.bag.chunk_records() {
            let ChunkRecord::Chunk(chunk) = record? else {
                continue;
            };
            for message in chunk.messages() {
                let MessageRecord::MessageData(data) = message? else {
                    continue;
                };
                if !connection_ids.contains(&data.conn_id) {
                    continue;
                }
                visitor(RawMessage {
                    connection: self.connection(data.conn_id)?,
                    time: Timestamp::from_nanos(data.time),
                    data: data.data,
                })?;
            }
        }
        Ok(())
    }

    /// Returns true if stored order is already time order.
    fn is_chronological(&self, connection_ids: &[u32]) -> Result<bool> {
        let mut last = Timestamp::default();
        let mut sorted = true;
        self.visit_stored(connection_ids, &mut |raw| {
            sorted &= raw.time >= last;
            last = raw.time;
            Ok(())
        })?;
        Ok(sorted)
    }
}

/// Reads connection records from the index section, falling back to the
/// chunks for bags written without one.
fn read_connections(bag: &RosBag) -> Result<Vec<Connection>> {
    let mut by_id: BTreeMap<u32, Connection> = BTreeMap::new();

    for record in bag.index_records() {
        if let IndexRecord::Connection(conn) = record? {
            by_id.entry(conn.id).or_insert_with(|| convert(&conn));
        }
    }

    if by_id.is_empty() {
        for record in bag.chunk_records() {
            if let ChunkRecord::Chunk(chunk) = record? {
                for message in chunk.messages() {
                    if let MessageRecord::Connection(conn) = message? {
                        by_id.entry(conn.id).or_insert_with(|| convert(&conn));
                    }
                }
            }
        }
    }

    Ok(by_id.into_values().collect())
}

fn convert(conn: &rosbag::record_types::Connection<'_>) -> Connection {
    Connection::new(conn.id, conn.topic, conn.tp).with_definition(conn.message_definition)
}

impl MessageSource for BagReader {
    fn connections(&self) -> &[Connection] {
        &self.connections
    }

    fn typestore(&self) -> &TypeStore {
        &self.typestore
    }

    /// Chunks are normally written in time order and are streamed
    /// directly. Otherwise the selected payloads are copied and stably
    /// sorted by record time first.
    fn visit_messages(&self, connection_ids: &[u32], visitor: &mut Visitor<'_>) -> Result<()> {
        if self.is_chronological(connection_ids)? {
            return self.visit_stored(connection_ids, visitor);
        }

        let mut buffered: Vec<(u32, Timestamp, Vec<u8>)> = Vec::new();
        self.visit_stored(connection_ids, &mut |raw| {
            buffered.push((raw.connection.id, raw.time, raw.data.to_vec()));
            Ok(())
        })?;
        buffered.sort_by_key(|(_, time, _)| *time);
        debug!(
            path = %self.path.display(),
            messages = buffered.len(),
            "messages stored out of time order; sorted"
        );

        for (id, time, data) in &buffered {
            visitor(RawMessage {
                connection: self.connection(*id)?,
                time: *time,
                data,
            })?;
        }
        Ok(())
    }

    fn count_messages(&self, connection_ids: &[u32]) -> Result<usize> {
        let mut count = 0usize;
        self.visit_stored(connection_ids, &mut |_| {
            count += 1;
            Ok(())
        })?;
        Ok(count)
    }
}
