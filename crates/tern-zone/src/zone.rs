//! The zone collaborator and its in-memory implementation.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::debug;

use tern_proto::rdata::SOA;
use tern_proto::{Name, RecordType, ResourceRecord};

use crate::error::{Result, ZoneError};

/// Default TTL for records that do not carry one (1 hour).
pub const DEFAULT_TTL: u32 = 3600;

/// A mutation applied to a zone's records inside [`Zone::update`].
///
/// It receives a working copy of the records. Returning `true` commits the
/// copy; returning `false` discards it and leaves the zone untouched.
pub type Mutator<'a> = Box<dyn FnOnce(&mut Vec<ResourceRecord>) -> bool + Send + 'a>;

/// An authoritative zone whose records can be changed at runtime.
///
/// Implementations must run [`update`](Zone::update) mutators one at a
/// time per zone, and readers of [`records`](Zone::records) must only ever
/// see a committed state.
#[async_trait]
pub trait Zone: Send + Sync + fmt::Debug {
    /// Returns the zone origin (apex name).
    fn origin(&self) -> &Name;

    /// Returns the TTL used for records added without one, in seconds.
    fn default_ttl(&self) -> u32;

    /// Returns the current records, in zone order.
    fn records(&self) -> Arc<Vec<ResourceRecord>>;

    /// Runs `mutator` with exclusive write access to the records.
    async fn update(&self, mutator: Mutator<'_>) -> Result<bool>;
}

/// A zone held in memory.
///
/// Readers load an immutable snapshot and never block. Writers queue on an
/// async mutex, work on a copy and publish it with a single pointer swap.
pub struct InMemoryZone {
    /// Zone apex.
    origin: Name,
    /// Default TTL in seconds.
    default_ttl: u32,
    /// Committed records.
    records: ArcSwap<Vec<ResourceRecord>>,
    /// Serializes writers.
    writer: Mutex<()>,
    /// Time of the last committed change.
    last_modified: RwLock<Option<DateTime<Utc>>>,
}

impl InMemoryZone {
    /// Creates a zone with the given records.
    pub fn new(origin: Name, default_ttl: u32, records: Vec<ResourceRecord>) -> Self {
        Self {
            origin,
            default_ttl,
            records: ArcSwap::from_pointee(records),
            writer: Mutex::new(()),
            last_modified: RwLock::new(None),
        }
    }

    /// Creates an empty zone.
    pub fn empty(origin: Name) -> Self {
        Self::new(origin, DEFAULT_TTL, Vec::new())
    }

    /// Creates a zone holding only its SOA record.
    pub fn with_soa(origin: Name, soa: SOA) -> Self {
        let ttl = soa.minimum().max(1).min(DEFAULT_TTL);
        let record = ResourceRecord::soa(origin.clone(), DEFAULT_TTL, soa);
        Self::new(origin, ttl, vec![record])
    }

    /// Returns the apex SOA payload, if the zone has one.
    pub fn soa(&self) -> Option<SOA> {
        self.records
            .load()
            .iter()
            .filter(|r| r.is_type(RecordType::SOA) && r.name() == &self.origin)
            .find_map(|r| r.rdata().and_then(|d| d.as_soa()).cloned())
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.load().len()
    }

    /// Returns true if the zone holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.load().is_empty()
    }

    /// Returns the time of the last committed update.
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        *self.last_modified.read()
    }

    /// Checks that every record lies inside the zone.
    pub fn validate(&self) -> Result<()> {
        if let Some(outside) = self
            .records
            .load()
            .iter()
            .find(|r| !r.name().is_subdomain_of(&self.origin))
        {
            return Err(ZoneError::invalid(format!(
                "{} is outside zone {}",
                outside.name(),
                self.origin
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for InMemoryZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryZone")
            .field("origin", &self.origin)
            .field("default_ttl", &self.default_ttl)
            .field("records", &self.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Zone for InMemoryZone {
    fn origin(&self) -> &Name {
        &self.origin
    }

    fn default_ttl(&self) -> u32 {
        self.default_ttl
    }

    fn records(&self) -> Arc<Vec<ResourceRecord>> {
        self.records.load_full()
    }

    async fn update(&self, mutator: Mutator<'_>) -> Result<bool> {
        let _guard = self.writer.lock().await;

        let mut working = Vec::clone(&self.records.load());
        if !mutator(&mut working) {
            debug!(zone = %self.origin, "update discarded");
            return Ok(false);
        }

        let count = working.len();
        self.records.store(Arc::new(working));
        *self.last_modified.write() = Some(Utc::now());
        debug!(zone = %self.origin, records = count, "update committed");
        Ok(true)
    }
}
