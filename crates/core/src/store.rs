//! Snapshot persistence for the marketplace collections.
//!
//! Each collection lives in its own JSON file and is rewritten whole on
//! every save. Files are written to a temporary sibling first and renamed
//! into place, so a crash mid-write never leaves a truncated snapshot.

use std::{
    fmt, fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::{
    config::{sanitize_file_name, AppConfig},
    models::{Listing, ListingId, Ticket, User},
};

/// Format version written into every snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The independently persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Registered accounts.
    Users,
    /// The browsable catalog.
    Listings,
    /// Placed orders.
    Tickets,
}

impl Collection {
    /// All collections, in flush order.
    pub const ALL: [Collection; 3] = [Collection::Users, Collection::Listings, Collection::Tickets];

    /// Name recorded inside the snapshot envelope.
    pub fn name(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Listings => "listings",
            Collection::Tickets => "tickets",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// On-disk envelope around a collection.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot<I> {
    version: u32,
    collection: Collection,
    saved_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_id: Option<u64>,
    items: I,
}

/// A collection that could not be written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to persist {collection}: {message}")]
pub struct PersistenceFailure {
    /// Collection whose snapshot was not written.
    pub collection: Collection,
    /// Rendered error chain.
    pub message: String,
}

/// Outcome of one flush of every collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Collections written successfully.
    pub saved: Vec<Collection>,
    /// Collections that failed; the others were still written.
    pub failed: Vec<PersistenceFailure>,
}

impl FlushReport {
    /// True when every collection was written.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Borrowed view of everything a flush writes.
#[derive(Debug, Clone, Copy)]
pub struct CollectionsRef<'a> {
    /// Registered accounts.
    pub users: &'a [User],
    /// Active catalog.
    pub listings: &'a [Listing],
    /// Placed tickets.
    pub tickets: &'a [Ticket],
    /// Id the next listing will receive, kept with the catalog.
    pub next_listing_id: ListingId,
}

/// Result of restoring every collection. `None` marks a slot whose file was
/// missing or unreadable, as opposed to `Some(vec![])` for an empty collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedCollections {
    /// Restored accounts.
    pub users: Option<Vec<User>>,
    /// Restored catalog.
    pub listings: Option<Vec<Listing>>,
    /// Restored tickets.
    pub tickets: Option<Vec<Ticket>>,
    /// Listing id counter recorded with the catalog, if any.
    pub next_listing_id: Option<ListingId>,
}

/// Reads and writes collection snapshots beneath a root directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
    users_file: String,
    listings_file: String,
    tickets_file: String,
}

impl SnapshotStore {
    /// Store rooted at `root` with the default file names.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::from_config(&AppConfig::with_data_dir(root))
    }

    /// Store using the directory and file names from `config`.
    ///
    /// File names are reduced to a single path component beneath the data
    /// directory, however the config was built.
    pub fn from_config(config: &AppConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            root: config.data_dir.clone(),
            users_file: sanitize_file_name(&config.users_file, &defaults.users_file),
            listings_file: sanitize_file_name(&config.listings_file, &defaults.listings_file),
            tickets_file: sanitize_file_name(&config.tickets_file, &defaults.tickets_file),
        }
    }

    /// Directory holding the snapshot files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `collection`.
    pub fn path_for(&self, collection: Collection) -> PathBuf {
        let file_name = match collection {
            Collection::Users => &self.users_file,
            Collection::Listings => &self.listings_file,
            Collection::Tickets => &self.tickets_file,
        };
        self.root.join(file_name)
    }

    /// Write every collection, continuing past individual failures.
    pub fn save_all(&self, collections: CollectionsRef<'_>) -> FlushReport {
        let mut report = FlushReport::default();
        let outcomes = [
            (
                Collection::Users,
                self.write_snapshot(Collection::Users, collections.users, None),
            ),
            (
                Collection::Listings,
                self.write_snapshot(
                    Collection::Listings,
                    collections.listings,
                    Some(collections.next_listing_id.0),
                ),
            ),
            (
                Collection::Tickets,
                self.write_snapshot(Collection::Tickets, collections.tickets, None),
            ),
        ];
        for (collection, outcome) in outcomes {
            match outcome {
                Ok(path) => {
                    debug!("saved {collection} to {}", path.display());
                    report.saved.push(collection);
                }
                Err(err) => {
                    warn!("Failed to save {collection}: {err:#}");
                    report.failed.push(PersistenceFailure {
                        collection,
                        message: format!("{err:#}"),
                    });
                }
            }
        }
        report
    }

    /// Restore every collection; a bad file only empties its own slot.
    pub fn load_all(&self) -> LoadedCollections {
        let (listings, next_id) = match self.load_slot(Collection::Listings) {
            Some((items, next_id)) => (Some(items), next_id),
            None => (None, None),
        };
        LoadedCollections {
            users: self.load_slot(Collection::Users).map(|(items, _)| items),
            listings,
            tickets: self.load_slot(Collection::Tickets).map(|(items, _)| items),
            next_listing_id: next_id.map(ListingId),
        }
    }

    /// Serialize `items` as the full snapshot for `collection`.
    pub fn save_collection<T: Serialize>(
        &self,
        collection: Collection,
        items: &[T],
    ) -> Result<PathBuf> {
        self.write_snapshot(collection, items, None)
    }

    /// Read the snapshot for `collection`, failing if it is missing or invalid.
    pub fn load_collection<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>> {
        self.read_snapshot(collection).map(|(items, _)| items)
    }

    fn write_snapshot<T: Serialize>(
        &self,
        collection: Collection,
        items: &[T],
        next_id: Option<u64>,
    ) -> Result<PathBuf> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            collection,
            saved_at: Utc::now(),
            next_id,
            items,
        };
        let serialised = serde_json::to_vec_pretty(&snapshot)
            .with_context(|| format!("failed to serialize {collection}"))?;
        let path = self.path_for(collection);
        write_atomic(&path, &serialised)?;
        Ok(path)
    }

    fn read_snapshot<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<(Vec<T>, Option<u64>)> {
        let path = self.path_for(collection);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let snapshot: Snapshot<Value> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            bail!(
                "unsupported snapshot version {} in {}",
                snapshot.version,
                path.display()
            );
        }
        if snapshot.collection != collection {
            bail!(
                "{} holds {} rather than {collection}",
                path.display(),
                snapshot.collection
            );
        }
        let items = serde_json::from_value(snapshot.items)
            .with_context(|| format!("failed to decode {collection} in {}", path.display()))?;
        Ok((items, snapshot.next_id))
    }

    /// Delete every snapshot file.
    pub fn wipe(&self) -> Result<()> {
        for collection in Collection::ALL {
            let path = self.path_for(collection);
            if path.exists() {
                fs::remove_file(&path)
                    .with_context(|| format!("failed to remove {}", path.display()))?;
            }
        }
        Ok(())
    }

    fn load_slot<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Option<(Vec<T>, Option<u64>)> {
        let path = self.path_for(collection);
        if !path.exists() {
            debug!("no {collection} snapshot at {}", path.display());
            return None;
        }
        match self.read_snapshot::<T>(collection) {
            Ok((items, next_id)) => {
                info!("loaded {} {collection} from {}", items.len(), path.display());
                Some((items, next_id))
            }
            Err(err) => {
                warn!("Failed to load {collection}: {err:#}");
                None
            }
        }
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;

    let mut staged = NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to stage snapshot in {}", parent.display()))?;
    staged
        .write_all(bytes)
        .with_context(|| format!("failed to write {}", staged.path().display()))?;
    staged
        .as_file()
        .sync_all()
        .with_context(|| format!("failed to sync {}", staged.path().display()))?;
    staged
        .persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
