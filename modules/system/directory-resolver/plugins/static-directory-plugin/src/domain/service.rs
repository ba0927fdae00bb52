//! Service implementation for the static directory plugin.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use arc_swap::ArcSwap;
use directory_resolver_sdk::{DirectoryEntry, Filter, SearchRequest};

use crate::config::StaticDirectoryPluginConfig;

/// In-memory directory.
///
/// Entries keep insertion order, so identical searches return identical
/// results. Writers swap in a new snapshot; open connections keep reading
/// the snapshot they started with.
pub struct Service {
    entries: ArcSwap<Vec<DirectoryEntry>>,
    acquisitions: AtomicU64,
    pub(crate) open_connections: Arc<AtomicUsize>,
}

impl Service {
    /// Create a service from plugin configuration.
    #[must_use]
    pub fn from_config(cfg: &StaticDirectoryPluginConfig) -> Self {
        let entries: Vec<DirectoryEntry> = cfg
            .users
            .iter()
            .map(|user| user.to_entry(&cfg.base_dn))
            .chain(cfg.entries.iter().cloned())
            .collect();

        Self {
            entries: ArcSwap::from_pointee(entries),
            acquisitions: AtomicU64::new(0),
            open_connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Append an entry, replacing any entry with the same DN.
    pub fn add_entry(&self, entry: DirectoryEntry) {
        self.entries.rcu(|current| {
            let mut next: Vec<DirectoryEntry> = current
                .iter()
                .filter(|existing| !existing.dn.eq_ignore_ascii_case(&entry.dn))
                .cloned()
                .collect();
            next.push(entry.clone());
            next
        });
    }

    /// Remove the entry with `dn`. Returns whether one was removed.
    pub fn remove_entry(&self, dn: &str) -> bool {
        let previous = self.entries.rcu(|current| {
            current
                .iter()
                .filter(|existing| !existing.dn.eq_ignore_ascii_case(dn))
                .cloned()
                .collect::<Vec<_>>()
        });
        previous.iter().any(|existing| existing.dn.eq_ignore_ascii_case(dn))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.load().is_empty()
    }

    /// Connections handed out so far.
    #[must_use]
    pub fn acquisitions(&self) -> u64 {
        self.acquisitions.load(Ordering::SeqCst)
    }

    /// Connections acquired and not yet released or dropped.
    #[must_use]
    pub fn open_connections(&self) -> usize {
        self.open_connections.load(Ordering::SeqCst)
    }

    pub(crate) fn snapshot(&self) -> Arc<Vec<DirectoryEntry>> {
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        self.entries.load_full()
    }
}

/// Evaluate a search against a snapshot.
pub(crate) fn search(entries: &[DirectoryEntry], request: &SearchRequest) -> Vec<DirectoryEntry> {
    let limit = if request.size_limit == 0 {
        usize::MAX
    } else {
        request.size_limit
    };

    entries
        .iter()
        .filter(|entry| in_scope(&entry.dn, &request.base_dn))
        .filter(|entry| matches(&request.filter, entry))
        .take(limit)
        .cloned()
        .collect()
}

/// The base entry itself or anything below it; the suffix must start at an
/// RDN boundary.
fn in_scope(dn: &str, base_dn: &str) -> bool {
    if base_dn.is_empty() || dn.eq_ignore_ascii_case(base_dn) {
        return true;
    }
    dn.len()
        .checked_sub(base_dn.len() + 1)
        .and_then(|start| dn.get(start..))
        .and_then(|tail| tail.strip_prefix(','))
        .is_some_and(|rest| rest.eq_ignore_ascii_case(base_dn))
}

/// Case-insensitive evaluation, as directories compare names.
pub(crate) fn matches(filter: &Filter, entry: &DirectoryEntry) -> bool {
    match filter {
        Filter::And(filters) => filters.iter().all(|f| matches(f, entry)),
        Filter::Or(filters) => filters.iter().any(|f| matches(f, entry)),
        Filter::Equals { attribute, value } => entry
            .values(attribute)
            .iter()
            .any(|v| v.eq_ignore_ascii_case(value)),
        Filter::Prefix { attribute, value } => entry.values(attribute).iter().any(|v| {
            v.get(..value.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(value))
        }),
    }
}
