//! # Tern DNS Query Filtering
//!
//! Decides whether a query may be answered, based on its header and
//! question.
//!
//! ## Features
//!
//! - **Delegate filters**: wrap any predicate over the query header
//! - **Domain sets**: allow and block lists in hosts or plain domain
//!   format, matched case-insensitively
//! - **Composition**: a chain that permits only what every member permits
//!
//! ## Example
//!
//! ```rust
//! use std::str::FromStr;
//! use tern_filter::{DomainSetFilter, Filter, Verdict};
//! use tern_proto::{Header, Name, OpCode, Question, RecordType, RecordClass};
//!
//! let filter = DomainSetFilter::new();
//! filter.add_list("0.0.0.0 ads.example.com\n", Verdict::Block);
//!
//! let query = Header::with_question(
//!     OpCode::Query,
//!     Question::new(Name::from_str("ads.example.com").unwrap(), RecordType::A, RecordClass::IN),
//! );
//! assert!(!filter.is_permitted(&query));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

use std::fmt;
use std::io;
use std::net::IpAddr;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace};

use tern_proto::{Header, Name};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while loading filter lists.
#[derive(Error, Debug)]
pub enum FilterError {
    /// IO error while reading a list.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;

// ============================================================================
// Filter Trait
// ============================================================================

/// Decides whether a query may proceed.
pub trait Filter: Send + Sync {
    /// Returns true if the query described by `query` is permitted.
    fn is_permitted(&self, query: &Header) -> bool;
}

impl<F: Filter + ?Sized> Filter for Arc<F> {
    fn is_permitted(&self, query: &Header) -> bool {
        (**self).is_permitted(query)
    }
}

impl<F: Filter + ?Sized> Filter for Box<F> {
    fn is_permitted(&self, query: &Header) -> bool {
        (**self).is_permitted(query)
    }
}

/// A filter backed by a predicate.
pub struct DelegateFilter<F> {
    should_allow: F,
}

impl<F> DelegateFilter<F>
where
    F: Fn(&Header) -> bool + Send + Sync,
{
    /// Creates a filter that permits whatever `should_allow` accepts.
    pub fn new(should_allow: F) -> Self {
        Self { should_allow }
    }
}

impl<F> Filter for DelegateFilter<F>
where
    F: Fn(&Header) -> bool + Send + Sync,
{
    fn is_permitted(&self, query: &Header) -> bool {
        (self.should_allow)(query)
    }
}

impl<F> fmt::Debug for DelegateFilter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateFilter").finish_non_exhaustive()
    }
}

/// Permits a query only if every member filter permits it.
///
/// An empty chain permits everything.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a filter.
    pub fn push(&mut self, filter: impl Filter + 'static) {
        self.filters.push(Box::new(filter));
    }

    /// Appends a filter, builder style.
    #[must_use]
    pub fn with(mut self, filter: impl Filter + 'static) -> Self {
        self.push(filter);
        self
    }

    /// Returns the number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns true if the chain has no filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Filter for FilterChain {
    fn is_permitted(&self, query: &Header) -> bool {
        self.filters.iter().all(|f| f.is_permitted(query))
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.filters.len())
            .finish()
    }
}

// ============================================================================
// Verdict
// ============================================================================

/// What a domain list says about the domains it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Queries for the domain are permitted.
    Allow,
    /// Queries for the domain are refused.
    Block,
}

impl Verdict {
    /// Returns true for [`Verdict::Allow`].
    pub fn is_allow(self) -> bool {
        self == Self::Allow
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Block => write!(f, "block"),
        }
    }
}

// ============================================================================
// List Parsing
// ============================================================================

/// Extracts the domains named by one line of a hosts file or plain domain
/// list.
///
/// Comments (`#` to end of line) and blank lines yield nothing. When the
/// first field is an address, the remaining fields are the domains;
/// otherwise the first field is the domain.
pub fn parse_line(line: &str) -> impl Iterator<Item = Name> + '_ {
    let line = line.split('#').next().unwrap_or_default();
    let hosts_line = line
        .split_whitespace()
        .next()
        .is_some_and(|f| IpAddr::from_str(f).is_ok());
    line.split_whitespace()
        .skip(usize::from(hosts_line))
        .take(if hosts_line { usize::MAX } else { 1 })
        .filter(|f| !is_local(f))
        .filter_map(|f| match Name::from_str(f) {
            Ok(name) if !name.is_root() => Some(name),
            Ok(_) => None,
            Err(e) => {
                trace!(entry = f, error = %e, "skipping list entry");
                None
            }
        })
}

fn is_local(domain: &str) -> bool {
    matches!(
        domain,
        "localhost" | "localhost.localdomain" | "local" | "broadcasthost"
    )
}

/// Parses a whole list, dropping duplicates.
pub fn parse_list(content: &str) -> HashSet<Name> {
    content.lines().flat_map(parse_line).collect()
}

// ============================================================================
// Domain Set Filter
// ============================================================================

/// Counters kept by a [`DomainSetFilter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    /// Queries permitted.
    pub permitted: u64,
    /// Queries refused.
    pub blocked: u64,
}

/// Filters queries by the name in their question against allow and block
/// lists.
///
/// A name on no list is permitted. When a name appears on several lists the
/// most recently added list wins. Queries without a question are permitted.
#[derive(Debug, Default)]
pub struct DomainSetFilter {
    domains: DashMap<Name, Verdict>,
    include_subdomains: bool,
    permitted: AtomicU64,
    blocked: AtomicU64,
}

impl DomainSetFilter {
    /// Creates an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also applies an entry to every name below it.
    #[must_use]
    pub fn with_subdomains(mut self, include: bool) -> Self {
        self.include_subdomains = include;
        self
    }

    /// Sets the verdict for one domain.
    pub fn insert(&self, domain: Name, verdict: Verdict) {
        self.domains.insert(domain, verdict);
    }

    /// Adds every domain in `content` with the given verdict.
    ///
    /// Returns the number of distinct domains in the list.
    pub fn add_list(&self, content: &str, verdict: Verdict) -> usize {
        let set = parse_list(content);
        let count = set.len();
        for domain in set {
            self.domains.insert(domain, verdict);
        }
        debug!(domains = count, %verdict, "added filter list");
        count
    }

    /// Reads a list from a file and adds it with the given verdict.
    pub async fn add_list_file(&self, path: impl AsRef<Path>, verdict: Verdict) -> Result<usize> {
        let path = path.as_ref();
        trace!(path = %path.display(), "reading filter list");
        let content = tokio::fs::read_to_string(path).await?;
        let count = self.add_list(&content, verdict);
        info!(
            path = %path.display(),
            %verdict,
            found = count,
            total = self.len(),
            "filter list loaded"
        );
        Ok(count)
    }

    /// Adds a block list file.
    pub async fn add_block_list(&self, path: impl AsRef<Path>) -> Result<usize> {
        self.add_list_file(path, Verdict::Block).await
    }

    /// Adds an allow list file.
    pub async fn add_allow_list(&self, path: impl AsRef<Path>) -> Result<usize> {
        self.add_list_file(path, Verdict::Allow).await
    }

    /// Returns the verdict for `name`, if any list mentions it.
    pub fn check(&self, name: &Name) -> Option<Verdict> {
        if let Some(verdict) = self.domains.get(name) {
            return Some(*verdict);
        }
        if !self.include_subdomains {
            return None;
        }

        let mut current = name.parent()?;
        while !current.is_root() {
            if let Some(verdict) = self.domains.get(&current) {
                return Some(*verdict);
            }
            current = current.parent()?;
        }
        None
    }

    /// Returns the number of domains on any list.
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Returns true if no domains are listed.
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Returns the query counters.
    pub fn stats(&self) -> FilterStats {
        FilterStats {
            permitted: self.permitted.load(Ordering::Relaxed),
            blocked: self.blocked.load(Ordering::Relaxed),
        }
    }
}

impl Filter for DomainSetFilter {
    fn is_permitted(&self, query: &Header) -> bool {
        let permitted = query
            .question
            .as_ref()
            .and_then(|q| self.check(&q.qname))
            .is_none_or(Verdict::is_allow);

        if permitted {
            self.permitted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.blocked.fetch_add(1, Ordering::Relaxed);
            if let Some(q) = &query.question {
                debug!(name = %q.qname, id = query.id, "query blocked");
            }
        }
        permitted
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tern_proto::{OpCode, Question, RecordClass, RecordType};

    fn test_name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    fn query(s: &str) -> Header {
        Header::with_question(
            OpCode::Query,
            Question::new(test_name(s), RecordType::A, RecordClass::IN),
        )
    }

    #[test]
    fn test_parse_hosts_line() {
        let names: Vec<_> = parse_line("0.0.0.0 ads.example.com tracker.example.com # ads").collect();
        assert_eq!(names, vec![test_name("ads.example.com"), test_name("tracker.example.com")]);

        let names: Vec<_> = parse_line("127.0.0.1 localhost").collect();
        assert!(names.is_empty());
    }

    #[test]
    fn test_parse_domains_line() {
        let names: Vec<_> = parse_line("  ads.example.com  ").collect();
        assert_eq!(names, vec![test_name("ads.example.com")]);

        assert_eq!(parse_line("# comment only").count(), 0);
        assert_eq!(parse_line("").count(), 0);
        assert_eq!(parse_line("bad_domain!").count(), 0);
    }

    #[test]
    fn test_parse_list_dedups() {
        let set = parse_list("ads.example.com\n0.0.0.0 ADS.example.com\n\n# x\nother.com\n");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_delegate_filter() {
        let filter = DelegateFilter::new(|h: &Header| h.id != 0);
        let mut header = query("example.com");
        header.id = 1;
        assert!(filter.is_permitted(&header));
        header.id = 0;
        assert!(!filter.is_permitted(&header));
    }

    #[test]
    fn test_block_and_allow_lists() {
        let filter = DomainSetFilter::new();
        assert_eq!(filter.add_list("ads.example.com\nads.example.net\n", Verdict::Block), 2);
        assert_eq!(filter.add_list("ads.example.net\n", Verdict::Allow), 1);

        assert!(!filter.is_permitted(&query("ADS.example.com")));
        assert!(filter.is_permitted(&query("ads.example.net")));
        assert!(filter.is_permitted(&query("www.example.com")));
        assert!(filter.is_permitted(&query("sub.ads.example.com")));

        assert_eq!(filter.stats(), FilterStats { permitted: 3, blocked: 1 });
    }

    #[test]
    fn test_subdomains() {
        let filter = DomainSetFilter::new().with_subdomains(true);
        filter.insert(test_name("example.com"), Verdict::Block);
        filter.insert(test_name("ok.example.com"), Verdict::Allow);

        assert!(!filter.is_permitted(&query("a.b.example.com")));
        assert!(filter.is_permitted(&query("x.ok.example.com")));
        assert!(filter.is_permitted(&query("example.org")));
    }

    #[test]
    fn test_no_question_is_permitted() {
        let filter = DomainSetFilter::new();
        filter.insert(test_name("example.com"), Verdict::Block);
        assert!(filter.is_permitted(&Header::new(7)));
    }

    #[test]
    fn test_chain() {
        let blocked = DomainSetFilter::new();
        blocked.insert(test_name("ads.example.com"), Verdict::Block);

        let chain = FilterChain::new()
            .with(DelegateFilter::new(|h: &Header| h.opcode == OpCode::Query))
            .with(blocked);
        assert_eq!(chain.len(), 2);

        assert!(chain.is_permitted(&query("www.example.com")));
        assert!(!chain.is_permitted(&query("ads.example.com")));
        assert!(FilterChain::new().is_permitted(&query("ads.example.com")));
    }

    #[tokio::test]
    async fn test_load_list_files() {
        let dir = tempfile::tempdir().unwrap();
        let block = dir.path().join("block.txt");
        let allow = dir.path().join("allow.txt");
        std::fs::write(&block, "0.0.0.0 ads.example.com\n0.0.0.0 t.example.com\n").unwrap();
        std::fs::write(&allow, "t.example.com\n").unwrap();

        let filter = DomainSetFilter::new();
        assert_eq!(filter.add_block_list(&block).await.unwrap(), 2);
        assert_eq!(filter.add_allow_list(&allow).await.unwrap(), 1);

        assert_eq!(filter.check(&test_name("t.example.com")), Some(Verdict::Allow));
        assert_eq!(filter.check(&test_name("ads.example.com")), Some(Verdict::Block));

        let missing = filter.add_block_list(dir.path().join("missing")).await;
        assert!(matches!(missing, Err(FilterError::Io(_))));
    }
}
