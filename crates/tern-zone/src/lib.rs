//! # Tern DNS Zone Updates
//!
//! RFC 2136 dynamic updates applied to authoritative zones:
//!
//! - **Zone storage**: the [`Zone`] collaborator and an in-memory zone
//!   that publishes committed changes atomically
//! - **Dynamic updates**: prerequisite checks and update application,
//!   all-or-nothing per request
//! - **Hierarchical lookup**: a zone tree for routing updates by name
//! - **Host tables**: dhcpd and hosts file sources that seed address records
//!
//! ## Example
//!
//! ```rust
//! use std::net::Ipv4Addr;
//! use std::str::FromStr;
//! use tern_proto::{Name, ResourceRecord, ResponseCode};
//! use tern_zone::{DynamicUpdate, InMemoryZone, Zone};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let zone = InMemoryZone::empty(Name::from_str("example.com").unwrap());
//! let updates = [ResourceRecord::a(
//!     Name::from_str("www.example.com").unwrap(),
//!     300,
//!     Ipv4Addr::new(192, 0, 2, 1),
//! )];
//!
//! let code = DynamicUpdate::new().process(&zone, &[], &updates).await.unwrap();
//! assert_eq!(code, ResponseCode::NoError);
//! assert_eq!(zone.records().len(), 1);
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

pub mod error;
pub mod handler;
pub mod lookup;
pub mod tree;
pub mod update;
pub mod zone;

pub use error::{Result, ZoneError};
pub use handler::UpdateHandler;
pub use lookup::{DhcpdConfigSource, HostEntry, HostsFileSource, LookupSource, host_records};
pub use tree::ZoneTree;
pub use update::{DynamicUpdate, apply_updates, bump_serial, check_prerequisites};
pub use zone::{DEFAULT_TTL, InMemoryZone, Mutator, Zone};
