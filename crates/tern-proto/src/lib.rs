//! # Tern DNS Protocol Library
//!
//! DNS message types and a defensive wire codec following RFC 1035, with
//! the message layout used by dynamic updates (RFC 2136).
//!
//! ## Features
//!
//! - **Strict name decompression**: pointers must move strictly backwards,
//!   so hostile loops fail instead of spinning
//! - **Exact payload lengths**: a record whose payload decoder does not end
//!   on its declared RDLENGTH is rejected
//! - **Count checking**: header counts are compared with the sections both
//!   when encoding and after decoding
//! - **Record types** A, AAAA, NS, CNAME, PTR, MX, SOA, TXT, SPF, OPT, SVCB
//!   and HTTPS, with every other type kept as opaque bytes
//!
//! ## Example
//!
//! ```rust
//! use std::net::Ipv4Addr;
//! use std::str::FromStr;
//! use tern_proto::{Message, Name, ResourceRecord};
//!
//! let mut update = Message::update(Name::from_str("example.com").unwrap());
//! update.add_update(ResourceRecord::a(
//!     Name::from_str("www.example.com").unwrap(),
//!     300,
//!     Ipv4Addr::new(192, 0, 2, 1),
//! ));
//!
//! let wire = update.to_wire().unwrap();
//! let decoded = Message::decode(&wire).unwrap();
//! assert_eq!(decoded, update);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod class;
pub mod error;
pub mod header;
pub mod message;
pub mod name;
pub mod opcode;
pub mod question;
pub mod rcode;
pub mod rdata;
pub mod record;
pub mod rtype;
pub mod wire;

// Re-exports for convenience
pub use class::{Class, RecordClass};
pub use error::{Error, Result};
pub use header::{Header, HeaderFlags};
pub use message::{Message, Section};
pub use name::Name;
pub use opcode::OpCode;
pub use question::Question;
pub use rcode::ResponseCode;
pub use rdata::RData;
pub use record::ResourceRecord;
pub use rtype::{RecordType, Type};
pub use wire::{WireReader, WireWriter};

/// Maximum length of a DNS label (63 bytes per RFC 1035)
pub const MAX_LABEL_LENGTH: usize = 63;

/// Maximum length of a domain name (255 bytes per RFC 1035)
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum size of a UDP DNS message without EDNS0 (512 bytes per RFC 1035)
pub const MAX_UDP_MESSAGE_SIZE: usize = 512;

/// DNS port (53)
pub const DNS_PORT: u16 = 53;
