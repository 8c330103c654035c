//! Identity preserving binary archives. An archive holds one root value; any
//! string and any shared object inside it is written exactly once, and every
//! further occurrence is a single back-reference id. Decoding restores shared
//! occurrences as shared references to the same reconstructed entity, so
//! graphs with shared nodes and even cycles survive the round trip.
//!
//! The stream is not self-describing: reader and writer must agree on the
//! root type and on every record's field order. All multi-byte scalars are
//! big-endian; platform-sized integers always travel as their 64 bit
//! counterparts. Every archive starts with the format version (currently 1)
//! and an opaque caller-chosen version, both as big-endian i64.
//!
//! # Wire example
//!
//! ```
//! use archiv::{to_bytes, from_bytes};
//!
//! let names = vec!["kessel".to_string(), "kessel".to_string()];
//! let bytes = to_bytes(&names, 0).unwrap();
//! assert_eq!(bytes, [
//!     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, // archive format version 1
//!     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // user version 0
//!     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, // two elements
//!     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // id 0, fresh: payload follows
//!     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x06, // six bytes of Utf-8
//!     0x6b, 0x65, 0x73, 0x73, 0x65, 0x6c,             // 'kessel'
//!     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // id 0 again, payload already known
//! ]);
//! let decoded: Vec<String> = from_bytes(&bytes).unwrap();
//! assert_eq!(names, decoded);
//! ```
//!
//! # Shared objects and cycles
//!
//! A [`Handle`] carries heap identity. Its target declares a field schema
//! through [`Record`] and becomes archivable with [`record_codec!`]. Decoding
//! a handle is two-phase: the instance is default-constructed and registered
//! under its id before its fields are read, which is what lets a cycle
//! resolve to the instance that is still being populated.
//!
//! ```
//! use archiv::{handle, to_bytes, from_bytes, FieldDef, Handle, Record};
//! use std::rc::Rc;
//!
//! #[derive(Default)]
//! struct Node {
//!     next: Option<Handle<Node>>,
//! }
//!
//! impl Record for Node {
//!     fn fields() -> Vec<FieldDef<Self>> {
//!         vec![FieldDef::new(|n: &Node| &n.next, |n: &mut Node, v| n.next = v)]
//!     }
//! }
//!
//! archiv::record_codec!(Node);
//!
//! let node = handle(Node::default());
//! node.borrow_mut().next = Some(node.clone());
//!
//! let decoded: Handle<Node> = from_bytes(&to_bytes(&node, 0).unwrap()).unwrap();
//! let next = decoded.borrow().next.clone().unwrap();
//! assert!(Rc::ptr_eq(&decoded, &next));
//! ```

mod codec;
mod error;
mod handle;
mod reader;
pub mod schema;
mod wire;
mod writer;

pub use codec::{Decode, Encode};
pub use error::{DecodeError, EncodeError};
pub use handle::{handle, Handle};
pub use reader::{from_bytes, Reader};
pub use schema::{FieldDef, Record};
pub use wire::Atom;
pub use writer::{to_bytes, Writer};

/// The wire format identifier emitted as the first header field of every
/// archive. A stream announcing any other value is rejected with
/// [`DecodeError::IncompatibleArchiver`].
pub const ENCODING_VERSION: i64 = 1;
