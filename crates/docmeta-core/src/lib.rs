//! Domain types for editing Word package metadata: the field registry,
//! value snapshots, the edit session state machine, options and errors.

pub mod error;
pub mod fields;
pub mod options;
pub mod session;
pub mod snapshot;
pub mod writer;

pub use error::{MetaError, Result};
pub use fields::{FieldDescriptor, PartName, FIELDS};
pub use session::{EditSession, SaveOutcome, SessionState};
pub use snapshot::MetadataSnapshot;
pub use writer::{PackageWriter, WrittenPackage};
