//! Semtag core
//!
//! The stateful half of the tagging pipeline: the [`TagStore`], the
//! auto-tagging inference engine, the tree export builder, and the
//! message-driven [`Session`] that ties them to a host runtime.
//!
//! ```text
//! InboundMessage → Session::handle()
//!     ├─ TagStore::apply / remove      (write-through to ElementStorage)
//!     ├─ autotag::auto_tag             (layer name → tag + properties)
//!     └─ export::build_forest          (TagStore + DocumentTree → ExportForest)
//! → Vec<OutboundMessage>
//! ```
//!
//! Everything here is synchronous and single-threaded; the session owns the
//! store and the host and processes one message at a time.

pub mod artifact;
pub mod autotag;
pub mod export;
pub mod host;
pub mod memory;
pub mod protocol;
pub mod session;
pub mod settings;
pub mod store;
pub mod taxonomy;

pub use autotag::{auto_tag, AutoTagOptions, AutoTagResult};
pub use export::build_forest;
pub use host::{DocumentTree, ElementStorage, HostError};
pub use memory::{DocumentSnapshot, MemoryDocument};
pub use protocol::{InboundMessage, OutboundMessage, ProtocolError};
pub use session::Session;
pub use settings::Settings;
pub use store::{ApplyOutcome, TagStore};

/// Tag store and artifact storage error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Select or enter a tag")]
    EmptyTag,

    #[error("No elements selected")]
    NoElements,

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("Cannot serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
