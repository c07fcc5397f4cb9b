//! Domain layer for the SHM Dash client.
//!
//! Contains the schema and data types shared across all modules:
//! - `Attribute` / `VirtualChannel` / `Setup`: the schema snapshot
//! - `Record` / `Value`: one timestamped upload unit
//! - `Annotation` / `Severity`: side-channel events
//! - `ClientError`: Top-level error type

pub mod annotation;
pub mod attribute;
pub mod error;
pub mod identifier;
pub mod record;
pub mod setup;
pub mod virtual_channel;

pub use annotation::{Annotation, Severity};
pub use attribute::{Attribute, AttributeType, DiagramScale, SoftLimits};
pub use error::ClientError;
pub use identifier::to_identifier;
pub use record::{Record, Value};
pub use setup::Setup;
pub use virtual_channel::VirtualChannel;
