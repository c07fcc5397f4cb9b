#![deny(rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_possible_truncation, // Durations and counts stay within realistic bounds
    clippy::cast_precision_loss,      // Demo data and soft limits only
    clippy::missing_errors_doc,       // Error types are documented on the enums
    clippy::module_name_repetitions,  // e.g. ResponseError in response module
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::doc_markdown
)]

pub mod app;
pub mod client;
pub mod domain;
pub mod sender;

// Re-export main types for easy access
pub use client::{Client, ClientConfig};
pub use domain::{
    Annotation, Attribute, AttributeType, ClientError, DiagramScale, Record, Setup, Severity,
    SoftLimits, Value, VirtualChannel, to_identifier,
};
pub use sender::{
    ChannelError, HttpRequest, HttpResponse, HttpSession, ReqwestSession, RequestError,
    ResponseError, SessionOptions, UploadSummary,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
