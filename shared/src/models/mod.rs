//! Data models
//!
//! Shared between label-server and the browser client (via API).
//! Wire format is camelCase JSON.

pub mod batch;
pub mod printer;
pub mod settings;
pub mod widget;

// Re-exports
pub use batch::*;
pub use printer::*;
pub use settings::*;
pub use widget::*;
