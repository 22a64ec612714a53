//! Label Printing Module
//!
//! - [`PrinterResolver`]: picks a real device or virtual printer and dispatches to it
//! - [`template`]: `:name:` placeholder expansion per data row
//! - [`BatchJobManager`]: single-flight batch jobs with streamed progress
//! - [`CanvasRenderer`]: widget layout to bitmap

pub mod batch;
pub mod error;
pub mod renderer;
pub mod resolver;
pub mod sources;
pub mod template;

pub use batch::{BatchError, BatchJob, BatchJobManager, BatchResult, LabelDispatcher};
pub use error::{DispatchError, DispatchResult};
pub use renderer::{CanvasRenderer, LabelRenderer, RenderError, RenderResult};
pub use resolver::PrinterResolver;
pub use sources::{EnvVirtualPrinters, StaticVirtualPrinters, VirtualPrinterSource};
pub use template::{detect_variables, substitute};
