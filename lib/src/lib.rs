#![warn(clippy::pedantic)]
#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::too_many_lines,
    clippy::similar_names,
    clippy::doc_markdown,
    clippy::struct_excessive_bools
)]
pub mod aggregate;
pub mod boot;
pub mod catalog;
pub mod context;
pub mod direction;
pub mod estimate;
pub mod host;
pub mod hudline;
pub mod memory;
pub mod render;
pub mod sampler;
pub mod settings;
pub mod toggles;

pub use context::HudProgram;
pub use host::{Host, TelemetrySource};
