//! Output formats for token streams
//!
//! Each format implements [`Formatter`] and is looked up by name through
//! [`FormatRegistry`]. All of them are meant for inspecting what a grammar
//! does; none of them renders highlighted output for end users.

pub mod json;
pub mod registry;
pub mod tag;
pub mod treeviz;

pub use json::JsonFormatter;
pub use registry::{FormatError, FormatRegistry, Formatter};
pub use tag::{to_tag_str, TagFormatter};
pub use treeviz::{to_treeviz_str, TreevizFormatter};
