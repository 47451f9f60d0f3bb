//! Data model for piping layouts: pipe segments, annotations, partial
//! updates and the fabrication status rules.

pub mod annotation;
pub mod pipe;
pub mod status;

pub use annotation::*;
pub use pipe::*;
pub use status::*;
