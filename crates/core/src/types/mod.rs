//! Core types for the zoo product form.

pub mod handle;
pub mod id;

pub use handle::MetaobjectHandle;
pub use id::*;
