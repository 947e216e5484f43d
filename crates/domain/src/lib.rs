//! Domain layer for planwatch
//!
//! Entities and value objects describing Irish planning applications, the
//! alerts that watch them, and the document-intelligence analyses the backend
//! produces. This crate performs no I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
