//! Providers implemented by the service itself

pub mod local;

pub use local::LocalProvider;
