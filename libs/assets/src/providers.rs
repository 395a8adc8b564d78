//! Built-in provider implementations

pub mod remote;

pub use remote::{RemoteProvider, RemoteProviderConfig};
