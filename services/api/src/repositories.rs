//! Repositories for database operations

pub mod attachments;

pub use attachments::AttachmentRepository;

/// SQLSTATE for a unique constraint violation
pub(crate) const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE for a foreign key violation
pub(crate) const FOREIGN_KEY_VIOLATION: &str = "23503";
