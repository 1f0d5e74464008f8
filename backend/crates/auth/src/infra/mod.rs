//! Infrastructure Layer
//!
//! Storage backends and reset delivery.

pub mod memory;
pub mod notifier;
pub mod postgres;

pub use memory::InMemoryAuthRepository;
pub use notifier::{LogResetNotifier, NoopResetNotifier};
pub use postgres::PgAuthRepository;
