//! Shared Kernel
//!
//! Vocabulary shared by every backend crate:
//! - The unified [`error::app_error::AppError`] and its [`error::kind::ErrorKind`]
//! - Typed identifiers ([`id::Id`])
//!
//! Only things whose meaning is stable across domains belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
