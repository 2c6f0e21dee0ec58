//! Core types for Shoptill.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod invoice;
pub mod money;
pub mod username;

pub use id::*;
pub use invoice::{InvoiceNumber, InvoiceNumberError};
pub use money::{Money, MoneyError};
pub use username::{Username, UsernameError};
