//! # MoMo Protocol
//!
//! Canonical model for the mobile-money gateway and the pure functions that
//! bridge its two API generations:
//! - Money-movement requests and results (deposit, payout, refund)
//! - V1/V2 status envelope decoding and terminal-state classification
//! - Availability and active-configuration feed normalization
//! - Request validation and the failure-code table
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐      ┌───────────────┐      ┌────────────────────┐
//! │ V1 body      │─┐    │               │      │ MoneyMovementResult│
//! │ (array/obj)  │ ├───▶│ StatusEnvelope│─────▶│ AvailabilityEntry  │
//! │ V2 envelope  │─┘    │  (decoded)    │      │ ActiveConfigEntry  │
//! └──────────────┘      └───────────────┘      └────────────────────┘
//! ```
//!
//! Nothing in this crate performs I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod error;
pub mod failure_codes;
pub mod id;
pub mod normalizer;
pub mod types;
pub mod validation;

pub use error::{Error, Result, ValidationError};
pub use id::{IdGenerator, SequentialIdGenerator, UuidGenerator};
pub use types::*;

/// Maximum description length accepted by both API generations
pub const MAX_DESCRIPTION_LENGTH: usize = 22;

/// Maximum integer digits in an amount
pub const MAX_AMOUNT_INTEGER_DIGITS: usize = 18;

/// Maximum metadata entries on a deposit or refund
pub const MAX_METADATA_ITEMS: usize = 10;

/// Maximum metadata entries on a payout entered through a batch form
pub const MAX_BATCH_PAYOUT_METADATA_ITEMS: usize = 5;
