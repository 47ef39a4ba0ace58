//! # MoMo Adapters
//!
//! Gateway connectivity layer with:
//! - Transport trait and reqwest-backed HTTP transport
//! - Version-specific wire mapping (V1 correspondent / V2 provider)
//! - Transaction orchestrator: validate, initiate, poll once, classify
//! - Batch payout coordinator with per-recipient isolation
//! - Hosted payment-page sessions
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │   TransactionOrchestrator / BatchPayoutCoordinator  │
//! └────────────┬────────────────────────────────────────┘
//!              │ MoneyMovementRequest
//!     ┌────────▼────────┐        ┌──────────────────────┐
//!     │   wire (V1/V2)  │        │ momo_protocol        │
//!     └────────┬────────┘        │  validation          │
//!              │ GatewayRequest  │  normalizer          │
//!     ┌────────▼────────┐        └──────────▲───────────┘
//!     │    Transport    │──── GatewayResponse ┘
//!     │ (HttpTransport) │
//!     └─────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod batch;
pub mod config;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod payment_page;
pub mod transport;
pub mod wire;

pub use batch::{BatchPayoutCoordinator, BatchResult, PayoutRecipient, RecipientResult};
pub use config::GatewayConfig;
pub use error::{Error, Result};
pub use orchestrator::{InitiatedOperation, TransactionOrchestrator};
pub use payment_page::{PaymentPageClient, PaymentPageRequest, PaymentPageResult};
pub use transport::{
    GatewayRequest, GatewayResponse, HttpMethod, HttpTransport, ScriptedTransport, Transport,
};

/// Default request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Default pause between initiating a payout and checking it (milliseconds)
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 2000;

/// Default batch concurrency (1 = sequential)
pub const DEFAULT_BATCH_CONCURRENCY: usize = 1;
