//! Bootstrap purchase authorization and cap enforcement.
//!
//! During a launched asset's bootstrap window every trade is reported to the
//! [`AuthorizationVerifier`]. Depending on the market's configuration it
//! requires a signed, time-limited, single-use authorization token, resolves
//! the account that really initiated the trade, estimates the launched-asset
//! units the trade buys and enforces per-account and per-trade ceilings.

pub mod builder;
pub mod caps;
pub mod collaborators;
pub mod error;
pub mod event_bus;
pub mod ledger;
pub mod market;
pub mod math;
pub mod origin;
pub mod quoter;
mod reentrancy;
pub mod registry;
pub mod replay;
pub mod verifier;

pub use builder::{BuilderError, GuardBuilder, GuardFactories};
pub use collaborators::{AssetRegistry, BootstrapSource, CollaboratorError, Detached, OriginProbe};
pub use error::{GuardError, MathError};
pub use event_bus::EventBus;
pub use ledger::effective_ceiling;
pub use verifier::{AuthorizationVerifier, GuardSettings, TradeOutcome};
