// In crates/risk/src/lib.rs

use async_trait::async_trait;
use core_types::Symbol;
use rust_decimal::Decimal;

pub mod balance_gate;
pub mod error;
pub mod types;

// Re-export public types
pub use balance_gate::{SimulatedBalanceGate, StaticBalanceGate};
pub use error::{Error, Result};
pub use types::{BalanceCheck, BalanceGateSettings};

/// The admission check run before every entry.
///
/// A `BalanceGate` answers whether enough funds are available to open a
/// position of `required` quote currency. It is the only asynchronous edge of
/// the engine; implementations may suspend to model a remote account query.
#[async_trait]
pub trait BalanceGate: Send + Sync {
    /// The name of the balance provider.
    fn name(&self) -> &'static str;

    /// Checks the available balance for `symbol`.
    ///
    /// # Returns
    ///
    /// * `Ok(BalanceCheck)`: The check completed; `approved` tells whether the
    ///   entry may proceed.
    /// * `Err(Error::Unavailable)`: The check itself failed. Callers reject the
    ///   entry and do not retry.
    async fn check_balance(&self, symbol: &Symbol, required: Decimal) -> Result<BalanceCheck>;
}
