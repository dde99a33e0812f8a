//! Fundamental types for address ownership verification.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! participant addresses, deposit amounts, and the ordered pair key that
//! identifies a request/verification lifecycle.

pub mod address;
pub mod amount;
pub mod error;
pub mod pair;

pub use address::Address;
pub use amount::Amount;
pub use error::TypesError;
pub use pair::PairKey;
