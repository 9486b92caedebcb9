//! Contract bindings for the ERC20 token interface.
//!
//! Generated with alloy's `sol!` macro; `IERC20Instance` is the typed RPC
//! handle the token adapter drives.

pub mod token;
