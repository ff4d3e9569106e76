//! Account lifecycle handlers and supporting modules.
//!
//! Registration creates the account with a hashed password and a one-hour
//! OTP, verification clears the OTP and issues the first bearer token, and
//! login exchanges a password for a token of the same shape. The protected
//! user endpoints resolve the bearer token through [`principal::require_auth`].

pub mod login;
pub(crate) mod otp;
pub(crate) mod password;
pub mod principal;
pub mod register;
mod state;
pub(crate) mod storage;
pub mod types;
pub(crate) mod utils;
pub mod verify_otp;

pub use state::{AuthConfig, AuthState};
