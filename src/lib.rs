//! # Konto (User Accounts)
//!
//! `konto` is a small user-account service: registration with email
//! one-time-password (OTP) verification, login issuing a bearer token, and
//! authenticated CRUD on account records.
//!
//! ## Account lifecycle
//!
//! - **Register** creates the account with a hashed password and a 6-digit
//!   OTP valid for one hour, then emails the code to the user.
//! - **Verify OTP** clears the OTP fields and issues a bearer token.
//! - **Login** checks the password against its bcrypt hash and issues a
//!   token of the same shape.
//! - **List/Update/Delete** require a valid bearer token and never expose
//!   password or OTP fields.
//!
//! Email uniqueness is enforced by the database; a losing concurrent
//! registration surfaces as a conflict, not a crash.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
