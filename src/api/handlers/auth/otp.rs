//! One-time-password generation.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// A freshly generated OTP and the instant it stops being valid.
#[derive(Clone, Debug)]
pub struct OneTimePassword {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Generate a 6-digit numeric code expiring `ttl_seconds` from now.
#[must_use]
pub fn generate(ttl_seconds: i64) -> OneTimePassword {
    generate_at(Utc::now(), ttl_seconds)
}

fn generate_at(now: DateTime<Utc>, ttl_seconds: i64) -> OneTimePassword {
    let code = rand::thread_rng().gen_range(100_000..=999_999);
    OneTimePassword {
        code: code.to_string(),
        expires_at: now + Duration::seconds(ttl_seconds),
    }
}

/// Check a supplied code against the stored OTP state.
///
/// Cleared fields, a mismatched code, or an expiry at or before `now` all
/// reject. Both fields are always set or cleared together.
#[must_use]
pub fn is_valid(
    stored: Option<&str>,
    expires_at: Option<DateTime<Utc>>,
    supplied: &str,
    now: DateTime<Utc>,
) -> bool {
    match (stored, expires_at) {
        (Some(code), Some(expires_at)) => code == supplied && expires_at > now,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_six_decimal_digits() {
        for _ in 0..100 {
            let otp = generate(3600);
            assert_eq!(otp.code.len(), 6);
            assert!(otp.code.chars().all(|c| c.is_ascii_digit()));
            // Leading digit is never zero, so the code parses back losslessly
            assert!(!otp.code.starts_with('0'));
        }
    }

    #[test]
    fn expiry_is_exactly_ttl_after_creation() {
        let now = Utc::now();
        let otp = generate_at(now, 3600);
        assert_eq!(otp.expires_at - now, Duration::seconds(3600));
    }

    #[test]
    fn expiry_honors_configured_ttl() {
        let now = Utc::now();
        let otp = generate_at(now, 60);
        assert_eq!(otp.expires_at - now, Duration::seconds(60));
    }

    #[test]
    fn fresh_code_validates_against_itself() {
        let now = Utc::now();
        let otp = generate_at(now, 3600);
        assert!(is_valid(
            Some(&otp.code),
            Some(otp.expires_at),
            &otp.code,
            now
        ));
    }

    #[test]
    fn wrong_code_is_rejected() {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(3600);
        assert!(!is_valid(Some("123456"), Some(expires_at), "654321", now));
    }

    #[test]
    fn expiry_at_now_is_rejected() {
        let now = Utc::now();
        assert!(!is_valid(Some("123456"), Some(now), "123456", now));
    }

    #[test]
    fn expiry_before_now_is_rejected() {
        let now = Utc::now();
        let expires_at = now - Duration::seconds(1);
        assert!(!is_valid(Some("123456"), Some(expires_at), "123456", now));
    }

    #[test]
    fn cleared_fields_reject_any_code() {
        // State after a successful verification: the same code never works twice
        let now = Utc::now();
        assert!(!is_valid(None, None, "123456", now));
    }
}
