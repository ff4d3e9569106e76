use crate::api::{
    self,
    email::{EmailSender, LogEmailSender, SmtpConfig, SmtpEmailSender},
    handlers::auth::{AuthConfig, AuthState},
    token::TokenIssuer,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub jwt_secret: SecretString,
    pub token_ttl_seconds: i64,
    pub otp_ttl_seconds: i64,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<SecretString>,
    pub smtp_from: Option<String>,
}

/// Execute the server action.
///
/// # Errors
/// Returns an error if the DSN is invalid, the SMTP transport cannot be
/// built, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    // Fail early on malformed connection strings instead of at pool creation
    Url::parse(&args.dsn).context("invalid database DSN")?;

    let port = args.port;
    let dsn = args.dsn.clone();
    let state = Arc::new(build_auth_state(args)?);

    api::new(port, dsn, state).await
}

/// Assemble the handler state from parsed arguments.
///
/// The token issuer takes its lifetime from the config, so the TTL has a
/// single source of truth.
///
/// # Errors
/// Returns an error if the SMTP transport cannot be built.
fn build_auth_state(args: Args) -> Result<AuthState> {
    let mailer: Arc<dyn EmailSender> = if let Some(host) = args.smtp_host {
        let from = args
            .smtp_from
            .context("missing required argument: --smtp-from")?;
        let config = SmtpConfig {
            host,
            port: args.smtp_port,
            username: args.smtp_username,
            password: args.smtp_password,
            from,
        };
        Arc::new(SmtpEmailSender::new(&config)?)
    } else {
        info!("No SMTP relay configured, OTP emails will be logged");
        Arc::new(LogEmailSender)
    };

    let config = AuthConfig::new()
        .with_token_ttl_seconds(args.token_ttl_seconds)
        .with_otp_ttl_seconds(args.otp_ttl_seconds);

    let tokens = TokenIssuer::new(args.jwt_secret).with_ttl_seconds(config.token_ttl_seconds());

    Ok(AuthState::new(config, tokens, mailer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn args(token_ttl_seconds: i64) -> Args {
        Args {
            port: 8080,
            dsn: "postgres://user@localhost:5432/konto".to_string(),
            jwt_secret: SecretString::from("test-secret".to_string()),
            token_ttl_seconds,
            otp_ttl_seconds: 3600,
            smtp_host: None,
            smtp_port: 465,
            smtp_username: None,
            smtp_password: None,
            smtp_from: None,
        }
    }

    #[test]
    fn issuer_ttl_comes_from_config() -> Result<()> {
        let state = build_auth_state(args(-120))?;
        assert_eq!(state.config().token_ttl_seconds(), -120);

        // A negative lifetime means every issued token is already expired,
        // which only happens if the issuer picked up the configured TTL
        let token = state.tokens().issue(Uuid::new_v4())?;
        assert!(state.tokens().verify(&token).is_err());
        Ok(())
    }

    #[test]
    fn configured_ttl_produces_valid_tokens() -> Result<()> {
        let state = build_auth_state(args(60))?;
        let account_id = Uuid::new_v4();
        let token = state.tokens().issue(account_id)?;
        assert_eq!(state.tokens().verify(&token)?, account_id);
        Ok(())
    }

    #[test]
    fn smtp_host_without_from_is_rejected() {
        let mut smtp_args = args(3600);
        smtp_args.smtp_host = Some("smtp.example.com".to_string());
        assert!(build_auth_state(smtp_args).is_err());
    }
}
