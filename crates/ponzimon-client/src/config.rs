//! Wallet configuration.
//!
//! Every field deserializes with a default so that an absent key is
//! reported as `MissingConfiguration` by [`WalletConfig::validate`] instead
//! of a generic JSON error.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sol_wire::Pubkey;

use crate::error::ClientError;

/// Network endpoint and game addresses for one wallet handle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub rpc_url: String,
    pub program_id: String,
    pub token_mint: String,
    pub fees_wallet: String,
    pub recipient_account: String,
    pub referrer_wallet: String,
    pub tx: TxSettings,
}

/// Transaction submission and polling parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxSettings {
    pub compute_unit_limit: u32,
    /// Priority fee in micro-lamports per compute unit.
    pub compute_unit_price: u64,
    pub send_retries: u32,
    /// Linear backoff unit between send attempts.
    pub send_retry_backoff_ms: u64,
    pub confirm_initial_delay_ms: u64,
    pub confirm_poll_interval_ms: u64,
    pub confirm_max_polls: u32,
    /// Wait between a commit and its settle, so the commit slot's hash exists.
    pub commit_settle_delay_ms: u64,
    pub inter_step_delay_ms: u64,
    pub fetch_timeout_ms: u64,
    pub simulate_before_send: bool,
    pub token_decimals: u8,
}

impl Default for TxSettings {
    fn default() -> Self {
        Self {
            compute_unit_limit: 1_000_000,
            compute_unit_price: 200,
            send_retries: 3,
            send_retry_backoff_ms: 500,
            confirm_initial_delay_ms: 1_000,
            confirm_poll_interval_ms: 500,
            confirm_max_polls: 30,
            commit_settle_delay_ms: 3_000,
            inter_step_delay_ms: 500,
            fetch_timeout_ms: 15_000,
            simulate_before_send: true,
            token_decimals: 6,
        }
    }
}

impl TxSettings {
    pub fn confirm_initial_delay(&self) -> Duration {
        Duration::from_millis(self.confirm_initial_delay_ms)
    }

    pub fn confirm_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirm_poll_interval_ms)
    }

    pub fn commit_settle_delay(&self) -> Duration {
        Duration::from_millis(self.commit_settle_delay_ms)
    }

    pub fn inter_step_delay(&self) -> Duration {
        Duration::from_millis(self.inter_step_delay_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Backoff before retry number `attempt` (zero-based).
    pub fn send_backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.send_retry_backoff_ms.saturating_mul(u64::from(attempt) + 1))
    }
}

/// The configured addresses, parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramAccounts {
    pub program_id: Pubkey,
    pub token_mint: Pubkey,
    pub fees_wallet: Pubkey,
    pub recipient_account: Pubkey,
    pub referrer_wallet: Pubkey,
}

impl WalletConfig {
    pub fn from_json(json: &str) -> Result<Self, ClientError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check that every field is present and well formed.
    pub fn validate(&self) -> Result<ProgramAccounts, ClientError> {
        let rpc_url = required("rpc_url", &self.rpc_url)?;
        if !(rpc_url.starts_with("http://") || rpc_url.starts_with("https://")) {
            return Err(ClientError::InvalidAddressConfiguration {
                field: "rpc_url",
                reason: format!("expected an http(s) URL, got {rpc_url:?}"),
            });
        }
        if self.tx.confirm_max_polls == 0 {
            return Err(ClientError::InvalidAddressConfiguration {
                field: "tx.confirm_max_polls",
                reason: "must be at least 1".into(),
            });
        }

        Ok(ProgramAccounts {
            program_id: address("program_id", &self.program_id)?,
            token_mint: address("token_mint", &self.token_mint)?,
            fees_wallet: address("fees_wallet", &self.fees_wallet)?,
            recipient_account: address("recipient_account", &self.recipient_account)?,
            referrer_wallet: address("referrer_wallet", &self.referrer_wallet)?,
        })
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ClientError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ClientError::MissingConfiguration(field));
    }
    Ok(value)
}

fn address(field: &'static str, value: &str) -> Result<Pubkey, ClientError> {
    required(field, value)?
        .parse()
        .map_err(|e: sol_wire::SolError| ClientError::InvalidAddressConfiguration {
            field,
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WalletConfig {
        WalletConfig {
            rpc_url: "https://api.mainnet-beta.solana.com".into(),
            program_id: "pv5gAmRb1GZ92k7iuLe5JdNmj5R8Ch61N4beuf2yEdK".into(),
            token_mint: "mmMeBvEs7dmLXPJZmVQGrV3rTujsAJQHrbJVHQApgJz".into(),
            fees_wallet: "8kvqgxQG77pv6RvEou8f2kHSWi3rtx8F7MksXUqNLGmn".into(),
            recipient_account: "GmaDrppBC7P5ARKV8g3djiwP89vz1jLK23V2GBjuAEGB".into(),
            referrer_wallet: "8kvqgxQG77pv6RvEou8f2kHSWi3rtx8F7MksXUqNLGmn".into(),
            tx: TxSettings::default(),
        }
    }

    #[test]
    fn valid_config_parses_addresses() {
        let accounts = sample().validate().unwrap();
        assert_eq!(
            accounts.token_mint.to_string(),
            "mmMeBvEs7dmLXPJZmVQGrV3rTujsAJQHrbJVHQApgJz"
        );
    }

    #[test]
    fn missing_field_is_reported_by_name() {
        let mut config = sample();
        config.token_mint = "  ".into();
        assert!(matches!(
            config.validate(),
            Err(ClientError::MissingConfiguration("token_mint"))
        ));
    }

    #[test]
    fn malformed_address_is_rejected() {
        let mut config = sample();
        config.fees_wallet = "not-an-address".into();
        match config.validate() {
            Err(ClientError::InvalidAddressConfiguration { field, .. }) => {
                assert_eq!(field, "fees_wallet")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rpc_url_must_be_http() {
        let mut config = sample();
        config.rpc_url = "ws://localhost:8900".into();
        assert!(config.validate().is_err());
    }

    // -- JSON ---------------------------------------------------------------

    #[test]
    fn json_uses_defaults_for_tx_settings() {
        let json = r#"{
            "rpc_url": "https://example.invalid",
            "program_id": "pv5gAmRb1GZ92k7iuLe5JdNmj5R8Ch61N4beuf2yEdK",
            "token_mint": "mmMeBvEs7dmLXPJZmVQGrV3rTujsAJQHrbJVHQApgJz",
            "fees_wallet": "8kvqgxQG77pv6RvEou8f2kHSWi3rtx8F7MksXUqNLGmn",
            "recipient_account": "8kvqgxQG77pv6RvEou8f2kHSWi3rtx8F7MksXUqNLGmn",
            "referrer_wallet": "8kvqgxQG77pv6RvEou8f2kHSWi3rtx8F7MksXUqNLGmn",
            "tx": { "compute_unit_price": 5000 }
        }"#;
        let config = WalletConfig::from_json(json).unwrap();
        assert_eq!(config.tx.compute_unit_price, 5000);
        assert_eq!(config.tx.compute_unit_limit, 1_000_000);
        assert_eq!(config.tx.confirm_max_polls, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_missing_key_surfaces_as_missing_configuration() {
        let config = WalletConfig::from_json(r#"{ "rpc_url": "https://x.invalid" }"#).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ClientError::MissingConfiguration("program_id"))
        ));
    }

    #[test]
    fn json_syntax_error_is_a_parse_failure() {
        let err = WalletConfig::from_json(r#"{ "rpc_url": "#).unwrap_err();
        assert!(matches!(err, ClientError::ConfigParse(_)));
        assert!(err.to_string().starts_with("Unreadable configuration"));

        let err = WalletConfig::from_json(r#"{ "program_id": 7 }"#).unwrap_err();
        assert!(matches!(err, ClientError::ConfigParse(_)));
    }

    #[test]
    fn backoff_is_linear() {
        let tx = TxSettings::default();
        assert_eq!(tx.send_backoff(0), Duration::from_millis(500));
        assert_eq!(tx.send_backoff(2), Duration::from_millis(1500));
    }
}
