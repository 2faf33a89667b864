use log::*;
use mpg_common::Secret;

use crate::data_objects::DEFAULT_LANG;

#[derive(Debug, Clone)]
pub struct MomoConfig {
    /// The partner code issued by MoMo for this merchant.
    pub partner_code: String,
    /// The access key paired with the partner code. Part of every signing string.
    pub access_key: Secret<String>,
    /// The HMAC-SHA256 signing key shared with MoMo.
    pub secret_key: Secret<String>,
    /// Base URL of the gateway, e.g. "https://test-payment.momo.vn".
    pub endpoint: String,
    pub lang: String,
}

impl Default for MomoConfig {
    fn default() -> Self {
        Self {
            partner_code: String::default(),
            access_key: Secret::default(),
            secret_key: Secret::default(),
            endpoint: "https://test-payment.momo.vn".to_string(),
            lang: DEFAULT_LANG.to_string(),
        }
    }
}

impl MomoConfig {
    pub fn new_from_env_or_default() -> Self {
        let partner_code = std::env::var("MPG_MOMO_PARTNER_CODE").unwrap_or_else(|_| {
            warn!("🪛️ MPG_MOMO_PARTNER_CODE not set. Payment creation will be rejected by the gateway.");
            String::default()
        });
        let access_key = Secret::new(std::env::var("MPG_MOMO_ACCESS_KEY").unwrap_or_else(|_| {
            warn!("🪛️ MPG_MOMO_ACCESS_KEY not set. Payment creation will be rejected by the gateway.");
            String::default()
        }));
        let secret_key = Secret::new(std::env::var("MPG_MOMO_SECRET_KEY").unwrap_or_else(|_| {
            warn!("🪛️ MPG_MOMO_SECRET_KEY not set. Payment creation will be rejected by the gateway.");
            String::default()
        }));
        let endpoint = std::env::var("MPG_MOMO_ENDPOINT").unwrap_or_else(|_| {
            info!("🪛️ MPG_MOMO_ENDPOINT not set. Using the sandbox gateway.");
            "https://test-payment.momo.vn".to_string()
        });
        let lang = std::env::var("MPG_MOMO_LANG").unwrap_or_else(|_| DEFAULT_LANG.to_string());
        Self { partner_code, access_key, secret_key, endpoint, lang }
    }
}
