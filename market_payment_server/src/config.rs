use std::{env, net::IpAddr};

use log::*;
use momo_tools::MomoConfig;
use mpg_common::helpers::env_flag;

const DEFAULT_MPG_HOST: &str = "127.0.0.1";
const DEFAULT_MPG_PORT: u16 = 8480;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address,
    /// rather than the connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather
    /// than the connection's remote address.
    pub use_forwarded: bool,
    /// The public base URL of this server; the IPN callback URL handed to the provider is built
    /// from it.
    pub public_url: String,
    /// Where the redirect-return endpoint sends the payer's browser after the callback has been
    /// processed.
    pub redirects: PaymentRedirects,
    /// MoMo gateway credentials and endpoint.
    pub momo: MomoConfig,
    /// If supplied, requests against the IPN endpoint are checked against a whitelist of
    /// provider IP addresses. To explicitly disable the whitelist, set the variable to "false",
    /// "none", or "0".
    pub ipn_whitelist: Option<Vec<IpAddr>>,
}

#[derive(Clone, Debug)]
pub struct PaymentRedirects {
    pub success_url: String,
    pub failure_url: String,
}

impl Default for PaymentRedirects {
    fn default() -> Self {
        Self { success_url: "/payment/success".to_string(), failure_url: "/payment/failure".to_string() }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MPG_HOST.to_string(),
            port: DEFAULT_MPG_PORT,
            database_url: String::default(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            public_url: format!("http://{DEFAULT_MPG_HOST}:{DEFAULT_MPG_PORT}"),
            redirects: PaymentRedirects::default(),
            momo: MomoConfig::default(),
            ipn_whitelist: None,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("MPG_HOST").ok().unwrap_or_else(|| DEFAULT_MPG_HOST.into());
        let port = env::var("MPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for MPG_PORT. {e} Using the default, {DEFAULT_MPG_PORT}, instead."
                    );
                    DEFAULT_MPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_MPG_PORT);
        let database_url = env::var("MPG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ MPG_DATABASE_URL is not set. Please set it to the URL for the gateway database.");
            String::default()
        });
        let public_url = env::var("MPG_PUBLIC_URL").ok().unwrap_or_else(|| {
            warn!(
                "🪛️ MPG_PUBLIC_URL is not set. The IPN callback URL handed to the payment provider will point at \
                 {host}:{port}, which is almost certainly not reachable from the provider's servers."
            );
            format!("http://{host}:{port}")
        });
        let redirects = PaymentRedirects {
            success_url: env::var("MPG_PAYMENT_SUCCESS_URL").unwrap_or_else(|_| "/payment/success".to_string()),
            failure_url: env::var("MPG_PAYMENT_FAILURE_URL").unwrap_or_else(|_| "/payment/failure".to_string()),
        };
        let use_x_forwarded_for = env_flag("MPG_USE_X_FORWARDED_FOR", false);
        let use_forwarded = env_flag("MPG_USE_FORWARDED", false);
        let momo = MomoConfig::new_from_env_or_default();
        let ipn_whitelist = configure_ipn_whitelist();
        Self {
            host,
            port,
            database_url,
            use_x_forwarded_for,
            use_forwarded,
            public_url,
            redirects,
            momo,
            ipn_whitelist,
        }
    }

    /// The IPN callback URL the provider will POST settlement notifications to.
    pub fn ipn_url(&self) -> String {
        format!("{}/payments/momo/ipn", self.public_url.trim_end_matches('/'))
    }
}

fn configure_ipn_whitelist() -> Option<Vec<IpAddr>> {
    let whitelist = env::var("MPG_MOMO_IP_WHITELIST").ok().and_then(|s| {
        if ["none", "false", "0"].contains(&s.to_lowercase().as_str()) {
            info!(
                "🪛️ The IPN IP whitelist is disabled. If this is not what you want, set MPG_MOMO_IP_WHITELIST to a \
                 comma-separated list of IP addresses to enable it."
            );
            return None;
        }
        let ip_addrs = s
            .split(',')
            .filter_map(|s| {
                s.trim()
                    .parse()
                    .map_err(|e| {
                        warn!("🪛️ Ignoring invalid IP address ({s}) in MPG_MOMO_IP_WHITELIST: {e}");
                        None::<IpAddr>
                    })
                    .ok()
            })
            .collect::<Vec<IpAddr>>();
        Some(ip_addrs)
    });
    match &whitelist {
        Some(whitelist) if whitelist.is_empty() => {
            warn!(
                "🚨️ The IPN IP whitelist was configured, but is empty. The server will run, but won't accept any \
                 incoming payment notifications."
            );
        },
        None => {
            info!("🪛️ No IPN IP whitelist is set. Only signature validation will be used.");
        },
        Some(v) => {
            let addrs = v.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ");
            info!("🪛️ IPN IP whitelist: {addrs}");
        },
    }
    whitelist
}
