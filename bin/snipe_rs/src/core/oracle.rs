use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use snipe_utils::utils::format_lower_hex;
use thiserror::Error;
use url::Url;

use crate::{
    constants::{Env, ORACLE_TIMEOUT},
    types::{CandidateToken, SafetyVerdict},
};

#[derive(Error, Debug)]
pub enum OracleError {
    /// Transport failure, including the 30s client timeout.
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    #[error("oracle returned status {0}")]
    Status(StatusCode),
    #[error("oracle response carries no safety fields")]
    Unparseable,
}

/// Scoring oracle for candidate tokens. Callers must treat any `Err` as a
/// rejection; this interface never converts a broken oracle into an accept.
#[async_trait]
pub trait SafetyOracle: Send + Sync {
    async fn assess(&self, token: &CandidateToken) -> Result<SafetyVerdict, OracleError>;
}

/// TokenSniffer client. Queries the per-token endpoint directly over HTTP;
/// when the service answers with a rendered page instead of JSON, the three
/// safety fields are scraped out of the markup, same extraction the
/// endpoint has always tolerated.
#[derive(Debug, Clone)]
pub struct TokenSnifferClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TokenSnifferClient {
    pub fn new(env: &Env) -> Self {
        let Ok(base_url) = Url::parse(&env.token_sniffer_url) else {
            panic!("TOKEN_SNIFFER_URL {:?} invalid", env.token_sniffer_url);
        };
        let client = Client::builder()
            .timeout(ORACLE_TIMEOUT)
            .build()
            .expect("reqwest client");

        Self {
            client,
            base_url: base_url.to_string().trim_end_matches('/').to_string(),
            api_key: env.token_sniffer_api_key.clone(),
        }
    }
}

#[async_trait]
impl SafetyOracle for TokenSnifferClient {
    async fn assess(&self, token: &CandidateToken) -> Result<SafetyVerdict, OracleError> {
        let url = format!(
            "{}/{}?apikey={}",
            self.base_url,
            format_lower_hex(&token.address),
            self.api_key
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Status(status));
        }

        let body = response.text().await?;
        parse_verdict(&body).ok_or(OracleError::Unparseable)
    }
}

#[derive(Debug, Deserialize)]
struct TokenSnifferResponse {
    is_honeypot: Option<bool>,
    buy_tax: Option<f64>,
    sell_tax: Option<f64>,
}

/// Reduce an oracle body to a verdict. Prefers the JSON shape; falls back to
/// scraping the fields out of rendered HTML. `None` when the body carries no
/// recognizable safety payload at all, so rate-limit notices and other
/// 200-status error payloads can never turn into an accepting verdict.
pub fn parse_verdict(body: &str) -> Option<SafetyVerdict> {
    if let Ok(response) = serde_json::from_str::<TokenSnifferResponse>(body) {
        if response.is_honeypot.is_none()
            && response.buy_tax.is_none()
            && response.sell_tax.is_none()
        {
            return None;
        }
        return Some(SafetyVerdict {
            is_honeypot: response.is_honeypot.unwrap_or(false),
            buy_tax_percent: response.buy_tax,
            sell_tax_percent: response.sell_tax,
        });
    }

    if !body.contains("is_honeypot") {
        return None;
    }

    let buy_tax_re = Regex::new(r#""buy_tax":\s*(\d+\.?\d*)"#).ok()?;
    let sell_tax_re = Regex::new(r#""sell_tax":\s*(\d+\.?\d*)"#).ok()?;
    let extract = |re: &Regex| {
        re.captures(body)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
    };

    Some(SafetyVerdict {
        is_honeypot: body.contains(r#""is_honeypot":true"#),
        buy_tax_percent: extract(&buy_tax_re),
        sell_tax_percent: extract(&sell_tax_re),
    })
}
