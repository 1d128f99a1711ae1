//! Client identity rotation
//!
//! Each fetch presents one of a handful of real browser signatures, picked
//! uniformly at random, so that consecutive requests do not share a
//! trivially fingerprintable header set.

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};

/// Header set describing one browser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityProfile {
    /// `User-Agent` header value
    pub user_agent: &'static str,

    /// `sec-ch-ua` client hint, sent by Chromium-family browsers only
    pub client_hint: Option<&'static str>,

    /// `sec-ch-ua-platform` client hint
    pub platform_hint: Option<&'static str>,
}

impl IdentityProfile {
    /// Converts the profile into request headers
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(self.user_agent));

        if let Some(hint) = self.client_hint {
            headers.insert(
                HeaderName::from_static("sec-ch-ua"),
                HeaderValue::from_static(hint),
            );
        }
        if let Some(platform) = self.platform_hint {
            headers.insert(
                HeaderName::from_static("sec-ch-ua-platform"),
                HeaderValue::from_static(platform),
            );
        }

        headers
    }
}

/// Pool of browser signatures; never empty
pub const IDENTITY_POOL: &[IdentityProfile] = &[
    IdentityProfile {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/115.0",
        client_hint: None,
        platform_hint: None,
    },
    IdentityProfile {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        client_hint: Some(r#""Google Chrome";v="123", "Not:A-Brand";v="8", "Chromium";v="123""#),
        platform_hint: Some(r#""macOS""#),
    },
    IdentityProfile {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36 Edg/125.0.0.0",
        client_hint: Some(r#""Microsoft Edge";v="125", "Chromium";v="125", "Not.A/Brand";v="24""#),
        platform_hint: Some(r#""Windows""#),
    },
    IdentityProfile {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
        client_hint: Some(r#""Chromium";v="124", "Google Chrome";v="124", "Not-A.Brand";v="99""#),
        platform_hint: Some(r#""Linux""#),
    },
    IdentityProfile {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
        client_hint: None,
        platform_hint: None,
    },
];

/// Picks one identity uniformly at random
pub fn pick_identity() -> &'static IdentityProfile {
    let index = rand::rng().random_range(0..IDENTITY_POOL.len());
    &IDENTITY_POOL[index]
}
