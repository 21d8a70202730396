//! Turns request parameters into an authenticated request URL.
//!
//! Parameters are sorted by name before encoding, so the same request always
//! produces the same URL and, in signing mode, the same signature.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use url::form_urlencoded;
use url::Url;

use crate::context::{Auth, Context};
use crate::error::{MapsError, Result};

type HmacSha1 = Hmac<Sha1>;

/// Query parameters of a request before authentication.
pub type Params = Vec<(&'static str, String)>;

/// Parameter names whose values never appear in logs.
const SECRET_PARAMS: [&str; 2] = ["key", "signature"];

/// Build the full URL for `path` with `params` and the context's credentials.
pub(crate) fn build_url(ctx: &Context, path: &str, mut params: Params) -> Result<Url> {
    let mut url = ctx.base_url.clone();
    let prefix = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{}{}", prefix, path));

    match &ctx.auth {
        Auth::ApiKey(key) => params.push(("key", key.clone())),
        Auth::Signed {
            client_id, channel, ..
        } => {
            params.push(("client", client_id.clone()));
            if let Some(channel) = channel {
                params.push(("channel", channel.clone()));
            }
        }
    }

    let mut query = encode_query(params);

    if let Auth::Signed { key, .. } = &ctx.auth {
        let signature = sign(url.path(), &query, key)?;
        query.push_str("&signature=");
        query.push_str(&signature);
    }

    url.set_query(Some(&query));
    Ok(url)
}

/// Form-encode parameters in canonical (name-sorted) order.
pub(crate) fn encode_query(mut params: Params) -> String {
    params.sort_by(|a, b| a.0.cmp(b.0));
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
        .finish()
}

/// HMAC-SHA1 of `path?query` keyed with the decoded client secret,
/// URL-safe base64 encoded.
pub(crate) fn sign(path: &str, query: &str, key: &[u8]) -> Result<String> {
    let mut mac = HmacSha1::new_from_slice(key)
        .map_err(|e| MapsError::Config(format!("unusable signing key: {}", e)))?;
    mac.update(path.as_bytes());
    mac.update(b"?");
    mac.update(query.as_bytes());
    Ok(URL_SAFE.encode(mac.finalize().into_bytes()))
}

/// The URL with credential values masked, for logging.
pub(crate) fn redact(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if SECRET_PARAMS.contains(&k.as_ref()) {
                "REDACTED".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    if !pairs.is_empty() {
        redacted.query_pairs_mut().clear().extend_pairs(pairs);
    }
    redacted.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContextBuilder, Credentials};
    use crate::transport::{HttpResponse, Transport};
    use std::time::Duration;

    struct NullTransport;

    impl Transport for NullTransport {
        fn get(&self, _url: &Url, _timeout: Option<Duration>) -> Result<HttpResponse> {
            Ok(HttpResponse::default())
        }
    }

    fn context(credentials: Credentials, base_url: &str) -> Context {
        ContextBuilder::new(credentials)
            .transport(NullTransport)
            .base_url(base_url)
            .build()
            .unwrap()
    }

    #[test]
    fn test_encode_query_sorted() {
        let query = encode_query(vec![
            ("samples", "3".to_string()),
            ("path", "enc:abc".to_string()),
            ("key", "k".to_string()),
        ]);
        assert_eq!(query, "key=k&path=enc%3Aabc&samples=3");
    }

    #[test]
    fn test_encode_query_escapes() {
        let query = encode_query(vec![(
            "locations",
            "39.7391536,-104.9847034|36.455556,-116.866667".to_string(),
        )]);
        assert_eq!(
            query,
            "locations=39.7391536%2C-104.9847034%7C36.455556%2C-116.866667"
        );

        let query = encode_query(vec![("address", "New York".to_string())]);
        assert_eq!(query, "address=New+York");
    }

    #[test]
    fn test_build_url_with_api_key() {
        let ctx = context(Credentials::api_key("AIzaTest"), "https://maps.googleapis.com");
        let url = build_url(
            &ctx,
            "/maps/api/elevation/json",
            vec![("locations", "39.7391536,-104.9847034".to_string())],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://maps.googleapis.com/maps/api/elevation/json?key=AIzaTest&locations=39.7391536%2C-104.9847034"
        );
    }

    #[test]
    fn test_build_url_keeps_base_path() {
        let ctx = context(Credentials::api_key("k"), "http://127.0.0.1:8080/proxy/");
        let url = build_url(&ctx, "/maps/api/timezone/json", Vec::new()).unwrap();
        assert_eq!(url.path(), "/proxy/maps/api/timezone/json");
    }

    #[test]
    fn test_signature_matches_reference() {
        // Reference example from the URL signing documentation
        let key = URL_SAFE.decode("vNIXE0xscrmjlyV-12Nj_BvUPaw=").unwrap();
        let signature = sign(
            "/maps/api/geocode/json",
            "address=New+York&client=clientID",
            &key,
        )
        .unwrap();
        assert_eq!(signature, "chaRF2hTJKOScPr-RQCEhZbSzIE=");
    }

    #[test]
    fn test_build_url_signed() {
        let ctx = context(
            Credentials::client_secret("clientID", "vNIXE0xscrmjlyV-12Nj_BvUPaw="),
            "https://maps.googleapis.com",
        );
        let url = build_url(
            &ctx,
            "/maps/api/geocode/json",
            vec![("address", "New York".to_string())],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://maps.googleapis.com/maps/api/geocode/json?address=New+York&client=clientID&signature=chaRF2hTJKOScPr-RQCEhZbSzIE="
        );
    }

    #[test]
    fn test_signing_is_deterministic() {
        let ctx = context(
            Credentials::client_secret("clientID", "vNIXE0xscrmjlyV-12Nj_BvUPaw="),
            "https://maps.googleapis.com",
        );
        let params = || {
            vec![
                ("samples", "3".to_string()),
                ("path", "enc:_p~iF~ps|U".to_string()),
            ]
        };
        let a = build_url(&ctx, "/maps/api/elevation/json", params()).unwrap();
        let b = build_url(&ctx, "/maps/api/elevation/json", params()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_channel_is_signed() {
        let ctx = ContextBuilder::new(Credentials::client_secret(
            "clientID",
            "vNIXE0xscrmjlyV-12Nj_BvUPaw=",
        ))
        .transport(NullTransport)
        .channel("reports")
        .build()
        .unwrap();
        let url = build_url(&ctx, "/maps/api/geocode/json", Vec::new()).unwrap();
        let query = url.query().unwrap();
        assert!(query.starts_with("channel=reports&client=clientID&signature="));
    }

    #[test]
    fn test_redact() {
        let ctx = context(Credentials::api_key("AIzaSecret"), "https://maps.googleapis.com");
        let url = build_url(
            &ctx,
            "/maps/api/elevation/json",
            vec![("locations", "1,2".to_string())],
        )
        .unwrap();
        let logged = redact(&url);
        assert!(!logged.contains("AIzaSecret"));
        assert!(logged.contains("key=REDACTED"));
        assert!(logged.contains("locations=1%2C2"));
    }
}
