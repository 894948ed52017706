//! Payment requests and the pay URL they encode to
//!
//! The pay page lives next to the app page: `https://host/x/app/` hands off
//! to `https://host/x/pay/?name=..&iban=..&amount=..&ref=..&txid=..`.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::Serialize;
use url::Url;

use crate::{Error, Result};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random part of references and transaction ids
pub const TOKEN_LEN: usize = 6;

/// Prefix of every reference
pub const REFERENCE_PREFIX: &str = "PS";

/// One generation's worth of payment data. Built fresh each time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRequest {
    pub payer_name: String,
    pub payer_iban: String,
    /// Two-decimal amount text, e.g. `"12.50"`
    pub amount: String,
    pub reference: String,
    pub transaction_id: String,
}

/// Lower-case base36 rendering of `n`
pub fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// Random lower-case base36 token of [`TOKEN_LEN`] characters
pub fn random_token<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..TOKEN_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// Human-readable tag: `PS-<YYYYMMDD>-<6 upper-case base36 chars>`
pub fn reference<R: Rng + ?Sized>(date: NaiveDate, rng: &mut R) -> String {
    format!(
        "{}-{}-{}",
        REFERENCE_PREFIX,
        date.format("%Y%m%d"),
        random_token(rng).to_uppercase()
    )
}

/// Millisecond timestamp in base36 followed by a random token
pub fn transaction_id<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> String {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    format!("{}{}", to_base36(millis), random_token(rng))
}

/// Derive the pay page URL from the app page URL.
///
/// A trailing `/app` segment is replaced by `/pay/`; any other path gets
/// `/pay/` appended. Query and fragment are dropped.
pub fn pay_base_url(app_url: &str) -> Result<Url> {
    let mut url = Url::parse(app_url)?;
    if url.cannot_be_a_base() {
        return Err(Error::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase));
    }

    let path = url.path().trim_end_matches('/');
    let path = path.strip_suffix("/app").unwrap_or(path);
    let path = format!("{}/pay/", path.trim_end_matches('/'));

    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Attach the request as form-encoded query parameters
/// `name, iban, amount, ref, txid`, replacing any existing query.
pub fn build_pay_url(base: &Url, request: &PaymentRequest) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("name", &request.payer_name)
        .append_pair("iban", &request.payer_iban)
        .append_pair("amount", &request.amount)
        .append_pair("ref", &request.reference)
        .append_pair("txid", &request.transaction_id);
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use regex::Regex;

    fn sample_request() -> PaymentRequest {
        PaymentRequest {
            payer_name: "Jane Doe & Co".into(),
            payer_iban: "DE89370400440532013000".into(),
            amount: "12.50".into(),
            reference: "PS-20261019-AB12CD".into(),
            transaction_id: "mgx1abcdef".into(),
        }
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
    }

    #[test]
    fn test_reference_shape() {
        let re = Regex::new(r"^PS-\d{8}-[A-Z0-9]{6}$").unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        for _ in 0..100 {
            let r = reference(date, &mut rng);
            assert!(re.is_match(&r), "bad reference {}", r);
            assert!(r.starts_with("PS-20261019-"));
        }
    }

    #[test]
    fn test_transaction_id_shape() {
        let now = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let txid = transaction_id(now, &mut rng);
        assert!(txid.starts_with(&to_base36(now.timestamp_millis() as u64)));
        assert_eq!(txid.len(), to_base36(now.timestamp_millis() as u64).len() + TOKEN_LEN);
        assert!(txid.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_transaction_ids_differ() {
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(3);
        let a = transaction_id(now, &mut rng);
        let b = transaction_id(now, &mut rng);
        assert_ne!(a, b);
    }

    #[test]
    fn test_pay_base_replaces_app_segment() {
        let cases = [
            ("https://example.com/app/", "https://example.com/pay/"),
            ("https://example.com/app", "https://example.com/pay/"),
            ("https://example.com/shop/app/?x=1#top", "https://example.com/shop/pay/"),
            ("https://example.com/", "https://example.com/pay/"),
            ("https://example.com/myapp", "https://example.com/myapp/pay/"),
            ("http://localhost:8080/app/", "http://localhost:8080/pay/"),
        ];
        for (app, expected) in cases {
            assert_eq!(pay_base_url(app).unwrap().as_str(), expected, "app url {}", app);
        }
    }

    #[test]
    fn test_pay_base_rejects_unusable_urls() {
        assert!(pay_base_url("not a url").is_err());
        assert!(pay_base_url("mailto:jane@example.com").is_err());
    }

    #[test]
    fn test_build_pay_url_parameters() {
        let base = pay_base_url("https://example.com/app/").unwrap();
        let url = build_pay_url(&base, &sample_request());
        assert_eq!(
            url.as_str(),
            "https://example.com/pay/?name=Jane+Doe+%26+Co&iban=DE89370400440532013000\
             &amount=12.50&ref=PS-20261019-AB12CD&txid=mgx1abcdef"
        );

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["name", "iban", "amount", "ref", "txid"]);
        assert_eq!(pairs[0].1, "Jane Doe & Co");
    }

    #[test]
    fn test_build_pay_url_is_deterministic() {
        let base = pay_base_url("https://example.com/app/").unwrap();
        let first = build_pay_url(&base, &sample_request());
        for _ in 0..100 {
            assert_eq!(build_pay_url(&base, &sample_request()), first);
        }
    }
}
