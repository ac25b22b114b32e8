//! Parameters carried by `otpauth://totp/...` key URIs.
//!
//! Sample url
//! otpauth://totp/otplib-website:otplib-demo-user?
//! secret=H4ZWJCQZEREL2IE2&period=30&digits=6
//! &algorithm=SHA1&issuer=otplib-website

use std::convert::TryFrom;

use log::debug;
use url::Url;

use crate::base32;
use crate::error::{Error, Result};
use crate::totp::TotpSpec;

impl TotpSpec {
    /// Parse a key URI string into a spec.
    pub fn from_uri(uri: &str) -> Result<Self> {
        let u = Url::parse(uri)?;
        TotpSpec::try_from(&u)
    }

    /// Render the spec back as a key URI with a canonical, unpadded secret.
    /// Specs that could not produce a code are refused.
    pub fn to_uri(&self) -> Result<String> {
        let secret = base32::encode(&self.key()?);
        let account = urlencoding::encode(&self.account);
        let label = if self.issuer.is_empty() {
            account.into_owned()
        } else {
            format!("{}:{}", urlencoding::encode(&self.issuer), account)
        };

        let mut uri = format!(
            "otpauth://totp/{}?secret={}&algorithm={}&digits={}&period={}",
            label, secret, self.algorithm, self.digits, self.period
        );
        if !self.issuer.is_empty() {
            uri.push_str("&issuer=");
            uri.push_str(&urlencoding::encode(&self.issuer));
        }
        Ok(uri)
    }
}

/// Split the `Issuer:account` label out of the url path.
fn label(u: &Url) -> Result<(String, String)> {
    let path = u.path();
    let path = path.strip_prefix('/').unwrap_or(path);
    let decoded = urlencoding::decode(path)
        .map_err(|_| Error::InvalidUri(String::from("label is not valid utf-8")))?;

    Ok(match decoded.find(':') {
        Some(i) => (
            decoded[..i].trim().to_owned(),
            decoded[i + 1..].trim().to_owned(),
        ),
        None => (String::new(), decoded.trim().to_owned()),
    })
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::InvalidParameters(format!("{} {:?} is not a number", name, value)))
}

impl TryFrom<&Url> for TotpSpec {
    type Error = Error;

    /// Build a spec from a parsed key URI. Missing parameters keep their
    /// defaults, malformed ones are errors.
    fn try_from(u: &Url) -> Result<Self> {
        if u.scheme() != "otpauth" {
            return Err(Error::InvalidUri(format!(
                "unsupported scheme {:?}",
                u.scheme()
            )));
        }
        if u.host_str() != Some("totp") {
            return Err(Error::InvalidUri(format!(
                "unsupported otp type {:?}",
                u.host_str().unwrap_or("")
            )));
        }

        let (issuer, account) = label(u)?;
        let mut spec = TotpSpec {
            issuer,
            account,
            ..TotpSpec::default()
        };
        let mut secret = None;

        for (key, value) in u.query_pairs() {
            match key.as_ref() {
                "secret" => secret = Some(value.into_owned()),
                "algorithm" => spec.algorithm = value.parse()?,
                "digits" => spec.digits = parse_number("digits", &value)?,
                "period" => spec.period = parse_number("period", &value)?,
                "issuer" => spec.issuer = value.into_owned(),
                other => debug!("ignoring otpauth parameter {:?}", other),
            }
        }

        spec.secret = secret.ok_or_else(|| Error::InvalidUri(String::from("missing secret")))?;
        spec.validate()?;
        Ok(spec)
    }
}
