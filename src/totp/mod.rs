use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use log::trace;
use ring::hmac;

use crate::base32;
use crate::error::{Error, Result, SecretError};

pub const DEFAULT_DIGITS: u32 = 6;
pub const DEFAULT_PERIOD: u64 = 30;

/// HMAC hash used to derive the code.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Algorithm {
    Sha1,
    Sha256,
    Sha512,
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::Sha1
    }
}

impl Algorithm {
    fn hmac(self) -> hmac::Algorithm {
        match self {
            Algorithm::Sha1 => hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY,
            Algorithm::Sha256 => hmac::HMAC_SHA256,
            Algorithm::Sha512 => hmac::HMAC_SHA512,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Sha1 => "SHA1",
            Algorithm::Sha256 => "SHA256",
            Algorithm::Sha512 => "SHA512",
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SHA1" => Ok(Algorithm::Sha1),
            "SHA256" => Ok(Algorithm::Sha256),
            "SHA512" => Ok(Algorithm::Sha512),
            _ => Err(Error::UnsupportedAlgorithm(s.to_owned())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A generated code together with how long it stays valid.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Code {
    pub value: String,
    pub remaining: u64,
    pub counter: u64,
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Parameters of a single TOTP account.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TotpSpec {
    /// Base32 shared secret, as provisioned.
    pub secret: String,
    pub algorithm: Algorithm,
    pub digits: u32,
    pub period: u64,
    pub issuer: String,
    pub account: String,
}

impl Default for TotpSpec {
    fn default() -> Self {
        TotpSpec {
            secret: String::new(),
            algorithm: Algorithm::default(),
            digits: DEFAULT_DIGITS,
            period: DEFAULT_PERIOD,
            issuer: String::new(),
            account: String::new(),
        }
    }
}

impl TotpSpec {
    pub fn new<S: Into<String>>(secret: S) -> Self {
        TotpSpec {
            secret: secret.into(),
            ..TotpSpec::default()
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_digits(mut self, digits: u32) -> Self {
        self.digits = digits;
        self
    }

    pub fn with_period(mut self, period: u64) -> Self {
        self.period = period;
        self
    }

    /// Check that the spec can produce codes at all.
    pub fn validate(&self) -> Result<()> {
        self.key().map(|_| ())
    }

    /// The decoded key, once the parameters have been checked.
    pub(crate) fn key(&self) -> Result<Vec<u8>> {
        check_parameters(self.digits, self.period)?;
        key_from(&self.secret)
    }

    /// The code for the window containing `unix_seconds`.
    pub fn code_at(&self, unix_seconds: u64) -> Result<Code> {
        let value = generate_at(
            &self.secret,
            self.algorithm,
            self.digits,
            self.period,
            unix_seconds,
        )?;
        Ok(Code {
            value,
            remaining: seconds_remaining_at(unix_seconds, self.period)?,
            counter: counter_at(unix_seconds, self.period)?,
        })
    }

    /// The code for the current window.
    pub fn code(&self) -> Result<Code> {
        self.code_at(now()?)
    }
}

/// Seconds since the unix epoch, read from the system clock.
pub fn now() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

fn check_parameters(digits: u32, period: u64) -> Result<()> {
    if digits == 0 {
        return Err(Error::InvalidParameters(String::from(
            "digits must be at least 1",
        )));
    }
    check_period(period)
}

fn check_period(period: u64) -> Result<()> {
    if period == 0 {
        return Err(Error::InvalidParameters(String::from(
            "period must be greater than zero",
        )));
    }
    Ok(())
}

/// Decode a base32 secret, refusing secrets that yield no key material.
fn key_from(secret: &str) -> Result<Vec<u8>> {
    let key = base32::decode(secret)?;
    if key.is_empty() {
        return Err(SecretError::Empty.into());
    }
    Ok(key)
}

/// The interval number containing `unix_seconds`, used as the HOTP counter.
pub fn counter_at(unix_seconds: u64, period: u64) -> Result<u64> {
    check_period(period)?;
    Ok(unix_seconds / period)
}

/// Seconds left in the window containing `unix_seconds`.
///
/// At the exact start of a window the full period is returned, never 0.
pub fn seconds_remaining_at(unix_seconds: u64, period: u64) -> Result<u64> {
    check_period(period)?;
    Ok(period - unix_seconds % period)
}

pub fn seconds_remaining(period: u64) -> Result<u64> {
    seconds_remaining_at(now()?, period)
}

/// Dynamic truncation (RFC 4226 section 5.3).
///
/// The low nibble of the last byte selects a 4 byte window which is read
/// big-endian with the sign bit cleared.
fn truncate(digest: &[u8]) -> u32 {
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let bytes = [
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ];
    u32::from_be_bytes(bytes)
}

/// Format the truncated value as exactly `digits` decimal characters.
fn format_code(value: u32, digits: u32) -> String {
    let value = value as u64;
    // Above 19 digits the modulus no longer fits, and the 31 bit value
    // already has fewer digits than requested.
    let code = match 10u64.checked_pow(digits) {
        Some(modulus) => value % modulus,
        None => value,
    };
    // Padded by hand: a format width is capped at u16::MAX.
    let code = code.to_string();
    let mut out = "0".repeat((digits as usize).saturating_sub(code.len()));
    out.push_str(&code);
    out
}

/// HOTP (RFC 4226) for raw key bytes and an explicit counter.
pub fn hotp(key: &[u8], counter: u64, algorithm: Algorithm, digits: u32) -> Result<String> {
    if key.is_empty() {
        return Err(SecretError::Empty.into());
    }
    if digits == 0 {
        return Err(Error::InvalidParameters(String::from(
            "digits must be at least 1",
        )));
    }

    let key = hmac::Key::new(algorithm.hmac(), key);
    let tag = hmac::sign(&key, &counter.to_be_bytes());

    Ok(format_code(truncate(tag.as_ref()), digits))
}

/// TOTP (RFC 6238) for a base32 secret at the given time.
pub fn generate_at(
    secret: &str,
    algorithm: Algorithm,
    digits: u32,
    period: u64,
    unix_seconds: u64,
) -> Result<String> {
    check_parameters(digits, period)?;
    let key = key_from(secret)?;
    let counter = counter_at(unix_seconds, period)?;
    trace!(
        "totp {} digits={} period={} counter={}",
        algorithm,
        digits,
        period,
        counter
    );
    hotp(&key, counter, algorithm, digits)
}

/// TOTP for a base32 secret, reading the clock once.
pub fn generate(secret: &str, algorithm: Algorithm, digits: u32, period: u64) -> Result<String> {
    generate_at(secret, algorithm, digits, period, now()?)
}

/// Like [`generate_at`], with the algorithm given by name (`SHA1`,
/// `SHA256` or `SHA512`, any case).
pub fn generate_named_at(
    secret: &str,
    algorithm: &str,
    digits: u32,
    period: u64,
    unix_seconds: u64,
) -> Result<String> {
    let algorithm: Algorithm = algorithm.parse()?;
    generate_at(secret, algorithm, digits, period, unix_seconds)
}
