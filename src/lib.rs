//! Time-based one-time passwords.
//!
//! Implements HOTP ([RFC 4226]) driven by a time-derived counter
//! ([RFC 6238]), along with the base32 decoding of shared secrets that
//! authenticator apps exchange.
//!
//! ```
//! use otp::{Algorithm, TotpSpec};
//!
//! let spec = TotpSpec::new("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ").with_digits(8);
//! let code = spec.code_at(59).unwrap();
//! assert_eq!(code.value, "94287082");
//! assert_eq!(code.remaining, 1);
//!
//! let code = otp::totp::generate_at(&spec.secret, Algorithm::Sha1, 8, 30, 1111111109).unwrap();
//! assert_eq!(code, "07081804");
//! ```
//!
//! [RFC 4226]: https://datatracker.ietf.org/doc/html/rfc4226
//! [RFC 6238]: https://datatracker.ietf.org/doc/html/rfc6238

pub mod base32;
pub mod error;
pub mod otpauth;
pub mod totp;

pub use error::{Error, Result, SecretError};
pub use totp::{Algorithm, Code, TotpSpec};
