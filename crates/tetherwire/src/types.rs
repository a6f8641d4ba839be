// crates/tetherwire/src/types.rs
use std::error;
use std::fmt;

use rand::Rng;
use serde::Deserialize;
use serde::Serialize;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// An error occurred within the underlying JSON layer.
    Json(serde_json::Error),
    /// The message structure was invalid or violated the protocol.
    Malformed(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Json(e) => write!(f, "JSON error: {}", e),
            Error::Malformed(msg) => write!(f, "Malformed message: {}", msg),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

/// Correlation token for requests and callback refs.
///
/// 128 bits of randomness rendered as a 32-character lowercase hex string,
/// serialized as a bare JSON string. Unpredictable enough to avoid accidental
/// collision among concurrently outstanding requests on one channel; not
/// required to be cryptographically secure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Draw a fresh random token.
    pub fn fresh() -> Self {
        let bits: u128 = rand::thread_rng().gen();
        Token(format!("{:032x}", bits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
