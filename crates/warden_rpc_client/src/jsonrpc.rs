use core::fmt;

use serde::{Deserialize, Serialize};

/// The JSON-RPC protocol version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Version {
    /// Version 2.0 of the JSON-RPC specification
    V2_0,
}

impl Serialize for Version {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Version::V2_0 => serializer.serialize_str("2.0"),
        }
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            "2.0" => Ok(Version::V2_0),
            _ => Err(serde::de::Error::custom(format!(
                "unsupported JSON-RPC version: '{raw}'"
            ))),
        }
    }
}

/// A JSON-RPC request id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// A numerical id
    Num(u64),
    /// A string id
    Str(String),
    /// An absent id
    Null,
}

/// A JSON-RPC request envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request<MethodT> {
    /// The protocol version
    #[serde(rename = "jsonrpc")]
    pub version: Version,
    /// The request id, echoed back in the response
    pub id: Id,
    /// The method invocation, serialized as the `method` and `params` fields
    #[serde(flatten)]
    pub method: MethodT,
}

/// A JSON-RPC response envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response<T> {
    /// The protocol version
    #[serde(rename = "jsonrpc")]
    pub version: Version,
    /// The id of the request this responds to
    pub id: Id,
    /// The response payload
    #[serde(flatten)]
    pub data: ResponseData<T>,
}

/// The payload of a JSON-RPC response: either a result or an error object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData<T> {
    /// A failed invocation
    Error {
        /// The error object
        error: Error,
    },
    /// A successful invocation
    Success {
        /// The invocation's result
        result: T,
    },
}

impl<T> ResponseData<T> {
    /// Converts the payload into a `Result`.
    pub fn into_result(self) -> Result<T, Error> {
        match self {
            ResponseData::Success { result } => Ok(result),
            ResponseData::Error { error } => Err(error),
        }
    }
}

impl<T> From<Result<T, Error>> for ResponseData<T> {
    fn from(result: Result<T, Error>) -> Self {
        match result {
            Ok(result) => ResponseData::Success { result },
            Err(error) => ResponseData::Error { error },
        }
    }
}

/// A JSON-RPC error object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub struct Error {
    /// The error code
    pub code: i16,
    /// A short description of the error
    pub message: String,
    /// Additional data attached by the server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)
    }
}

/// The method was not found on the server (JSON-RPC `-32601`).
pub const METHOD_NOT_FOUND: i16 = -32601;

impl Error {
    /// Whether the error indicates that the invoked method is not supported
    /// by the server.
    pub fn is_method_not_found(&self) -> bool {
        self.code == METHOD_NOT_FOUND
            || self.message.to_lowercase().contains("not supported")
            || self.message.to_lowercase().contains("not found")
    }
}
