// crates/tetherwire/src/message.rs
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::errors::ErrorDescriptor;
use crate::types::Error;
use crate::types::Result;
use crate::types::Token;

/// The wire envelope.
///
/// Every message is a JSON object tagged by `type`:
/// - `ACTION_GET`      -> `{id, data: {key}}`
/// - `ACTION_SET`      -> `{id, data: {key, value}}`
/// - `ACTION_APPLY`    -> `{id, data: {key, args}}`
/// - `RESULT_SUCCESS`  -> `{id, result}`
/// - `RESULT_ERROR`    -> `{id, error: {name, message, stack}}`
/// - `RESULT_CALLBACK` -> `{id, func: {ref, args}}`
///
/// Actions flow toward the exposed object; results flow back tagged with the
/// same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    #[serde(rename = "ACTION_GET")]
    Get { id: Token, data: GetData },
    #[serde(rename = "ACTION_SET")]
    Set { id: Token, data: SetData },
    #[serde(rename = "ACTION_APPLY")]
    Apply { id: Token, data: ApplyData },
    #[serde(rename = "RESULT_SUCCESS")]
    Success { id: Token, result: Value },
    #[serde(rename = "RESULT_ERROR")]
    Error { id: Token, error: ErrorDescriptor },
    #[serde(rename = "RESULT_CALLBACK")]
    Callback { id: Token, func: CallbackInvocation },
}

impl Message {
    /// The correlation id this message is tagged with.
    pub fn id(&self) -> &Token {
        match self {
            Message::Get { id, .. }
            | Message::Set { id, .. }
            | Message::Apply { id, .. }
            | Message::Success { id, .. }
            | Message::Error { id, .. }
            | Message::Callback { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetData {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetData {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyData {
    pub key: String,
    pub args: Vec<WireArg>,
}

/// One positional argument of an apply action.
///
/// A function-valued argument never travels; it is replaced before transport
/// by the `{"type": "TYPE_FUNCTION", "ref"}` marker. Anything else passes
/// through as a plain value. Decoding tries the marker first and falls back
/// to a plain value, so an ordinary object carrying an unrelated `type` field
/// is not mistaken for a callback ref.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WireArg {
    #[serde(rename = "TYPE_FUNCTION")]
    Function {
        #[serde(rename = "ref")]
        reference: Token,
    },
    #[serde(untagged)]
    Plain(Value),
}

/// Payload of a `RESULT_CALLBACK` message: which ref to invoke, with what.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackInvocation {
    #[serde(rename = "ref")]
    pub reference: Token,
    pub args: Vec<Value>,
}

/// Encodes a message as JSON bytes for byte-oriented transports.
pub fn to_bytes(message: &Message) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(message)?)
}

/// Decodes a message from JSON bytes.
///
/// Correlation ids are what replies and callback invocations route by, so a
/// message with an empty id is rejected as malformed rather than let loose to
/// match nothing.
pub fn from_bytes(bytes: &[u8]) -> Result<Message> {
    let message: Message = serde_json::from_slice(bytes)?;
    if message.id().as_str().is_empty() {
        return Err(Error::Malformed("message has an empty id".to_string()));
    }
    Ok(message)
}
