// crates/tetherwire/src/tests.rs
use serde_json::json;
use serde_json::Value;

use crate::errors::ErrorDescriptor;
use crate::errors::ErrorKind;
use crate::errors::RemoteError;
use crate::message::from_bytes;
use crate::message::to_bytes;
use crate::message::ApplyData;
use crate::message::CallbackInvocation;
use crate::message::GetData;
use crate::message::Message;
use crate::message::SetData;
use crate::message::WireArg;
use crate::types::Error;
use crate::types::Result;
use crate::types::Token;

type R<T> = Result<T>;

#[test]
fn test_token_shape() {
    let token = Token::fresh();

    assert_eq!(token.as_str().len(), 32);
    assert!(token.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(token, Token::fresh());
}

#[test]
fn test_action_get_wire_shape() -> R<()> {
    let id = Token::fresh();
    let message = Message::Get {
        id: id.clone(),
        data: GetData { key: "x".into() },
    };

    let bytes = to_bytes(&message)?;
    let raw: Value = serde_json::from_slice(&bytes)?;

    assert_eq!(raw["type"], "ACTION_GET");
    assert_eq!(raw["id"], json!(id.as_str()));
    assert_eq!(raw["data"]["key"], "x");

    Ok(())
}

#[test]
fn test_action_set_wire_shape() -> R<()> {
    let message = Message::Set {
        id: Token::fresh(),
        data: SetData {
            key: "y".into(),
            value: json!(7),
        },
    };

    let bytes = to_bytes(&message)?;
    let raw: Value = serde_json::from_slice(&bytes)?;

    assert_eq!(raw["type"], "ACTION_SET");
    assert_eq!(raw["data"]["key"], "y");
    assert_eq!(raw["data"]["value"], 7);

    Ok(())
}

#[test]
fn test_apply_marshals_function_args() -> R<()> {
    let reference = Token::fresh();
    let message = Message::Apply {
        id: Token::fresh(),
        data: ApplyData {
            key: "run".into(),
            args: vec![
                WireArg::Plain(json!(2)),
                WireArg::Function {
                    reference: reference.clone(),
                },
            ],
        },
    };

    let bytes = to_bytes(&message)?;
    let raw: Value = serde_json::from_slice(&bytes)?;

    assert_eq!(raw["type"], "ACTION_APPLY");
    assert_eq!(raw["data"]["args"][0], 2);
    assert_eq!(raw["data"]["args"][1]["type"], "TYPE_FUNCTION");
    assert_eq!(raw["data"]["args"][1]["ref"], json!(reference.as_str()));

    // And back: the marker becomes a Function arg, the number stays plain.
    match from_bytes(&bytes)? {
        Message::Apply { data, .. } => {
            assert_eq!(data.args[0], WireArg::Plain(json!(2)));
            assert_eq!(data.args[1], WireArg::Function { reference });
        }
        other => panic!("Expected apply, got {:?}", other),
    }

    Ok(())
}

#[test]
fn test_plain_object_arg_is_not_a_function_ref() -> R<()> {
    // An ordinary object with an unrelated `type` field must stay plain.
    let message = Message::Apply {
        id: Token::fresh(),
        data: ApplyData {
            key: "run".into(),
            args: vec![WireArg::Plain(json!({"type": "point", "ref": "north"}))],
        },
    };

    let decoded = from_bytes(&to_bytes(&message)?)?;
    assert_eq!(decoded, message);

    Ok(())
}

#[test]
fn test_result_messages_round_trip() -> R<()> {
    let success = Message::Success {
        id: Token::fresh(),
        result: json!({"answer": 42}),
    };
    let error = Message::Error {
        id: Token::fresh(),
        error: ErrorDescriptor {
            name: "TypeError".into(),
            message: "boom".into(),
            stack: "TypeError: boom\n  at run".into(),
        },
    };
    let callback = Message::Callback {
        id: Token::fresh(),
        func: CallbackInvocation {
            reference: Token::fresh(),
            args: vec![json!(1), json!("two")],
        },
    };

    for message in [success, error, callback] {
        assert_eq!(from_bytes(&to_bytes(&message)?)?, message);
    }

    Ok(())
}

#[test]
fn test_from_bytes_rejects_garbage() {
    assert!(from_bytes(b"not json").is_err());
    assert!(from_bytes(br#"{"type": "ACTION_WARP", "id": "0"}"#).is_err());
}

#[test]
fn test_from_bytes_rejects_empty_id() {
    let raw = br#"{"type": "ACTION_GET", "id": "", "data": {"key": "x"}}"#;

    match from_bytes(raw) {
        Err(Error::Malformed(reason)) => assert!(reason.contains("empty id")),
        other => panic!("Expected a malformed-message error, got {:?}", other),
    }
}

#[test]
fn test_error_codec_preserves_known_kind() {
    let thrown = RemoteError::type_error("boom");
    let descriptor = ErrorDescriptor::capture(&thrown);

    assert_eq!(descriptor.name, "TypeError");
    assert_eq!(descriptor.message, "boom");

    let rebuilt = descriptor.into_error();
    assert_eq!(rebuilt.kind(), ErrorKind::Type);
    assert_eq!(rebuilt.message(), "boom");
    // The stack text is the transported snapshot, not a fresh local capture.
    assert_eq!(rebuilt.stack(), thrown.stack());
}

#[test]
fn test_error_codec_unknown_name_falls_back_to_generic() {
    let descriptor = ErrorDescriptor {
        name: "QuotaExceededError".into(),
        message: "out of quota".into(),
        stack: "trace text".into(),
    };

    let rebuilt = descriptor.into_error();
    assert_eq!(rebuilt.kind(), ErrorKind::Generic);
    assert_eq!(rebuilt.message(), "out of quota");
    assert_eq!(rebuilt.stack(), "trace text");
}
