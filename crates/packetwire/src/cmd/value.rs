use std::sync::Arc;

use bytes::Bytes;
use packetwire_value::{Blob, BlobCodec, ElementRegistry, Value, ValueCodec, ValueMap};
use serde::Serialize;

use crate::cmd::{decode_hex, DecodeArgs, EncodeArgs};
use crate::exit::{json_error, value_error, CliResult, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct EncodeOutput<'a> {
    kind: &'a str,
    size: usize,
    hex: String,
}

#[derive(Serialize)]
struct DecodeOutput<'a> {
    kind: &'a str,
    size: usize,
    trailing: usize,
    value: &'a Value,
}

/// Codec used for offline inspection: knows [`Blob`] elements and opaque blobs.
pub fn inspection_codec() -> ValueCodec {
    let elements = ElementRegistry::new().with::<Blob>();
    ValueCodec::new(Arc::new(elements)).with_opaque_codec(Arc::new(BlobCodec::default()))
}

/// Map a JSON document onto the tagged value union.
///
/// Integers become `Int` when they fit 32 bits and `Long` otherwise, other
/// numbers `Double`. Objects become mappings keyed by string.
pub fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => i32::try_from(i).map_or(Value::Long(i), Value::Int),
            None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::List(items.iter().map(json_to_value).collect()),
        serde_json::Value::Object(entries) => Value::Map(
            entries
                .iter()
                .map(|(key, value)| (key.as_str(), json_to_value(value)))
                .collect::<ValueMap>(),
        ),
    }
}

pub fn encode(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let json: serde_json::Value =
        serde_json::from_str(&args.json).map_err(|err| json_error("value encode", err))?;
    let value = json_to_value(&json);
    let bytes = inspection_codec()
        .encode_to_bytes(&value)
        .map_err(|err| value_error("value encode", err))?;

    let out = EncodeOutput {
        kind: value.kind(),
        size: bytes.len(),
        hex: hex::encode(&bytes),
    };
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => print_table(
            &["KIND", "SIZE", "HEX"],
            vec![vec![out.kind.to_string(), out.size.to_string(), out.hex]],
        ),
        OutputFormat::Pretty => println!("{}", out.hex),
    }
    Ok(SUCCESS)
}

pub fn decode(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = decode_hex("value decode", &args.hex)?;
    let total = bytes.len();
    let mut src = Bytes::from(bytes);
    let value = inspection_codec()
        .decode(&mut src)
        .map_err(|err| value_error("value decode", err))?;

    let trailing = src.len();
    if trailing > 0 {
        tracing::warn!(trailing, "trailing bytes after value");
    }

    let out = DecodeOutput {
        kind: value.kind(),
        size: total - trailing,
        trailing,
        value: &value,
    };
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => print_table(
            &["KIND", "SIZE", "TRAILING", "VALUE"],
            vec![vec![
                out.kind.to_string(),
                out.size.to_string(),
                out.trailing.to_string(),
                render(&value),
            ]],
        ),
        OutputFormat::Pretty => {
            println!("{} ({} bytes): {}", out.kind, out.size, render(&value));
        }
    }
    Ok(SUCCESS)
}

/// Compact JSON rendering of a decoded value.
pub fn render(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
}
