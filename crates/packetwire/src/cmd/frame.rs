use bytes::{Bytes, BytesMut};
use packetwire_frame::{decode_delimited, FrameError};
use packetwire_registry::{Registrable, TypeRegistry};
use serde::Serialize;

use crate::cmd::value::{inspection_codec, render};
use crate::cmd::{decode_hex, InspectArgs};
use crate::exit::{frame_error, registration_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{hex_preview, print_json, print_table, OutputFormat};

const PREVIEW_BYTES: usize = 32;

/// A type known only by its canonical name.
#[derive(Debug, Clone, PartialEq)]
struct TypeName(String);

impl Registrable for TypeName {
    fn canonical_name(&self) -> &str {
        &self.0
    }
}

#[derive(Serialize)]
struct FrameOutput {
    discriminator: u8,
    type_name: Option<String>,
    payload_size: usize,
    payload_hex: String,
    /// Set when the payload is exactly one tagged value.
    payload_value: Option<serde_json::Value>,
    #[serde(skip)]
    payload: Bytes,
}

pub fn inspect(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = type_table(&args.types)?;
    let bytes = decode_hex("frame inspect", &args.hex)?;
    let frames = split_frames(bytes, args.delimited, args.max_frame_size)?;

    let outputs = frames
        .into_iter()
        .map(|frame| describe(frame, &registry, args.max_frame_size))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| frame_error("frame inspect", err))?;

    match format {
        OutputFormat::Json => {
            for out in &outputs {
                print_json(out);
            }
        }
        OutputFormat::Table => print_table(
            &["DISCRIMINATOR", "TYPE", "SIZE", "PAYLOAD"],
            outputs
                .iter()
                .map(|out| {
                    vec![
                        out.discriminator.to_string(),
                        out.type_name.clone().unwrap_or_else(|| "-".to_string()),
                        out.payload_size.to_string(),
                        preview(out),
                    ]
                })
                .collect(),
        ),
        OutputFormat::Pretty => {
            for out in &outputs {
                println!(
                    "discriminator={} type={} size={} payload={}",
                    out.discriminator,
                    out.type_name.as_deref().unwrap_or("-"),
                    out.payload_size,
                    preview(out)
                );
            }
        }
    }
    Ok(SUCCESS)
}

/// Frozen table of `names`, in the order peers would assign discriminators.
fn type_table(names: &[String]) -> CliResult<TypeRegistry<TypeName>> {
    let mut registry = TypeRegistry::new();
    for name in names.iter().filter(|name| !name.is_empty()) {
        registry
            .try_register(TypeName(name.clone()))
            .map_err(|err| registration_error("frame inspect --types", err))?;
    }
    registry.freeze();
    Ok(registry)
}

fn split_frames(bytes: Vec<u8>, delimited: bool, max_frame_size: usize) -> CliResult<Vec<Bytes>> {
    if !delimited {
        return Ok(vec![Bytes::from(bytes)]);
    }

    let mut buf = BytesMut::from(bytes.as_slice());
    let mut frames = Vec::new();
    loop {
        match decode_delimited(&mut buf, max_frame_size) {
            Ok(Some(frame)) => frames.push(frame),
            Ok(None) => break,
            Err(err) => return Err(frame_error("frame inspect", err)),
        }
    }
    if !buf.is_empty() {
        return Err(CliError::new(
            DATA_INVALID,
            format!("frame inspect: incomplete frame ({} bytes left)", buf.len()),
        ));
    }
    Ok(frames)
}

fn describe(
    frame: Bytes,
    registry: &TypeRegistry<TypeName>,
    max_frame_size: usize,
) -> Result<FrameOutput, FrameError> {
    if frame.len() > max_frame_size {
        return Err(FrameError::FrameTooLarge {
            size: frame.len(),
            max: max_frame_size,
        });
    }
    let Some(&discriminator) = frame.first() else {
        return Err(FrameError::EmptyFrame);
    };

    let type_name = if registry.is_empty() {
        None
    } else {
        let entry = registry
            .type_at(discriminator)
            .map_err(|_| FrameError::UnknownDiscriminator {
                discriminator,
                registered: registry.len(),
            })?;
        Some(entry.0.clone())
    };

    let payload = frame.slice(1..);
    Ok(FrameOutput {
        discriminator,
        type_name,
        payload_size: payload.len(),
        payload_hex: hex::encode(&payload),
        payload_value: payload_value(payload.clone()),
        payload,
    })
}

fn payload_value(mut payload: Bytes) -> Option<serde_json::Value> {
    if payload.is_empty() {
        return None;
    }
    let value = inspection_codec().decode(&mut payload).ok()?;
    if !payload.is_empty() {
        return None;
    }
    serde_json::to_value(&value).ok()
}

fn preview(out: &FrameOutput) -> String {
    match &out.payload_value {
        Some(value) => value.to_string(),
        None => hex_preview(&out.payload, PREVIEW_BYTES),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn type_table_orders_by_name() {
        let registry = type_table(&names(&["Ping", "Chat"])).unwrap();
        assert_eq!(registry.names(), vec!["Chat", "Ping"]);
    }

    #[test]
    fn duplicate_type_names_are_a_usage_error() {
        let err = type_table(&names(&["Ping", "Ping"])).unwrap_err();
        assert_eq!(err.code, crate::exit::USAGE);
    }

    #[test]
    fn describe_names_the_discriminator() {
        let registry = type_table(&names(&["Ping", "Chat"])).unwrap();
        let frame = Bytes::from_static(&[0x00, 0, 0, 0, 2, b'h', b'i']);

        let out = describe(frame, &registry, usize::MAX).unwrap();
        assert_eq!(out.discriminator, 0);
        assert_eq!(out.type_name.as_deref(), Some("Chat"));
        assert_eq!(out.payload_size, 6);
        assert_eq!(out.payload_hex, "000000026869");
    }

    #[test]
    fn describe_rejects_unknown_discriminators() {
        let registry = type_table(&names(&["Ping", "Chat"])).unwrap();
        let err = describe(Bytes::from_static(&[0x05]), &registry, usize::MAX).unwrap_err();
        assert!(matches!(
            err,
            FrameError::UnknownDiscriminator {
                discriminator: 5,
                registered: 2
            }
        ));
        assert!(matches!(
            describe(Bytes::new(), &registry, usize::MAX),
            Err(FrameError::EmptyFrame)
        ));
    }

    #[test]
    fn tagged_payloads_are_rendered() {
        // Int(7) as a tagged value.
        let payload = Bytes::from_static(&[0x00, 0, 0, 0, 7]);
        assert_eq!(payload_value(payload), Some(serde_json::json!(7)));
        assert_eq!(payload_value(Bytes::from_static(&[0x42])), None);
    }

    #[test]
    fn delimited_input_splits_into_frames() {
        let stream = vec![0, 0, 0, 1, 0x01, 0, 0, 0, 2, 0x00, 0xAA];
        let frames = split_frames(stream, true, 1024).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].as_ref(), &[0x00, 0xAA]);

        let err = split_frames(vec![0, 0, 0, 9, 0x01], true, 1024).unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
    }
}
