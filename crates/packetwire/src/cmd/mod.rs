use clap::{Args, Subcommand};
use packetwire_frame::DEFAULT_MAX_FRAME_SIZE;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod frame;
pub mod value;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode or decode a single tagged value.
    #[command(subcommand)]
    Value(ValueCommand),
    /// Inspect raw frames.
    #[command(subcommand)]
    Frame(FrameCommand),
    /// Show version information.
    Version(VersionArgs),
}

#[derive(Subcommand, Debug)]
pub enum ValueCommand {
    /// Encode a JSON document as a tagged value and print its hex.
    Encode(EncodeArgs),
    /// Decode a hex tagged value.
    Decode(DecodeArgs),
}

#[derive(Subcommand, Debug)]
pub enum FrameCommand {
    /// Print the discriminator and payload of hex frames.
    Inspect(InspectArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Value(ValueCommand::Encode(args)) => value::encode(args, format),
        Command::Value(ValueCommand::Decode(args)) => value::decode(args, format),
        Command::Frame(FrameCommand::Inspect(args)) => frame::inspect(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// JSON document to encode.
    #[arg(long)]
    pub json: String,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Hex-encoded tagged value.
    pub hex: String,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Hex-encoded frame, or frame stream with --delimited.
    pub hex: String,
    /// Registered type names (comma-separated), to name discriminators.
    #[arg(long, value_delimiter = ',')]
    pub types: Vec<String>,
    /// Input is a stream of 4-byte length-prefixed frames.
    #[arg(long)]
    pub delimited: bool,
    /// Maximum accepted frame size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_FRAME_SIZE)]
    pub max_frame_size: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Decode a hex argument, ignoring surrounding whitespace and a `0x` prefix.
pub fn decode_hex(context: &str, input: &str) -> CliResult<Vec<u8>> {
    let input = input.trim();
    let input = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    hex::decode(input).map_err(|err| crate::exit::hex_error(context, err))
}
