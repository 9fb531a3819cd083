mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "packetwire", version, about = "Packet frame and tagged value inspector")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level for packetwire crates (stderr). Directives in
    /// PACKETWIRE_LOG take precedence.
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::{FrameCommand, ValueCommand};

    #[test]
    fn parses_value_encode() {
        let cli = Cli::try_parse_from(["packetwire", "value", "encode", "--json", "[1,2]"])
            .expect("encode args should parse");

        assert!(matches!(
            cli.command,
            Command::Value(ValueCommand::Encode(args)) if args.json == "[1,2]"
        ));
    }

    #[test]
    fn parses_frame_inspect_types() {
        let cli = Cli::try_parse_from([
            "packetwire",
            "frame",
            "inspect",
            "0001",
            "--types",
            "Ping,Chat",
            "--delimited",
        ])
        .expect("inspect args should parse");

        let Command::Frame(FrameCommand::Inspect(args)) = cli.command else {
            panic!("expected frame inspect");
        };
        assert_eq!(args.types, vec!["Ping", "Chat"]);
        assert!(args.delimited);
    }

    #[test]
    fn encode_requires_json() {
        let err = Cli::try_parse_from(["packetwire", "value", "encode"])
            .expect_err("missing --json should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
