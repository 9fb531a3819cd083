use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Environment variable with filter directives that replace `--log-level`.
pub const LOG_ENV: &str = "PACKETWIRE_LOG";

/// Crates whose events follow `--log-level`; everything else stays at warn.
const PACKETWIRE_TARGETS: [&str; 5] = [
    "packetwire",
    "packetwire_value",
    "packetwire_registry",
    "packetwire_frame",
    "packetwire_dispatch",
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Filter directives for the packetwire crates at this level.
    pub fn directives(self) -> String {
        let level = self.directive();
        let mut directives = String::from("warn");
        for target in PACKETWIRE_TARGETS {
            directives.push_str(&format!(",{target}={level}"));
        }
        directives
    }
}

/// Install the stderr subscriber.
///
/// Event targets are shown from debug up, where it matters which layer
/// (value, frame, dispatch) logged.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level.directives()));
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(level >= LogLevel::Debug);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}
