//! Registry-driven packet framing for multi-peer applications.
//!
//! packetwire maps packet types to single-byte discriminators agreed by
//! both peers without a schema exchange, carries self-describing tagged
//! values inside payloads, and queues decoded packets per peer for
//! dispatch on the consumer's own turn.
//!
//! # Crate Structure
//!
//! - [`value`] — Recursive tagged value codec and nested element resolution
//! - [`registry`] — Freezable, alphabetically ordered type registry
//! - [`frame`] — `[discriminator][payload]` frames and stream framing
//! - [`dispatch`] — Inbound queues, handler dispatch and send targets

/// Re-export value types.
pub mod value {
    pub use packetwire_value::*;
}

/// Re-export registry types.
pub mod registry {
    pub use packetwire_registry::*;
}

/// Re-export frame types.
pub mod frame {
    pub use packetwire_frame::*;
}

/// Re-export dispatch types.
pub mod dispatch {
    pub use packetwire_dispatch::*;
}
