use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use packetwire_frame::FrameCodec;

use crate::error::Result;
use crate::queues::DispatchQueues;

/// Which side of a link this process plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Single consumer. Everything received goes to the local queue.
    Initiating,
    /// Many peers. Packets are queued per sending session.
    Responding,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initiating => write!(f, "initiating"),
            Self::Responding => write!(f, "responding"),
        }
    }
}

/// Decodes inbound frames and queues them for their role's consumer.
#[derive(Clone)]
pub struct Inbox {
    codec: Arc<FrameCodec>,
    queues: Arc<DispatchQueues>,
    role: Role,
}

impl Inbox {
    pub fn new(codec: Arc<FrameCodec>, queues: Arc<DispatchQueues>, role: Role) -> Self {
        Self {
            codec,
            queues,
            role,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Decode `frame` received on `session` and queue the packet.
    ///
    /// A frame that fails to decode is logged and nothing is queued. The
    /// error is returned so the caller can count it; the link stays usable.
    pub fn receive(&self, session: &str, frame: Bytes) -> Result<()> {
        let size = frame.len();
        let packet = match self.codec.decode(frame) {
            Ok(packet) => packet,
            Err(err) => {
                tracing::warn!(
                    session,
                    role = %self.role,
                    size,
                    error = %err,
                    "dropping undecodable frame"
                );
                return Err(err.into());
            }
        };

        match self.role {
            Role::Initiating => self.queues.enqueue_local(packet),
            Role::Responding => self.queues.enqueue_for_peer(session, packet),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use packetwire_frame::FrameError;

    use super::*;
    use crate::error::DispatchError;
    use crate::fixtures::{codec, seq_of, Ping};

    fn ping_frame(codec: &FrameCodec, seq: i32) -> Bytes {
        codec
            .encode(&Ping {
                seq,
                received: false,
            })
            .unwrap()
    }

    #[test]
    fn initiating_side_queues_locally() {
        let codec = codec();
        let queues = Arc::new(DispatchQueues::new());
        let inbox = Inbox::new(Arc::clone(&codec), Arc::clone(&queues), Role::Initiating);

        inbox.receive("server", ping_frame(&codec, 1)).unwrap();

        assert_eq!(queues.local_len(), 1);
        assert_eq!(queues.peer_count(), 0);
        let packet = queues.pop_local().unwrap();
        assert!(packet.is_received());
        assert_eq!(seq_of(&*packet), 1);
    }

    #[test]
    fn responding_side_queues_per_session() {
        let codec = codec();
        let queues = Arc::new(DispatchQueues::new());
        let inbox = Inbox::new(Arc::clone(&codec), Arc::clone(&queues), Role::Responding);

        inbox.receive("p1", ping_frame(&codec, 1)).unwrap();
        inbox.receive("p2", ping_frame(&codec, 2)).unwrap();
        inbox.receive("p1", ping_frame(&codec, 3)).unwrap();

        assert_eq!(queues.local_len(), 0);
        assert_eq!(queues.peer_len("p1"), 2);
        assert_eq!(queues.peer_len("p2"), 1);
    }

    #[test]
    fn bad_frames_queue_nothing() {
        let queues = Arc::new(DispatchQueues::new());
        let inbox = Inbox::new(codec(), Arc::clone(&queues), Role::Responding);

        let err = inbox
            .receive("p1", Bytes::from_static(&[0x09]))
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Frame(FrameError::UnknownDiscriminator { discriminator: 9, .. })
        ));
        assert!(inbox.receive("p1", Bytes::new()).is_err());
        assert!(inbox.receive("p1", Bytes::from_static(&[0x01, 0x00])).is_err());

        assert!(!queues.has_peer("p1"));
        assert!(queues.is_empty());
    }
}
