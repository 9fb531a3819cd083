use std::sync::Arc;

use crossbeam::queue::SegQueue;
use dashmap::DashMap;
use packetwire_frame::Packet;

/// Unbounded FIFO of decoded packets. Safe to push from any thread.
pub type PacketQueue = SegQueue<Box<dyn Packet>>;

/// Decoded packets waiting for their consuming side's turn.
///
/// Per-peer queues are created on the first packet from an unseen peer and
/// live until [`remove_peer`](Self::remove_peer).
#[derive(Default)]
pub struct DispatchQueues {
    local: PacketQueue,
    peers: DashMap<String, Arc<PacketQueue>>,
}

impl DispatchQueues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a packet for the single local consumer.
    pub fn enqueue_local(&self, packet: Box<dyn Packet>) {
        self.local.push(packet);
        tracing::trace!(queued = self.local.len(), "packet queued for local consumer");
    }

    /// Queue a packet received from `peer`.
    ///
    /// The push happens under the map guard, so it never lands in a queue
    /// that a concurrent removal has already taken out of the map.
    pub fn enqueue_for_peer(&self, peer: &str, packet: Box<dyn Packet>) {
        let queued = match self.peers.get(peer) {
            Some(queue) => {
                queue.push(packet);
                queue.len()
            }
            None => {
                let queue = self.peers.entry(peer.to_string()).or_insert_with(|| {
                    tracing::debug!(peer, "opened peer queue");
                    Arc::default()
                });
                queue.push(packet);
                queue.len()
            }
        };
        tracing::trace!(peer, queued, "packet queued for peer");
    }

    pub fn pop_local(&self) -> Option<Box<dyn Packet>> {
        self.local.pop()
    }

    pub fn local_len(&self) -> usize {
        self.local.len()
    }

    /// Queue of `peer`, if one is open.
    pub fn peer_queue(&self, peer: &str) -> Option<Arc<PacketQueue>> {
        self.peers.get(peer).map(|queue| Arc::clone(queue.value()))
    }

    /// Packets waiting for `peer`. Zero if no queue is open.
    pub fn peer_len(&self, peer: &str) -> usize {
        self.peers.get(peer).map_or(0, |queue| queue.len())
    }

    pub fn has_peer(&self, peer: &str) -> bool {
        self.peers.contains_key(peer)
    }

    /// Snapshot of the peers with an open queue.
    pub fn peer_ids(&self) -> Vec<String> {
        self.peers.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Close the queue of `peer`, returning how many packets it discarded.
    pub fn remove_peer(&self, peer: &str) -> usize {
        match self.peers.remove(peer) {
            Some((_, queue)) => clear(&queue),
            None => 0,
        }
    }

    /// Close the queue of `peer` only if it holds no packets.
    ///
    /// Returns `true` if the queue was removed. The emptiness check and the
    /// removal are atomic with respect to [`enqueue_for_peer`](Self::enqueue_for_peer).
    pub fn remove_idle_peer(&self, peer: &str) -> bool {
        self.peers
            .remove_if(peer, |_, queue| queue.is_empty())
            .is_some()
    }

    /// True if no packet is waiting on either side.
    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.peers.iter().all(|entry| entry.value().is_empty())
    }
}

/// Discard everything in `queue`, returning the count.
pub(crate) fn clear(queue: &PacketQueue) -> usize {
    let mut discarded = 0;
    while queue.pop().is_some() {
        discarded += 1;
    }
    discarded
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::fixtures::{ping, seq_of};

    #[test]
    fn local_queue_is_fifo() {
        let queues = DispatchQueues::new();
        for seq in 1..=3 {
            queues.enqueue_local(ping(seq));
        }

        assert_eq!(queues.local_len(), 3);
        let order: Vec<_> = std::iter::from_fn(|| queues.pop_local())
            .map(|packet| seq_of(&*packet))
            .collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert!(queues.is_empty());
    }

    #[test]
    fn peer_queues_open_lazily() {
        let queues = DispatchQueues::new();
        assert!(!queues.has_peer("p1"));
        assert_eq!(queues.peer_len("p1"), 0);

        queues.enqueue_for_peer("p1", ping(1));
        queues.enqueue_for_peer("p1", ping(2));
        queues.enqueue_for_peer("p2", ping(3));

        assert_eq!(queues.peer_count(), 2);
        assert_eq!(queues.peer_len("p1"), 2);
        let mut peers = queues.peer_ids();
        peers.sort();
        assert_eq!(peers, vec!["p1", "p2"]);
    }

    #[test]
    fn remove_peer_discards_its_backlog() {
        let queues = DispatchQueues::new();
        queues.enqueue_for_peer("ghost", ping(1));
        queues.enqueue_for_peer("ghost", ping(2));

        assert_eq!(queues.remove_peer("ghost"), 2);
        assert!(!queues.has_peer("ghost"));
        assert_eq!(queues.remove_peer("ghost"), 0);
    }

    #[test]
    fn idle_removal_keeps_queues_with_new_packets() {
        let queues = DispatchQueues::new();
        queues.enqueue_for_peer("ghost", ping(1));
        let stale = queues.peer_queue("ghost").unwrap();
        assert_eq!(clear(&stale), 1);

        queues.enqueue_for_peer("ghost", ping(2));
        assert!(!queues.remove_idle_peer("ghost"));
        assert_eq!(queues.peer_len("ghost"), 1);

        let queue = queues.peer_queue("ghost").unwrap();
        assert_eq!(queue.pop().map(|packet| seq_of(&*packet)), Some(2));
        assert!(queues.remove_idle_peer("ghost"));
        assert!(!queues.has_peer("ghost"));
        assert!(!queues.remove_idle_peer("ghost"));
    }

    #[test]
    fn enqueue_racing_removal_lands_in_a_live_queue() {
        let queues = Arc::new(DispatchQueues::new());
        let producer = {
            let queues = Arc::clone(&queues);
            thread::spawn(move || {
                for seq in 0..2_000 {
                    queues.enqueue_for_peer("ghost", ping(seq));
                }
            })
        };

        let mut discarded = 0;
        while !producer.is_finished() {
            discarded += queues.remove_peer("ghost");
        }
        producer.join().unwrap();
        discarded += queues.remove_peer("ghost");

        assert_eq!(discarded, 2_000);
    }

    #[test]
    fn concurrent_producers_keep_per_peer_order() {
        let queues = Arc::new(DispatchQueues::new());
        let producers: Vec<_> = (0..4)
            .map(|id| {
                let queues = Arc::clone(&queues);
                thread::spawn(move || {
                    let peer = format!("peer-{id}");
                    for seq in 0..100 {
                        queues.enqueue_for_peer(&peer, ping(seq));
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }

        assert_eq!(queues.peer_count(), 4);
        for id in 0..4 {
            let queue = queues.peer_queue(&format!("peer-{id}")).unwrap();
            let order: Vec<_> = std::iter::from_fn(|| queue.pop())
                .map(|packet| seq_of(&*packet))
                .collect();
            assert_eq!(order, (0..100).collect::<Vec<_>>());
        }
    }
}
