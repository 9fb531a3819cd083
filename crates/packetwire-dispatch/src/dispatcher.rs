use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use packetwire_frame::Packet;

use crate::config::DispatchConfig;
use crate::directory::PeerDirectory;
use crate::queues::{self, DispatchQueues, PacketQueue};

type Handler<C> = Box<dyn Fn(Box<dyn Packet>, &C) + Send + Sync>;

/// Outcome of one drain pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Packets handed to a handler.
    pub handled: usize,
    /// Packets dropped because their type has no handler on this side.
    pub unhandled: usize,
    /// Packets discarded with the queue of a disconnected peer.
    pub discarded: usize,
    /// Peers whose queues were removed.
    pub removed_peers: Vec<String>,
}

impl DrainReport {
    /// Packets taken off the queues, whatever their outcome.
    pub fn total(&self) -> usize {
        self.handled + self.unhandled + self.discarded
    }
}

/// Drains [`DispatchQueues`] and invokes the handler registered per type.
///
/// `L` is the local consumer's context and `H` the handle a
/// [`PeerDirectory`] resolves peers to. Each drain must run on its side's
/// own turn; the two drains never touch the same queue.
pub struct Dispatcher<L, H> {
    queues: Arc<DispatchQueues>,
    config: DispatchConfig,
    local_handlers: HashMap<TypeId, Handler<L>>,
    peer_handlers: HashMap<TypeId, Handler<H>>,
}

impl<L: 'static, H: 'static> Dispatcher<L, H> {
    pub fn new(queues: Arc<DispatchQueues>) -> Self {
        Self::with_config(queues, DispatchConfig::default())
    }

    pub fn with_config(queues: Arc<DispatchQueues>, config: DispatchConfig) -> Self {
        Self {
            queues,
            config,
            local_handlers: HashMap::new(),
            peer_handlers: HashMap::new(),
        }
    }

    pub fn queues(&self) -> &Arc<DispatchQueues> {
        &self.queues
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Handle `P` packets drained from the local queue.
    pub fn on_local<P, F>(&mut self, handler: F) -> &mut Self
    where
        P: Packet,
        F: Fn(P, &L) + Send + Sync + 'static,
    {
        insert_handler(&mut self.local_handlers, "local", handler);
        self
    }

    /// Handle `P` packets drained from peer queues.
    pub fn on_peer<P, F>(&mut self, handler: F) -> &mut Self
    where
        P: Packet,
        F: Fn(P, &H) + Send + Sync + 'static,
    {
        insert_handler(&mut self.peer_handlers, "peer", handler);
        self
    }

    /// Handle packets from the local queue in arrival order until it is
    /// empty.
    ///
    /// Packets enqueued while the pass runs are handled in the same pass,
    /// unless [`DispatchConfig::max_packets_per_pass`] stops it first.
    pub fn drain_single(&self, local: &L) -> DrainReport {
        let mut report = DrainReport::default();
        for _ in 0..self.config.pass_budget() {
            let Some(packet) = self.queues.pop_local() else {
                break;
            };
            dispatch(&self.local_handlers, packet, local, &mut report);
        }
        tracing::trace!(handled = report.handled, "local queue drained");
        report
    }

    /// Handle the queue of every connected peer and drop the queues of
    /// peers `directory` no longer resolves.
    ///
    /// Stale queues are removed after the pass over all peers completes. A
    /// stale queue that received packets after it was cleared is kept, so a
    /// peer reconnecting under the same identity loses nothing.
    pub fn drain_multi<D>(&self, directory: &D) -> DrainReport
    where
        D: PeerDirectory<Handle = H>,
    {
        let mut report = DrainReport::default();
        let mut stale = Vec::new();

        for peer in self.queues.peer_ids() {
            let Some(queue) = self.queues.peer_queue(&peer) else {
                continue;
            };
            match directory.resolve(&peer) {
                Some(handle) => self.drain_peer(&queue, &handle, &mut report),
                None => {
                    report.discarded += queues::clear(&queue);
                    stale.push(peer);
                }
            }
        }

        for peer in stale {
            if self.queues.remove_idle_peer(&peer) {
                tracing::debug!(peer = %peer, "removed queue of disconnected peer");
                report.removed_peers.push(peer);
            } else {
                tracing::debug!(peer = %peer, "kept queue of peer with new packets");
            }
        }
        if report.discarded > 0 {
            tracing::debug!(
                discarded = report.discarded,
                "discarded packets of disconnected peers"
            );
        }
        report
    }

    fn drain_peer(&self, queue: &PacketQueue, handle: &H, report: &mut DrainReport) {
        for _ in 0..self.config.pass_budget() {
            let Some(packet) = queue.pop() else {
                break;
            };
            dispatch(&self.peer_handlers, packet, handle, report);
        }
    }
}

fn insert_handler<P, C, F>(
    handlers: &mut HashMap<TypeId, Handler<C>>,
    side: &'static str,
    handler: F,
) where
    P: Packet,
    C: 'static,
    F: Fn(P, &C) + Send + Sync + 'static,
{
    let erased: Handler<C> = Box::new(move |packet: Box<dyn Packet>, context: &C| {
        match packet.into_inner::<P>() {
            Some(packet) => handler(packet, context),
            None => tracing::error!(side, "handler invoked with a packet of another type"),
        }
    });
    if handlers.insert(TypeId::of::<P>(), erased).is_some() {
        tracing::warn!(
            side,
            packet = std::any::type_name::<P>(),
            "replaced packet handler"
        );
    }
}

fn dispatch<C>(
    handlers: &HashMap<TypeId, Handler<C>>,
    packet: Box<dyn Packet>,
    context: &C,
    report: &mut DrainReport,
) {
    match handlers.get(&packet.packet_type_id()) {
        Some(handler) => {
            handler(packet, context);
            report.handled += 1;
        }
        None => {
            tracing::warn!(packet = ?packet, "no handler for packet, dropping");
            report.unhandled += 1;
        }
    }
}
