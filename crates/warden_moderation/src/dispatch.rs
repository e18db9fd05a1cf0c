//! Per-peer event queues.
//!
//! Each receiving peer gets its own queue and worker task, so one peer's
//! events are handled strictly in order while different peers interleave.
//! Connect/disconnect signals bypass the queues and update the registry at once.

use crate::{EnforcementCoordinator, OperatorConsole, Outcome, PeerHandle, PeerRegistry};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use warden_core::{InboundEvent, LifecycleKind, PeerId, wire};
use warden_error::ConfigError;
use warden_interface::GroupTransport;

const QUEUE_CAPACITY: usize = 64;

/// Builds the transport used to act as a newly connected peer.
pub trait TransportFactory: Send + Sync {
    /// Transport for `peer`, or an error when the peer has no endpoint.
    fn create(&self, peer: &PeerId) -> Result<Arc<dyn GroupTransport>, ConfigError>;
}

/// Routes one event to the handler for its kind.
#[derive(Debug, Clone)]
pub struct EventRouter {
    coordinator: EnforcementCoordinator,
    console: OperatorConsole,
}

impl EventRouter {
    /// Router over a coordinator and operator console.
    pub fn new(coordinator: EnforcementCoordinator, console: OperatorConsole) -> Self {
        Self {
            coordinator,
            console,
        }
    }

    /// Coordinator events are routed to.
    pub fn coordinator(&self) -> &EnforcementCoordinator {
        &self.coordinator
    }

    /// Handle an invite or group message to completion.
    ///
    /// Group messages carrying a detection record go to the coordinator; the
    /// rest are offered to the operator console. Returns the coordinator's
    /// outcome when it handled the event.
    pub async fn route(&self, event: InboundEvent) -> Option<Outcome> {
        match event {
            InboundEvent::Invite(invite) => Some(self.coordinator.handle_invite(&invite).await),
            InboundEvent::GroupMessage(message) => {
                if wire::is_detection_message(message.text()) {
                    Some(self.coordinator.handle_bus_message(&message).await)
                } else {
                    self.console.handle_message(&message).await;
                    None
                }
            }
            InboundEvent::Lifecycle { .. } | InboundEvent::Ignored => None,
        }
    }
}

/// Fans inbound events out to per-peer workers.
pub struct EventDispatcher {
    router: EventRouter,
    registry: Arc<PeerRegistry>,
    factory: Arc<dyn TransportFactory>,
    queues: DashMap<PeerId, mpsc::Sender<InboundEvent>>,
    workers: parking_lot::Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("router", &self.router)
            .field("queues", &self.queues.len())
            .finish_non_exhaustive()
    }
}

impl EventDispatcher {
    /// Dispatcher registering peers in `registry` through `factory`.
    pub fn new(
        router: EventRouter,
        registry: Arc<PeerRegistry>,
        factory: Arc<dyn TransportFactory>,
    ) -> Self {
        Self {
            router,
            registry,
            factory,
            queues: DashMap::new(),
            workers: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Accept one inbound event.
    ///
    /// Lifecycle events are applied before returning. Other events are queued
    /// on the receiving peer's worker; this waits only while that queue is full.
    #[instrument(skip(self, event))]
    pub async fn dispatch(&self, event: InboundEvent) {
        let peer = match &event {
            InboundEvent::Ignored => return,
            InboundEvent::Lifecycle { self_id, kind } => {
                self.apply_lifecycle(self_id, *kind);
                return;
            }
            InboundEvent::Invite(invite) => invite.self_id().clone(),
            InboundEvent::GroupMessage(message) => message.self_id().clone(),
        };

        let sender = self.queue_for(&peer);
        if sender.send(event).await.is_err() {
            error!(peer = %peer, "Worker queue closed, event lost");
            self.queues.remove(&peer);
            self.prune_workers();
        }
    }

    fn apply_lifecycle(&self, peer: &PeerId, kind: LifecycleKind) {
        match kind {
            LifecycleKind::Connect => {
                if self.registry.is_connected(peer) {
                    debug!(peer = %peer, "Peer already registered");
                    return;
                }
                match self.factory.create(peer) {
                    Ok(transport) => {
                        self.registry.connect(PeerHandle::new(peer.clone(), transport));
                    }
                    Err(e) => warn!(peer = %peer, error = %e, "Cannot register peer"),
                }
            }
            LifecycleKind::Disconnect => {
                self.registry.disconnect(peer);
                // Dropping the sender lets the worker drain and exit.
                self.queues.remove(peer);
                self.prune_workers();
            }
        }
    }

    fn queue_for(&self, peer: &PeerId) -> mpsc::Sender<InboundEvent> {
        self.queues
            .entry(peer.clone())
            .or_insert_with(|| {
                let (sender, mut receiver) = mpsc::channel(QUEUE_CAPACITY);
                let router = self.router.clone();
                let id = peer.clone();
                let worker = tokio::spawn(async move {
                    debug!(peer = %id, "Worker started");
                    while let Some(event) = receiver.recv().await {
                        router.route(event).await;
                    }
                    debug!(peer = %id, "Worker stopped");
                });
                let mut workers = self.workers.lock();
                workers.retain(|worker| !worker.is_finished());
                workers.push(worker);
                info!(peer = %peer, "Event queue created");
                sender
            })
            .clone()
    }

    /// Forget handles of workers that have already exited.
    fn prune_workers(&self) {
        self.workers.lock().retain(|worker| !worker.is_finished());
    }

    /// Peers with an active queue.
    pub fn active_queues(&self) -> usize {
        self.queues.len()
    }

    /// Worker handles held for shutdown.
    pub fn tracked_workers(&self) -> usize {
        self.workers.lock().len()
    }

    /// Close every queue and wait for workers to finish what they hold.
    pub async fn shutdown(&self) {
        self.queues.clear();
        let workers: Vec<JoinHandle<()>> = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            if let Err(e) = worker.await {
                error!(error = %e, "Worker task panicked");
            }
        }
    }
}
