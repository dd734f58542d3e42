//! Single-writer game session.
//!
//! One tokio task owns the world, the rules, the RNG, and the event
//! backlog. Everything else talks to it over an mpsc command channel, so
//! mutation is serialized by construction. A step that fails leaves the
//! world untouched; the owned world is only ever replaced by a completed
//! step outcome.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, warn};

use hearthage_core::{step, validate_proposal, Rules, SimRng, StepOutcome};
use hearthage_protocol::{GameEvent, Proposal, ServerMessage, World};

/// Live backlog bound; older events are dropped once exceeded.
const BACKLOG_CAP: usize = 200;
/// How many trailing events a fresh connection receives.
const SNAPSHOT_TAIL: usize = 40;

enum SessionCommand {
    Propose {
        proposal: Proposal,
        reply: oneshot::Sender<Result<(), String>>,
    },
    Snapshot {
        reply: oneshot::Sender<(World, Vec<GameEvent>)>,
    },
}

/// Cheap, cloneable handle to the session task.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    broadcasts: broadcast::Sender<ServerMessage>,
}

impl SessionHandle {
    /// Submit a resolved proposal. `Err` carries the rejection message for
    /// the originating client; accepted proposals are answered after their
    /// step has been committed and broadcast.
    pub async fn propose(&self, proposal: Proposal) -> Result<(), String> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::Propose { proposal, reply })
            .await
            .map_err(|_| "session closed".to_string())?;
        rx.await.map_err(|_| "session closed".to_string())?
    }

    /// Current world plus the trailing slice of the event backlog.
    pub async fn snapshot(&self) -> Option<(World, Vec<GameEvent>)> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::Snapshot { reply })
            .await
            .ok()?;
        rx.await.ok()
    }

    /// Subscribe to step broadcasts.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.broadcasts.subscribe()
    }
}

/// Spawn the session task and hand back its handle.
pub fn spawn_session(
    rules: Rules,
    world: World,
    rng: SimRng,
    tick_interval: Duration,
) -> SessionHandle {
    let (commands, command_rx) = mpsc::channel(64);
    let (broadcasts, _) = broadcast::channel(64);
    let session = Session {
        rules,
        world,
        rng,
        backlog: Vec::new(),
        broadcasts: broadcasts.clone(),
    };
    tokio::spawn(run_session(session, command_rx, tick_interval));
    SessionHandle {
        commands,
        broadcasts,
    }
}

#[cfg(test)]
impl SessionHandle {
    /// Handle whose session task has already stopped.
    pub(crate) fn closed() -> Self {
        let (commands, receiver) = mpsc::channel(1);
        drop(receiver);
        let (broadcasts, _) = broadcast::channel(1);
        Self {
            commands,
            broadcasts,
        }
    }
}

struct Session {
    rules: Rules,
    world: World,
    rng: SimRng,
    backlog: Vec<GameEvent>,
    broadcasts: broadcast::Sender<ServerMessage>,
}

async fn run_session(
    mut session: Session,
    mut commands: mpsc::Receiver<SessionCommand>,
    tick_interval: Duration,
) {
    // First passive tick one full interval from now, not immediately.
    let mut ticker = interval_at(Instant::now() + tick_interval, tick_interval);
    info!(tick_ms = tick_interval.as_millis() as u64, "session started");

    loop {
        tokio::select! {
            _ = ticker.tick() => session.passive_tick(),
            command = commands.recv() => match command {
                Some(SessionCommand::Propose { proposal, reply }) => {
                    let _ = reply.send(session.apply(&proposal));
                }
                Some(SessionCommand::Snapshot { reply }) => {
                    let _ = reply.send((session.world.clone(), session.snapshot_tail()));
                }
                None => {
                    info!("all session handles dropped, stopping");
                    return;
                }
            }
        }
    }
}

impl Session {
    /// Validate and apply one proposal as a full step.
    fn apply(&mut self, proposal: &Proposal) -> Result<(), String> {
        let action = proposal.action.as_ref().map_or("none", |a| a.kind());
        if let Err(e) = validate_proposal(&self.rules, &self.world, proposal) {
            debug!(player = %proposal.player_id, action, error = %e, "proposal rejected");
            return Err(e.to_string());
        }
        debug!(player = %proposal.player_id, action, "proposal accepted");
        match step(&self.rules, &self.world, Some(proposal), &mut self.rng) {
            Ok(outcome) => {
                self.commit(outcome);
                Ok(())
            }
            Err(e) => Err(e.to_string()),
        }
    }

    /// Advance the world with no player action. Quiet ticks swap the world
    /// without broadcasting.
    fn passive_tick(&mut self) {
        match step(&self.rules, &self.world, None, &mut self.rng) {
            Ok(outcome) if outcome.events.is_empty() => self.world = outcome.world,
            Ok(outcome) => self.commit(outcome),
            Err(e) => warn!(error = %e, "passive tick failed"),
        }
    }

    fn commit(&mut self, outcome: StepOutcome) {
        self.world = outcome.world;
        self.backlog.extend(outcome.events.iter().cloned());
        if self.backlog.len() > BACKLOG_CAP {
            let excess = self.backlog.len() - BACKLOG_CAP;
            self.backlog.drain(..excess);
        }
        let _ = self.broadcasts.send(ServerMessage::Events {
            events: outcome.events,
            world: self.world.clone(),
        });
    }

    fn snapshot_tail(&self) -> Vec<GameEvent> {
        let skip = self.backlog.len().saturating_sub(SNAPSHOT_TAIL);
        self.backlog[skip..].to_vec()
    }
}
