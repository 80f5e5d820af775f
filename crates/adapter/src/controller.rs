//! Game loop.
//!
//! The controller owns the [`GameSession`] and is the only place that mutates
//! it. Client commands, fetch results and timer ticks all arrive on channels
//! and are handled one at a time from a single `select!` loop.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::core::{
    Advance, FetchError, FetchTicket, GameSession, GameSettings, Guess, Resolution, RoundRecord,
    RoundView, SessionError, TimerEvent, TimerGeneration,
};
use crate::protocol::{
    advance_event, best_scores, create_ack, round_loaded, round_resolved, session_error, timer_tick,
    ServerMessage,
};
use crate::source::RoundSource;
use crate::timer::TimerHandle;
use crate::types::DisplayPoint;

/// Command delivered to the game loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub command: ClientCommand,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    StartNewGame(GameSettings),
    PlaceGuess(DisplayPoint),
    SubmitNameGuess(String),
    Skip,
    Advance,
    Reset,
    /// Answered with the stored best of every mode, in any phase.
    GetScores,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClient {
        client_id: usize,
        message: ServerMessage,
    },
    Broadcast {
        message: ServerMessage,
    },
}

type FetchResult = (FetchTicket, Result<Vec<RoundRecord>, FetchError>);

enum GameEvent {
    Loaded(RoundView),
    Resolved(Resolution),
    Advanced(Advance),
    Tick { index: usize, remaining: u32 },
    Failed(SessionError),
}

pub struct Controller {
    session: GameSession,
    source: Arc<dyn RoundSource>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    fetch_tx: mpsc::UnboundedSender<FetchResult>,
    fetch_rx: mpsc::UnboundedReceiver<FetchResult>,
    fetch_task: Option<JoinHandle<()>>,
    /// Client and seq of the `startNewGame` being fetched.
    requester: Option<(usize, u64)>,
    timer: TimerHandle,
    tick_rx: mpsc::UnboundedReceiver<TimerGeneration>,
    event_seq: u64,
}

impl Controller {
    pub fn new(
        session: GameSession,
        source: Arc<dyn RoundSource>,
        out_tx: mpsc::UnboundedSender<OutboundMessage>,
    ) -> Self {
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        Self {
            session,
            source,
            out_tx,
            fetch_tx,
            fetch_rx,
            fetch_task: None,
            requester: None,
            timer: TimerHandle::new(tick_tx),
            tick_rx,
            event_seq: 0,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Run until the command channel closes.
    pub async fn run(mut self, mut cmd_rx: mpsc::Receiver<InboundCommand>) {
        info!("game loop started");
        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                Some((ticket, result)) = self.fetch_rx.recv() => self.handle_fetch(ticket, result),
                Some(generation) = self.tick_rx.recv() => self.handle_tick(generation),
            }
        }
        self.abort_fetch();
        self.timer.cancel();
        info!("game loop stopped");
    }

    pub fn handle_command(&mut self, cmd: InboundCommand) {
        let InboundCommand {
            client_id,
            seq,
            command,
        } = cmd;
        debug!(client_id, seq, ?command, "command");

        let result = match command {
            ClientCommand::StartNewGame(settings) => self
                .start_new_game(client_id, seq, settings)
                .map(|()| None),
            ClientCommand::PlaceGuess(point) => self
                .session
                .submit_guess(Guess::Location(point))
                .map(|r| Some(GameEvent::Resolved(r))),
            ClientCommand::SubmitNameGuess(text) => self
                .session
                .submit_guess(Guess::Name(text))
                .map(|r| Some(GameEvent::Resolved(r))),
            ClientCommand::Skip => self
                .session
                .submit_guess(Guess::NoGuess)
                .map(|r| Some(GameEvent::Resolved(r))),
            ClientCommand::Advance => self
                .session
                .advance_round()
                .map(|a| Some(GameEvent::Advanced(a))),
            ClientCommand::GetScores => {
                let reply = match self.session.stored_bests() {
                    Ok(bests) => ServerMessage::Scores(best_scores(seq, &bests)),
                    Err(e) => ServerMessage::Error(session_error(seq, &e)),
                };
                self.send_to(client_id, reply);
                return;
            }
            ClientCommand::Reset => {
                self.abort_fetch();
                self.requester = None;
                self.session.reset();
                Ok(None)
            }
        };

        match result {
            Ok(event) => {
                self.send_to(client_id, ServerMessage::Ack(create_ack(seq)));
                if let Some(event) = event {
                    self.broadcast(event);
                }
            }
            Err(e) => {
                debug!(client_id, seq, error = %e, "command rejected");
                self.send_to(client_id, ServerMessage::Error(session_error(seq, &e)));
            }
        }
        self.sync_timer();
    }

    fn start_new_game(
        &mut self,
        client_id: usize,
        seq: u64,
        settings: GameSettings,
    ) -> Result<(), SessionError> {
        let ticket = self.session.begin_new_game(settings)?;
        self.abort_fetch();
        self.requester = Some((client_id, seq));

        let source = Arc::clone(&self.source);
        let tx = self.fetch_tx.clone();
        let count = settings.round_count.max(1);
        self.fetch_task = Some(tokio::spawn(async move {
            let result = source.fetch_rounds(count).await;
            let _ = tx.send((ticket, result));
        }));
        Ok(())
    }

    pub fn handle_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<RoundRecord>, FetchError>,
    ) {
        match self.session.complete_new_game(ticket, result) {
            Ok(Some(view)) => {
                self.fetch_task = None;
                self.requester = None;
                self.broadcast(GameEvent::Loaded(view));
            }
            Ok(None) => {}
            Err(e) => {
                self.fetch_task = None;
                warn!(error = %e, "could not start game");
                match self.requester.take() {
                    Some((client_id, seq)) => {
                        self.send_to(client_id, ServerMessage::Error(session_error(seq, &e)))
                    }
                    None => self.broadcast(GameEvent::Failed(e)),
                }
            }
        }
        self.sync_timer();
    }

    pub fn handle_tick(&mut self, generation: TimerGeneration) {
        match self.session.timer_tick(generation) {
            Ok(TimerEvent::Stale) => {}
            Ok(TimerEvent::Tick { remaining }) => {
                let index = self.session.current_index();
                self.broadcast(GameEvent::Tick { index, remaining });
            }
            Ok(TimerEvent::Expired {
                resolution,
                advance,
            }) => {
                self.broadcast(GameEvent::Resolved(resolution));
                match advance {
                    Ok(advance) => self.broadcast(GameEvent::Advanced(advance)),
                    Err(e) => self.broadcast(GameEvent::Failed(e)),
                }
            }
            Err(e) => warn!(error = %e, "timer expiry could not resolve the round"),
        }
        self.sync_timer();
    }

    fn abort_fetch(&mut self) {
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
    }

    /// Make the tick task match the session's armed countdown.
    fn sync_timer(&mut self) {
        let wanted = self.session.timer().generation();
        if wanted == self.timer.generation() {
            return;
        }
        match wanted {
            Some(generation) => {
                let remaining = self.session.timer().remaining_secs();
                self.timer.start(generation, remaining);
            }
            None => self.timer.cancel(),
        }
    }

    fn next_seq(&mut self) -> u64 {
        self.event_seq += 1;
        self.event_seq
    }

    fn send_to(&self, client_id: usize, message: ServerMessage) {
        let _ = self.out_tx.send(OutboundMessage::ToClient { client_id, message });
    }

    fn broadcast(&mut self, event: GameEvent) {
        let seq = self.next_seq();
        let message = match event {
            GameEvent::Loaded(view) => ServerMessage::RoundLoaded(round_loaded(seq, &view)),
            GameEvent::Resolved(r) => ServerMessage::RoundResolved(round_resolved(seq, &r)),
            GameEvent::Advanced(advance) => advance_event(seq, &advance),
            GameEvent::Tick { index, remaining } => {
                ServerMessage::TimerTick(timer_tick(seq, index, remaining))
            }
            GameEvent::Failed(e) => ServerMessage::Error(session_error(seq, &e)),
        };
        let _ = self.out_tx.send(OutboundMessage::Broadcast { message });
    }
}
