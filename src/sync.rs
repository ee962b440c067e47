//! Session client and synchronization loop.
//!
//! A [`SessionClient`] is scoped to exactly one game: it is constructed by
//! creating or joining a session, owns the polling task and the optional push
//! task, and tears both down when shut down or dropped. State flows out
//! through a `tokio::sync::watch` channel that the presentation layer reads.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use crate::error::ClientError;
use crate::push;
use crate::reconnect::ReconnectPolicy;
use crate::snapshot::{GameId, GameSnapshot, Mark, PlayerId, Position, game_id_is_valid};
use crate::transport::{GameApi, RestClient};
use crate::view::SessionView;

/// Tunables for one session's synchronization behavior.
#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    /// Fixed period between background state fetches. Polling never backs
    /// off; only the push channel does.
    pub poll_interval: Duration,
    /// Backoff schedule for push-channel reconnection.
    pub reconnect: ReconnectPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            poll_interval: Duration::from_millis(1000),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

/// Connectivity of the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    /// No push channel open (polling only).
    #[default]
    Idle,
    /// First connection attempt in flight.
    Connecting,
    /// Channel open; snapshots arrive unsolicited.
    Connected,
    /// Channel lost; reconnection attempt `attempt` is scheduled or in
    /// flight.
    Reconnecting {
        /// 1-based attempt number.
        attempt: u32,
    },
    /// Reconnection attempts exhausted; polling continues unaffected.
    Lost,
}

/// Everything the presentation layer needs, published on every change.
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    /// Last known authoritative session, kept through transient failures.
    pub session: Option<GameSnapshot>,
    /// Transient fetch error, cleared by the next successful refresh.
    pub error: Option<String>,
    /// Push-channel connectivity.
    pub link: LinkState,
}

/// Monotonic counter guarding asynchronous continuations against teardown.
///
/// Each background task captures the counter value it was spawned under and
/// re-checks it before applying any result; bumping the counter invalidates
/// every outstanding token, so a response arriving after teardown is
/// discarded instead of mutating superseded state.
#[derive(Debug, Clone, Default)]
pub struct Generation(Arc<AtomicU64>);

impl Generation {
    /// Current counter value; tokens captured now stay valid until the next
    /// bump.
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Invalidates all outstanding tokens.
    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// True while `token` is still the live generation.
    pub fn is_current(&self, token: u64) -> bool {
        self.current() == token
    }
}

/// Replaces the session wholesale and clears any transient error, unless the
/// token went stale. Returns false when the caller should stop.
pub(crate) fn apply_snapshot(
    state: &watch::Sender<SyncState>,
    generation: &Generation,
    token: u64,
    snapshot: GameSnapshot,
) -> bool {
    if !generation.is_current(token) {
        debug!("discarding snapshot for superseded session");
        return false;
    }
    state.send_modify(|s| {
        s.session = Some(snapshot);
        s.error = None;
    });
    true
}

pub(crate) fn set_link(
    state: &watch::Sender<SyncState>,
    generation: &Generation,
    token: u64,
    link: LinkState,
) {
    if !generation.is_current(token) {
        return;
    }
    state.send_modify(|s| s.link = link);
}

/// Client for one game session.
///
/// Construct with [`SessionClient::create`] or [`SessionClient::join`]; both
/// capture the local identity and assigned mark from the first response and
/// start the polling loop. The push channel is opted into with
/// [`SessionClient::open_push`]. Dropping the client cancels everything.
#[derive(Debug)]
pub struct SessionClient<A: GameApi = RestClient> {
    api: Arc<A>,
    config: SyncConfig,
    game_id: GameId,
    player_id: PlayerId,
    my_mark: Mark,
    generation: Generation,
    state: Arc<watch::Sender<SyncState>>,
    poll_task: Option<JoinHandle<()>>,
    push_task: Option<JoinHandle<()>>,
}

impl<A: GameApi> SessionClient<A> {
    /// Creates a new game on the server and starts synchronizing it. The
    /// creator plays X.
    pub async fn create(api: A, config: SyncConfig) -> Result<Self, ClientError> {
        let first = api.create_game().await?;
        Self::start(api, config, first, Mark::X)
    }

    /// Joins an existing game and starts synchronizing it. The id is checked
    /// locally first; nothing is sent for a malformed id. The joiner plays O.
    pub async fn join(api: A, config: SyncConfig, game_id: &str) -> Result<Self, ClientError> {
        if !game_id_is_valid(game_id) {
            return Err(ClientError::InvalidGameId);
        }
        let first = api.join_game(game_id).await?;
        Self::start(api, config, first, Mark::O)
    }

    fn start(
        api: A,
        config: SyncConfig,
        first: GameSnapshot,
        my_mark: Mark,
    ) -> Result<Self, ClientError> {
        let player_id = first.player_id.clone().ok_or_else(|| ClientError::Server {
            status: 200,
            message: "response carried no player identity".to_string(),
        })?;
        let game_id = first.game_id.clone();
        info!(game_id = %game_id, mark = %my_mark, "session started");

        let (tx, _rx) = watch::channel(SyncState {
            session: Some(first),
            error: None,
            link: LinkState::Idle,
        });
        let mut client = Self {
            api: Arc::new(api),
            config,
            game_id,
            player_id,
            my_mark,
            generation: Generation::default(),
            state: Arc::new(tx),
            poll_task: None,
            push_task: None,
        };
        client.spawn_poll_task();
        Ok(client)
    }

    /// Id of the synchronized game.
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Local identity within the game, fixed at create/join time.
    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    /// Mark assigned to this client, fixed at create/join time.
    pub fn my_mark(&self) -> Mark {
        self.my_mark
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    pub fn state(&self) -> SyncState {
        self.state.borrow().clone()
    }

    /// Derived presentation facts for the current state.
    pub fn view(&self) -> SessionView {
        let state = self.state.borrow();
        SessionView::derive(state.session.as_ref(), Some(self.my_mark))
    }

    /// Submits a move, applies the returned authoritative state, and runs an
    /// out-of-band refresh so the mover converges before the next tick.
    ///
    /// A rejection leaves the local session untouched and surfaces the
    /// server's reason to the caller.
    #[instrument(skip(self), fields(game_id = %self.game_id, position = %position))]
    pub async fn submit_move(&self, position: Position) -> Result<(), ClientError> {
        let token = self.generation.current();
        let snapshot = self
            .api
            .submit_move(&self.game_id, &self.player_id, position)
            .await?;
        apply_snapshot(&self.state, &self.generation, token, snapshot);

        match self.api.fetch_state(&self.game_id).await {
            Ok(refreshed) => {
                apply_snapshot(&self.state, &self.generation, token, refreshed);
            }
            Err(error) => {
                warn!(%error, "post-move refresh failed, next tick will retry");
            }
        }
        Ok(())
    }

    /// Opens the push channel. A no-op while one is already live; the
    /// channel reconnects on its own per the configured policy and gives up
    /// only after exhausting it (polling keeps running either way).
    pub fn open_push(&mut self) {
        if let Some(task) = &self.push_task {
            if !task.is_finished() {
                debug!("push channel already open");
                return;
            }
        }
        let url = self.api.push_url(&self.game_id);
        info!(%url, "opening push channel");
        self.push_task = Some(tokio::spawn(push::run_push_channel(
            url,
            self.config.reconnect,
            self.generation.clone(),
            self.generation.current(),
            Arc::clone(&self.state),
        )));
    }

    /// Closes the push channel, cancelling any pending reconnection attempt.
    /// Safe to call when already closed.
    pub fn close_push(&mut self) {
        if let Some(task) = self.push_task.take() {
            task.abort();
            debug!("push channel closed");
        }
        self.state.send_modify(|s| s.link = LinkState::Idle);
    }

    /// Tears the session down: invalidates outstanding work, cancels the
    /// polling and push tasks. No callback mutates state afterwards.
    pub fn shutdown(&mut self) {
        self.generation.bump();
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
        if let Some(task) = self.push_task.take() {
            task.abort();
        }
        self.state.send_modify(|s| s.link = LinkState::Idle);
        info!(game_id = %self.game_id, "session shut down");
    }

    fn spawn_poll_task(&mut self) {
        let api = Arc::clone(&self.api);
        let state = Arc::clone(&self.state);
        let generation = self.generation.clone();
        let token = self.generation.current();
        let game_id = self.game_id.clone();
        let period = self.config.poll_interval;

        self.poll_task = Some(tokio::spawn(async move {
            // First tick fires immediately, giving the initial fetch.
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !generation.is_current(token) {
                    return;
                }
                match api.fetch_state(&game_id).await {
                    Ok(snapshot) => {
                        if !apply_snapshot(&state, &generation, token, snapshot) {
                            return;
                        }
                    }
                    Err(error) => {
                        if !generation.is_current(token) {
                            return;
                        }
                        warn!(%error, "state fetch failed, keeping last known session");
                        state.send_modify(|s| s.error = Some(error.to_string()));
                    }
                }
            }
        }));
    }
}

impl<A: GameApi> Drop for SessionClient<A> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
