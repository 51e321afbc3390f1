//! The single owned game context and its event dispatcher.
//!
//! [`SessionContext`] holds the session, the peer link, the transport and
//! the notification queue for one process. Every input goes through
//! [`SessionContext::handle`]: user commands, link events and timer ticks.
//! Each one runs to completion before the next. Time is passed in, so every
//! transition can be tested without a clock or a live network.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::RoomCodeError;
use crate::game::{Board, DropError, Landing, MoveError, Phase, Player, Session};
use crate::net::{ConnectionState, LinkEvent, PeerTransport, RoomCode};
use crate::notify::{NotificationKind, Notifications};
use crate::protocol::WireMessage;

/// Commands from the local player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    CreateRoom,
    JoinRoom(String),
    Play(usize),
    Restart,
    CopyRoomId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Command(UserCommand),
    Link(LinkEvent),
    /// Timer check: connect timeout and notification expiry.
    Tick,
}

/// Side effects the presentation layer performs on the context's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CopyToClipboard(String),
}

/// State of the direct link to the opponent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerLink {
    pub local_id: RoomCode,
    pub remote_id: Option<String>,
    pub state: ConnectionState,
    /// Color this side will play once the link opens.
    pub role: Option<Player>,
    pub error: Option<String>,
}

impl PeerLink {
    fn new(local_id: RoomCode) -> Self {
        PeerLink {
            local_id,
            remote_id: None,
            state: ConnectionState::Idle,
            role: None,
            error: None,
        }
    }
}

pub struct SessionContext<T: PeerTransport> {
    session: Session,
    link: PeerLink,
    transport: T,
    notifications: Notifications,
    connect_timeout: Duration,
    connect_deadline: Option<Instant>,
}

impl<T: PeerTransport> SessionContext<T> {
    pub fn new(local_id: RoomCode, transport: T, config: &SessionConfig) -> Self {
        info!(room = %local_id, "room identity assigned");
        SessionContext {
            session: Session::new(),
            link: PeerLink::new(local_id),
            transport,
            notifications: Notifications::new(config.notification_duration()),
            connect_timeout: config.connect_timeout(),
            connect_deadline: None,
        }
    }

    /// Dispatch one event.
    pub fn handle(&mut self, event: AppEvent, now: Instant) -> Option<Effect> {
        match event {
            AppEvent::Command(command) => return self.on_command(command, now),
            AppEvent::Link(event) => self.on_link(event, now),
            AppEvent::Tick => self.on_tick(now),
        }
        None
    }

    /// Drain every pending link event, then run the timers.
    pub fn pump(&mut self, now: Instant) {
        while let Some(event) = self.transport.poll_event() {
            self.on_link(event, now);
        }
        self.on_tick(now);
    }

    /// Raise a notification from outside the dispatcher.
    pub fn notify(&mut self, kind: NotificationKind, message: impl Into<String>, now: Instant) {
        self.notifications.push(kind, message, now);
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn board(&self) -> &Board {
        self.session.board()
    }

    pub fn turn(&self) -> Player {
        self.session.turn()
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn local_color(&self) -> Option<Player> {
        self.session.local_color()
    }

    pub fn link(&self) -> &PeerLink {
        &self.link
    }

    pub fn room_id(&self) -> RoomCode {
        self.link.local_id
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.link.state
    }

    pub fn is_connecting(&self) -> bool {
        self.link.state == ConnectionState::Connecting
    }

    pub fn is_connected(&self) -> bool {
        self.link.state == ConnectionState::Open
    }

    pub fn error_text(&self) -> Option<&str> {
        self.link.error.as_deref()
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn on_command(&mut self, command: UserCommand, now: Instant) -> Option<Effect> {
        match command {
            UserCommand::CreateRoom => self.create_room(now),
            UserCommand::JoinRoom(code) => self.join_room(&code, now),
            UserCommand::Play(column) => self.play(column, now),
            UserCommand::Restart => self.restart(now),
            UserCommand::CopyRoomId => {
                return Some(Effect::CopyToClipboard(self.link.local_id.to_string()));
            }
        }
        None
    }

    /// Check whether a new link attempt may start, and say why not otherwise.
    fn can_start_link(&mut self, now: Instant) -> bool {
        let reason = match self.link.state {
            ConnectionState::Idle | ConnectionState::Failed | ConnectionState::Listening => {
                return true;
            }
            ConnectionState::Connecting => "Already joining a room",
            ConnectionState::Open => "Already connected to an opponent",
            ConnectionState::Closed => "The connection was closed. Restart the app to play again.",
        };
        self.notify(NotificationKind::Warning, reason, now);
        false
    }

    fn create_room(&mut self, now: Instant) {
        if self.link.state == ConnectionState::Listening {
            let msg = format!("Already waiting in room {}", self.link.local_id);
            self.notify(NotificationKind::Info, msg, now);
            return;
        }
        if !self.can_start_link(now) {
            return;
        }

        self.transport.close();
        match self.transport.listen(self.link.local_id) {
            Ok(()) => {
                self.link.state = ConnectionState::Listening;
                self.link.role = Some(Player::Red);
                self.link.remote_id = None;
                self.link.error = None;
                info!(room = %self.link.local_id, "room created");
                let msg = format!(
                    "Room {} created. Share the code with your opponent.",
                    self.link.local_id
                );
                self.notify(NotificationKind::Info, msg, now);
            }
            Err(e) => {
                warn!(error = %e, "could not create room");
                self.fail_link(format!("Could not create room: {e}"), now);
            }
        }
    }

    fn join_room(&mut self, input: &str, now: Instant) {
        let remote = match RoomCode::parse(input) {
            Ok(code) if code == self.link.local_id => Err(RoomCodeError::OwnRoom),
            other => other,
        };
        let remote = match remote {
            Ok(code) => code,
            Err(e) => {
                debug!(input, "rejected join input");
                self.notify(NotificationKind::Warning, e.to_string(), now);
                return;
            }
        };
        if !self.can_start_link(now) {
            return;
        }

        // A host that decides to join instead gives up its room
        self.transport.close();
        match self.transport.connect(self.link.local_id, remote) {
            Ok(()) => {
                self.link.state = ConnectionState::Connecting;
                self.link.role = Some(Player::Yellow);
                self.link.remote_id = Some(remote.to_string());
                self.link.error = None;
                self.connect_deadline = Some(now + self.connect_timeout);
                info!(room = %remote, "joining room");
                self.notify(NotificationKind::Info, format!("Joining room {remote}..."), now);
            }
            Err(e) => {
                warn!(error = %e, room = %remote, "could not start connect");
                self.fail_link(format!("Could not join room {remote}: {e}"), now);
            }
        }
    }

    fn play(&mut self, column: usize, now: Instant) {
        if self.link.state != ConnectionState::Open {
            self.notify(NotificationKind::Warning, "No opponent connected", now);
            return;
        }

        match self.session.attempt_local_move(column) {
            Ok(landing) => {
                // Applied locally, so it must go out or the peers diverge
                if let Some(color) = self.session.local_color() {
                    debug!(column, color = %color, "local move accepted");
                    self.send(&WireMessage::Move { column, color }, now);
                }
                self.announce_outcome(landing, now);
            }
            Err(e) => {
                debug!(column, error = %e, "local move rejected");
                self.notify(NotificationKind::Warning, move_rejection(&e), now);
            }
        }
    }

    fn restart(&mut self, now: Instant) {
        self.session.restart();
        match WireMessage::Restart.encode() {
            Ok(frame) => {
                if let Err(e) = self.transport.send(&frame) {
                    if self.is_connected() {
                        let msg = format!("Failed to send restart: {e}");
                        self.notify(NotificationKind::Warning, msg, now);
                    } else {
                        debug!(error = %e, "restart not sent, no peer");
                    }
                }
            }
            Err(e) => warn!(error = %e, "failed to encode restart"),
        }
        info!("game restarted locally");
        self.notify(NotificationKind::Info, "New game started!", now);
    }

    fn on_link(&mut self, event: LinkEvent, now: Instant) {
        match event {
            LinkEvent::Opened { remote_id } => self.on_opened(remote_id, now),
            LinkEvent::Data(payload) => self.on_data(&payload, now),
            LinkEvent::Closed => self.on_closed(now),
            LinkEvent::Errored(info) => self.on_errored(info, now),
        }
    }

    fn on_opened(&mut self, remote_id: String, now: Instant) {
        if !matches!(
            self.link.state,
            ConnectionState::Listening | ConnectionState::Connecting
        ) {
            debug!(%remote_id, state = ?self.link.state, "ignoring stale open");
            return;
        }
        let Some(color) = self.link.role else {
            warn!(%remote_id, "link opened without a role");
            return;
        };

        self.connect_deadline = None;
        self.link.state = ConnectionState::Open;
        self.link.remote_id = Some(remote_id.clone());
        self.link.error = None;
        self.session.begin(color);
        info!(%remote_id, color = %color, "link open");

        let welcome = WireMessage::Welcome {
            text: format!("{} is ready in room {}", color, self.link.local_id),
        };
        self.send(&welcome, now);
        let msg = format!("Connected to {remote_id}. You are {color}.");
        self.notify(NotificationKind::Success, msg, now);
    }

    fn on_data(&mut self, payload: &str, now: Instant) {
        if self.link.state != ConnectionState::Open {
            debug!("dropping data on a link that is not open");
            return;
        }

        let message = match WireMessage::decode(payload) {
            Ok(Some(message)) => message,
            Ok(None) => {
                debug!(payload, "ignoring unknown message kind");
                return;
            }
            Err(e) => {
                debug!(payload, error = %e, "dropping malformed message");
                return;
            }
        };

        match message {
            WireMessage::Move { column, color } => {
                match self.session.apply_remote_move(column, color) {
                    Ok(landing) => self.announce_outcome(landing, now),
                    Err(e) => warn!(column, color = %color, error = %e, "remote move not applied"),
                }
            }
            WireMessage::Restart => {
                self.session.restart();
                info!("game restarted by opponent");
                self.notify(NotificationKind::Info, "Opponent started a new game", now);
            }
            WireMessage::Welcome { text } => {
                debug!(%text, "welcome received");
                self.notify(NotificationKind::Info, text, now);
            }
        }
    }

    fn on_closed(&mut self, now: Instant) {
        match self.link.state {
            ConnectionState::Open => {
                self.link.state = ConnectionState::Closed;
                info!("link closed by peer");
                self.notify(
                    NotificationKind::Warning,
                    "Opponent disconnected. The game has ended.",
                    now,
                );
            }
            ConnectionState::Listening | ConnectionState::Connecting => {
                self.fail_link("Connection closed before the game started".to_string(), now);
            }
            _ => debug!(state = ?self.link.state, "ignoring close"),
        }
    }

    fn on_errored(&mut self, info: String, now: Instant) {
        warn!(error = %info, state = ?self.link.state, "link error");
        match self.link.state {
            ConnectionState::Listening | ConnectionState::Connecting => {
                self.fail_link(format!("Connection error: {info}"), now);
            }
            _ => {
                self.link.error = Some(info.clone());
                self.notify(NotificationKind::Warning, format!("Connection error: {info}"), now);
            }
        }
    }

    fn on_tick(&mut self, now: Instant) {
        if let Some(deadline) = self.connect_deadline {
            if now >= deadline && self.link.state == ConnectionState::Connecting {
                let room = self.link.remote_id.clone().unwrap_or_default();
                warn!(%room, "connect timed out");
                self.fail_link(format!("Timed out joining room {room}"), now);
            }
        }
        self.notifications.expire(now);
    }

    /// Abandon a pending link attempt. The session is left untouched.
    fn fail_link(&mut self, error: String, now: Instant) {
        self.transport.close();
        self.connect_deadline = None;
        self.link.state = ConnectionState::Failed;
        self.link.role = None;
        self.link.remote_id = None;
        self.link.error = Some(error.clone());
        self.notify(NotificationKind::Error, error, now);
    }

    fn send(&mut self, message: &WireMessage, now: Instant) {
        let result = message
            .encode()
            .map_err(|e| e.to_string())
            .and_then(|frame| self.transport.send(&frame).map_err(|e| e.to_string()));
        if let Err(e) = result {
            warn!(error = %e, ?message, "send failed");
            self.notify(NotificationKind::Warning, format!("Failed to reach opponent: {e}"), now);
        }
    }

    fn announce_outcome(&mut self, landing: Landing, now: Instant) {
        if !landing.is_terminal() {
            return;
        }
        let (kind, msg) = match self.session.phase() {
            Phase::Won(winner) if Some(winner) == self.session.local_color() => {
                (NotificationKind::Success, "You win!".to_string())
            }
            Phase::Won(winner) => (NotificationKind::Info, format!("{winner} wins!")),
            Phase::Drawn => (NotificationKind::Info, "It's a draw!".to_string()),
            Phase::Lobby | Phase::Active => return,
        };
        info!(phase = ?self.session.phase(), "game over");
        self.notify(kind, msg, now);
    }
}

fn move_rejection(err: &MoveError) -> String {
    match err {
        MoveError::NotActive => "No game in progress".to_string(),
        MoveError::GameOver => "Game over! Press 'r' to restart.".to_string(),
        MoveError::NotYourTurn(_) => "Wait for your turn".to_string(),
        MoveError::Drop(DropError::ColumnFull(_)) => "Column is full!".to_string(),
        MoveError::Drop(e) => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Cell;
    use crate::net::{MemoryNetwork, MemoryTransport};

    fn code(s: &str) -> RoomCode {
        RoomCode::parse(s).unwrap()
    }

    fn context(net: &MemoryNetwork, room: &str) -> SessionContext<MemoryTransport> {
        SessionContext::new(code(room), net.endpoint(), &SessionConfig::default())
    }

    fn cmd(ctx: &mut SessionContext<MemoryTransport>, command: UserCommand, now: Instant) {
        ctx.handle(AppEvent::Command(command), now);
    }

    fn last_message(ctx: &SessionContext<MemoryTransport>) -> String {
        ctx.notifications()
            .latest()
            .map(|n| n.message.clone())
            .unwrap_or_default()
    }

    /// Host in 1111, guest in 2222, linked and welcomed.
    fn linked_pair(now: Instant) -> (SessionContext<MemoryTransport>, SessionContext<MemoryTransport>) {
        let net = MemoryNetwork::new();
        let mut host = context(&net, "1111");
        let mut guest = context(&net, "2222");
        cmd(&mut host, UserCommand::CreateRoom, now);
        cmd(&mut guest, UserCommand::JoinRoom("1111".to_string()), now);
        guest.pump(now);
        host.pump(now);
        guest.pump(now);
        (host, guest)
    }

    #[test]
    fn test_new_context_is_idle() {
        let net = MemoryNetwork::new();
        let ctx = context(&net, "1234");
        assert_eq!(ctx.connection_state(), ConnectionState::Idle);
        assert_eq!(ctx.phase(), Phase::Lobby);
        assert_eq!(ctx.room_id().to_string(), "1234");
        assert!(ctx.notifications().is_empty());
    }

    #[test]
    fn test_create_room_listens_without_binding_color() {
        let now = Instant::now();
        let net = MemoryNetwork::new();
        let mut ctx = context(&net, "1234");
        cmd(&mut ctx, UserCommand::CreateRoom, now);

        assert_eq!(ctx.connection_state(), ConnectionState::Listening);
        assert_eq!(ctx.link().role, Some(Player::Red));
        assert_eq!(ctx.local_color(), None);
        assert_eq!(ctx.phase(), Phase::Lobby);
    }

    #[test]
    fn test_link_open_binds_colors() {
        let now = Instant::now();
        let (host, guest) = linked_pair(now);

        assert!(host.is_connected() && guest.is_connected());
        assert_eq!(host.local_color(), Some(Player::Red));
        assert_eq!(guest.local_color(), Some(Player::Yellow));
        assert_eq!(host.phase(), Phase::Active);
        assert_eq!(guest.phase(), Phase::Active);
        assert_eq!(host.link().remote_id.as_deref(), Some("2222"));
        assert_eq!(guest.link().remote_id.as_deref(), Some("1111"));
        // Each side shows the other's welcome
        assert!(host.notifications().active().any(|n| n.message.contains("Yellow is ready")));
        assert!(guest.notifications().active().any(|n| n.message.contains("Red is ready")));
    }

    #[test]
    fn test_join_rejects_malformed_code() {
        let now = Instant::now();
        let net = MemoryNetwork::new();
        let mut ctx = context(&net, "1234");
        cmd(&mut ctx, UserCommand::JoinRoom("12x4".to_string()), now);

        assert_eq!(ctx.connection_state(), ConnectionState::Idle);
        assert!(ctx.link().role.is_none());
        assert!(last_message(&ctx).contains("4 digits"));
    }

    #[test]
    fn test_join_rejects_own_room() {
        let now = Instant::now();
        let net = MemoryNetwork::new();
        let mut ctx = context(&net, "1234");
        cmd(&mut ctx, UserCommand::JoinRoom("1234".to_string()), now);

        assert_eq!(ctx.connection_state(), ConnectionState::Idle);
        assert_eq!(last_message(&ctx), "cannot join your own room");
    }

    #[test]
    fn test_join_timeout() {
        let now = Instant::now();
        let net = MemoryNetwork::new();
        let mut ctx = context(&net, "1234");
        cmd(&mut ctx, UserCommand::JoinRoom("9876".to_string()), now);
        assert!(ctx.is_connecting());
        let before = ctx.session().clone();

        ctx.pump(now + Duration::from_secs(9));
        assert!(ctx.is_connecting());

        ctx.pump(now + Duration::from_secs(10));
        assert!(!ctx.is_connecting());
        assert_eq!(ctx.connection_state(), ConnectionState::Failed);
        assert_eq!(ctx.error_text(), Some("Timed out joining room 9876"));
        let note = ctx.notifications().latest().unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(ctx.session(), &before);
    }

    #[test]
    fn test_open_cancels_timeout() {
        let now = Instant::now();
        let (_host, mut guest) = linked_pair(now);
        guest.pump(now + Duration::from_secs(30));
        assert!(guest.is_connected());
        assert!(guest.error_text().is_none());
    }

    #[test]
    fn test_stale_open_after_timeout_is_ignored() {
        let now = Instant::now();
        let net = MemoryNetwork::new();
        let mut ctx = context(&net, "1234");
        cmd(&mut ctx, UserCommand::JoinRoom("9876".to_string()), now);
        ctx.pump(now + Duration::from_secs(11));

        ctx.handle(
            AppEvent::Link(LinkEvent::Opened {
                remote_id: "9876".to_string(),
            }),
            now + Duration::from_secs(12),
        );
        assert_eq!(ctx.connection_state(), ConnectionState::Failed);
        assert_eq!(ctx.phase(), Phase::Lobby);
    }

    #[test]
    fn test_retry_after_failed_join() {
        let now = Instant::now();
        let net = MemoryNetwork::new();
        let mut host = context(&net, "1111");
        let mut guest = context(&net, "2222");

        cmd(&mut guest, UserCommand::JoinRoom("1111".to_string()), now);
        guest.pump(now + Duration::from_secs(10));
        assert_eq!(guest.connection_state(), ConnectionState::Failed);

        cmd(&mut host, UserCommand::CreateRoom, now);
        cmd(&mut guest, UserCommand::JoinRoom("1111".to_string()), now);
        guest.pump(now);
        assert!(guest.is_connected());
        assert_eq!(guest.local_color(), Some(Player::Yellow));
    }

    #[test]
    fn test_play_requires_link() {
        let now = Instant::now();
        let net = MemoryNetwork::new();
        let mut ctx = context(&net, "1234");
        cmd(&mut ctx, UserCommand::Play(3), now);
        assert_eq!(last_message(&ctx), "No opponent connected");
        assert_eq!(ctx.board(), &Board::new());
    }

    #[test]
    fn test_local_move_is_sent_and_replayed() {
        let now = Instant::now();
        let (mut host, mut guest) = linked_pair(now);

        cmd(&mut host, UserCommand::Play(4), now);
        guest.pump(now);

        assert_eq!(host.board().get(5, 4), Cell::Red);
        assert_eq!(guest.board(), host.board());
        assert_eq!(guest.turn(), Player::Yellow);
        assert_eq!(host.turn(), Player::Yellow);
    }

    #[test]
    fn test_out_of_turn_local_move_is_not_sent() {
        let now = Instant::now();
        let (mut host, mut guest) = linked_pair(now);

        cmd(&mut guest, UserCommand::Play(0), now);
        host.pump(now);

        assert_eq!(last_message(&guest), "Wait for your turn");
        assert_eq!(host.board(), &Board::new());
        assert_eq!(guest.board(), &Board::new());
    }

    #[test]
    fn test_malformed_and_unknown_messages_are_dropped() {
        let now = Instant::now();
        let (host, mut guest) = linked_pair(now);
        let before = guest.session().clone();
        let notes = guest.notifications().len();

        for payload in ["garbage", r#"{"type":"emote","id":3}"#, r#"{"type":"move"}"#] {
            guest.handle(AppEvent::Link(LinkEvent::Data(payload.to_string())), now);
        }

        assert_eq!(guest.session(), &before);
        assert_eq!(guest.notifications().len(), notes);
        assert!(host.is_connected());
    }

    #[test]
    fn test_restart_propagates_without_echo() {
        let now = Instant::now();
        let (mut host, mut guest) = linked_pair(now);
        cmd(&mut host, UserCommand::Play(0), now);
        guest.pump(now);
        cmd(&mut guest, UserCommand::Play(1), now);
        host.pump(now);

        cmd(&mut guest, UserCommand::Restart, now);
        host.pump(now);
        // Nothing comes back to the guest
        guest.pump(now);

        assert_eq!(host.board(), &Board::new());
        assert_eq!(guest.board(), &Board::new());
        assert_eq!(host.turn(), Player::Red);
        assert_eq!(host.phase(), Phase::Active);
        assert_eq!(last_message(&guest), "New game started!");
        assert_eq!(last_message(&host), "Opponent started a new game");
    }

    #[test]
    fn test_peer_close_blocks_further_moves() {
        let now = Instant::now();
        let (mut host, mut guest) = linked_pair(now);
        cmd(&mut host, UserCommand::Play(2), now);
        guest.pump(now);

        guest.handle(AppEvent::Link(LinkEvent::Closed), now);

        assert_eq!(guest.connection_state(), ConnectionState::Closed);
        assert_eq!(guest.phase(), Phase::Active);
        let board = guest.board().clone();
        cmd(&mut guest, UserCommand::Play(3), now);
        assert_eq!(guest.board(), &board);
        assert_eq!(last_message(&guest), "No opponent connected");

        // No new link on a closed session
        cmd(&mut guest, UserCommand::CreateRoom, now);
        assert_eq!(guest.connection_state(), ConnectionState::Closed);
    }

    #[test]
    fn test_error_while_open_is_a_warning() {
        let now = Instant::now();
        let (mut host, _guest) = linked_pair(now);
        host.handle(AppEvent::Link(LinkEvent::Errored("hiccup".to_string())), now);

        assert!(host.is_connected());
        assert_eq!(host.error_text(), Some("hiccup"));
        let note = host.notifications().latest().unwrap();
        assert_eq!(note.kind, NotificationKind::Warning);
    }

    #[test]
    fn test_error_while_connecting_fails_the_join() {
        let now = Instant::now();
        let net = MemoryNetwork::new();
        let mut ctx = context(&net, "1234");
        cmd(&mut ctx, UserCommand::JoinRoom("5555".to_string()), now);
        ctx.transport().inject_event(LinkEvent::Errored("refused".to_string()));
        ctx.pump(now);

        assert_eq!(ctx.connection_state(), ConnectionState::Failed);
        assert_eq!(ctx.error_text(), Some("Connection error: refused"));
        assert_eq!(ctx.local_color(), None);
    }

    #[test]
    fn test_copy_room_id_effect() {
        let now = Instant::now();
        let net = MemoryNetwork::new();
        let mut ctx = context(&net, "0420");
        let effect = ctx.handle(AppEvent::Command(UserCommand::CopyRoomId), now);
        assert_eq!(effect, Some(Effect::CopyToClipboard("0420".to_string())));
    }

    #[test]
    fn test_notifications_expire_on_tick() {
        let now = Instant::now();
        let net = MemoryNetwork::new();
        let mut ctx = context(&net, "1234");
        cmd(&mut ctx, UserCommand::CreateRoom, now);
        assert_eq!(ctx.notifications().len(), 1);

        ctx.handle(AppEvent::Tick, now + Duration::from_secs(3));
        assert!(ctx.notifications().is_empty());
    }

    #[test]
    fn test_win_is_announced_on_both_sides() {
        let now = Instant::now();
        let (mut host, mut guest) = linked_pair(now);
        for col in [0, 1, 0, 1, 0, 1] {
            let mover = if host.session().is_local_turn() { &mut host } else { &mut guest };
            cmd(mover, UserCommand::Play(col), now);
            host.pump(now);
            guest.pump(now);
        }
        cmd(&mut host, UserCommand::Play(0), now);
        guest.pump(now);

        assert_eq!(host.phase(), Phase::Won(Player::Red));
        assert_eq!(guest.phase(), Phase::Won(Player::Red));
        assert_eq!(last_message(&host), "You win!");
        assert_eq!(last_message(&guest), "Red wins!");
    }
}
