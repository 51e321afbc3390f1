use tracing::{debug, warn};

use super::{Board, DropError, Landing, Player};

/// Lifecycle of one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No opponent yet.
    Lobby,
    /// Opponent connected, moves accepted.
    Active,
    Won(Player),
    Drawn,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Won(_) | Phase::Drawn)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("no game in progress")]
    NotActive,

    #[error("the game is over, restart to play again")]
    GameOver,

    #[error("it is {0}'s turn")]
    NotYourTurn(Player),

    #[error(transparent)]
    Drop(#[from] DropError),
}

/// Board plus turn ownership and game phase.
///
/// Local input goes through [`Session::attempt_local_move`], which enforces
/// that only the local color may move on its turn. Moves from the peer go
/// through [`Session::apply_remote_move`], which trusts the declared color and
/// otherwise follows the same mutation path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    board: Board,
    local_color: Option<Player>,
    turn: Player,
    phase: Phase,
}

impl Session {
    /// Fresh session in the lobby. Red moves first.
    pub fn new() -> Self {
        Session {
            board: Board::new(),
            local_color: None,
            turn: Player::Red,
            phase: Phase::Lobby,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn local_color(&self) -> Option<Player> {
        self.local_color
    }

    pub fn winner(&self) -> Option<Player> {
        match self.phase {
            Phase::Won(player) => Some(player),
            _ => None,
        }
    }

    /// True when it is the local player's move in an active game.
    pub fn is_local_turn(&self) -> bool {
        self.phase == Phase::Active && self.local_color == Some(self.turn)
    }

    /// Bind the local color and leave the lobby.
    ///
    /// The color is bound once. A second call with a different color is
    /// ignored and returns `false`.
    pub fn begin(&mut self, color: Player) -> bool {
        match self.local_color {
            Some(bound) if bound != color => {
                warn!(bound = %bound, requested = %color, "local color already bound");
                return false;
            }
            _ => self.local_color = Some(color),
        }

        if self.phase == Phase::Lobby {
            self.phase = Phase::Active;
        }
        debug!(color = %color, phase = ?self.phase, "session started");
        true
    }

    /// Play `column` for the local player.
    ///
    /// Rejected unless the game is active and it is the local color's turn.
    /// The caller is responsible for sending the accepted move to the peer.
    pub fn attempt_local_move(&mut self, column: usize) -> Result<Landing, MoveError> {
        self.ensure_active()?;
        if self.local_color != Some(self.turn) {
            return Err(MoveError::NotYourTurn(self.turn));
        }
        self.apply(column, self.turn)
    }

    /// Replay a move received from the peer.
    ///
    /// Turn order is not checked here. The peer ran the same acceptance logic
    /// before sending, so its declared color is taken as given.
    pub fn apply_remote_move(&mut self, column: usize, color: Player) -> Result<Landing, MoveError> {
        self.ensure_active()?;
        if color != self.turn {
            warn!(declared = %color, expected = %self.turn, "peer moved out of turn");
        }
        self.apply(column, color)
    }

    /// Replace the board and turn with a fresh game.
    ///
    /// A session with a bound color goes straight back to `Active`; one still
    /// in the lobby stays there.
    pub fn restart(&mut self) {
        self.board = Board::new();
        self.turn = Player::Red;
        self.phase = if self.local_color.is_some() {
            Phase::Active
        } else {
            Phase::Lobby
        };
        debug!(phase = ?self.phase, "session restarted");
    }

    fn ensure_active(&self) -> Result<(), MoveError> {
        match self.phase {
            Phase::Active => Ok(()),
            Phase::Lobby => Err(MoveError::NotActive),
            Phase::Won(_) | Phase::Drawn => Err(MoveError::GameOver),
        }
    }

    fn apply(&mut self, column: usize, color: Player) -> Result<Landing, MoveError> {
        let landing = self.board.drop_disc(column, color)?;

        if landing.win {
            self.phase = Phase::Won(color);
        } else if landing.full {
            self.phase = Phase::Drawn;
        } else {
            self.turn = color.other();
        }

        debug!(
            column,
            row = landing.row,
            color = %color,
            phase = ?self.phase,
            "disc dropped"
        );
        Ok(landing)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::test_fixtures::draw_fill;
    use crate::game::Cell;

    fn active(color: Player) -> Session {
        let mut session = Session::new();
        assert!(session.begin(color));
        session
    }

    #[test]
    fn test_initial_session() {
        let session = Session::new();
        assert_eq!(session.phase(), Phase::Lobby);
        assert_eq!(session.turn(), Player::Red);
        assert_eq!(session.local_color(), None);
        assert!(!session.is_local_turn());
    }

    #[test]
    fn test_lobby_rejects_moves() {
        let mut session = Session::new();
        assert_eq!(session.attempt_local_move(3), Err(MoveError::NotActive));
        assert_eq!(
            session.apply_remote_move(3, Player::Red),
            Err(MoveError::NotActive)
        );
        assert_eq!(session.board(), &Board::new());
    }

    #[test]
    fn test_local_move_advances_turn() {
        let mut session = active(Player::Red);
        let landing = session.attempt_local_move(3).unwrap();

        assert_eq!(landing.row, 5);
        assert_eq!(session.board().get(5, 3), Cell::Red);
        assert_eq!(session.turn(), Player::Yellow);
        assert_eq!(session.phase(), Phase::Active);
    }

    #[test]
    fn test_local_move_out_of_turn_is_rejected() {
        let mut session = active(Player::Yellow);
        let before = session.clone();

        assert_eq!(
            session.attempt_local_move(0),
            Err(MoveError::NotYourTurn(Player::Red))
        );
        assert_eq!(session, before);
    }

    #[test]
    fn test_full_column_leaves_turn_alone() {
        let mut session = active(Player::Red);
        for i in 0..6 {
            let color = if i % 2 == 0 { Player::Red } else { Player::Yellow };
            session.apply_remote_move(0, color).unwrap();
        }
        assert_eq!(session.turn(), Player::Red);

        let err = session.attempt_local_move(0).unwrap_err();
        assert_eq!(err, MoveError::Drop(DropError::ColumnFull(0)));
        assert_eq!(session.turn(), Player::Red);
    }

    #[test]
    fn test_remote_move_is_not_turn_checked() {
        let mut session = active(Player::Red);
        // Yellow moves first even though it is Red's turn
        session.apply_remote_move(2, Player::Yellow).unwrap();

        assert_eq!(session.board().get(5, 2), Cell::Yellow);
        assert_eq!(session.turn(), Player::Red);
    }

    #[test]
    fn test_vertical_win_scenario() {
        let mut session = active(Player::Red);
        for i in 0..3 {
            session.attempt_local_move(3).unwrap();
            session.apply_remote_move(i, Player::Yellow).unwrap();
        }
        let landing = session.attempt_local_move(3).unwrap();

        assert!(landing.is_terminal());
        assert_eq!(session.phase(), Phase::Won(Player::Red));
        assert_eq!(session.winner(), Some(Player::Red));
        // Turn does not advance on a terminal drop
        assert_eq!(session.turn(), Player::Red);
    }

    #[test]
    fn test_moves_rejected_after_win() {
        let mut session = active(Player::Red);
        for _ in 0..4 {
            session.apply_remote_move(0, Player::Red).unwrap();
        }
        assert_eq!(session.phase(), Phase::Won(Player::Red));
        assert_eq!(session.attempt_local_move(1), Err(MoveError::GameOver));
        assert_eq!(
            session.apply_remote_move(1, Player::Yellow),
            Err(MoveError::GameOver)
        );
    }

    #[test]
    fn test_draw_scenario() {
        let mut session = active(Player::Red);
        for (col, color) in draw_fill() {
            session.apply_remote_move(col, color).unwrap();
        }

        assert_eq!(session.phase(), Phase::Drawn);
        assert_eq!(session.winner(), None);
        assert!(session.board().check_draw());
    }

    #[test]
    fn test_restart_resets_everything_but_color() {
        let mut session = active(Player::Yellow);
        for _ in 0..4 {
            session.apply_remote_move(6, Player::Red).unwrap();
        }
        assert!(session.phase().is_terminal());

        session.restart();

        assert_eq!(session.board(), &Board::new());
        assert_eq!(session.turn(), Player::Red);
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.local_color(), Some(Player::Yellow));
    }

    #[test]
    fn test_restart_is_idempotent() {
        let mut session = active(Player::Red);
        session.attempt_local_move(1).unwrap();
        session.restart();
        let once = session.clone();
        session.restart();
        assert_eq!(session, once);
    }

    #[test]
    fn test_restart_in_lobby_stays_in_lobby() {
        let mut session = Session::new();
        session.restart();
        assert_eq!(session.phase(), Phase::Lobby);
    }

    #[test]
    fn test_color_binds_once() {
        let mut session = active(Player::Red);
        assert!(!session.begin(Player::Yellow));
        assert_eq!(session.local_color(), Some(Player::Red));
        // Rebinding the same color is harmless
        assert!(session.begin(Player::Red));
    }

    #[test]
    fn test_turn_enforced_in_every_phase() {
        for color in [Player::Red, Player::Yellow] {
            let mut lobby = Session::new();
            assert!(lobby.attempt_local_move(0).is_err());

            let mut session = active(color);
            let accepted = session.attempt_local_move(0).is_ok();
            assert_eq!(accepted, color == Player::Red);

            let mut won = active(color);
            for _ in 0..4 {
                won.apply_remote_move(5, Player::Red).unwrap();
            }
            assert!(won.attempt_local_move(0).is_err());

            let mut drawn = active(color);
            for (col, player) in draw_fill() {
                drawn.apply_remote_move(col, player).unwrap();
            }
            assert_eq!(drawn.phase(), Phase::Drawn);
            assert_eq!(drawn.attempt_local_move(0), Err(MoveError::GameOver));
        }
    }
}
