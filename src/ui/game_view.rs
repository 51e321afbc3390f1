use crate::game::{Board, Cell, Phase, Player, COLS, ROWS};
use crate::net::{ConnectionState, PeerTransport};
use crate::notify::{Notification, NotificationKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::app::{App, InputMode};

const MAX_NOTIFICATIONS: usize = 3;

pub fn render<T: PeerTransport>(frame: &mut Frame, app: &App<T>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),                             // Header
            Constraint::Min(11),                               // Board
            Constraint::Length(MAX_NOTIFICATIONS as u16 + 2), // Notifications
            Constraint::Length(3),                             // Controls
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_board(frame, app.context().board(), app.selected_column(), chunks[1]);
    render_notifications(frame, app.context().notifications().active(), chunks[2]);
    render_controls(frame, app.input_mode(), chunks[3]);
}

fn player_color(player: Player) -> Color {
    match player {
        Player::Red => Color::Red,
        Player::Yellow => Color::Yellow,
    }
}

fn render_header<T: PeerTransport>(frame: &mut Frame, app: &App<T>, area: Rect) {
    let ctx = app.context();

    let (status, color) = match ctx.phase() {
        Phase::Lobby => ("Waiting for an opponent".to_string(), Color::Gray),
        Phase::Active if ctx.session().is_local_turn() => {
            ("Your turn".to_string(), player_color(ctx.turn()))
        }
        Phase::Active => (format!("{}'s turn", ctx.turn()), player_color(ctx.turn())),
        Phase::Won(winner) => (format!("{winner} wins!"), player_color(winner)),
        Phase::Drawn => ("It's a draw!".to_string(), Color::Cyan),
    };

    let you = ctx
        .local_color()
        .or(ctx.link().role)
        .map(|p| p.name())
        .unwrap_or("-");

    let link_color = match ctx.connection_state() {
        ConnectionState::Open => Color::Green,
        ConnectionState::Failed | ConnectionState::Closed => Color::Red,
        _ => Color::DarkGray,
    };
    let mut link_line = vec![
        Span::raw(format!("Room {}  |  You: {}  |  ", ctx.room_id(), you)),
        Span::styled(ctx.connection_state().label(), Style::default().fg(link_color)),
    ];
    if let Some(remote) = &ctx.link().remote_id {
        link_line.push(Span::raw(format!(" ({remote})")));
    }
    if let Some(error) = ctx.error_text() {
        link_line.push(Span::styled(format!("  {error}"), Style::default().fg(Color::Red)));
    }

    let mut title_style = Style::default();
    if matches!(ctx.phase(), Phase::Won(_)) {
        title_style = title_style.fg(color).add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK);
    }

    let header = Paragraph::new(vec![
        Line::from(Span::styled(status, Style::default().fg(color).add_modifier(Modifier::BOLD))),
        Line::from(link_line),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled("Connect Four", title_style)),
    );

    frame.render_widget(header, area);
}

fn render_board(frame: &mut Frame, board: &Board, selected_column: usize, area: Rect) {
    let mut lines = Vec::new();

    // Column numbers with selection indicator
    let mut col_line = vec![Span::raw("   ")]; // Padding (3 chars to match "  ║")
    for col in 0..COLS {
        if col == selected_column {
            col_line.push(Span::styled(
                format!(" {} ", col + 1),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ));
        } else {
            col_line.push(Span::raw(format!(" {} ", col + 1)));
        }
    }
    col_line.push(Span::raw("  ")); // Suffix padding to match " ║"
    lines.push(Line::from(col_line));

    // Top border
    lines.push(Line::from("  ╔══════════════════════╗"));

    // Board rows
    for row in 0..ROWS {
        let mut row_spans = vec![Span::raw("  ║")];

        for &cell in board.row(row) {
            let (symbol, color) = match cell {
                Cell::Empty => (" . ", Color::DarkGray),
                Cell::Red => (" ● ", Color::Red),
                Cell::Yellow => (" ● ", Color::Yellow),
            };
            row_spans.push(Span::styled(symbol, Style::default().fg(color)));
        }

        row_spans.push(Span::raw(" ║"));
        lines.push(Line::from(row_spans));
    }

    // Bottom border
    lines.push(Line::from("  ╚══════════════════════╝"));

    let board_widget = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(board_widget, area);
}

fn render_notifications<'a>(
    frame: &mut Frame,
    notifications: impl Iterator<Item = &'a Notification>,
    area: Rect,
) {
    let notes: Vec<_> = notifications.collect();
    let lines: Vec<Line> = notes
        .iter()
        .rev()
        .take(MAX_NOTIFICATIONS)
        .rev()
        .map(|n| {
            let color = match n.kind {
                NotificationKind::Info => Color::White,
                NotificationKind::Success => Color::Green,
                NotificationKind::Warning => Color::Yellow,
                NotificationKind::Error => Color::Red,
            };
            Line::from(Span::styled(n.message.clone(), Style::default().fg(color)))
        })
        .collect();

    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, mode: &InputMode, area: Rect) {
    let line = match mode {
        InputMode::Normal => Line::from(
            "←/→: Move  |  Enter: Drop  |  H: Host  |  J: Join  |  C: Copy code  |  R: Restart  |  Q: Quit",
        ),
        InputMode::JoinCode(code) => Line::from(vec![
            Span::raw("Room code: "),
            Span::styled(
                format!("{code:_<4}"),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  |  Enter: Join  |  Esc: Cancel"),
        ]),
    };

    let controls = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Controls"));

    frame.render_widget(controls, area);
}
