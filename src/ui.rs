use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use crate::app::{App, InputMode};
use crate::session::Sender;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    if app.session.is_authenticated() {
        render_chat_screen(app, frame, body_area);
    } else {
        app.chat_area = None;
        render_login_gate(app, frame, body_area);
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let auth_indicator = if app.session.is_authenticated() {
        " [signed in]"
    } else {
        ""
    };

    let title = Line::from(vec![
        Span::styled(" Weather Chat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(auth_indicator, Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = if !app.session.is_authenticated() {
        " SIGN IN "
    } else {
        " CHAT "
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = if !app.session.is_authenticated() {
        if app.login_in_progress() {
            vec![
                Span::styled(" waiting for approval ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]
        } else {
            vec![
                Span::styled(" s ", key_style),
                Span::styled(" sign in ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]
        }
    } else {
        match app.input_mode {
            InputMode::Normal => vec![
                Span::styled(" i ", key_style),
                Span::styled(" type ", label_style),
                Span::styled(" j/k ", key_style),
                Span::styled(" scroll ", label_style),
                Span::styled(" o ", key_style),
                Span::styled(" sign out ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ],
            InputMode::Editing => {
                if app.session.is_pending() {
                    vec![
                        Span::styled(" waiting for reply ", label_style),
                        Span::styled(" Esc ", key_style),
                        Span::styled(" stop typing ", label_style),
                    ]
                } else {
                    vec![
                        Span::styled(" Enter ", key_style),
                        Span::styled(" send ", label_style),
                        Span::styled(" Esc ", key_style),
                        Span::styled(" stop typing ", label_style),
                    ]
                }
            }
        }
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_login_gate(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Sign in ");

    let mut lines: Vec<Line> = vec![Line::default()];

    if app.auth.is_none() {
        lines.push(Line::from(Span::styled(
            "Sign-in is not configured.",
            Style::default().fg(Color::Red),
        )));
        lines.push(Line::default());
        lines.push(Line::from(
            "Set GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET and restart.",
        ));
    } else if let Some(prompt) = &app.device_prompt {
        lines.push(Line::from("To sign in with Google, visit"));
        lines.push(Line::from(Span::styled(
            prompt.verification_url.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from("and enter the code"));
        lines.push(Line::from(Span::styled(
            prompt.user_code.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::default());
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Waiting for approval{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    } else if app.login_in_progress() {
        lines.push(Line::from(Span::styled(
            "Contacting Google...",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    } else {
        lines.push(Line::from("Sign in with Google to start chatting."));
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::raw("Press "),
            Span::styled("s", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" to sign in."),
        ]));
    }

    let gate = Paragraph::new(Text::from(lines))
        .block(block)
        .alignment(ratatui::layout::Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(gate, area);
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    // Conversation on top, input at the bottom
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store area for mouse hit-testing
    app.chat_area = Some(chat_area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    render_conversation(app, frame, chat_area);
    render_input(app, frame, input_area);
}

fn render_conversation(app: &App, frame: &mut Frame, area: Rect) {
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    let chat_text = if app.session.messages().is_empty() && !app.session.is_pending() {
        Text::from(Span::styled(
            "No messages yet. Start the conversation!",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in app.session.messages() {
            match msg.sender {
                Sender::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                }
                Sender::Bot => {
                    lines.push(Line::from(Span::styled(
                        "Bot:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                }
            }
            for line in msg.text.lines() {
                lines.push(Line::from(line.to_string()));
            }
            lines.push(Line::default());
        }

        if app.session.is_pending() {
            lines.push(Line::from(Span::styled(
                "Bot:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Bot is typing{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let input_border_color = if app.session.is_pending() {
        Color::DarkGray
    } else if app.input_mode == InputMode::Editing {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(input_border_color))
        .title(" Message (i to type) ");

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let (text, style) = if app.input.is_empty() && app.input_mode == InputMode::Normal {
        (
            "Type your message...".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        // Get the visible slice of the input
        let visible_text: String = app
            .input
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        (visible_text, Style::default().fg(Color::Cyan))
    };

    let input = Paragraph::new(text).style(style).block(input_block);
    frame.render_widget(input, area);

    // Show cursor when editing (the field is disabled while pending)
    if app.input_mode == InputMode::Editing && !app.session.is_pending() {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}
