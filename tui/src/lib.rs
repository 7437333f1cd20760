//! TUI rendering for tasklab using ratatui.

mod input;
mod theme;

pub use input::{InputPump, handle_events};
pub use theme::{Palette, palette, spinner_frame};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use tasklab_engine::App;
use tasklab_types::ui::Button;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &App) {
    let palette = palette();

    // Clear with background color
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(4), // Greeting + error text
            Constraint::Length(3), // Emitter value
            Constraint::Length(3), // Callback value
            Constraint::Length(3), // Buttons
            Constraint::Min(0),    // Filler
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0], &palette);
    draw_emitter_panel(frame, app, chunks[1], &palette);
    draw_callback_panel(frame, app, chunks[2], &palette);
    draw_buttons(frame, app, chunks[3], &palette);
    draw_status_bar(frame, app, chunks[5], &palette);
}

fn panel_block(title: &str, palette: &Palette) -> Block<'static> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.bg_border))
        .style(Style::default().bg(palette.bg_panel))
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let mut lines = vec![Line::from(Span::styled(
        format!("Hello {}", app.name()),
        palette.greeting(app.has_error()),
    ))];

    if let Some(error_text) = app.error_text() {
        lines.push(Line::from(Span::styled(
            error_text.to_string(),
            Style::default().fg(palette.error),
        )));
    }

    let header = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::NONE)
            .style(Style::default().bg(palette.bg_dark)),
    );
    frame.render_widget(header, area);
}

fn draw_emitter_panel(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let mut spans = vec![
        Span::styled("Emitter value: ", Style::default().fg(palette.text_muted)),
        Span::styled(
            app.current_int().to_string(),
            Style::default().fg(palette.accent),
        ),
    ];
    if app.emitter_active() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            spinner_frame(app.tick_count()),
            Style::default().fg(palette.accent),
        ));
    }

    let panel = Paragraph::new(Line::from(spans)).block(panel_block("Emitter", palette));
    frame.render_widget(panel, area);
}

fn draw_callback_panel(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let line = match app.callback_value() {
        Some(value) => {
            let color = if value == "Success" {
                palette.success
            } else {
                palette.error
            };
            Line::from(Span::styled(value.to_string(), Style::default().fg(color)))
        }
        None => Line::from(Span::styled(
            "<- Press Either button",
            Style::default().fg(palette.text_muted),
        )),
    };

    let panel = Paragraph::new(line).block(panel_block("Callback", palette));
    frame.render_widget(panel, area);
}

fn draw_buttons(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let constraints: Vec<Constraint> = Button::ALL
        .iter()
        .map(|b| Constraint::Length(b.label().len() as u16 + 6))
        .collect();

    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (button, cell) in Button::ALL.into_iter().zip(cells.iter()) {
        let focused = app.focused_button() == button;
        let text = format!("[{}] {}", button.shortcut(), button.label());
        let widget = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(palette.button(focused))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(if focused {
                        Style::default().fg(palette.accent)
                    } else {
                        Style::default().fg(palette.bg_border)
                    }),
            );
        frame.render_widget(widget, *cell);
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let mut help = String::from("←/→ focus · enter press · s/c/f/w/a shortcuts · q quit");
    if app.emitter_active() {
        help.push_str("  [emitter running]");
    }

    let bar = Paragraph::new(Line::from(Span::styled(
        help,
        Style::default().fg(palette.text_muted),
    )));
    frame.render_widget(bar, area);
}
