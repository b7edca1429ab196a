use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Row, Table},
    Terminal,
};
use tokio::task::JoinHandle;

use crate::{
    core::{error::DashboardError, state::DashboardState, types::Detection},
    ui::{
        app::App,
        render::{detection_rows, report_rows, stat_cards, RowAction},
    },
    workflows::{progress::ProgressTracker, report::ReportOutcome, Engine},
};

pub async fn run_tui(
    engine: Arc<Engine>,
    mut state: DashboardState,
    mut app: App,
) -> Result<(), DashboardError> {
    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tracker, progress_rx) = ProgressTracker::channel();
    let mut analyze_task: Option<JoinHandle<Result<Detection, DashboardError>>> = None;
    let mut report_task: Option<JoinHandle<Result<ReportOutcome, DashboardError>>> = None;

    loop {
        app.progress = *progress_rx.borrow();
        terminal.draw(|f| draw_ui(f, &app, &state))?;

        if crossterm::event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Esc => break,
                    KeyCode::Tab => {
                        app.cycle_type(state.catalog().len());
                        if let Some(i) = app.type_cursor {
                            let name = state.catalog()[i].name.clone();
                            app.log(format!("[+] Detection type: {}", name));
                        }
                    }
                    KeyCode::Enter => {
                        if !app.input.trim().is_empty() {
                            app.attach_input_file();
                        } else if app.can_analyze() && !app.analyzing && analyze_task.is_none() {
                            if let (Some(i), Some(file)) =
                                (app.type_cursor, app.selected_file.clone())
                            {
                                let type_id = state.catalog()[i].id.clone();
                                app.begin_analysis(state.type_name(&type_id), &file.filename);
                                let engine = engine.clone();
                                let tracker = tracker.clone();
                                analyze_task = Some(tokio::spawn(async move {
                                    engine.analyze(&type_id, &file, &tracker).await
                                }));
                            }
                        }
                    }
                    KeyCode::Up => {
                        app.row_cursor = app.row_cursor.saturating_sub(1);
                    }
                    KeyCode::Down => {
                        let max = state.detections().len().saturating_sub(1);
                        app.row_cursor = (app.row_cursor + 1).min(max);
                    }
                    KeyCode::Backspace => {
                        app.input.pop();
                    }
                    KeyCode::Char('q') if app.input.is_empty() => break,
                    KeyCode::Char('g') if app.input.is_empty() => {
                        report_action(&engine, &state, &mut app, &mut report_task);
                    }
                    KeyCode::Char(c) => app.input.push(c),
                    _ => {}
                }
            }
        }

        // Async analyze completion handling
        if let Some(handle) = analyze_task.take() {
            if handle.is_finished() {
                match handle.await {
                    Ok(Ok(detection)) => {
                        if let Err(err) = state.record_detection(detection.clone()) {
                            app.fail_analysis(&err.to_string());
                        } else {
                            app.complete_analysis(&detection);
                        }
                    }
                    Ok(Err(err)) => app.fail_analysis(&err.to_string()),
                    Err(join_err) => app.fail_analysis(&join_err.to_string()),
                }
            } else {
                analyze_task = Some(handle);
            }
        }

        // Async report completion handling
        if let Some(handle) = report_task.take() {
            if handle.is_finished() {
                app.reporting = false;
                match handle.await {
                    Ok(Ok(outcome)) => {
                        if let Some(remote_err) = &outcome.remote_error {
                            app.notice = Some(format!(
                                "Remote report failed ({}); generated locally",
                                remote_err
                            ));
                        } else {
                            app.notice = Some("Report generated successfully".to_string());
                        }
                        let artifact = outcome.report.artifact.to_string();
                        match state.record_report(outcome.report) {
                            Ok(()) => app.log(format!("[+] Report ready: {}", artifact)),
                            Err(err) => app.log(format!("[!] {}", err)),
                        }
                    }
                    Ok(Err(err)) => {
                        app.notice = Some(format!("Report failed: {}", err));
                        app.log(format!("[!] {}", err));
                    }
                    Err(join_err) => app.log(format!("[!] {}", join_err)),
                }
            } else {
                report_task = Some(handle);
            }
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Generate for rows without a report, view for rows that have one.
fn report_action(
    engine: &Arc<Engine>,
    state: &DashboardState,
    app: &mut App,
    report_task: &mut Option<JoinHandle<Result<ReportOutcome, DashboardError>>>,
) {
    let rows = detection_rows(state);
    let Some(row) = rows.get(app.row_cursor) else {
        return;
    };
    match row.action {
        RowAction::View => {
            if let Some(report) = state.report_for(row.id) {
                app.notice = Some(format!("Report {}: {}", report.id, report.artifact));
            }
        }
        RowAction::Generate => {
            if app.reporting || report_task.is_some() {
                return;
            }
            let Some(detection) = state.detection(row.id).cloned() else {
                return;
            };
            app.reporting = true;
            app.log(format!("[~] Generating report for {}...", detection.id));
            let engine = engine.clone();
            *report_task = Some(tokio::spawn(async move {
                engine.generate_report(&detection).await
            }));
        }
    }
}

fn draw_ui(f: &mut ratatui::Frame, app: &App, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(7),
                Constraint::Length(4),
                Constraint::Length(6),
            ]
            .as_ref(),
        )
        .split(f.size());

    // Header with the selected detection type
    let type_label = app
        .type_cursor
        .map(|i| state.catalog()[i].name.clone())
        .unwrap_or_else(|| "none (TAB to pick)".to_string());
    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            " VERIDASH ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("type: "),
        Span::styled(type_label, Style::default().fg(Color::Yellow)),
        Span::raw(" | file: "),
        Span::styled(
            app.selected_file
                .as_ref()
                .map(|fi| fi.filename.clone())
                .unwrap_or_else(|| "none".to_string()),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(" | ENTER=analyze g=report q=quit"),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    // Statistics cards
    let mut stat_spans: Vec<Span> = Vec::new();
    for (i, card) in stat_cards(state).iter().enumerate() {
        if i > 0 {
            stat_spans.push(Span::raw(" | "));
        }
        stat_spans.push(Span::raw(format!("{}: ", card.label)));
        stat_spans.push(Span::styled(
            card.value.to_string(),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ));
    }
    let stats = Paragraph::new(Line::from(stat_spans))
        .block(Block::default().title(" STATISTICS ").borders(Borders::ALL));
    f.render_widget(stats, chunks[1]);

    // Detections table
    let detection_items: Vec<Row> = detection_rows(state)
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i == app.row_cursor {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Row::new(vec![
                row.id.to_string(),
                row.type_name,
                row.filename,
                row.confidence,
                row.timestamp,
                row.action.label().to_string(),
            ])
            .style(style)
        })
        .collect();
    let detections = Table::new(
        detection_items,
        [
            Constraint::Length(14),
            Constraint::Length(20),
            Constraint::Min(16),
            Constraint::Length(10),
            Constraint::Length(20),
            Constraint::Length(9),
        ],
    )
    .header(
        Row::new(vec!["ID", "Type", "File", "Conf", "Timestamp", "Action"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .title(" DETECTIONS (Up/Down, g=generate/view) ")
            .borders(Borders::ALL),
    );
    f.render_widget(detections, chunks[2]);

    // Reports table
    let report_items: Vec<Row> = report_rows(state)
        .into_iter()
        .map(|row| {
            Row::new(vec![
                row.id,
                row.type_name,
                row.generated_at,
                row.status,
                row.artifact,
            ])
        })
        .collect();
    let reports = Table::new(
        report_items,
        [
            Constraint::Length(14),
            Constraint::Length(20),
            Constraint::Length(20),
            Constraint::Length(10),
            Constraint::Min(20),
        ],
    )
    .header(
        Row::new(vec!["Report", "Type", "Generated", "Status", "Artifact"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().title(" EVIDENCE REPORTS ").borders(Borders::ALL));
    f.render_widget(reports, chunks[3]);

    // Progress / latest result / errors
    if app.analyzing {
        let gauge = Gauge::default()
            .block(Block::default().title(" ANALYZING ").borders(Borders::ALL))
            .gauge_style(Style::default().fg(Color::Yellow))
            .ratio(f64::from(app.progress) / 100.0);
        f.render_widget(gauge, chunks[4]);
    } else {
        let mut lines: Vec<Line> = Vec::new();
        if let Some(err) = &app.error {
            lines.push(Line::from(Span::styled(
                err.clone(),
                Style::default().fg(Color::Red),
            )));
        } else if let Some(det) = &app.last_result {
            lines.push(Line::from(vec![
                Span::raw(format!("ID: {} | ", det.id)),
                Span::raw(format!("Type: {} | ", state.type_name(&det.type_id))),
                Span::styled(
                    format!(
                        "Confidence: {}",
                        crate::core::types::format_confidence(det.confidence)
                    ),
                    Style::default().fg(Color::Green),
                ),
                Span::raw(" | press g to generate a report"),
            ]));
        } else {
            lines.push(Line::from("Attach a file and press ENTER to analyze"));
        }
        if let Some(notice) = &app.notice {
            lines.push(Line::from(Span::styled(
                notice.clone(),
                Style::default().fg(Color::Cyan),
            )));
        }
        let result = Paragraph::new(lines)
            .block(Block::default().title(" RESULT ").borders(Borders::ALL));
        f.render_widget(result, chunks[4]);
    }

    // Input + logs
    let bottom_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)].as_ref())
        .split(chunks[5]);

    let input = Paragraph::new(app.input.as_str())
        .block(Block::default().title(" FILENAME ").borders(Borders::ALL));
    f.render_widget(input, bottom_chunks[0]);

    let log_items: Vec<ListItem> = app
        .logs
        .iter()
        .rev()
        .take(4)
        .map(|log| ListItem::new(Line::from(vec![Span::raw("> "), Span::raw(log.clone())])))
        .collect();
    let logs = List::new(log_items)
        .block(Block::default().title(" ACTIVITY ").borders(Borders::ALL));
    f.render_widget(logs, bottom_chunks[1]);
}
