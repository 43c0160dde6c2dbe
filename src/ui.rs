use crate::app::{App, PendingDelete, TaskDetails, View};
use crate::form::{FormField, TaskForm};
use crate::models::TaskUser;
use crate::notify::ToastKind;
use crate::task::{progress_percentage, task_duration, Priority, Task, TaskStatus};
use crate::worker::{ApiEvent, Worker};
use chrono::Utc;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Cell, Clear, Gauge, List, ListItem, ListState, Paragraph, Row, Table,
        TableState, Tabs, Wrap,
    },
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;

const TICK: Duration = Duration::from_millis(200);

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    worker: &mut Worker,
    events: &mut UnboundedReceiver<ApiEvent>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        while let Ok(api_event) = events.try_recv() {
            let requests = app.handle_event(api_event);
            worker.dispatch_all(requests);
        }
        worker.dispatch_all(app.tick(Instant::now()));

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let requests = app.handle_key(key, Instant::now());
                    worker.dispatch_all(requests);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    match app.view {
        View::Login => draw_login(f, app, chunks[1]),
        View::MyTasks => draw_my_tasks(f, app, chunks[1]),
        View::Projects => draw_projects(f, app, chunks[1]),
        View::Board => draw_board(f, app, chunks[1]),
        View::Dashboard => draw_dashboard(f, app, chunks[1]),
        View::Coins => draw_coins(f, app, chunks[1]),
    }
    draw_footer(f, app, chunks[2]);

    if let Some(details) = &app.details {
        draw_details(f, details);
    }
    if let Some(form) = &app.form {
        draw_form(f, app, form);
    }
    if let Some(input) = &app.project_input {
        draw_project_input(f, input);
    }
    if let Some(pending) = &app.pending_delete {
        draw_confirm(f, pending);
    }
    if app.show_help {
        draw_help(f);
    }
    draw_toasts(f, app);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Min(0), Constraint::Length(26)])
        .split(area);

    let titles: Vec<String> = View::TABS
        .iter()
        .enumerate()
        .map(|(i, view)| format!("{} {}", i + 1, view.title()))
        .collect();
    let selected = View::TABS.iter().position(|v| *v == app.view).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("axo-tasks"))
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, chunks[0]);

    let balance = Paragraph::new(Line::from(vec![
        Span::styled("◎ ", Style::default().fg(Color::Yellow)),
        Span::styled(
            app.coins().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" AXO"),
    ]))
    .alignment(Alignment::Right)
    .block(Block::default().borders(Borders::ALL).title(
        app.user
            .as_ref()
            .map(|u| u.display_name().to_string())
            .unwrap_or_default(),
    ));
    f.render_widget(balance, chunks[1]);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hint = match app.view {
        View::Login => "paste the redirected URL, Enter: log in, Esc: quit",
        View::MyTasks => "j/k: select  Enter: details  c: complete  n: new  e: edit  d: delete  ?: help",
        View::Projects => "j/k: select  Enter: open board  n: new project  d: delete  ?: help",
        View::Board => "h/l: column  j/k: card  H/L or Shift+←/→: move  c: done  Enter: details  ?: help",
        View::Dashboard | View::Coins => "r: refresh  1-5: switch view  q: quit  ?: help",
    };
    f.render_widget(
        Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn draw_login(f: &mut Frame, app: &App, area: Rect) {
    let area = centered_rect(70, 60, area);
    let text = Text::from(vec![
        Line::from(Span::styled(
            "Welcome back",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("Login to access your tasks and rewards"),
        Line::from(""),
        Line::from("1. Open this address in a browser and sign in with Google:"),
        Line::from(Span::styled(
            app.login_url.clone(),
            Style::default().fg(Color::Cyan),
        )),
        Line::from("2. Paste the address you were redirected to below and press Enter."),
        Line::from(""),
        Line::from(vec![
            Span::raw("> "),
            Span::styled(app.login_input.clone(), Style::default().fg(Color::White)),
        ]),
        Line::from(if app.login_pending {
            "Authenticating..."
        } else {
            ""
        }),
    ]);
    let login = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Login"));
    f.render_widget(login, area);
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Todo => Color::Red,
        TaskStatus::InProgress => Color::Yellow,
        TaskStatus::Done => Color::Green,
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

fn draw_my_tasks(f: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec!["Title", "Status", "Priority", "Coins", "Project", "Due"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = app
        .my_tasks
        .iter()
        .map(|t| {
            Row::new(vec![
                Cell::from(t.title.clone()),
                Cell::from(t.status.title()).style(Style::default().fg(status_color(t.status))),
                Cell::from(t.priority.as_str())
                    .style(Style::default().fg(priority_color(t.priority))),
                Cell::from(format!("{} AXO", t.coins)),
                Cell::from(
                    t.project
                        .as_ref()
                        .map(|p| p.name.clone())
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Cell::from(t.due_label()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(34),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Percentage(20),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title("My Tasks"))
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = TableState::default();
    if !app.my_tasks.is_empty() {
        state.select(Some(app.my_task_selected));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_projects(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .projects
        .iter()
        .map(|p| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    p.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(vec![
                    Span::raw(format!("  {}", p.description.as_deref().unwrap_or_default())),
                    Span::styled(
                        format!("  ({}/{} done)", p.completed_tasks(), p.tasks.len()),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Projects"))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if !app.projects.is_empty() {
        state.select(Some(app.project_selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_board(f: &mut Frame, app: &App, area: Rect) {
    let board = &app.board;
    let title = app
        .board_project
        .as_ref()
        .map(|p| format!("{} Tasks", p.name))
        .unwrap_or_else(|| "Board".to_string());

    let outer = Block::default().borders(Borders::NONE).title(title);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(inner);

    for (i, status) in TaskStatus::ALL.iter().enumerate() {
        let tasks = board.get_tasks_by_status(*status);
        let items: Vec<ListItem> = tasks
            .iter()
            .map(|t| {
                let pending = if board.is_pending(t.id) { " …" } else { "" };
                let avatar = t.user.as_ref().map_or('-', TaskUser::initial);
                ListItem::new(vec![
                    Line::from(vec![
                        Span::raw(format!("[#{}] ", t.id)),
                        Span::styled(t.title.clone(), Style::default().fg(Color::White)),
                        Span::styled(pending, Style::default().fg(Color::DarkGray)),
                    ]),
                    Line::from(vec![
                        Span::raw(format!("  ({avatar}) {} · ", t.owner_name())),
                        Span::styled(
                            format!("{} AXO", t.coins),
                            Style::default().fg(Color::Yellow),
                        ),
                        Span::raw(" · "),
                        Span::styled(
                            t.priority.as_str(),
                            Style::default().fg(priority_color(t.priority)),
                        ),
                        Span::raw(format!(" (Due: {})", t.due_label())),
                    ]),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!("{} ({})", status.title(), tasks.len()))
                    .borders(Borders::ALL)
                    .border_style(if board.selected_status == i {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default()
                    }),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

        let mut state = ListState::default();
        if board.selected_status == i && !tasks.is_empty() {
            state.select(Some(board.selected_task));
        }
        f.render_stateful_widget(list, chunks[i], &mut state);
    }
}

fn draw_dashboard(f: &mut Frame, app: &App, area: Rect) {
    let Some(data) = &app.dashboard else {
        f.render_widget(
            Paragraph::new("Loading dashboard...")
                .block(Block::default().borders(Borders::ALL).title("Dashboard")),
            area,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(6),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let overview = &data.overview;
    let summary = Paragraph::new(vec![
        Line::from(format!("Total Projects: {}", overview.total_projects)),
        Line::from(format!("Total Users:    {}", overview.total_users)),
        Line::from(format!("Total Tasks:    {}", overview.total_tasks)),
        Line::from(vec![
            Span::styled(
                format!("To Do {}  ", overview.tasks_by_status.todo),
                Style::default().fg(status_color(TaskStatus::Todo)),
            ),
            Span::styled(
                format!("In Progress {}  ", overview.tasks_by_status.in_progress),
                Style::default().fg(status_color(TaskStatus::InProgress)),
            ),
            Span::styled(
                format!("Done {}", overview.tasks_by_status.done),
                Style::default().fg(status_color(TaskStatus::Done)),
            ),
        ]),
    ])
    .block(Block::default().borders(Borders::ALL).title("Overview"));
    f.render_widget(summary, chunks[0]);

    let rate = overview.completion_rate.clamp(0.0, 100.0);
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Completion Rate"))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(rate.round() as u16)
        .label(format!("{rate:.1}%"));
    f.render_widget(gauge, chunks[1]);

    let tables = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);

    let project_rows: Vec<Row> = data
        .projects
        .iter()
        .map(|p| {
            let coins: u64 = p.tasks.iter().map(|t| t.coins).sum();
            Row::new(vec![
                p.name.clone(),
                p.tasks.len().to_string(),
                p.completed_tasks().to_string(),
                coins.to_string(),
            ])
        })
        .collect();
    let projects = Table::new(
        project_rows,
        [
            Constraint::Percentage(55),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(8),
        ],
    )
    .header(
        Row::new(vec!["Project", "Tasks", "Done", "AXO"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title("Projects"));
    f.render_widget(projects, tables[0]);

    let user_rows: Vec<Row> = data
        .users
        .iter()
        .map(|u| {
            Row::new(vec![
                u.name.clone(),
                u.tasks_count.to_string(),
                u.coins.to_string(),
            ])
        })
        .collect();
    let users = Table::new(
        user_rows,
        [
            Constraint::Percentage(60),
            Constraint::Length(6),
            Constraint::Length(8),
        ],
    )
    .header(
        Row::new(vec!["User", "Tasks", "AXO"]).style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title("Users Summary"));
    f.render_widget(users, tables[1]);
}

fn draw_coins(f: &mut Frame, app: &App, area: Rect) {
    let lines = match &app.user {
        Some(user) => vec![
            Line::from(Span::styled(
                format!("{} AXO", user.coins),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!("Name:  {}", user.display_name())),
            Line::from(format!("Email: {}", user.email)),
            Line::from(""),
            Line::from(Span::styled(
                "Coins are credited by the server when a task is marked done.",
                Style::default().fg(Color::DarkGray),
            )),
        ],
        None => vec![Line::from("Loading user data...")],
    };
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("AXO Balance")),
        area,
    );
}

fn draw_details(f: &mut Frame, details: &TaskDetails) {
    let area = centered_rect(70, 80, f.area());
    f.render_widget(Clear, area);

    let task: &Task = &details.task;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(task.title.clone())
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(4),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(inner);

    let now = Utc::now();
    let created = task.created_at.as_deref().unwrap_or_default();
    let meta = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                task.status.as_str().replace('_', " "),
                Style::default().fg(status_color(task.status)),
            ),
            Span::raw("   "),
            Span::styled(
                format!("{} AXO", task.coins),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw("   "),
            Span::styled(
                format!("{} Priority", task.priority),
                Style::default().fg(priority_color(task.priority)),
            ),
        ]),
        Line::from(format!(
            "{} <{}>",
            task.owner_name(),
            task.user.as_ref().map(|u| u.email.as_str()).unwrap_or_default()
        )),
        Line::from(format!(
            "Due: {}   Open for: {}",
            task.due_label(),
            task_duration(created, now).unwrap_or_else(|| "-".to_string())
        )),
        Line::from(if details.loading { "Loading..." } else { "" }),
    ]);
    f.render_widget(meta, chunks[0]);

    let description_title = if details.editing {
        "Task Description (editing, Esc to stop)"
    } else {
        "Task Description (e to edit)"
    };
    let mut description = details.editor.draft().to_string();
    if details.editing {
        description.push('▏');
    }
    f.render_widget(
        Paragraph::new(description)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(description_title)),
        chunks[1],
    );

    let percent = task
        .due_date
        .as_deref()
        .and_then(|due| progress_percentage(created, due, now))
        .unwrap_or(0);
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(Color::Blue))
        .percent(u16::from(percent))
        .label(format!("{percent}% Complete"));
    f.render_widget(gauge, chunks[2]);
}

fn draw_form(f: &mut Frame, app: &App, form: &TaskForm) {
    let area = centered_rect(50, 50, f.area());
    f.render_widget(Clear, area);

    let lines: Vec<Line> = FormField::ALL
        .iter()
        .map(|field| {
            let value = match field {
                FormField::Title => form.title.clone(),
                FormField::Status => format!("◂ {} ▸", form.status.title()),
                FormField::Coins => form.coins.clone(),
                FormField::Assignee => format!("◂ {} ▸", form.assignee_name(&app.users)),
                FormField::Priority => format!("◂ {} ▸", form.priority),
                FormField::DueDate => {
                    if form.due_date.is_empty() {
                        "YYYY-MM-DD".to_string()
                    } else {
                        form.due_date.clone()
                    }
                }
            };
            let style = if *field == form.focus {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{:>10}: ", field.label()), style),
                Span::raw(value),
            ])
        })
        .chain([
            Line::from(""),
            Line::from(Span::styled(
                "Tab: next field  ←/→: change  Enter: save  Esc: cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .collect();

    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(form.heading())
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        area,
    );
}

fn draw_project_input(f: &mut Frame, input: &str) {
    let area = centered_rect(40, 20, f.area());
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(vec![
            Line::from(format!("Name: {input}▏")),
            Line::from(Span::styled(
                "Enter: create  Esc: cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .block(Block::default().borders(Borders::ALL).title("New Project")),
        area,
    );
}

fn draw_confirm(f: &mut Frame, pending: &PendingDelete) {
    let area = centered_rect(40, 20, f.area());
    f.render_widget(Clear, area);
    let subject = match pending {
        PendingDelete::Task { title, .. } => format!("task '{title}'"),
        PendingDelete::Project { name, .. } => format!("project '{name}'"),
    };
    f.render_widget(
        Paragraph::new(vec![
            Line::from(format!("Delete {subject}?")),
            Line::from(""),
            Line::from("y: delete   n: cancel"),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Confirm")
                .border_style(Style::default().fg(Color::Red)),
        ),
        area,
    );
}

fn draw_help(f: &mut Frame) {
    let area = centered_rect(60, 70, f.area());
    f.render_widget(Clear, area);
    let lines = vec![
        Line::from("1-5 / Tab   switch view"),
        Line::from("r           refresh"),
        Line::from("O           log out"),
        Line::from("q           quit"),
        Line::from(""),
        Line::from("Board"),
        Line::from("  h/l ←/→   select column"),
        Line::from("  j/k ↑/↓   select card"),
        Line::from("  H/L, Shift+←/→   move card to the neighbouring column"),
        Line::from("  c         move card to Done"),
        Line::from("  n/e/d     new / edit / delete"),
        Line::from("  Enter     task details"),
        Line::from(""),
        Line::from("Task details"),
        Line::from("  e         edit description (saved after 2s idle)"),
        Line::from("  c / d     complete / delete"),
        Line::from("  Esc       close"),
    ];
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Help")),
        area,
    );
}

fn draw_toasts(f: &mut Frame, app: &App) {
    let screen = f.area();
    let width = 44.min(screen.width);
    let mut y = screen.y + 1;
    for toast in app.notifier.visible() {
        let height = if toast.description.is_some() { 4 } else { 3 };
        if y + height > screen.bottom() {
            break;
        }
        let area = Rect::new(screen.right().saturating_sub(width + 1), y, width, height);
        let color = match toast.kind {
            ToastKind::Info => Color::Blue,
            ToastKind::Success => Color::Green,
            ToastKind::Error => Color::Red,
        };
        let mut lines = vec![Line::from(Span::styled(
            toast.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        if let Some(description) = &toast.description {
            lines.push(Line::from(description.clone()));
        }
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: true }).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            ),
            area,
        );
        y += height;
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use crate::worker::ApiEvent;
    use ratatui::backend::TestBackend;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn login_view_shows_provider_url() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(
            SessionStore::new(dir.path().join("session.json")),
            "http://api.test/users/auth/google_oauth2",
            Duration::from_secs(2),
            Duration::from_secs(3),
        );
        app.start();
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Welcome back"));
        assert!(text.contains("google_oauth2"));
    }

    #[test]
    fn board_renders_three_columns() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(
            SessionStore::new(dir.path().join("session.json")),
            "http://api.test/users/auth/google_oauth2",
            Duration::from_secs(2),
            Duration::from_secs(3),
        );
        app.view = View::MyTasks;
        app.open_board(3);
        let task: Task = serde_json::from_value(serde_json::json!({
            "id": 11,
            "title": "Paint fence",
            "status": "in_progress",
            "priority": "low",
            "coins": 15,
            "due_date": "2024-07-01",
            "user": { "id": 2, "name": "Bia" }
        }))
        .unwrap();
        app.handle_event(ApiEvent::ProjectTasks {
            project_id: 3,
            result: Ok(vec![task]),
        });

        let mut terminal = Terminal::new(TestBackend::new(150, 30)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("To Do (0)"));
        assert!(text.contains("In Progress (1)"));
        assert!(text.contains("Done (0)"));
        assert!(text.contains("Paint fence"));
        assert!(text.contains("(B) Bia"));
    }
}
