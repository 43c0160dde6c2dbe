use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use axo_tasks::api::{CallbackParams, ClientConfig};
use axo_tasks::app::App;
use axo_tasks::models::ProjectDraft;
use axo_tasks::session::{Session, SessionStore};
use axo_tasks::task::{Priority, Task, TaskDraft, TaskStatus};
use axo_tasks::ui;
use axo_tasks::worker::Worker;
use axo_tasks::{ApiClient, AppConfig};

#[derive(Parser, Debug)]
#[command(name = "axo-tasks", version, about = "Terminal client for the AXO task board")]
struct Cli {
    /// Overrides `api_url` from the config file
    #[arg(long = "api-url", value_name = "URL", global = true)]
    api_url: Option<String>,
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    log_file: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info", global = true)]
    log_level: String,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive board (default)
    Tui,
    /// Sign in with Google and store the session
    Login,
    Logout,
    /// Show the signed-in user and AXO balance
    Whoami,
    Tasks {
        #[command(subcommand)]
        action: Option<TaskCommand>,
    },
    Projects {
        #[command(subcommand)]
        action: Option<ProjectCommand>,
    },
    Dashboard,
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    List,
    /// Tasks assigned to you
    Mine,
    Create {
        title: String,
        #[arg(long)]
        coins: u64,
        /// YYYY-MM-DD
        #[arg(long)]
        due: String,
        #[arg(long)]
        project: Option<u64>,
        #[arg(long, default_value = "medium")]
        priority: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Mark a task done
    Done {
        id: u64,
        #[arg(long)]
        project: Option<u64>,
    },
    Delete {
        id: u64,
        #[arg(long)]
        project: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    List,
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Update {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, config_path) = AppConfig::load().context("load configuration")?;
    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.trim_end_matches('/').to_string();
    }
    if let Some(log_file) = &cli.log_file {
        config.log_file = Some(log_file.clone());
    }

    let command = cli.command.unwrap_or(Command::Tui);
    let _guard = match command {
        Command::Tui => Some(init_file_tracing(&cli.log_level, &config.log_path())?),
        _ => {
            init_tracing(&cli.log_level)?;
            None
        }
    };
    info!(
        config_path = %config_path.display(),
        api_url = %config.api_url,
        "configuration loaded"
    );

    let runtime = Runtime::new().context("start tokio runtime")?;
    let client = ApiClient::with_config(ClientConfig::from(&config)).context("build api client")?;
    let store = SessionStore::new(config.session_path());

    match command {
        Command::Tui => run_tui(&runtime, client, store, &config),
        Command::Login => runtime.block_on(login(&client, &store)),
        Command::Logout => {
            store.clear().context("remove session")?;
            info!("logged out");
            println!("Logged out.");
            Ok(())
        }
        Command::Whoami => runtime.block_on(whoami(client, &store)),
        Command::Tasks { action } => {
            runtime.block_on(tasks(client, &store, action.unwrap_or(TaskCommand::List)))
        }
        Command::Projects { action } => runtime.block_on(projects(
            client,
            &store,
            action.unwrap_or(ProjectCommand::List),
        )),
        Command::Dashboard => runtime.block_on(dashboard(client, &store)),
    }
}

fn env_filter(log_level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(log_level).context("invalid log level"),
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(log_level)?)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

/// The TUI owns stdout, so logs go to a file instead.
fn init_file_tracing(log_level: &str, log_path: &Path) -> Result<WorkerGuard> {
    let dir = log_path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create log directory {}", dir.display()))?;
    let file_appender = tracing_appender::rolling::never(
        dir,
        log_path
            .file_name()
            .unwrap_or(OsStr::new("axo-tasks.log")),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(log_level)?)
        .with_ansi(false)
        .with_writer(non_blocking)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(guard)
}

/// Raw mode and the alternate screen for as long as the guard lives.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}

fn run_tui(
    runtime: &Runtime,
    client: ApiClient,
    store: SessionStore,
    config: &AppConfig,
) -> Result<()> {
    let login_url = client.login_url().context("build login url")?.to_string();
    let mut app = App::new(
        store,
        login_url,
        config.autosave_delay(),
        config.toast_duration(),
    );
    let (mut worker, mut events) = Worker::new(runtime.handle().clone(), client);
    worker.dispatch_all(app.start());

    let result = {
        let mut guard = TerminalGuard::new().context("set up terminal")?;
        ui::run_app(&mut guard.terminal, &mut app, &mut worker, &mut events)
    };

    // Spawned saves would die with the runtime.
    for request in app.shutdown_requests() {
        worker.run_blocking(request);
    }
    info!("terminal closed");
    result.context("terminal loop")
}

fn authenticated(mut client: ApiClient, store: &SessionStore) -> Result<(ApiClient, Session)> {
    let Some(session) = store.load() else {
        bail!("not logged in, run `axo-tasks login` first");
    };
    client.set_token(session.token.clone());
    Ok((client, session))
}

async fn login(client: &ApiClient, store: &SessionStore) -> Result<()> {
    println!("Open this address in a browser and sign in with Google:\n");
    println!("  {}\n", client.login_url()?);
    print!("Paste the address you were redirected to: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("read callback address")?;
    let params = CallbackParams::parse(&input)?;
    let auth = client
        .exchange_code(&params)
        .await
        .context("exchange authorization code")?;

    store
        .save(&Session {
            token: auth.token,
            user: auth.user.clone(),
        })
        .context("save session")?;
    info!(user = %auth.user.email, "logged in");
    println!("Welcome back, {}!", auth.user.display_name());
    Ok(())
}

async fn whoami(client: ApiClient, store: &SessionStore) -> Result<()> {
    let (client, _) = authenticated(client, store)?;
    let user = client.current_user().await.context("load current user")?;
    if let Err(err) = store.update_user(&user) {
        warn!(error = %err, "could not refresh stored profile");
    }
    println!("{} <{}>", user.display_name(), user.email);
    println!("{} AXO", user.coins);
    Ok(())
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    for task in tasks {
        println!(
            "{:>5}  {:<12} {:<7} {:>6} AXO  {:<12} {}",
            task.id,
            task.status.title(),
            task.priority.as_str(),
            task.coins,
            task.due_label(),
            task.title
        );
    }
}

async fn tasks(client: ApiClient, store: &SessionStore, action: TaskCommand) -> Result<()> {
    let (client, session) = authenticated(client, store)?;
    match action {
        TaskCommand::List => print_tasks(&client.list_tasks().await.context("list tasks")?),
        TaskCommand::Mine => print_tasks(&client.my_tasks().await.context("list my tasks")?),
        TaskCommand::Create {
            title,
            coins,
            due,
            project,
            priority,
            description,
        } => {
            let draft = TaskDraft {
                id: None,
                title: Some(title),
                description,
                status: Some(TaskStatus::Todo),
                coins: Some(coins),
                priority: Some(priority.parse::<Priority>()?),
                due_date: Some(due),
                user_id: Some(session.user.id),
                project_id: project,
            };
            draft.validate_for_create()?;
            let task = match project {
                Some(project_id) => client.create_project_task(project_id, &draft).await,
                None => client.create_task(&draft).await,
            }
            .context("create task")?;
            println!("Created task #{} '{}'", task.id, task.title);
        }
        TaskCommand::Done { id, project } => {
            let draft = TaskDraft::status_change(id, TaskStatus::Done);
            let task = match project {
                Some(project_id) => client.update_project_task(project_id, id, &draft).await,
                None => client.update_task(id, &draft).await,
            }
            .context("complete task")?;
            let user = client.current_user().await.context("refresh balance")?;
            if let Err(err) = store.update_user(&user) {
                warn!(error = %err, "could not refresh stored profile");
            }
            println!("Task #{} '{}' is done. Balance: {} AXO", task.id, task.title, user.coins);
        }
        TaskCommand::Delete { id, project } => {
            match project {
                Some(project_id) => client.delete_project_task(project_id, id).await,
                None => client.delete_task(id).await,
            }
            .context("delete task")?;
            println!("Deleted task #{id}");
        }
    }
    Ok(())
}

async fn projects(client: ApiClient, store: &SessionStore, action: ProjectCommand) -> Result<()> {
    let (client, _) = authenticated(client, store)?;
    match action {
        ProjectCommand::List => {
            let projects = client.list_projects().await.context("list projects")?;
            if projects.is_empty() {
                println!("No projects.");
            }
            for project in projects {
                println!(
                    "{:>5}  {:<30} {}/{} done",
                    project.id,
                    project.name,
                    project.completed_tasks(),
                    project.tasks.len()
                );
            }
        }
        ProjectCommand::Create { name, description } => {
            let project = client
                .create_project(&ProjectDraft {
                    name: Some(name),
                    description,
                })
                .await
                .context("create project")?;
            println!("Created project #{} '{}'", project.id, project.name);
        }
        ProjectCommand::Update {
            id,
            name,
            description,
        } => {
            if name.is_none() && description.is_none() {
                bail!("nothing to update, pass --name or --description");
            }
            let project = client
                .update_project(id, &ProjectDraft { name, description })
                .await
                .context("update project")?;
            println!("Updated project #{} '{}'", project.id, project.name);
        }
        ProjectCommand::Delete { id } => {
            client.delete_project(id).await.context("delete project")?;
            println!("Deleted project #{id}");
        }
    }
    Ok(())
}

async fn dashboard(client: ApiClient, store: &SessionStore) -> Result<()> {
    let (client, _) = authenticated(client, store)?;
    let overview = client
        .dashboard_overview()
        .await
        .context("load dashboard overview")?;
    println!("Projects: {}", overview.total_projects);
    println!("Users:    {}", overview.total_users);
    println!("Tasks:    {}", overview.total_tasks);
    println!(
        "  To Do {}  In Progress {}  Done {}",
        overview.tasks_by_status.todo,
        overview.tasks_by_status.in_progress,
        overview.tasks_by_status.done
    );
    println!("Completion rate: {:.1}%", overview.completion_rate);

    let users = client.users_summary().await.context("load users summary")?;
    if !users.is_empty() {
        println!();
        for user in users {
            println!("{:<24} {:>4} tasks {:>7} AXO", user.name, user.tasks_count, user.coins);
        }
    }
    Ok(())
}
