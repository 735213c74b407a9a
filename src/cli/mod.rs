#![forbid(unsafe_code)]

pub mod views;

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{CommandFactory as _, Parser, Subcommand};
use time::Date;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{self, Config};
use crate::engine::MAX_TIMELINE_DAYS;
use crate::error::PmError;
use crate::model::dates::{self, parse_date};
use crate::model::{NewTask, NewTimeEntry, Priority, TaskStatus};
use crate::state::{AppState, View};
use crate::store::{self, SnapshotSource, SnapshotStore, sample};

#[derive(Debug, Parser)]
#[command(
    name = "insightpm",
    version,
    about = "Project dashboard: task boards, timelines, workload and analytics"
)]
pub struct Cli {
    /// Workspace file (overrides data.file from the config)
    #[arg(long = "data", global = true)]
    pub data: Option<PathBuf>,
    /// Enable debug logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Dashboard(DashboardArgs),
    #[command(alias = "kanban")]
    Board(BoardArgs),
    #[command(alias = "gantt")]
    Timeline(TimelineArgs),
    Resources(ResourcesArgs),
    Analytics(AnalyticsArgs),
    Variance(VarianceArgs),
    Task(TaskArgs),
    Time(TimeArgs),
    Init(InitArgs),
    Config(ConfigArgs),
    Completion(CompletionArgs),
    Version,
}

#[derive(Debug, Clone, Copy, Default, clap::Args)]
pub struct OutputArgs {
    /// Output as JSON
    #[arg(long = "json", conflicts_with = "csv")]
    pub json: bool,
    /// Output as CSV
    #[arg(long = "csv")]
    pub csv: bool,
}

#[derive(Debug, Clone, Default, Parser)]
pub struct DashboardArgs {
    /// Reference date for overdue checks (defaults to today, UTC)
    #[arg(long = "today", value_parser = parse_date)]
    pub today: Option<Date>,
    /// Output as JSON
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Clone, Default, Parser)]
pub struct BoardArgs {
    /// Only tasks assigned to this user id
    #[arg(short = 'a', long = "assignee")]
    pub assignee: Option<String>,
    /// Only tasks carrying this tag
    #[arg(short = 't', long = "tag")]
    pub tag: Option<String>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Clone, Default, Parser)]
pub struct TimelineArgs {
    /// First day of the window (defaults to the earliest task start)
    #[arg(long = "start", value_parser = parse_date)]
    pub start: Option<Date>,
    /// Number of days shown, 1 to 366 (defaults to analytics.timeline_days)
    #[arg(
        long = "days",
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_TIMELINE_DAYS))
    )]
    pub days: Option<u32>,
    /// Output as JSON
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Clone, Default, Parser)]
pub struct ResourcesArgs {
    /// List each member's first active tasks
    #[arg(short = 'd', long = "detail")]
    pub detail: bool,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Clone, Default, Parser)]
pub struct AnalyticsArgs {
    /// Reference date for overdue checks (defaults to today, UTC)
    #[arg(long = "today", value_parser = parse_date)]
    pub today: Option<Date>,
    /// Number of completion dates kept (defaults to analytics.completed_window)
    #[arg(
        long = "window",
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub window: Option<usize>,
    /// Output as JSON
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Clone, Default, Parser)]
pub struct VarianceArgs {
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Parser)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub cmd: TaskCmd,
}

#[derive(Debug, Subcommand)]
pub enum TaskCmd {
    Add(TaskAddArgs),
    List(TaskListArgs),
    Import(TaskImportArgs),
}

#[derive(Debug, Parser)]
pub struct TaskAddArgs {
    /// Task title
    pub title: String,
    #[arg(short = 'a', long = "assignee")]
    pub assignee: String,
    #[arg(short = 's', long = "status", default_value = "todo")]
    pub status: TaskStatus,
    #[arg(short = 'p', long = "priority", default_value = "medium")]
    pub priority: Priority,
    #[arg(long = "start", value_parser = parse_date)]
    pub start: Option<Date>,
    #[arg(long = "due", value_parser = parse_date)]
    pub due: Option<Date>,
    /// Estimated hours
    #[arg(short = 'e', long = "estimate", default_value_t = 0.0)]
    pub estimate: f64,
    #[arg(short = 't', long = "tag")]
    pub tags: Vec<String>,
    #[arg(long = "depends-on")]
    pub depends_on: Vec<String>,
    #[arg(long = "description")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Parser)]
pub struct TaskListArgs {
    #[arg(short = 's', long = "status")]
    pub status: Option<TaskStatus>,
    #[arg(short = 'a', long = "assignee")]
    pub assignee: Option<String>,
    #[arg(short = 't', long = "tag")]
    pub tag: Option<String>,
    /// Only overdue tasks
    #[arg(long = "overdue")]
    pub overdue: bool,
    #[arg(long = "today", value_parser = parse_date)]
    pub today: Option<Date>,
    /// Sort by field (due, priority, status, title)
    #[arg(long = "sort", default_value = "")]
    pub sort: String,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Parser)]
pub struct TaskImportArgs {
    /// YAML or JSON file holding a list of tasks
    pub file: PathBuf,
}

#[derive(Debug, Parser)]
pub struct TimeArgs {
    #[command(subcommand)]
    pub cmd: TimeCmd,
}

#[derive(Debug, Subcommand)]
pub enum TimeCmd {
    Log(TimeLogArgs),
    List(TimeListArgs),
}

#[derive(Debug, Parser)]
pub struct TimeLogArgs {
    #[arg(long = "task")]
    pub task: String,
    /// Defaults to the task's assignee
    #[arg(long = "user")]
    pub user: Option<String>,
    #[arg(long = "hours", allow_negative_numbers = true)]
    pub hours: f64,
    /// Defaults to today, UTC
    #[arg(long = "date", value_parser = parse_date)]
    pub date: Option<Date>,
    #[arg(short = 'm', long = "description")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Parser)]
pub struct TimeListArgs {
    #[arg(long = "task")]
    pub task: Option<String>,
    #[arg(long = "user")]
    pub user: Option<String>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Overwrite an existing workspace file
    #[arg(short = 'f', long = "force")]
    pub force: bool,
    /// Write an empty workspace instead of the sample data
    #[arg(long = "empty")]
    pub empty: bool,
}

#[derive(Debug, Parser)]
pub struct CompletionArgs {
    pub shell: clap_complete::Shell,
}

#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub cmd: ConfigCmd,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCmd {
    List,
    Set(ConfigSetArgs),
    Get(ConfigGetArgs),
}

#[derive(Debug, Parser)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Parser)]
pub struct ConfigGetArgs {
    pub key: String,
}

pub fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let cmd = match cli.cmd {
        Some(Commands::Completion(args)) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "insightpm", &mut std::io::stdout());
            return Ok(ExitCode::SUCCESS);
        }
        Some(Commands::Version) => return Ok(cmd_version()),
        Some(Commands::Config(args)) => {
            init_logging(cli.verbose, "warn");
            return cmd_config(args);
        }
        other => other,
    };

    let (cfg, _paths) = config::load()?;
    init_logging(cli.verbose, &cfg.log.level);

    let cmd = match cmd {
        Some(Commands::Init(args)) => return cmd_init(&cfg, cli.data.as_deref(), &args),
        other => other,
    };

    let mut ws = Workspace::open(cfg, cli.data.as_deref())?;
    let mut out = std::io::stdout().lock();

    match cmd {
        None => {
            let view = View::from_id_or_placeholder(&ws.cfg.ui.default_view);
            ws.app.switch_view(view);
            views::render_default(&ws.app, &ws.cfg, &ws.store, &mut out)?;
        }
        Some(Commands::Dashboard(args)) => {
            ws.app.switch_view(View::Dashboard);
            views::render_dashboard(&ws.app, &ws.cfg, &args, &mut out)?;
        }
        Some(Commands::Board(args)) => {
            ws.app.switch_view(View::Kanban);
            views::render_board(&ws.app, &ws.cfg, &args, &mut out)?;
        }
        Some(Commands::Timeline(args)) => {
            ws.app.switch_view(View::Gantt);
            views::render_timeline(&ws.app, &ws.cfg, &args, &mut out)?;
        }
        Some(Commands::Resources(args)) => {
            ws.app.switch_view(View::Resources);
            views::render_resources(&ws.app, &ws.cfg, &args, &mut out)?;
        }
        Some(Commands::Analytics(args)) => {
            ws.app.switch_view(View::Analytics);
            views::render_analytics(&ws.app, &ws.cfg, &args, &mut out)?;
        }
        Some(Commands::Variance(args)) => {
            ws.app.switch_view(View::Analytics);
            views::render_variance(&ws.app, &args, &mut out)?;
        }
        Some(Commands::Task(args)) => cmd_task(&mut ws, args, &mut out)?,
        Some(Commands::Time(args)) => cmd_time(&mut ws, args, &mut out)?,
        // Handled before the workspace is opened.
        Some(
            Commands::Init(_) | Commands::Config(_) | Commands::Completion(_) | Commands::Version,
        ) => {}
    }

    ws.persist()?;
    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level.trim() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("insightpm={level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Loaded configuration, workspace store and the application state built from it.
pub struct Workspace {
    pub cfg: Config,
    pub store: SnapshotStore,
    pub app: AppState,
    pub source: SnapshotSource,
}

impl Workspace {
    pub fn open(cfg: Config, data: Option<&Path>) -> anyhow::Result<Self> {
        let path = match data {
            Some(p) => p.to_path_buf(),
            None => cfg.data_path()?,
        };
        let store = SnapshotStore::new(path);
        let (snapshot, source) = store.load_or_fallback(cfg.data.use_sample_when_missing)?;
        debug!(source = ?source, path = %store.path().display(), "workspace opened");
        Ok(Self {
            cfg,
            store,
            app: AppState::new(snapshot),
            source,
        })
    }

    /// Writes the snapshot back when an action changed it.
    pub fn persist(&self) -> anyhow::Result<()> {
        if !self.app.is_dirty() {
            return Ok(());
        }
        if self.source != SnapshotSource::File {
            info!(path = %self.store.path().display(), "creating workspace file");
        }
        self.store.save(self.app.snapshot())
    }
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<ExitCode> {
    match args.cmd {
        ConfigCmd::List => {
            print!("{}", config::list_resolved_toml()?);
        }
        ConfigCmd::Set(set) => {
            config::set_value_string(&set.key, &set.value)?;
            println!("Set {} = {}", set.key, set.value);
        }
        ConfigCmd::Get(get) => match config::get_value_string(&get.key)? {
            Some(v) => println!("{v}"),
            None => anyhow::bail!(
                "configuration key '{}' not found - use 'insightpm config list' to see available keys",
                get.key
            ),
        },
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_init(cfg: &Config, data: Option<&Path>, args: &InitArgs) -> anyhow::Result<ExitCode> {
    let path = match data {
        Some(p) => p.to_path_buf(),
        None => cfg.data_path()?,
    };
    let store = SnapshotStore::new(path);
    if store.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            store.path().display()
        );
    }
    let snapshot = if args.empty {
        store::Snapshot::default()
    } else {
        sample::sample_snapshot()
    };
    store.save(&snapshot)?;
    println!(
        "Wrote {} workspace to {}",
        if args.empty { "an empty" } else { "the sample" },
        display_path(cfg, store.path())
    );
    Ok(ExitCode::SUCCESS)
}

fn cmd_task(
    ws: &mut Workspace,
    args: TaskArgs,
    out: &mut dyn std::io::Write,
) -> anyhow::Result<()> {
    match args.cmd {
        TaskCmd::Add(a) => {
            ws.app.switch_view(View::Kanban);
            let draft = NewTask {
                title: a.title,
                description: a.description,
                status: a.status,
                priority: a.priority,
                assignee_id: a.assignee,
                start_date: a.start,
                due_date: a.due,
                estimated_time: a.estimate,
                tags: a.tags.into_iter().collect(),
                dependencies: a.depends_on,
                completed_at: None,
                progress: None,
            };
            warn_dangling_refs(&ws.app, &draft);
            let task = ws.app.create_task(draft)?;
            writeln!(out, "Created task {}: {}", task.id, task.title)?;
        }
        TaskCmd::List(a) => {
            ws.app.switch_view(View::Kanban);
            views::render_task_list(&ws.app, &ws.cfg, &a, out)?;
        }
        TaskCmd::Import(a) => {
            ws.app.switch_view(View::Kanban);
            let drafts = store::read_task_drafts(&a.file)?;
            let total = drafts.len();
            for (i, draft) in drafts.into_iter().enumerate() {
                warn_dangling_refs(&ws.app, &draft);
                let task = ws
                    .app
                    .create_task(draft)
                    .with_context(|| format!("item {} of {}", i + 1, a.file.display()))?;
                writeln!(out, "Created task {}: {}", task.id, task.title)?;
            }
            writeln!(out, "Imported {total} task(s)")?;
        }
    }
    Ok(())
}

fn warn_dangling_refs(app: &AppState, draft: &NewTask) {
    if app.snapshot().find_user(&draft.assignee_id).is_none() {
        warn!(assignee = %draft.assignee_id, "assignee is not a known user");
    }
    for dep in &draft.dependencies {
        if app.snapshot().find_task(dep).is_none() {
            warn!(dependency = %dep, "dependency is not a known task");
        }
    }
}

fn cmd_time(
    ws: &mut Workspace,
    args: TimeArgs,
    out: &mut dyn std::io::Write,
) -> anyhow::Result<()> {
    ws.app.switch_view(View::TimeLog);
    match args.cmd {
        TimeCmd::Log(a) => {
            let task = ws.app.snapshot().find_task(&a.task);
            let user_id = match (a.user, task) {
                (Some(u), _) => u,
                (None, Some(t)) => t.assignee_id.clone(),
                (None, None) => return Err(PmError::TaskNotFound(a.task).into()),
            };
            if task.is_none() {
                warn!(task = %a.task, "logging time against an unknown task");
            }
            let entry = ws.app.add_time_entry(NewTimeEntry {
                task_id: a.task,
                user_id,
                hours: a.hours,
                date: a.date.unwrap_or_else(dates::today_utc),
                description: a.description,
            })?;
            writeln!(
                out,
                "Logged {}h on {} for {} ({})",
                views::fmt_hours(entry.hours),
                entry.task_id,
                entry.user_id,
                dates::format_date(entry.date)
            )?;
        }
        TimeCmd::List(a) => views::render_time_log(&ws.app, &a, out)?,
    }
    Ok(())
}

fn cmd_version() -> ExitCode {
    println!("insightpm version {}", env!("CARGO_PKG_VERSION"));
    println!("  rust: {}", rustc_version_runtime::version());
    println!(
        "  os/arch: {}/{}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    ExitCode::SUCCESS
}

pub(crate) fn display_path(cfg: &Config, path: &Path) -> String {
    let s = path.to_string_lossy();
    if cfg.ui.tilde_home {
        config::tilde_path(&s)
    } else {
        s.into_owned()
    }
}
