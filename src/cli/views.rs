#![forbid(unsafe_code)]

use std::io::Write;

use serde::Serialize;

use crate::cli::{
    AnalyticsArgs, BoardArgs, DashboardArgs, OutputArgs, ResourcesArgs, TaskListArgs,
    TimeListArgs, TimelineArgs, VarianceArgs, display_path,
};
use crate::config::Config;
use crate::engine::{
    self, DateCount, Kpis, StatusShare, TaskSummary, TaskVariance, TeamLoad, TimelineBar,
    TimelineWindow, Workload,
};
use crate::model::{Project, Task, TaskStatus, TimeEntry, dates};
use crate::output::chart;
use crate::output::table::Table;
use crate::state::{AppState, View};
use crate::store::{Snapshot, SnapshotStore};

const BAR_WIDTH: usize = 20;
const TOP_TASKS: usize = 3;

/// Renders whichever view the state currently points at, with default options.
pub fn render_default(
    app: &AppState,
    cfg: &Config,
    store: &SnapshotStore,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match app.view() {
        View::Dashboard => render_dashboard(app, cfg, &DashboardArgs::default(), out),
        View::Kanban => render_board(app, cfg, &BoardArgs::default(), out),
        View::Gantt => render_timeline(app, cfg, &TimelineArgs::default(), out),
        View::Resources => render_resources(app, cfg, &ResourcesArgs::default(), out),
        View::Analytics => render_analytics(app, cfg, &AnalyticsArgs::default(), out),
        View::TimeLog => render_time_log(app, &TimeListArgs::default(), out),
        View::Settings => render_settings(app, cfg, store, out),
    }
}

pub fn render_dashboard(
    app: &AppState,
    cfg: &Config,
    args: &DashboardArgs,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let today = args.today.unwrap_or_else(dates::today_utc);
    let snap = app.snapshot();
    let kpis = engine::kpis(
        &snap.tasks,
        &snap.users,
        &snap.time_entries,
        today,
        &cfg.workload_options(),
    );
    let shares = kpis.tally.shares();

    if args.json {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Report<'a> {
            today: String,
            kpis: Kpis,
            status_shares: Vec<StatusShare>,
            projects: &'a [Project],
        }
        return write_json(
            out,
            &Report {
                today: dates::format_date(today),
                kpis,
                status_shares: shares,
                projects: &snap.projects,
            },
        );
    }

    heading(app, out)?;
    writeln!(
        out,
        "Tasks {}  Completed {} ({}%)  In progress {}  Overdue {}  Logged {}h",
        kpis.tally.total(),
        kpis.tally.done,
        kpis.completion_rate,
        kpis.tally.in_progress,
        kpis.overdue,
        fmt_hours(kpis.total_hours_logged)
    )?;
    write_team_line(&kpis.team, out)?;
    writeln!(out)?;

    let icons = cfg.ui.icons;
    let mut t = Table::new(["STATUS", "COUNT", "SHARE", ""]).right(&[1, 2]);
    for s in &shares {
        t.row([
            format!("{} {}", status_icon(s.status, icons), s.status),
            s.count.to_string(),
            format!("{}%", s.percent),
            chart::bar(f64::from(s.percent), 100.0, BAR_WIDTH, icons),
        ]);
    }
    t.write_to(&mut *out)?;

    if !snap.projects.is_empty() {
        writeln!(out)?;
        let mut t = Table::new(["PROJECT", "STATUS", "PROGRESS", ""]).right(&[2]);
        for p in &snap.projects {
            t.row([
                p.name.clone(),
                p.status.to_string(),
                format!("{}%", p.progress),
                chart::bar(f64::from(p.progress), 100.0, BAR_WIDTH, icons),
            ]);
        }
        t.write_to(&mut *out)?;
    }
    Ok(())
}

pub fn render_board(
    app: &AppState,
    cfg: &Config,
    args: &BoardArgs,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let snap = app.snapshot();
    let tasks: Vec<Task> = snap
        .tasks
        .iter()
        .filter(|t| args.assignee.as_deref().is_none_or(|a| t.assignee_id == a))
        .filter(|t| args.tag.as_deref().is_none_or(|tag| t.has_tag(tag)))
        .cloned()
        .collect();
    let columns = engine::board_columns(&tasks);

    if args.output.json {
        return write_json(out, &columns);
    }
    if args.output.csv {
        let mut t = task_table(false);
        for col in &columns {
            for task in &col.tasks {
                t.row(task_row(snap, task, None, false));
            }
        }
        t.write_csv_to(&mut *out)?;
        return Ok(());
    }

    heading(app, out)?;
    for (i, col) in columns.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(
            out,
            "{} {} ({})",
            status_icon(col.status, cfg.ui.icons),
            col.title,
            col.tasks.len()
        )?;
        for task in &col.tasks {
            writeln!(
                out,
                "  [{}] {}  {}  {}h{}",
                task.priority,
                task.title,
                snap.user_name(&task.assignee_id),
                fmt_hours(task.estimated_time),
                task.due_date
                    .map(|d| format!("  due {}", dates::short_label(d)))
                    .unwrap_or_default()
            )?;
        }
    }
    Ok(())
}

pub fn render_task_list(
    app: &AppState,
    cfg: &Config,
    args: &TaskListArgs,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let today = args.today.unwrap_or_else(dates::today_utc);
    let snap = app.snapshot();
    let mut list: Vec<&Task> = snap
        .tasks
        .iter()
        .filter(|t| args.status.is_none_or(|s| t.status == s))
        .filter(|t| args.assignee.as_deref().is_none_or(|a| t.assignee_id == a))
        .filter(|t| args.tag.as_deref().is_none_or(|tag| t.has_tag(tag)))
        .filter(|t| !args.overdue || engine::is_overdue(t, today))
        .collect();

    match args.sort.trim().to_lowercase().as_str() {
        "" => {}
        "due" => list.sort_by_key(|t| (t.due_date.is_none(), t.due_date)),
        "priority" => list.sort_by_key(|t| std::cmp::Reverse(t.priority)),
        "status" => list.sort_by_key(|t| t.status),
        "title" => list.sort_by_key(|t| t.title.to_lowercase()),
        other => anyhow::bail!("unknown sort key '{other}' (expected due, priority, status, title)"),
    }

    if args.output.json {
        return write_json(out, &list);
    }
    if list.is_empty() && !args.output.csv {
        writeln!(out, "No tasks found.")?;
        return Ok(());
    }
    let text = !args.output.csv;
    let mut t = task_table(text);
    for task in list {
        let marker = (text && engine::is_overdue(task, today)).then_some(if cfg.ui.icons {
            "⚠"
        } else {
            "!"
        });
        t.row(task_row(snap, task, marker, text));
    }
    emit(&t, args.output, out)
}

fn task_table(text: bool) -> Table {
    let who = if text { "ASSIGNEE" } else { "ASSIGNEE_ID" };
    Table::new([
        "ID", "TITLE", "STATUS", "PRIORITY", who, "START", "DUE", "EST", "TAGS",
    ])
    .right(&[7])
}

fn task_row(snap: &Snapshot, task: &Task, marker: Option<&str>, text: bool) -> Vec<String> {
    let due = task.due_date.map(dates::format_date).unwrap_or_default();
    vec![
        task.id.clone(),
        task.title.clone(),
        task.status.to_string(),
        task.priority.to_string(),
        if text {
            snap.user_name(&task.assignee_id).to_owned()
        } else {
            task.assignee_id.clone()
        },
        task.start_date.map(dates::format_date).unwrap_or_default(),
        match marker {
            Some(m) => format!("{due} {m}"),
            None => due,
        },
        fmt_hours(task.estimated_time),
        task.tags.iter().cloned().collect::<Vec<_>>().join(","),
    ]
}

pub fn render_timeline(
    app: &AppState,
    cfg: &Config,
    args: &TimelineArgs,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let snap = app.snapshot();
    let days = args.days.unwrap_or(cfg.analytics.timeline_days);
    if !(1..=engine::MAX_TIMELINE_DAYS).contains(&days) {
        anyhow::bail!(
            "timeline window must span 1..={} days, got {days}",
            engine::MAX_TIMELINE_DAYS
        );
    }
    let window = match args.start {
        Some(start) => Some(TimelineWindow::new(start, days)),
        None => TimelineWindow::fit(&snap.tasks, days),
    };
    let bars = window
        .as_ref()
        .map(|w| engine::timeline_bars(&snap.tasks, w))
        .unwrap_or_default();

    if args.json {
        #[derive(Serialize)]
        struct Report<'a> {
            window: Option<TimelineWindow>,
            dates: Vec<String>,
            bars: &'a [TimelineBar],
        }
        return write_json(
            out,
            &Report {
                window,
                dates: window
                    .as_ref()
                    .map(|w| w.dates().map(dates::short_label).collect())
                    .unwrap_or_default(),
                bars: &bars,
            },
        );
    }

    heading(app, out)?;
    let Some(window) = window else {
        writeln!(out, "No scheduled tasks.")?;
        return Ok(());
    };
    let first = window.start;
    let last = window.dates().last().unwrap_or(first);
    writeln!(
        out,
        "{} .. {} ({} days)",
        dates::format_date(first),
        dates::format_date(last),
        window.days
    )?;
    writeln!(out)?;

    let day_digits: String = window
        .dates()
        .map(|d| char::from(b'0' + d.day() % 10))
        .collect();
    let width = usize::try_from(window.days).unwrap_or(0);
    let mut t = Table::new(vec![
        "TASK".to_owned(),
        "WHO".to_owned(),
        "START".to_owned(),
        "DUE".to_owned(),
        day_digits,
    ]);
    for bar in &bars {
        let who = snap
            .find_user(&bar.assignee_id)
            .map_or_else(|| bar.assignee_id.clone(), |u| u.initials());
        let title = if bar.dependencies.is_empty() {
            bar.title.clone()
        } else {
            format!("{} (after {})", bar.title, bar.dependencies.join(", "))
        };
        t.row([
            title,
            who,
            dates::short_label(bar.start),
            dates::short_label(bar.due),
            chart::span_row(width, bar.visible_range(window.days), cfg.ui.icons),
        ]);
    }
    t.write_to(&mut *out)?;
    Ok(())
}

pub fn render_resources(
    app: &AppState,
    cfg: &Config,
    args: &ResourcesArgs,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let snap = app.snapshot();
    let workloads = engine::team_workload(&snap.users, &snap.tasks, &cfg.workload_options());
    let team = engine::team_load(&workloads);

    if args.output.json {
        #[derive(Serialize)]
        struct Report<'a> {
            members: &'a [Workload],
            team: TeamLoad,
        }
        return write_json(
            out,
            &Report {
                members: &workloads,
                team,
            },
        );
    }

    let text = !args.output.csv;
    let mut headers = vec![
        "MEMBER", "ROLE", "TASKS", "HOURS", "CAPACITY", "LOAD", "STATUS",
    ];
    if text {
        headers.push("");
    }
    let mut t = Table::new(headers).right(&[2, 3, 4, 5]);
    for (user, w) in snap.users.iter().zip(&workloads) {
        let mut row = vec![
            w.user_name.clone(),
            user.role.clone(),
            w.task_count.to_string(),
            fmt_hours(w.total_hours),
            fmt_hours(w.sprint_capacity),
            format!("{}%", w.percentage),
            w.class.to_string(),
        ];
        if text {
            row.push(chart::bar(
                f64::from(w.percentage),
                100.0,
                BAR_WIDTH,
                cfg.ui.icons,
            ));
        }
        t.row(row);
    }

    if !text {
        t.write_csv_to(&mut *out)?;
        return Ok(());
    }
    heading(app, out)?;
    write_team_line(&team, out)?;
    writeln!(out)?;
    t.write_to(&mut *out)?;

    if args.detail {
        for user in &snap.users {
            let top = engine::workload::top_active_tasks(&snap.tasks, &user.id, TOP_TASKS);
            if top.is_empty() {
                continue;
            }
            writeln!(out)?;
            writeln!(out, "{} ({})", user.name, user.initials())?;
            for task in top {
                writeln!(
                    out,
                    "  {} {}  {}h",
                    status_icon(task.status, cfg.ui.icons),
                    task.title,
                    fmt_hours(task.estimated_time)
                )?;
            }
        }
    }
    Ok(())
}

pub fn render_analytics(
    app: &AppState,
    cfg: &Config,
    args: &AnalyticsArgs,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let today = args.today.unwrap_or_else(dates::today_utc);
    let window = args.window.unwrap_or(cfg.analytics.completed_window);
    let snap = app.snapshot();
    let summary = engine::summarize(&snap.tasks, today);
    let series = engine::completed_by_date(&snap.tasks, window);
    let hours = engine::hours_by_user(&snap.time_entries);

    if args.json {
        #[derive(Serialize)]
        struct MemberHours<'a> {
            #[serde(rename = "userId")]
            user_id: &'a str,
            hours: f64,
        }
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Report<'a> {
            today: String,
            summary: TaskSummary,
            completed_by_date: &'a [DateCount],
            hours_by_user: Vec<MemberHours<'a>>,
        }
        return write_json(
            out,
            &Report {
                today: dates::format_date(today),
                summary,
                completed_by_date: &series,
                hours_by_user: hours
                    .iter()
                    .map(|(id, h)| MemberHours {
                        user_id: id,
                        hours: *h,
                    })
                    .collect(),
            },
        );
    }

    heading(app, out)?;
    writeln!(
        out,
        "Tasks {}  Completed {} ({}% completion rate)  In progress {}  Overdue {}{}",
        summary.total,
        summary.completed,
        summary.completion_rate,
        summary.in_progress,
        summary.overdue,
        if summary.overdue > 0 {
            " - needs attention"
        } else {
            " - all on track"
        }
    )?;
    writeln!(out)?;

    writeln!(out, "Completed tasks by date")?;
    if series.is_empty() {
        writeln!(out, "  no completed tasks yet")?;
    } else {
        let max = series.iter().map(|d| d.completed).max().unwrap_or(0);
        let mut t = Table::new(["DATE", "DONE", ""]).right(&[1]);
        for d in &series {
            t.row([
                d.label.clone(),
                d.completed.to_string(),
                chart::bar(
                    engine::count_as_f64(d.completed),
                    engine::count_as_f64(max),
                    BAR_WIDTH,
                    cfg.ui.icons,
                ),
            ]);
        }
        t.write_to(&mut *out)?;
    }

    if !hours.is_empty() {
        writeln!(out)?;
        writeln!(out, "Hours logged by member")?;
        let mut t = Table::new(["MEMBER", "HOURS"]).right(&[1]);
        for (id, h) in &hours {
            t.row([snap.user_name(id).to_owned(), fmt_hours(*h)]);
        }
        t.write_to(&mut *out)?;
    }
    Ok(())
}

pub fn render_variance(
    app: &AppState,
    args: &VarianceArgs,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let snap = app.snapshot();
    let report = engine::variance_report(&snap.tasks, &snap.time_entries);

    if args.output.json {
        return write_json(out, &report);
    }
    let mut t = Table::new([
        "TASK", "TITLE", "ESTIMATED", "ACTUAL", "VARIANCE", "VARIANCE%", "ENTRIES",
    ])
    .right(&[2, 3, 4, 5, 6]);
    for v in &report {
        t.row(variance_row(v));
    }
    if !args.output.csv {
        heading(app, out)?;
        writeln!(out, "Estimated vs actual hours")?;
        writeln!(out)?;
        if report.is_empty() {
            writeln!(out, "No time logged against tasks yet.")?;
            return Ok(());
        }
    }
    emit(&t, args.output, out)
}

fn variance_row(v: &TaskVariance) -> Vec<String> {
    vec![
        v.task_id.clone(),
        v.title.clone(),
        fmt_hours(v.estimated),
        fmt_hours(v.actual),
        format!("{:+.1}", v.variance),
        format!("{:+.1}%", v.variance_pct),
        v.entries.to_string(),
    ]
}

pub fn render_time_log(
    app: &AppState,
    args: &TimeListArgs,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let snap = app.snapshot();
    let entries: Vec<&TimeEntry> = snap
        .time_entries
        .iter()
        .filter(|e| args.task.as_deref().is_none_or(|t| e.task_id == t))
        .filter(|e| args.user.as_deref().is_none_or(|u| e.user_id == u))
        .collect();

    if args.output.json {
        return write_json(out, &entries);
    }
    if args.output.csv {
        let mut t = Table::new(["ID", "DATE", "TASK_ID", "USER_ID", "HOURS", "DESCRIPTION"]);
        for e in &entries {
            t.row([
                e.id.clone(),
                dates::format_date(e.date),
                e.task_id.clone(),
                e.user_id.clone(),
                fmt_hours(e.hours),
                e.description.clone().unwrap_or_default(),
            ]);
        }
        t.write_csv_to(&mut *out)?;
        return Ok(());
    }

    heading(app, out)?;
    if entries.is_empty() {
        writeln!(out, "No time entries.")?;
        return Ok(());
    }
    let mut t = Table::new(["DATE", "TASK", "MEMBER", "HOURS", "NOTE"]).right(&[3]);
    for e in &entries {
        t.row([
            dates::format_date(e.date),
            snap.find_task(&e.task_id)
                .map_or_else(|| e.task_id.clone(), |t| t.title.clone()),
            snap.user_name(&e.user_id).to_owned(),
            fmt_hours(e.hours),
            e.description.clone().unwrap_or_else(|| "-".to_owned()),
        ]);
    }
    t.write_to(&mut *out)?;
    let total: f64 = entries.iter().map(|e| e.hours).sum();
    writeln!(out)?;
    writeln!(out, "Total {}h across {} entries", fmt_hours(total), entries.len())?;
    Ok(())
}

fn render_settings(
    app: &AppState,
    cfg: &Config,
    store: &SnapshotStore,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    heading(app, out)?;
    writeln!(out, "Settings panel is under construction.")?;
    writeln!(out, "Workspace file: {}", display_path(cfg, store.path()))?;
    writeln!(out, "Run 'insightpm config list' to see the configuration.")?;
    Ok(())
}

fn heading(app: &AppState, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        out,
        "{} / {}",
        workspace_name(app.snapshot()),
        app.view().title()
    )?;
    writeln!(out)
}

fn workspace_name(snap: &Snapshot) -> &str {
    snap.projects
        .iter()
        .find(|p| p.status == crate::model::ProjectStatus::Active)
        .or_else(|| snap.projects.first())
        .map_or("Workspace", |p| p.name.as_str())
}

fn write_team_line(team: &TeamLoad, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        out,
        "Team {}  Overallocated {}  At capacity {}  Avg utilization {}%",
        team.team_size, team.overallocated, team.at_capacity, team.average_utilization
    )
}

fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn emit(t: &Table, output: OutputArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    if output.csv {
        t.write_csv_to(&mut *out)?;
    } else {
        t.write_to(&mut *out)?;
    }
    Ok(())
}

fn status_icon(status: TaskStatus, icons: bool) -> &'static str {
    match (status, icons) {
        (TaskStatus::Todo, true) => "○",
        (TaskStatus::InProgress, true) => "●",
        (TaskStatus::Review, true) => "◐",
        (TaskStatus::Done, true) => "✓",
        (TaskStatus::Todo, false) => "[ ]",
        (TaskStatus::InProgress, false) => "[~]",
        (TaskStatus::Review, false) => "[?]",
        (TaskStatus::Done, false) => "[x]",
    }
}

/// Whole hours without decimals, otherwise one decimal place.
#[must_use]
pub fn fmt_hours(hours: f64) -> String {
    if (hours - hours.round()).abs() < 1e-9 {
        format!("{hours:.0}")
    } else {
        format!("{hours:.1}")
    }
}
