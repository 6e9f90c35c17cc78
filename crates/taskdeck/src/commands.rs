use std::borrow::Cow;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use taskdeck_app::{
    AppConfig, AsyncTaskStore, CategoryCatalog, SettingsService, TaskBoard, TaskFilterBuilder, TaskLifecycle,
    badge_color,
};
use taskdeck_core::{
    CategoryId, NamedView, Priority, SettingsPatch, Task, TaskDraft, TaskId, TaskStats, TaskUpdate, WeekAgenda,
};
use taskdeck_store_local::LocalStore;
use time::{Date, macros::format_description};
use unicode_segmentation::UnicodeSegmentation;

use crate::{Command, SettingsCommand};

const TITLE_WIDTH: usize = 40;

pub async fn run(command: Command, config: &AppConfig, today: Date) -> Result<()> {
    let store = config
        .open_store()
        .with_context(|| format!("failed to open {}", config.data_file_path().display()))?;

    match command {
        Command::Settings { action } => return run_settings(action, &SettingsService::new(store)).await,
        Command::Categories => return list_categories(&store).await,
        _ => {}
    }

    let catalog = CategoryCatalog::load(&store).await?;
    let lifecycle = TaskLifecycle::new(store.clone());
    lifecycle.load().await?;

    match command {
        Command::Add {
            title,
            description,
            category,
            priority,
            due,
        } => {
            let category = match category {
                Some(raw) => parse_category_id(&raw)?,
                None => catalog
                    .iter()
                    .next()
                    .map(|category| category.id)
                    .ok_or_else(|| anyhow!("No categories exist; pass --category"))?,
            };
            let priority = match priority {
                Some(raw) => parse_priority(&raw)?,
                None => SettingsService::new(store).get().await?.default_priority,
            };
            let mut draft = TaskDraft::new(title, category).with_priority(priority);
            if let Some(description) = description {
                draft = draft.with_description(description);
            }
            if let Some(raw) = due {
                draft = draft.with_due_date(parse_due_date(&raw)?);
            }
            draft.validate()?;
            let task = lifecycle.create(draft).await?;
            println!("created task #{}: {}", task.id, task.title);
        }
        Command::Ls {
            status,
            priority,
            category,
            search,
        } => {
            let selection = TaskFilterBuilder::new()
                .with_status(&status)
                .and_then(|builder| builder.with_priority(&priority))
                .and_then(|builder| builder.with_category(&category))
                .map_err(|err| anyhow!(err.describe_user_facing()))?
                .with_text(search)
                .build();
            let board = TaskBoard::with_selection(selection);

            let tasks = lifecycle.tasks().await;
            let view = board.derive(&tasks, today);
            if view.filtered.is_empty() {
                if board.selection().is_default() {
                    println!("No tasks found");
                } else {
                    println!("No tasks matched the provided filters");
                }
            } else {
                render_task_table(view.filtered.iter(), &catalog, today);
            }
            println!();
            println!("{}", stats_line(&view.stats));
        }
        Command::View { view, search } => {
            let view = NamedView::from_str(&view)?;
            let tasks = lifecycle.tasks().await;
            let selected = view.select_with_search(&tasks, today, search.as_deref().unwrap_or_default());
            println!("{view} ({today})");
            if selected.is_empty() {
                println!("Nothing here");
            } else {
                render_task_table(selected.iter().copied(), &catalog, today);
            }
            let counts = TaskStats::compute(selected.iter().copied(), today);
            println!();
            println!(
                "{} total, {} completed, {} pending",
                counts.total, counts.completed, counts.pending
            );
        }
        Command::Week => {
            let tasks = lifecycle.tasks().await;
            let agenda = WeekAgenda::build(&tasks, today);
            for day in &agenda.days {
                let marker = if day.date == today { " (today)" } else { "" };
                let done = if day.all_done() { " - all done" } else { "" };
                println!("{} {}{marker}{done}", day.weekday(), day.date);
                for task in &day.tasks {
                    println!("  {}", task_line(task, &catalog, today));
                }
            }
            println!();
            println!("{} tasks this week", agenda.task_count());
        }
        Command::Edit {
            id,
            title,
            description,
            clear_description,
            category,
            priority,
            due,
            clear_due,
        } => {
            let id = parse_task_id(&id)?;
            let current = lifecycle
                .task(id)
                .await
                .ok_or_else(|| anyhow!("Task #{id} not found"))?;
            let mut update = TaskUpdate::from_task(&current);
            if let Some(title) = title {
                update = update.title(title);
            }
            if clear_description {
                update = update.description(None);
            } else if let Some(description) = description {
                update = update.description(Some(description));
            }
            if let Some(raw) = category {
                update = update.category(parse_category_id(&raw)?);
            }
            if let Some(raw) = priority {
                update = update.priority(parse_priority(&raw)?);
            }
            if clear_due {
                update = update.due_date(None);
            } else if let Some(raw) = due {
                update = update.due_date(Some(parse_due_date(&raw)?));
            }
            let task = lifecycle.update(id, update).await?;
            println!("updated task #{}: {}", task.id, task.title);
        }
        Command::Done { id } => {
            let task = lifecycle.toggle_complete(parse_task_id(&id)?).await?;
            let verb = if task.completed { "completed" } else { "reopened" };
            println!("{verb} task #{}: {}", task.id, task.title);
        }
        Command::Rm { id } => {
            let id = parse_task_id(&id)?;
            lifecycle.delete(id).await?;
            println!("deleted task #{id}");
        }
        Command::Stats => {
            let tasks = lifecycle.tasks().await;
            let stats = TaskStats::compute(&tasks, today);
            println!("{}", stats_line(&stats));
            println!("{}% complete", stats.completion_percent());
            let due_today = NamedView::Today.select(&tasks, today);
            let today_stats = TaskStats::compute(due_today.iter().copied(), today);
            println!(
                "due today: {} ({} completed, {} pending)",
                today_stats.total, today_stats.completed, today_stats.pending
            );
        }
        other @ (Command::Settings { .. } | Command::Categories) => bail!("{other:?} does not use the task session"),
    }

    Ok(())
}

async fn run_settings(action: SettingsCommand, service: &SettingsService<LocalStore>) -> Result<()> {
    let settings = match action {
        SettingsCommand::Show => service.get().await?,
        SettingsCommand::Reset => service.reset().await?,
        SettingsCommand::Set { key, value } => {
            let mut patch = SettingsPatch::default();
            patch.assign(&key, &value)?;
            service.update(&patch).await?
        }
    };
    for (key, value) in settings.entries() {
        println!("{key} = {value}");
    }
    Ok(())
}

async fn list_categories(store: &LocalStore) -> Result<()> {
    let catalog = CategoryCatalog::load(store).await?;
    if catalog.is_empty() {
        println!("No categories found");
        return Ok(());
    }
    println!("ID | Name | Color | Icon | Tasks");
    println!("-- | ---- | ----- | ---- | -----");
    for category in &catalog {
        let count = store.fetch_by_category(category.id).await?.len();
        println!(
            "{} | {} | {} | {} | {count}",
            category.id,
            category.name,
            badge_color(&category.color),
            category.icon
        );
    }
    Ok(())
}

fn render_task_table<'a>(tasks: impl IntoIterator<Item = &'a Task>, catalog: &CategoryCatalog, today: Date) {
    println!("ID | Done | Title | Priority | Due | Category");
    println!("-- | ---- | ----- | -------- | --- | --------");
    for task in tasks {
        println!("{}", task_row(task, catalog, today));
    }
}

fn task_row(task: &Task, catalog: &CategoryCatalog, today: Date) -> String {
    format!(
        "{} | {} | {} | {} | {} | {}",
        task.id,
        if task.completed { "x" } else { " " },
        truncate_with_ellipsis(&task.title, TITLE_WIDTH),
        task.priority,
        due_label(task, today),
        catalog
            .get(task.category_id)
            .map_or("-", |category| category.name.as_str()),
    )
}

fn task_line(task: &Task, catalog: &CategoryCatalog, today: Date) -> String {
    let check = if task.completed { "[x]" } else { "[ ]" };
    let category = catalog
        .get(task.category_id)
        .map(|category| format!(" ({})", category.name))
        .unwrap_or_default();
    format!(
        "{check} #{} {} [{}]{category}{}",
        task.id,
        truncate_with_ellipsis(&task.title, TITLE_WIDTH),
        task.priority,
        if taskdeck_core::predicate::is_overdue(task, today) { " overdue" } else { "" }
    )
}

fn due_label(task: &Task, today: Date) -> Cow<'static, str> {
    match task.due_date {
        None => Cow::Borrowed("-"),
        Some(due) if due == today => Cow::Borrowed("today"),
        Some(due) if taskdeck_core::predicate::is_overdue(task, today) => Cow::Owned(format!("{due} (overdue)")),
        Some(due) => Cow::Owned(due.to_string()),
    }
}

fn stats_line(stats: &TaskStats) -> String {
    format!(
        "{} total, {} completed, {} pending, {} overdue",
        stats.total, stats.completed, stats.pending, stats.overdue
    )
}

fn truncate_with_ellipsis(input: &str, max_graphemes: usize) -> Cow<'_, str> {
    const ELLIPSIS: &str = "...";
    const ELLIPSIS_GRAPHEMES: usize = 3;

    let grapheme_count = input.graphemes(true).count();
    if grapheme_count <= max_graphemes {
        return Cow::Borrowed(input);
    }
    if max_graphemes <= ELLIPSIS_GRAPHEMES {
        return Cow::Owned(input.graphemes(true).take(max_graphemes).collect());
    }
    let mut truncated: String = input.graphemes(true).take(max_graphemes - ELLIPSIS_GRAPHEMES).collect();
    truncated.push_str(ELLIPSIS);
    Cow::Owned(truncated)
}

fn parse_task_id(raw: &str) -> Result<TaskId> {
    TaskId::from_str(raw).with_context(|| format!("Invalid task id: {raw}"))
}

fn parse_category_id(raw: &str) -> Result<CategoryId> {
    CategoryId::from_str(raw).with_context(|| format!("Invalid category id: {raw}"))
}

fn parse_priority(raw: &str) -> Result<Priority> {
    Priority::from_str(raw).with_context(|| format!("Invalid priority: {raw}"))
}

fn parse_due_date(raw: &str) -> Result<Date> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("Due date must not be empty");
    }
    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("Invalid due date (expected YYYY-MM-DD): {raw}"))
}
