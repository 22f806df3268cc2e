use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use daily_check_app::{AppConfig, Checklist, KeyValueStore, TaskView, autofill};
use daily_check_core::{Task, TaskFields, TaskId, TaskStatus, normalize_check_in_time};
use daily_check_suggest::{HttpSuggestionClient, SuggestionClient};

use crate::{Command, LsFormat};

mod backup;
mod device;

pub fn run<S: KeyValueStore>(command: Command, checklist: &mut Checklist<S>, config: &AppConfig) -> Result<()> {
    match command {
        Command::Add {
            name,
            time,
            description,
            device,
            app,
            autofill,
        } => {
            let mut form = TaskFields {
                name,
                description: description.unwrap_or_default(),
                device: device.unwrap_or_default(),
                app_or_url: app.unwrap_or_default(),
                check_in_time: time.unwrap_or_default(),
            };
            if autofill {
                autofill_form(config, &mut form);
            }
            let task = checklist.create_task(validate_fields(form)?)?;
            println!("created task: {} ({} at {})", task.id, task.name, task.check_in_time);
        }
        Command::Edit {
            id,
            name,
            time,
            description,
            device,
            app,
        } => {
            let Some(task) = find_task(checklist, &id)? else {
                return Ok(());
            };
            let task_id = task.id.clone();
            let mut fields = task.fields();
            if let Some(name) = name {
                fields.name = name;
            }
            if let Some(time) = time {
                fields.check_in_time = time;
            }
            if let Some(description) = description {
                fields.description = description;
            }
            if let Some(device) = device {
                fields.device = device;
            }
            if let Some(app) = app {
                fields.app_or_url = app;
            }
            checklist.update_task(&task_id, validate_fields(fields)?)?;
            println!("updated task: {task_id}");
        }
        Command::Done { id } => change_status(checklist, &id, TaskStatus::Completed)?,
        Command::Skip { id } => change_status(checklist, &id, TaskStatus::Skipped)?,
        Command::Undo { id } => change_status(checklist, &id, TaskStatus::Pending)?,
        Command::Rm { id, yes } => {
            let Some(task) = find_task(checklist, &id)? else {
                return Ok(());
            };
            let (task_id, name) = (task.id.clone(), task.name.clone());
            if !yes && !confirm(&format!("Delete task '{name}'?"))? {
                println!("Aborted.");
                return Ok(());
            }
            checklist.delete_task(&task_id)?;
            println!("deleted task: {task_id}");
        }
        Command::Ls { view, format } => {
            let tasks = checklist.tasks_in(view);
            match format {
                LsFormat::Json => println!("{}", serde_json::to_string_pretty(&tasks)?),
                LsFormat::Table if tasks.is_empty() => {
                    if view == TaskView::All {
                        println!("No tasks found");
                    } else {
                        println!("No {view} tasks");
                    }
                }
                LsFormat::Table => {
                    render_task_table(&tasks);
                    println!();
                    println!("{}", checklist.progress());
                }
            }
        }
        Command::Move { id, before } => {
            let Some(from) = find_task(checklist, &id)?.map(|task| task.id.clone()) else {
                return Ok(());
            };
            let Some(to) = find_task(checklist, &before)?.map(|task| task.id.clone()) else {
                return Ok(());
            };
            if checklist.move_task(TaskView::All, &from, &to)? {
                println!("moved task {from} before {to}");
            } else {
                println!("nothing changed: only distinct pending tasks can be reordered");
            }
        }
        Command::Device { cmd } => device::run(cmd, checklist)?,
        Command::Export { output } => backup::export(checklist, output)?,
        Command::Import { path, yes } => backup::import(checklist, &path, yes)?,
        Command::Suggest { text } => {
            let client = HttpSuggestionClient::from_env(config.suggest.clone())?;
            let suggestion = client.suggest(&text)?;
            println!("{}", serde_json::to_string_pretty(&suggestion)?);
        }
    }

    Ok(())
}

fn change_status<S: KeyValueStore>(checklist: &mut Checklist<S>, raw: &str, status: TaskStatus) -> Result<()> {
    let Some(task) = find_task(checklist, raw)? else {
        return Ok(());
    };
    let task_id = task.id.clone();
    checklist.set_status(&task_id, status)?;
    println!("{task_id}: {status}");
    Ok(())
}

/// Resolve a full id or unique id prefix. Prints a notice when nothing matches.
fn find_task<'a, S>(checklist: &'a Checklist<S>, raw: &str) -> Result<Option<&'a Task>> {
    let task = resolve_task(checklist.tasks(), raw)?;
    if task.is_none() {
        println!("No task matches '{}'; nothing changed", raw.trim());
    }
    Ok(task)
}

fn resolve_task<'a>(tasks: &'a [Task], raw: &str) -> Result<Option<&'a Task>> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("task id must not be empty");
    }
    let exact = TaskId::from(raw);
    if let Some(task) = tasks.iter().find(|task| task.id == exact) {
        return Ok(Some(task));
    }
    let mut candidates = tasks.iter().filter(|task| task.id.as_str().starts_with(raw));
    match (candidates.next(), candidates.next()) {
        (Some(_), Some(_)) => bail!("task id prefix '{raw}' is ambiguous"),
        (found, _) => Ok(found),
    }
}

fn validate_fields(mut fields: TaskFields) -> Result<TaskFields> {
    fields.name = fields.name.trim().to_owned();
    if fields.name.is_empty() {
        bail!("task name must not be empty");
    }
    if fields.check_in_time.trim().is_empty() {
        bail!("a check-in time is required (--time HH:mm)");
    }
    fields.check_in_time = normalize_check_in_time(&fields.check_in_time)
        .with_context(|| format!("invalid check-in time '{}'", fields.check_in_time))?;
    Ok(fields)
}

fn autofill_form(config: &AppConfig, form: &mut TaskFields) {
    let outcome =
        HttpSuggestionClient::from_env(config.suggest.clone()).and_then(|client| autofill(&client, form));
    match outcome {
        Ok(true) => println!("filled blank fields from suggestion"),
        Ok(false) => {}
        Err(err) => eprintln!("{err}; continuing with the values given"),
    }
}

fn render_task_table(tasks: &[&Task]) {
    println!("ID | Time | Status | Name | Device | App/URL");
    println!("-- | ---- | ------ | ---- | ------ | -------");

    for task in tasks {
        println!(
            "{} | {} | {} | {} | {} | {}",
            task.id,
            task.check_in_time,
            task.status,
            task.name,
            or_dash(&task.device),
            or_dash(&task.app_or_url)
        );
    }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

/// Ask a yes/no question on stdin; anything but `y`/`yes` declines.
pub(crate) fn confirm(prompt: &str) -> Result<bool> {
    let stdin = io::stdin();
    confirm_with(&mut stdin.lock(), &mut io::stdout(), prompt)
}

fn confirm_with(input: &mut impl BufRead, output: &mut impl Write, prompt: &str) -> Result<bool> {
    write!(output, "{prompt} [y/N]: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
