use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use daily_check_app::{Checklist, ImportPlan, KeyValueStore};
use daily_check_core::{BackupDocument, BackupFormat};
use time::{Date, OffsetDateTime};

use super::confirm;

pub(super) fn export<S>(checklist: &Checklist<S>, output: Option<PathBuf>) -> Result<()> {
    let document = checklist.export();
    let json = document.to_json_pretty()?;

    let path = output.unwrap_or_else(|| PathBuf::from(BackupDocument::file_name(today())));
    if path.as_os_str() == "-" {
        println!("{json}");
        return Ok(());
    }

    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    println!(
        "exported {} tasks and {} devices to {}",
        document.tasks.len(),
        document.devices.len(),
        path.display()
    );
    Ok(())
}

pub(super) fn import<S: KeyValueStore>(checklist: &mut Checklist<S>, path: &Path, yes: bool) -> Result<()> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let plan = checklist
        .prepare_import(&raw)
        .with_context(|| format!("{} is not a usable backup", path.display()))?;

    println!("{}", describe_plan(&plan, checklist.tasks().len()));
    if !yes && !confirm("Replace current data with this backup?")? {
        println!("Aborted.");
        return Ok(());
    }

    let tasks = plan.task_count();
    checklist.apply_import(plan)?;
    println!("imported {tasks} tasks");
    Ok(())
}

fn describe_plan(plan: &ImportPlan, current_tasks: usize) -> String {
    let format = match plan.format() {
        BackupFormat::Legacy => "legacy task list",
        BackupFormat::Versioned => "backup",
    };
    let devices = plan.device_count().map_or_else(
        || "device list unchanged".to_owned(),
        |count| format!("{count} devices"),
    );
    format!(
        "{format} with {} tasks ({devices}); replaces {current_tasks} current tasks",
        plan.task_count()
    )
}

fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}
