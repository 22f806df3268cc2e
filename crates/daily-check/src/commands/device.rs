use anyhow::{Result, bail};
use daily_check_app::{Checklist, KeyValueStore};

use super::confirm;
use crate::DeviceCommand;

pub(super) fn run<S: KeyValueStore>(command: DeviceCommand, checklist: &mut Checklist<S>) -> Result<()> {
    match command {
        DeviceCommand::Ls => {
            if checklist.devices().is_empty() {
                println!("No devices registered");
            }
            for (position, label) in checklist.devices().iter().enumerate() {
                println!("{}. {label}", position + 1);
            }
        }
        DeviceCommand::Add { label } => {
            let label = checklist.add_device(&label)?;
            println!("added device: {label}");
        }
        DeviceCommand::Rename { index, label } => {
            let index = zero_based(index)?;
            if checklist.rename_device(index, &label)? {
                println!("device {}: {}", index + 1, label.trim());
            } else {
                println!("No device at position {}; nothing changed", index + 1);
            }
        }
        DeviceCommand::Rm { index, yes } => {
            let index = zero_based(index)?;
            let Some(label) = checklist.devices().get(index).cloned() else {
                println!("No device at position {}; nothing changed", index + 1);
                return Ok(());
            };
            if !yes && !confirm(&format!("Remove device '{label}'? Tasks keep their device text."))? {
                println!("Aborted.");
                return Ok(());
            }
            if let Some(removed) = checklist.remove_device(index)? {
                println!("removed device: {removed}");
            }
        }
    }
    Ok(())
}

fn zero_based(position: usize) -> Result<usize> {
    let Some(index) = position.checked_sub(1) else {
        bail!("device positions start at 1");
    };
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use daily_check_app::{AppConfig, MemoryStore};

    #[test]
    fn positions_are_one_based() -> Result<()> {
        assert_eq!(zero_based(1)?, 0);
        assert!(zero_based(0).is_err());
        Ok(())
    }

    #[test]
    fn device_commands_edit_the_registry() -> Result<()> {
        let storage = MemoryStore::new();
        let mut checklist = Checklist::open(&storage, &AppConfig::default())?;

        run(DeviceCommand::Add { label: " Watch ".into() }, &mut checklist)?;
        run(
            DeviceCommand::Rename {
                index: 1,
                label: "Smartphone".into(),
            },
            &mut checklist,
        )?;
        run(DeviceCommand::Rm { index: 2, yes: true }, &mut checklist)?;
        run(DeviceCommand::Rm { index: 42, yes: true }, &mut checklist)?;

        assert_eq!(checklist.devices(), ["Smartphone", "Desktop", "Tablet", "Watch"]);
        Ok(())
    }

    #[test]
    fn duplicate_device_is_reported_as_error() -> Result<()> {
        let storage = MemoryStore::new();
        let mut checklist = Checklist::open(&storage, &AppConfig::default())?;

        let Err(err) = run(DeviceCommand::Add { label: "Phone".into() }, &mut checklist) else {
            panic!("duplicate label should fail");
        };
        assert!(err.to_string().contains("already exists"));
        Ok(())
    }
}
