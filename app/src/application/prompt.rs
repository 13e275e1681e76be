use std::io::{self, BufRead, Write};

use anyhow::Context;
use caloscope_core::domain::food_history::{FoodEntry, ports::DeleteConfirmation};

/// Writes `label` to stderr and reads one trimmed line from stdin.
pub fn ask(label: &str) -> anyhow::Result<String> {
    let mut stderr = io::stderr().lock();
    write!(stderr, "{label}: ").context("failed to write prompt")?;
    stderr.flush().context("failed to write prompt")?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Uses `provided` when set, otherwise prompts for it.
pub fn value_or_ask(provided: Option<String>, label: &str) -> anyhow::Result<String> {
    match provided {
        Some(value) => Ok(value),
        None => ask(label),
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Asks on the terminal before each delete. Needs the multi-threaded runtime.
pub struct StdinConfirmation;

impl DeleteConfirmation for StdinConfirmation {
    fn confirm_delete(&self, entry: &FoodEntry) -> bool {
        let label = format!(
            "Delete \"{}\" ({:.0} kcal)? [y/N]",
            entry.predicted_name, entry.calories
        );
        // Blocks on stdin from inside the controller's async delete.
        tokio::task::block_in_place(|| ask(&label)).is_ok_and(|answer| is_yes(&answer))
    }
}

/// Used with `--yes`.
pub struct AlwaysConfirm;

impl DeleteConfirmation for AlwaysConfirm {
    fn confirm_delete(&self, _entry: &FoodEntry) -> bool {
        true
    }
}
