use std::sync::Arc;

use anyhow::bail;
use caloscope_core::{
    application::{CaloscopeClient, CaloscopeHistoryController},
    domain::{
        food_history::{
            DeleteOutcome, FetchOutcome, FetchRequest, FoodEntry, HistoryScope, SkipReason,
            ports::DeleteConfirmation,
        },
        refresh::RefreshReason,
    },
};
use tracing::debug;

use super::{
    prompt::{AlwaysConfirm, StdinConfirmation},
    render, user_error,
};
use crate::args::HistoryCommand;

/// How far `history list` pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageLimit {
    UpTo(u32),
    All,
}

impl PageLimit {
    fn wants_more(&self, loaded: u32) -> bool {
        match self {
            PageLimit::UpTo(last) => loaded < *last,
            PageLimit::All => true,
        }
    }
}

fn check(outcome: FetchOutcome) -> anyhow::Result<()> {
    match outcome {
        FetchOutcome::Failed(error) => Err(user_error(error)),
        FetchOutcome::Skipped(reason) => {
            debug!(?reason, "fetch skipped");
            Ok(())
        }
        FetchOutcome::Applied { .. } | FetchOutcome::Discarded => Ok(()),
    }
}

async fn load_pages(
    controller: &CaloscopeHistoryController,
    first: FetchRequest,
    limit: PageLimit,
) -> anyhow::Result<()> {
    check(controller.fetch(first).await)?;

    loop {
        let snapshot = controller.snapshot();
        if !snapshot.has_more || !limit.wants_more(snapshot.page) {
            return Ok(());
        }
        match controller.load_more().await {
            FetchOutcome::Skipped(SkipReason::NothingMore) => return Ok(()),
            outcome => check(outcome)?,
        }
    }
}

/// Pages through the unfiltered history until `id` shows up.
async fn find_entry(controller: &CaloscopeHistoryController, id: &str) -> anyhow::Result<FoodEntry> {
    check(controller.load_initial().await)?;

    loop {
        let snapshot = controller.snapshot();
        if let Some(entry) = snapshot.items.iter().find(|entry| entry.id == id) {
            return Ok(entry.clone());
        }
        if !snapshot.has_more {
            bail!("No food entry with id {id}.");
        }
        check(controller.load_more().await)?;
    }
}

pub async fn run(client: &CaloscopeClient, command: HistoryCommand) -> anyhow::Result<()> {
    match command {
        HistoryCommand::List {
            sort,
            scope,
            page,
            all,
            json,
        } => {
            let controller = client.history_controller(Arc::new(AlwaysConfirm), scope.scope());
            let limit = if all { PageLimit::All } else { PageLimit::UpTo(page) };
            load_pages(&controller, FetchRequest::page(1).with_sort(sort), limit).await?;

            let snapshot = controller.snapshot();
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print!("{}", render::history_table(&snapshot));
            }
        }
        HistoryCommand::Edit {
            id,
            calories,
            comment,
        } => {
            let controller = client.history_controller(Arc::new(AlwaysConfirm), HistoryScope::All);
            let entry = find_entry(&controller, &id).await?;
            let updated = controller
                .save_edit(&entry, &calories, &comment)
                .await
                .map_err(user_error)?;
            client.notify_history_changed(RefreshReason::EntryEdited);
            println!("Updated {}.", render::entry_summary(&updated));
            println!(
                "Total: {:.0} kcal",
                controller.snapshot().total_calories
            );
        }
        HistoryCommand::Delete { id, yes } => {
            let confirmation: Arc<dyn DeleteConfirmation> = if yes {
                Arc::new(AlwaysConfirm)
            } else {
                Arc::new(StdinConfirmation)
            };
            let controller = client.history_controller(confirmation, HistoryScope::All);
            let entry = find_entry(&controller, &id).await?;

            match controller.delete(&entry.id).await.map_err(user_error)? {
                DeleteOutcome::Deleted => {
                    client.notify_history_changed(RefreshReason::EntryDeleted);
                    println!("Deleted {}.", render::entry_summary(&entry));
                    println!(
                        "Total: {:.0} kcal",
                        controller.snapshot().total_calories
                    );
                }
                DeleteOutcome::Cancelled => println!("Nothing deleted."),
                DeleteOutcome::NotFound => bail!("No food entry with id {id}."),
                DeleteOutcome::AlreadyDeleting => bail!("This entry is already being deleted."),
            }
        }
    }

    Ok(())
}
