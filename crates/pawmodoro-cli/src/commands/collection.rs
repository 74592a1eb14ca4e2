use std::sync::Arc;

use clap::Subcommand;
use pawmodoro_core::{Catalog, CollectionStore};
use serde_json::json;

use super::{open_collection, print_json, CliResult};

#[derive(Subcommand)]
pub enum CollectionAction {
    /// List unlocked collectibles
    List,
    /// Make an unlocked collectible the companion
    Companion {
        /// Collectible ID
        id: String,
    },
    /// Show every collectible with its unlock condition
    Catalog,
}

pub fn run(action: CollectionAction) -> CliResult {
    let (_db, mut collection) = open_collection(Arc::new(Catalog::builtin()))?;

    match action {
        CollectionAction::List => {
            let entries: Vec<_> = collection
                .list_unlocked()
                .iter()
                .filter_map(|entry| {
                    let def = collection.catalog().get(&entry.collectible_id)?;
                    Some(json!({
                        "id": def.id,
                        "name": def.name,
                        "rarity": def.rarity,
                        "isCompanion": entry.is_companion,
                        "unlockedAt": entry.unlocked_at,
                        "progress": entry.progress,
                    }))
                })
                .collect();
            print_json(&entries)?;
        }
        CollectionAction::Companion { id } => {
            if !collection.set_companion(&id) {
                return Err(format!("collectible not unlocked: {id}").into());
            }
            println!("companion set to {id}");
        }
        CollectionAction::Catalog => {
            let entries: Vec<_> = collection
                .catalog()
                .entries()
                .iter()
                .map(|def| {
                    json!({
                        "id": def.id,
                        "name": def.name,
                        "description": def.description,
                        "rarity": def.rarity,
                        "unlockCondition": def.unlock_condition,
                        "dropWeight": def.drop_weight,
                        "unlocked": collection.is_unlocked(&def.id),
                    })
                })
                .collect();
            print_json(&entries)?;
        }
    }
    Ok(())
}
