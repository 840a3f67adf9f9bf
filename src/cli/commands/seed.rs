use anyhow::bail;
use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::utils::output_success;
use crate::cli::{connect_store, OutputFormat};
use crate::database::models::{Block, Container, Hostel};
use crate::database::Repository;
use crate::services::seed::seed_if_empty;

#[derive(Subcommand)]
pub enum SeedCommands {
    #[command(about = "Insert the default room components for a hostel or block that has none")]
    Components {
        #[arg(help = "Hostel id")]
        hostel_id: Uuid,
        #[arg(long, help = "Seed this block of the hostel instead of the hostel itself")]
        block: Option<Uuid>,
    },
}

pub async fn handle(cmd: SeedCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = connect_store().await?;

    match cmd {
        SeedCommands::Components { hostel_id, block } => {
            let hostel = Repository::<Hostel>::new(store.as_ref()).select_404(hostel_id).await?;
            let container = match block {
                Some(block_id) => {
                    let block = Repository::<Block>::new(store.as_ref()).select_404(block_id).await?;
                    if block.hostel_id != hostel.id {
                        bail!("Block {} does not belong to hostel {}", block.id, hostel.id);
                    }
                    Container::block(hostel.id, block.id)
                }
                None => Container::hostel(hostel.id),
            };

            match seed_if_empty(store.as_ref(), container).await? {
                Some(seeded) => output_success(
                    &output_format,
                    &format!("Seeded {} components", seeded.len()),
                    Some(json!({ "seeded": seeded.len() })),
                ),
                None => output_success(
                    &output_format,
                    "Components already present, nothing seeded",
                    Some(json!({ "seeded": 0 })),
                ),
            }
        }
    }
}
