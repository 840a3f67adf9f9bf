use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::{connect_store, OutputFormat};
use crate::services::maintenance::{
    assign_city_to_hostels, assign_missing_hostel_slugs, copy_hostel_city_to_profiles,
};

#[derive(Subcommand)]
pub enum MigrateCommands {
    #[command(about = "Give every hostel profile without a slug a unique one")]
    HostelSlugs,

    #[command(about = "Assign a city to every hostel that has none")]
    HostelCity {
        #[arg(help = "City id")]
        city_id: uuid::Uuid,
    },

    #[command(about = "Copy each hostel's city into its profile basic info")]
    ProfileCity,
}

pub async fn handle(cmd: MigrateCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = connect_store().await?;

    match cmd {
        MigrateCommands::HostelSlugs => {
            let assigned = assign_missing_hostel_slugs(store.as_ref()).await?;
            if matches!(output_format, OutputFormat::Text) {
                for (id, slug) in &assigned {
                    println!("  {} -> {}", id, slug);
                }
            }
            let slugs: Vec<_> = assigned
                .iter()
                .map(|(id, slug)| json!({ "profileId": id, "slug": slug }))
                .collect();
            output_success(
                &output_format,
                &format!("Assigned {} hostel profile slugs", assigned.len()),
                Some(json!({ "assigned": slugs })),
            )
        }
        MigrateCommands::HostelCity { city_id } => {
            let updated = assign_city_to_hostels(store.as_ref(), city_id).await?;
            output_success(
                &output_format,
                &format!("Assigned city {} to {} hostels", city_id, updated),
                Some(json!({ "updated": updated })),
            )
        }
        MigrateCommands::ProfileCity => {
            let updated = copy_hostel_city_to_profiles(store.as_ref()).await?;
            output_success(
                &output_format,
                &format!("Updated {} hostel profiles", updated),
                Some(json!({ "updated": updated })),
            )
        }
    }
}
