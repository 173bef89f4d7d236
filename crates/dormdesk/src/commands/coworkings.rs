//! Coworking command handlers.

use tabled::Tabled;

use dormdesk_api::{Coworking, CoworkingListFilters};
use dormdesk_core::StoreError;

use crate::cli::{CoworkingsArgs, CoworkingsCommand};
use crate::error::CliError;
use crate::output::{self, detail_lines};

use super::Context;

#[derive(Tabled)]
struct CoworkingRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Building")]
    building: u32,
    #[tabled(rename = "Entrance")]
    entrance: u32,
    #[tabled(rename = "No.")]
    number: u32,
    #[tabled(rename = "Available")]
    available: &'static str,
}

impl From<&Coworking> for CoworkingRow {
    fn from(c: &Coworking) -> Self {
        Self {
            id: c.id.clone(),
            name: c.name.clone(),
            building: c.building,
            entrance: c.entrance,
            number: c.number,
            available: if c.available { "yes" } else { "no" },
        }
    }
}

fn detail(c: &Coworking) -> String {
    detail_lines(&[
        ("ID", c.id.clone()),
        ("Name", c.name.clone()),
        ("Building", c.building.to_string()),
        ("Entrance", c.entrance.to_string()),
        ("Number", c.number.to_string()),
        ("Available", if c.available { "yes" } else { "no" }.into()),
    ])
}

pub async fn handle(ctx: &Context<'_>, args: CoworkingsArgs) -> Result<(), CliError> {
    ctx.open("/coworkings")?;

    match args.command {
        CoworkingsCommand::List {
            building,
            entrance,
            available,
        } => {
            let filters = CoworkingListFilters {
                building,
                entrance,
                available,
            };
            let coworkings = ctx.client.coworkings().fetch_coworkings(&filters).await?;
            ctx.print(&output::render_list(
                ctx.format,
                &coworkings,
                |c| CoworkingRow::from(c),
                |c| c.id.clone(),
            ));
            Ok(())
        }

        CoworkingsCommand::Show { id } => {
            let coworking = ctx
                .client
                .api()
                .get_coworking(&id)
                .await
                .map_err(StoreError::from)?;
            ctx.print(&output::render_single(
                ctx.format,
                &coworking,
                detail,
                |c| c.id.clone(),
            ));
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::cli::OutputFormat;

    use super::*;

    #[test]
    fn table_lists_availability() {
        let coworkings = vec![Coworking {
            id: "C1".into(),
            name: "Room A".into(),
            building: 1,
            entrance: 2,
            number: 101,
            available: false,
        }];
        let table = output::render_list(
            OutputFormat::Table,
            &coworkings,
            |c| CoworkingRow::from(c),
            |c| c.id.clone(),
        );
        assert!(table.contains("Room A"));
        assert!(table.contains("no"));
    }
}
