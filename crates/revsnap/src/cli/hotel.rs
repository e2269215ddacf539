//! Hotel command - Manage hotels and their routing addresses
//!
//! Each hotel owns one routing address; mail arriving there is ingested
//! on its behalf.

use clap::Subcommand;
use serde::Serialize;

use crate::cli::config;
use crate::cli::error::HelpfulError;
use crate::cli::output::{print_table, print_table_colored, status_color};
use revsnap_core::{Hotel, NewHotel, Snapshot};
use revsnap_db::{DbError, RevsnapDb, SnapshotFilter};

/// Subcommands for hotel management
#[derive(Subcommand, Debug, Clone)]
pub enum HotelAction {
    /// Onboard a new hotel
    Add {
        /// Display name of the hotel
        name: String,
        /// Routing address its reports are mailed to
        #[arg(long)]
        email: String,
        /// Number of sellable rooms, used for occupancy and revpar
        #[arg(long)]
        rooms: i64,
        #[arg(long)]
        json: bool,
    },
    /// List hotels
    List {
        /// Include deactivated hotels
        #[arg(long)]
        all: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show hotel details and recent snapshots
    Show {
        id: i64,
        #[arg(long)]
        json: bool,
    },
    /// Change the sellable room count used for future snapshots
    SetRooms { id: i64, rooms: i64 },
    /// Resume ingesting a hotel's mail
    Enable { id: i64 },
    /// Stop ingesting a hotel's mail; unread items stay in the mailbox
    Disable { id: i64 },
}

/// Execute the hotel command
pub fn run(action: HotelAction) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        match action {
            HotelAction::Add {
                name,
                email,
                rooms,
                json,
            } => add(name, email, rooms, json).await,
            HotelAction::List { all, json } => list(all, json).await,
            HotelAction::Show { id, json } => show(id, json).await,
            HotelAction::SetRooms { id, rooms } => set_rooms(id, rooms).await,
            HotelAction::Enable { id } => set_active(id, true).await,
            HotelAction::Disable { id } => set_active(id, false).await,
        }
    })
}

async fn add(name: String, email: String, rooms: i64, json: bool) -> anyhow::Result<()> {
    let db = config::open_registry().await?;

    let new = NewHotel {
        name,
        email,
        available_rooms: rooms,
    };
    let id = match db.hotel_create(&new).await {
        Ok(id) => id,
        Err(DbError::Constraint(_)) => {
            return Err(HelpfulError::new(format!(
                "Routing email already in use: {}",
                new.email
            ))
            .with_context("Each hotel needs a unique routing address")
            .with_suggestion("TRY: revsnap hotel list   # Show existing routes")
            .into());
        }
        Err(err) => return Err(err.into()),
    };

    let hotel = db
        .hotel_get(id)
        .await?
        .ok_or_else(|| HelpfulError::hotel_not_found(id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&hotel)?);
    } else {
        println!(
            "Registered hotel {} \"{}\" <{}>",
            hotel.id, hotel.name, hotel.email
        );
    }

    Ok(())
}

async fn list(all: bool, json: bool) -> anyhow::Result<()> {
    let db = config::open_registry_existing().await?;
    let hotels = db.hotel_list(!all).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&hotels)?);
        return Ok(());
    }

    if hotels.is_empty() {
        println!("No hotels registered.");
        println!("TRY: revsnap hotel add \"Name\" --email reports@hotel.example --rooms 120");
        return Ok(());
    }

    let headers = &["ID", "NAME", "EMAIL", "ROOMS", "ACTIVE", "CREATED"];
    let rows: Vec<Vec<String>> = hotels
        .iter()
        .map(|hotel| {
            vec![
                hotel.id.to_string(),
                hotel.name.clone(),
                hotel.email.clone(),
                hotel.available_rooms.to_string(),
                if hotel.active { "yes" } else { "no" }.to_string(),
                hotel.created_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();

    print_table(headers, rows);
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HotelDetails {
    hotel: Hotel,
    recent_snapshots: Vec<Snapshot>,
}

async fn show(id: i64, json: bool) -> anyhow::Result<()> {
    let db = config::open_registry_existing().await?;

    let hotel = db
        .hotel_get(id)
        .await?
        .ok_or_else(|| HelpfulError::hotel_not_found(id))?;
    let recent = db
        .snapshot_list(SnapshotFilter {
            hotel_id: Some(id),
            limit: Some(5),
            ..Default::default()
        })
        .await?;

    if json {
        let details = HotelDetails {
            hotel,
            recent_snapshots: recent,
        };
        println!("{}", serde_json::to_string_pretty(&details)?);
        return Ok(());
    }

    println!("HOTEL {}", hotel.id);
    println!("  Name:   {}", hotel.name);
    println!("  Email:  {}", hotel.email);
    println!("  Rooms:  {}", hotel.available_rooms);
    println!("  Active: {}", if hotel.active { "yes" } else { "no" });
    println!("  Since:  {}", hotel.created_at.format("%Y-%m-%d %H:%M"));

    if recent.is_empty() {
        println!();
        println!("No snapshots yet.");
        return Ok(());
    }

    println!();
    println!("RECENT SNAPSHOTS");
    let headers = &["ID", "TAKEN AT", "FILE", "SEED", "STATUS", "ROWS"];
    let rows = recent
        .iter()
        .map(|snapshot| {
            vec![
                (snapshot.id.to_string(), None),
                (
                    snapshot.taken_at.format("%Y-%m-%d %H:%M").to_string(),
                    None,
                ),
                (snapshot.filename.clone(), None),
                (
                    if snapshot.is_seed { "yes" } else { "" }.to_string(),
                    None,
                ),
                (
                    snapshot.status.as_str().to_string(),
                    Some(status_color(snapshot.status)),
                ),
                (snapshot.row_count.to_string(), None),
            ]
        })
        .collect();

    print_table_colored(headers, rows);
    Ok(())
}

async fn set_rooms(id: i64, rooms: i64) -> anyhow::Result<()> {
    let db = config::open_registry_existing().await?;

    match db.hotel_set_available_rooms(id, rooms).await {
        Ok(()) => {}
        Err(DbError::NotFound(_)) => return Err(HelpfulError::hotel_not_found(id).into()),
        Err(err) => return Err(err.into()),
    }

    println!("Hotel {id} now has {rooms} sellable rooms");
    Ok(())
}

async fn set_active(id: i64, active: bool) -> anyhow::Result<()> {
    let db = config::open_registry_existing().await?;

    match db.hotel_set_active(id, active).await {
        Ok(()) => {}
        Err(DbError::NotFound(_)) => return Err(HelpfulError::hotel_not_found(id).into()),
        Err(err) => return Err(err.into()),
    }

    println!(
        "Hotel {} {}",
        id,
        if active { "activated" } else { "deactivated" }
    );
    Ok(())
}
