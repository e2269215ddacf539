//! Fixtures shared by the ingestion test suites.

use revsnap_core::record::{
    COL_OUT_OF_ORDER, COL_RECORD_TYPE, COL_ROOM_NIGHTS, COL_ROOM_REVENUE, COL_STAY_DATE,
    RETAINED_COLUMNS,
};
use revsnap_core::{Hotel, NewHotel, RowDraft};
use revsnap_db::RevsnapDb;
use revsnap_parse::parse_report;

pub(crate) const FIXTURE_ROOMS: i64 = 120;

/// One report line: the leading property column plus the thirty retained
/// ones, tab separated.
pub(crate) fn report_line(kind: &str, date: &str, rooms: &str, revenue: &str) -> String {
    let mut retained = vec![String::new(); RETAINED_COLUMNS];
    retained[COL_RECORD_TYPE] = kind.to_string();
    retained[COL_STAY_DATE] = date.to_string();
    retained[COL_ROOM_NIGHTS] = rooms.to_string();
    retained[COL_ROOM_REVENUE] = revenue.to_string();
    retained[COL_OUT_OF_ORDER] = "0".to_string();
    let mut cols = vec!["PROP01".to_string()];
    cols.extend(retained);
    cols.join("\t")
}

/// A pure-HISTORY report covering November 2025 days `first..=last`, with
/// `rooms_base + day` room nights so every day and every base are distinct.
pub(crate) fn history_report(first: u32, last: u32, rooms_base: i64) -> String {
    (first..=last)
        .map(|day| {
            let rooms = rooms_base + i64::from(day);
            report_line(
                "History",
                &format!("{day:02}/11/25"),
                &rooms.to_string(),
                &format!("{}.00", rooms * 250),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn parse_fixture_report(report: &str) -> Vec<RowDraft> {
    parse_report(report.as_bytes(), FIXTURE_ROOMS).unwrap()
}

pub(crate) async fn hotel_with_email(db: &RevsnapDb, name: &str, email: &str) -> Hotel {
    let id = db
        .hotel_create(&NewHotel {
            name: name.to_string(),
            email: email.to_string(),
            available_rooms: FIXTURE_ROOMS,
        })
        .await
        .unwrap();
    db.hotel_get(id).await.unwrap().unwrap()
}

pub(crate) async fn hotel_fixture(db: &RevsnapDb) -> Hotel {
    hotel_with_email(db, "Harbour View", "reports@harbourview.example").await
}
