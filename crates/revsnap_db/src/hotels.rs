//! Hotel database operations.

use crate::error::{is_unique_violation, DbError, Result};
use crate::RevsnapDb;
use revsnap_core::{Hotel, NewHotel};
use sqlx::Row;

impl RevsnapDb {
    /// Onboard a hotel. The routing email must be unique.
    pub async fn hotel_create(&self, new: &NewHotel) -> Result<i64> {
        let now = Self::now_millis();

        let result = sqlx::query(
            r#"
            INSERT INTO rs_hotels (name, email, available_rooms, active, created_at, updated_at)
            VALUES (?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(&new.name)
        .bind(new.email.to_lowercase())
        .bind(new.available_rooms)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::constraint(format!("hotel email already registered: {}", new.email))
            } else {
                e.into()
            }
        })?;

        Ok(result.last_insert_rowid())
    }

    /// Get a hotel by ID.
    pub async fn hotel_get(&self, id: i64) -> Result<Option<Hotel>> {
        let row = sqlx::query("SELECT * FROM rs_hotels WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row_to_hotel(&row))),
            None => Ok(None),
        }
    }

    /// Look a hotel up by its routing email (case-insensitive).
    pub async fn hotel_get_by_email(&self, email: &str) -> Result<Option<Hotel>> {
        let row = sqlx::query("SELECT * FROM rs_hotels WHERE email = ?")
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row_to_hotel(&row))),
            None => Ok(None),
        }
    }

    /// List hotels, optionally only the active ones.
    pub async fn hotel_list(&self, active_only: bool) -> Result<Vec<Hotel>> {
        let sql = if active_only {
            "SELECT * FROM rs_hotels WHERE active = 1 ORDER BY name"
        } else {
            "SELECT * FROM rs_hotels ORDER BY name"
        };

        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_hotel).collect())
    }

    /// Enable or disable ingestion for a hotel.
    pub async fn hotel_set_active(&self, id: i64, active: bool) -> Result<()> {
        let result = sqlx::query("UPDATE rs_hotels SET active = ?, updated_at = ? WHERE id = ?")
            .bind(active)
            .bind(Self::now_millis())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(format!("hotel {id}")));
        }
        Ok(())
    }

    /// Update the room capacity used for future snapshots.
    pub async fn hotel_set_available_rooms(&self, id: i64, available_rooms: i64) -> Result<()> {
        let result =
            sqlx::query("UPDATE rs_hotels SET available_rooms = ?, updated_at = ? WHERE id = ?")
                .bind(available_rooms)
                .bind(Self::now_millis())
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(format!("hotel {id}")));
        }
        Ok(())
    }
}

fn row_to_hotel(row: &sqlx::sqlite::SqliteRow) -> Hotel {
    Hotel {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        available_rooms: row.get("available_rooms"),
        active: row.get("active"),
        created_at: RevsnapDb::millis_to_datetime(row.get("created_at")),
        updated_at: RevsnapDb::millis_to_datetime(row.get("updated_at")),
    }
}
