use revsnap_core::SnapshotStatus;
use revsnap_db::DbError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompareError>;

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("hotel not found: {0}")]
    HotelNotFound(i64),

    #[error("snapshot not found: {0}")]
    SnapshotNotFound(i64),

    #[error("snapshot {snapshot_id} does not belong to hotel {hotel_id}")]
    WrongHotel { snapshot_id: i64, hotel_id: i64 },

    #[error("snapshot {snapshot_id} is {status}, not COMPLETED")]
    NotCompleted {
        snapshot_id: i64,
        status: SnapshotStatus,
    },

    #[error("not enough data to compare: {0}")]
    InsufficientData(String),
}
