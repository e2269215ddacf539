//! Derived per-day performance metrics.

use serde::{Deserialize, Serialize};

/// Occupancy, ADR and RevPAR derived from a day's raw figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub occupancy_pct: f64,
    pub adr: f64,
    pub revpar: f64,
}

impl DerivedMetrics {
    /// Derive the three metrics, guarding each division by zero.
    pub fn derive(room_nights: f64, room_revenue: f64, available_rooms: i64) -> Self {
        let capacity = available_rooms as f64;
        let occupancy_pct = if capacity > 0.0 {
            round2(room_nights / capacity * 100.0)
        } else {
            0.0
        };
        let adr = if room_nights != 0.0 {
            round2(room_revenue / room_nights)
        } else {
            0.0
        };
        let revpar = if capacity > 0.0 {
            round2(room_revenue / capacity)
        } else {
            0.0
        };
        Self {
            occupancy_pct,
            adr,
            revpar,
        }
    }
}

/// Round to two decimals so stored figures stay stable across reruns.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_standard_day() {
        let m = DerivedMetrics::derive(45.0, 12500.0, 120);
        assert_eq!(m.occupancy_pct, 37.50);
        assert_eq!(m.adr, 277.78);
        assert_eq!(m.revpar, 104.17);
    }

    #[test]
    fn test_zero_room_nights_yields_zero_adr() {
        let m = DerivedMetrics::derive(0.0, 500.0, 120);
        assert_eq!(m.adr, 0.0);
        assert_eq!(m.occupancy_pct, 0.0);
        assert_eq!(m.revpar, 4.17);
    }

    #[test]
    fn test_zero_capacity_yields_zero_occupancy_and_revpar() {
        let m = DerivedMetrics::derive(10.0, 1000.0, 0);
        assert_eq!(m.occupancy_pct, 0.0);
        assert_eq!(m.revpar, 0.0);
        assert_eq!(m.adr, 100.0);
    }

    #[test]
    fn test_all_zero_input_is_all_zero_output() {
        let m = DerivedMetrics::derive(0.0, 0.0, 0);
        assert_eq!(m.occupancy_pct, 0.0);
        assert_eq!(m.adr, 0.0);
        assert_eq!(m.revpar, 0.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(277.77777), 277.78);
        assert_eq!(round2(104.166), 104.17);
        assert_eq!(round2(-0.005), -0.01);
        assert_eq!(round2(2.0), 2.0);
    }
}
