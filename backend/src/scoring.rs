use crate::models::{EnrichedCandidate, RouteCandidate, TripRequest};

/// Below this projected final charge a route needs a charging stop.
pub const LOW_BATTERY_THRESHOLD_PERCENT: f64 = 20.0;

/// Score weight of one charging stop; dominates any realistic energy or
/// duration term so a stop-free route always wins.
pub const CHARGING_STOP_PENALTY: f64 = 1000.0;

/// Battery percentage left after driving a route that draws `energy_kwh`.
pub fn projected_final_battery_percent(
    battery_level_percent: f64,
    energy_kwh: f64,
    battery_capacity_kwh: f64,
) -> f64 {
    battery_level_percent - (energy_kwh / battery_capacity_kwh) * 100.0
}

pub fn charging_stops_needed(projected_final_battery_percent: f64) -> u8 {
    if projected_final_battery_percent < LOW_BATTERY_THRESHOLD_PERCENT {
        1
    } else {
        0
    }
}

/// Lower is better.
pub fn score(charging_stops: u8, energy_kwh: f64, duration_min: f64) -> f64 {
    f64::from(charging_stops) * CHARGING_STOP_PENALTY + energy_kwh + duration_min / 60.0
}

/// Attach projected battery, stop need and score to a predicted candidate.
pub fn evaluate(
    index: usize,
    route: RouteCandidate,
    elevation_gain_m: f64,
    temperature_c: f64,
    predicted_energy_kwh: f64,
    request: &TripRequest,
) -> EnrichedCandidate {
    let projected = projected_final_battery_percent(
        request.battery_level_percent,
        predicted_energy_kwh,
        request.vehicle.battery_capacity_kwh,
    );
    let stops = charging_stops_needed(projected);
    let score = score(stops, predicted_energy_kwh, route.duration_min());

    EnrichedCandidate {
        index,
        route,
        elevation_gain_m,
        temperature_c,
        predicted_energy_kwh,
        projected_final_battery_percent: projected,
        charging_stops_needed: stops,
        score,
    }
}

/// Pick the lowest score; on ties the earliest candidate (provider order) wins.
pub fn select_best(mut candidates: Vec<EnrichedCandidate>) -> Option<EnrichedCandidate> {
    candidates.sort_by_key(|c| c.index);

    let mut best: Option<EnrichedCandidate> = None;
    for candidate in candidates {
        match &best {
            Some(current) if candidate.score >= current.score => {}
            _ => best = Some(candidate),
        }
    }
    best
}
