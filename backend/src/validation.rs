use greenroute_shared::{LocationPayload, NumericValue, TripRequestPayload, VehiclePayload};

use crate::models::{Coordinate, TripRequest, VehicleParams};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Field {0} must be a finite number")]
    NotNumeric(&'static str),
    #[error("Field {field} is out of range: {value} (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
    #[error("Start and end locations are identical")]
    IdenticalEndpoints,
}

/// Turn a raw planning payload into a [`TripRequest`], rejecting anything
/// missing, non-numeric or out of range.
pub fn validate(payload: TripRequestPayload) -> Result<TripRequest, ValidationError> {
    let start = location(
        payload.start_location.as_ref(),
        ["start_location", "start_location.latitude", "start_location.longitude"],
    )?;
    let end = location(
        payload.end_location.as_ref(),
        ["end_location", "end_location.latitude", "end_location.longitude"],
    )?;
    if start == end {
        return Err(ValidationError::IdenticalEndpoints);
    }

    let battery_level_percent = number(
        payload.battery_level_percent.as_ref(),
        "battery_level_percent",
    )?;
    in_range(battery_level_percent, 0.0, 100.0, "battery_level_percent", "0 to 100")?;

    let vehicle = vehicle(payload.vehicle.as_ref())?;

    Ok(TripRequest {
        start,
        end,
        battery_level_percent,
        vehicle,
    })
}

/// `fields` names the location object, its latitude and its longitude.
fn location(
    payload: Option<&LocationPayload>,
    fields: [&'static str; 3],
) -> Result<Coordinate, ValidationError> {
    let [field, lat_field, lon_field] = fields;
    let payload = payload.ok_or(ValidationError::MissingField(field))?;

    let lat = number(payload.latitude.as_ref(), lat_field)?;
    in_range(lat, -90.0, 90.0, lat_field, "-90 to 90")?;
    let lon = number(payload.longitude.as_ref(), lon_field)?;
    in_range(lon, -180.0, 180.0, lon_field, "-180 to 180")?;

    Ok(Coordinate::new(lat, lon))
}

fn vehicle(payload: Option<&VehiclePayload>) -> Result<VehicleParams, ValidationError> {
    let payload = payload.ok_or(ValidationError::MissingField("vehicle"))?;

    Ok(VehicleParams {
        battery_capacity_kwh: positive(
            payload.battery_capacity_kwh.as_ref(),
            "vehicle.battery_capacity_kwh",
        )?,
        mass_kg: positive(payload.vehicle_mass_kg.as_ref(), "vehicle.vehicle_mass_kg")?,
        drag_coeff: positive(payload.drag_coeff.as_ref(), "vehicle.drag_coeff")?,
        frontal_area_m2: positive(payload.frontal_area_m2.as_ref(), "vehicle.frontal_area_m2")?,
        rolling_resistance_coeff: positive(
            payload.rolling_resistance_coeff.as_ref(),
            "vehicle.rolling_resistance_coeff",
        )?,
    })
}

fn number(value: Option<&NumericValue>, field: &'static str) -> Result<f64, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField(field))?;
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or(ValidationError::NotNumeric(field))
}

fn positive(value: Option<&NumericValue>, field: &'static str) -> Result<f64, ValidationError> {
    let value = number(value, field)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            expected: "greater than 0",
        })
    }
}

fn in_range(
    value: f64,
    min: f64,
    max: f64,
    field: &'static str,
    expected: &'static str,
) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            expected,
        })
    }
}
