//! Request payloads and their field constraints.
//!
//! Payloads are deserialized as plain strings and checked by `validate()`,
//! so that a bad license symbol surfaces as [`FleetError::InvalidCategory`]
//! rather than a generic deserialization failure.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{FleetError, FleetResult};
use crate::license::LicenseCategory;

/// Maximum driver name length, in characters.
pub const NAME_MAX_CHARS: usize = 255;
/// Maximum plate length, in characters.
pub const PLATE_MAX_CHARS: usize = 50;

/// Body of driver create and update requests.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DriverInput {
    pub name: String,
    /// One of `A`, `B`, `C`, `D`, `E`.
    pub license_type: String,
}

/// Driver fields after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverFields {
    pub name: String,
    pub license_type: LicenseCategory,
}

impl DriverInput {
    /// # Errors
    ///
    /// `InvalidInput` for an empty or overlong name, `InvalidCategory` for an
    /// unknown license symbol.
    pub fn validate(self) -> FleetResult<DriverFields> {
        let name = required_text("name", &self.name, NAME_MAX_CHARS)?;
        let license_type = self.license_type.parse()?;
        Ok(DriverFields { name, license_type })
    }
}

/// Body of truck create and update requests.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TruckInput {
    pub plate: String,
    /// One of `A`, `B`, `C`, `D`, `E`.
    pub min_license_type: String,
}

/// Truck fields after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruckFields {
    pub plate: String,
    pub min_license_type: LicenseCategory,
}

impl TruckInput {
    /// # Errors
    ///
    /// `InvalidInput` for an empty or overlong plate, `InvalidCategory` for an
    /// unknown license symbol.
    pub fn validate(self) -> FleetResult<TruckFields> {
        let plate = required_text("plate", &self.plate, PLATE_MAX_CHARS)?;
        let min_license_type = self.min_license_type.parse()?;
        Ok(TruckFields {
            plate,
            min_license_type,
        })
    }
}

/// Body of assignment create and update requests. Updates replace all three
/// fields. The ids are not checked here; the service resolves them, so an
/// unknown or blank id is a not-found outcome.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignmentInput {
    pub driver_id: String,
    pub truck_id: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: NaiveDate,
}

/// Query string of the truck availability check.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AvailabilityQuery {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: NaiveDate,
}

fn required_text(field: &'static str, value: &str, max_chars: usize) -> FleetResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FleetError::invalid_input(field, "must not be empty"));
    }
    if trimmed.chars().count() > max_chars {
        return Err(FleetError::invalid_input(
            field,
            format!("must be at most {max_chars} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_input_trims_and_parses() {
        let fields = DriverInput {
            name: "  Ana Souza ".to_string(),
            license_type: "D".to_string(),
        }
        .validate()
        .unwrap();
        assert_eq!(fields.name, "Ana Souza");
        assert_eq!(fields.license_type, LicenseCategory::D);
    }

    #[test]
    fn driver_input_rejects_blank_name() {
        let err = DriverInput {
            name: "   ".to_string(),
            license_type: "A".to_string(),
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, FleetError::InvalidInput { field: "name", .. }));
    }

    #[test]
    fn driver_input_rejects_unknown_category() {
        let err = DriverInput {
            name: "Ana".to_string(),
            license_type: "Z".to_string(),
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, FleetError::InvalidCategory(_)));
    }

    #[test]
    fn truck_input_enforces_plate_length() {
        let err = TruckInput {
            plate: "P".repeat(PLATE_MAX_CHARS + 1),
            min_license_type: "C".to_string(),
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, FleetError::InvalidInput { field: "plate", .. }));

        let ok = TruckInput {
            plate: "P".repeat(PLATE_MAX_CHARS),
            min_license_type: "C".to_string(),
        }
        .validate();
        assert!(ok.is_ok());
    }

    #[test]
    fn assignment_input_parses_iso_date() {
        let input: AssignmentInput = serde_json::from_str(
            r#"{"driver_id":"d1","truck_id":"t1","date":"2025-02-15"}"#,
        )
        .unwrap();
        assert_eq!(input.date, NaiveDate::from_ymd_opt(2025, 2, 15).unwrap());
    }

    #[test]
    fn assignment_input_rejects_datetime_strings() {
        let parsed = serde_json::from_str::<AssignmentInput>(
            r#"{"driver_id":"d1","truck_id":"t1","date":"2025-02-15T10:00:00"}"#,
        );
        assert!(parsed.is_err());
    }
}
