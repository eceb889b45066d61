//! OpenAPI document for the HTTP API.

use axum::Json;
use fleet_core::{
    AssignmentDetail, AssignmentInput, Driver, DriverInput, LicenseCategory, Truck, TruckInput,
};
use utoipa::OpenApi;

use super::handlers::{
    assignments, drivers, root, trucks, AvailabilityResponse, ErrorResponse, MessageResponse,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Truck Management API",
        description = "Drivers, trucks and their daily assignments."
    ),
    paths(
        root::root_handler,
        drivers::create_driver,
        drivers::list_drivers,
        drivers::get_driver,
        drivers::update_driver,
        drivers::delete_driver,
        trucks::create_truck,
        trucks::list_trucks,
        trucks::get_truck,
        trucks::update_truck,
        trucks::delete_truck,
        trucks::truck_availability,
        assignments::create_assignment,
        assignments::list_assignments,
        assignments::get_assignment,
        assignments::update_assignment,
        assignments::delete_assignment,
    ),
    components(schemas(
        Driver,
        DriverInput,
        Truck,
        TruckInput,
        AssignmentDetail,
        AssignmentInput,
        LicenseCategory,
        ErrorResponse,
        MessageResponse,
        AvailabilityResponse,
    )),
    tags(
        (name = "drivers", description = "Driver registration"),
        (name = "trucks", description = "Truck registration and availability"),
        (name = "assignments", description = "Daily driver-to-truck bookings"),
    )
)]
pub struct ApiDoc;

/// Serves the generated document as JSON.
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        assert_eq!(doc.info.title, "Truck Management API");
        for path in [
            "/",
            "/api/drivers",
            "/api/drivers/{id}",
            "/api/trucks",
            "/api/trucks/{id}",
            "/api/trucks/{id}/availability",
            "/api/assignments",
            "/api/assignments/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
