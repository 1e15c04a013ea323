//! Integration tests for catalog API DTOs
//!
//! These tests exercise the request/response shapes the handlers consume.
//! For full integration testing, set DATABASE_URL environment variable.

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use traslado_api::dto::catalog::{
        LocationImportRequest, LocationUpsertRequest, OverrideUpsertRequest, RateUpsertRequest,
        RouteSummaryResponse, VehicleResponse, ZoneUpsertRequest,
    };
    use traslado_api::dto::quote::QuoteRequest;
    use traslado_api::PaginationParams;
    use traslado_core::models::{Route, RouteSummary, Vehicle, VehicleCategory};
    use validator::Validate;

    #[test]
    fn test_pagination_offset_calculation() {
        let params = PaginationParams {
            page: 1,
            per_page: 10,
        };
        assert_eq!(params.offset(), 0);

        let params = PaginationParams {
            page: 3,
            per_page: 20,
        };
        assert_eq!(params.offset(), 40);
        assert_eq!(params.limit(), 20);
    }

    #[test]
    fn test_quote_request_validation() {
        let req: QuoteRequest = serde_json::from_str(
            r#"{"origin":"puj-airport","destination":"hotel-x","passengers":3}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());

        let req: QuoteRequest =
            serde_json::from_str(r#"{"origin":"","destination":"hotel-x","passengers":0}"#)
                .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_zone_request_full_body() {
        let req: ZoneUpsertRequest = serde_json::from_str(
            r#"{
                "name": "Bávaro",
                "slug": "bavaro",
                "country_code": "RD",
                "microzones": ["Cap Cana", "Cortecito"],
                "featured_hotels": ["Tortuga Bay"]
            }"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
        assert!(req.id.is_none());
        assert_eq!(req.microzones.len(), 2);
    }

    #[test]
    fn test_location_request_with_pricing_overrides() {
        let req: LocationUpsertRequest = serde_json::from_str(
            r#"{
                "name": "Hotel X",
                "slug": "hotel-x",
                "zone_id": "bavaro",
                "location_type": "HOTEL",
                "pricing_overrides": { "SEDAN": 70, "VAN": 90 }
            }"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.pricing_overrides.get("SEDAN"), Some(&dec!(70)));
    }

    #[test]
    fn test_rate_request_partial_grid() {
        let req: RateUpsertRequest = serde_json::from_str(
            r#"{
                "origin_zone_id": "puj-airport",
                "destination_zone_id": "bavaro",
                "country_code": "RD",
                "prices": { "SEDAN": 60, "SUV": null }
            }"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.prices.get("SEDAN"), Some(&Some(dec!(60))));
        assert_eq!(req.prices.get("SUV"), Some(&None));
    }

    #[test]
    fn test_override_request_optional_sides() {
        let req: OverrideUpsertRequest = serde_json::from_str(
            r#"{
                "vehicle_id": "sedan-1",
                "destination_location_id": "loc-hotel-x",
                "price": 70
            }"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
        assert!(req.origin_location_id.is_none());
        assert_eq!(req.price, dec!(70));
    }

    #[test]
    fn test_import_request_rows() {
        let req: LocationImportRequest = serde_json::from_str(
            r#"{
                "rows": [
                    { "name": "Hotel X", "slug": "hotel-x", "zone_slug": "bavaro" },
                    { "name": "Hotel Y", "slug": "hotel-y" }
                ],
                "default_zone_id": "bavaro"
            }"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.rows.len(), 2);
        assert!(req.rows[1].zone_slug.is_none());
    }

    #[test]
    fn test_vehicle_response_conversion() {
        let vehicle = Vehicle {
            id: "van-1".to_string(),
            name: "Van Estándar".to_string(),
            slug: "van-estandar".to_string(),
            category: VehicleCategory::Van,
            min_pax: 1,
            max_pax: 8,
            ..Default::default()
        };

        let response = VehicleResponse::from(vehicle);
        assert_eq!(response.category, "VAN");
        assert_eq!(response.max_pax, 8);
    }

    #[test]
    fn test_route_summary_response_conversion() {
        let summary = RouteSummary {
            route: Route {
                id: "route-1".to_string(),
                zone_a_id: "bavaro".to_string(),
                zone_b_id: "puj-airport".to_string(),
                country_code: "RD".to_string(),
                ..Default::default()
            },
            vehicle_count: 3,
            min_price: Some(dec!(60)),
        };

        let response = RouteSummaryResponse::from(summary);
        assert_eq!(response.zone_a_id, "bavaro");
        assert_eq!(response.vehicle_count, 3);
        assert_eq!(response.min_price, Some(dec!(60)));
    }
}
