use std::sync::Arc;

use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::{AvailabilityService, DoctorListing, DoctorQuery, SlotBlock};
use shared_api::ClinicApiClient;
use shared_models::AppError;
use shared_utils::test_utils::{InMemoryClinicApi, MockClinicResponses, TestConfig};

fn service_for(server: &MockServer) -> AvailabilityService {
    let config = TestConfig::for_server(&server.uri()).to_app_config();
    let client = ClinicApiClient::new(&config).expect("client should build");
    AvailabilityService::new(Arc::new(client))
}

#[tokio::test]
async fn test_list_doctors_keeps_backend_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicResponses::doctor_response("d9", "Dr. Zed", "Neurology", 3),
            MockClinicResponses::doctor_response("d1", "Dr. A", "Cardiology", 10),
            MockClinicResponses::doctor_response("d5", "Dr. M", "Neurology", 7)
        ])))
        .mount(&mock_server)
        .await;

    let listing = service_for(&mock_server).list_doctors(&DoctorQuery::all()).await;

    let ids: Vec<&str> = listing.doctors().iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["d9", "d1", "d5"]);
    assert_eq!(listing.specialties(), vec!["Neurology", "Cardiology"]);
}

#[tokio::test]
async fn test_list_doctors_passes_filters_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/doctors"))
        .and(query_param("search", "chen"))
        .and(query_param("specialty", "Neurology"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicResponses::doctor_response("d2", "Dr. Michael Chen", "Neurology", 15)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let query = DoctorQuery::all().with_search("chen").with_specialty("Neurology");
    let listing = service_for(&mock_server).list_doctors(&query).await;

    assert_eq!(listing.doctors().len(), 1);
}

#[tokio::test]
async fn test_backend_failure_becomes_failed_listing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/doctors"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let listing = service_for(&mock_server).list_doctors(&DoctorQuery::all()).await;

    assert_matches!(&listing, DoctorListing::Failed { reason } if reason.contains("500"));
    assert!(listing.doctors().is_empty());
    assert!(listing.specialties().is_empty());
}

#[tokio::test]
async fn test_empty_backend_is_not_a_failure() {
    let api = InMemoryClinicApi::new().shared();
    let service = AvailabilityService::new(api);

    let listing = service.list_doctors(&DoctorQuery::all()).await;

    assert_eq!(listing, DoctorListing::loaded(Vec::new()));
    assert!(!listing.is_failed());
}

#[tokio::test]
async fn test_network_failure_from_injected_directory() {
    let api = InMemoryClinicApi::with_doctors(MockClinicResponses::seeded_doctors()).shared();
    api.fail_doctor_listing(Some(AppError::Network("connection refused".into())));
    let service = AvailabilityService::new(api.clone());

    let listing = service.list_doctors(&DoctorQuery::all()).await;
    assert_eq!(listing.failure(), Some("Network error: connection refused"));

    api.fail_doctor_listing(None);
    let listing = service.list_doctors(&DoctorQuery::all()).await;
    assert_eq!(listing.doctors().len(), 4);
}

#[test]
fn test_slot_catalog() {
    let service = AvailabilityService::new(InMemoryClinicApi::new().shared());

    let labels: Vec<&str> = service.time_slots().iter().map(|s| s.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "09:00", "09:30", "10:00", "10:30", "11:00", "11:30",
            "14:00", "14:30", "15:00", "15:30", "16:00", "16:30"
        ]
    );

    let afternoon: Vec<&str> = service
        .slots_in(SlotBlock::Afternoon)
        .iter()
        .map(|s| s.as_str())
        .collect();
    assert_eq!(afternoon.first(), Some(&"14:00"));
    assert_eq!(afternoon.len(), 6);
}
