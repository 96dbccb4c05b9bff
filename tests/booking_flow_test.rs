use anyhow::Result;
use httpmock::prelude::*;
use pelupet_booking::config::ApiConfig;
use pelupet_booking::core::catalog::load_booking_catalog;
use pelupet_booking::core::steps::{Resolution, WorkflowStep};
use pelupet_booking::domain::model::{CustomerId, DoctorId, PetId, Price};
use pelupet_booking::{ApiClient, BookingFormInput, BookingWorkflow, Session};
use serde_json::json;

fn client_for(server: &MockServer) -> Result<ApiClient> {
    Ok(ApiClient::new(
        ApiConfig::with_base_url(server.url("/api")),
        Session::anonymous(),
    )?)
}

fn mock_csrf(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/sanctum/csrf-cookie");
        then.status(204)
            .header("Set-Cookie", "XSRF-TOKEN=tok%3D%3D; Path=/");
    })
}

fn mock_catalog(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/api/services");
        then.status(200).json_body(json!([
            {"id": 3, "name": "Baño completo", "price": "45.00", "duration_minutes": 60, "category": "grooming"},
            {"id": 4, "name": "Vacuna", "price": "30.00", "duration_minutes": 20, "category": "veterinary"}
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/customers");
        then.status(200).json_body(json!([
            {"id": 7, "name": "Luis", "email": "l@x.com"}
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/pets");
        then.status(200).json_body(json!([
            {"id": 9, "name": "Max", "species": "Perro", "customer_id": 7}
        ]));
    });
}

/// 新客戶、新寵物：客戶 -> 寵物 -> 預約，每一步都用前一步回傳的 id
#[tokio::test]
async fn test_new_customer_new_pet_booking() -> Result<()> {
    let server = MockServer::start();
    let csrf = mock_csrf(&server);
    mock_catalog(&server);

    let create_customer = server.mock(|when, then| {
        when.method(POST)
            .path("/api/customers")
            .header("X-XSRF-TOKEN", "tok==")
            .json_body(json!({
                "name": "Ana",
                "email": "a@x.com",
                "phone": "555",
                "address": ""
            }));
        then.status(201)
            .json_body(json!({"id": 101, "name": "Ana", "email": "a@x.com"}));
    });
    let create_pet = server.mock(|when, then| {
        when.method(POST)
            .path("/api/pets")
            .json_body_partial(r#"{"customer_id": 101, "doctor_id": 1, "name": "Luna", "age": 2}"#);
        then.status(201).json_body(json!({"id": 202, "name": "Luna"}));
    });
    let create_appointment = server.mock(|when, then| {
        when.method(POST)
            .path("/api/grooming-appointments")
            .json_body(json!({
                "pet_id": 202,
                "customer_id": 101,
                "service_id": 3,
                "appointment_date": "2025-06-01T10:00",
                "total_price": "45.00",
                "notes": "",
                "status": "scheduled"
            }));
        then.status(201).json_body(json!({"id": 900}));
    });

    let form: BookingFormInput = serde_json::from_value(json!({
        "serviceId": "3",
        "isNewCustomer": true,
        "customerName": "Ana",
        "customerEmail": "a@x.com",
        "customerPhone": "555",
        "isNewPet": true,
        "petName": "Luna",
        "petSpecies": "Gato",
        "petAge": "2",
        "appointmentDate": "2025-06-01T10:00"
    }))?;

    let api = client_for(&server)?;
    let catalog = load_booking_catalog(&api).await;
    assert!(catalog.is_complete());

    let receipt = BookingWorkflow::new(&api, &catalog, DoctorId(1))
        .submit(form.into_form()?)
        .await?;

    csrf.assert_hits(1);
    create_customer.assert();
    create_pet.assert();
    create_appointment.assert();

    assert_eq!(receipt.customer_id, CustomerId(101));
    assert_eq!(receipt.pet_id, PetId(202));
    assert_eq!(receipt.total_price, Price::new("45.00"));
    assert_eq!(receipt.steps.len(), 3);
    Ok(())
}

/// 既有客戶與既有寵物只送出一個請求
#[tokio::test]
async fn test_existing_customer_and_pet_single_request() -> Result<()> {
    let server = MockServer::start();
    mock_csrf(&server);
    mock_catalog(&server);

    let create_customer = server.mock(|when, then| {
        when.method(POST).path("/api/customers");
        then.status(201).json_body(json!({"id": 1}));
    });
    let create_pet = server.mock(|when, then| {
        when.method(POST).path("/api/pets");
        then.status(201).json_body(json!({"id": 1}));
    });
    let create_appointment = server.mock(|when, then| {
        when.method(POST)
            .path("/api/grooming-appointments")
            .json_body_partial(r#"{"customer_id": 7, "pet_id": 9, "service_id": 4, "total_price": "30.00"}"#);
        then.status(201).json_body(json!({"id": 901}));
    });

    let form = BookingFormInput {
        service_id: "4".to_string(),
        is_new_customer: false,
        customer_id: "7".to_string(),
        // 切換模式前輸入的殘留值不應送出
        customer_name: "Stale".to_string(),
        is_new_pet: false,
        pet_id: "9".to_string(),
        pet_name: "Stale".to_string(),
        appointment_date: "2025-06-02T15:30".to_string(),
        ..Default::default()
    };

    let api = client_for(&server)?;
    let catalog = load_booking_catalog(&api).await;
    let receipt = BookingWorkflow::new(&api, &catalog, DoctorId(1))
        .submit(form.into_form()?)
        .await?;

    create_customer.assert_hits(0);
    create_pet.assert_hits(0);
    create_appointment.assert();
    assert_eq!(receipt.steps[0].resolution, Resolution::Reused(7));
    assert_eq!(receipt.steps[1].resolution, Resolution::Reused(9));
    Ok(())
}

/// 建立客戶失敗時不會再送出任何請求
#[tokio::test]
async fn test_customer_failure_aborts_remaining_steps() -> Result<()> {
    let server = MockServer::start();
    mock_csrf(&server);
    mock_catalog(&server);

    server.mock(|when, then| {
        when.method(POST).path("/api/customers");
        then.status(422).json_body(json!({
            "message": "The email has already been taken.",
            "errors": {"email": ["The email has already been taken."]}
        }));
    });
    let create_pet = server.mock(|when, then| {
        when.method(POST).path("/api/pets");
        then.status(201).json_body(json!({"id": 202}));
    });
    let create_appointment = server.mock(|when, then| {
        when.method(POST).path("/api/grooming-appointments");
        then.status(201).json_body(json!({"id": 900}));
    });

    let form = BookingFormInput {
        service_id: "3".to_string(),
        customer_name: "Ana".to_string(),
        customer_email: "a@x.com".to_string(),
        customer_phone: "555".to_string(),
        pet_name: "Luna".to_string(),
        pet_species: "Gato".to_string(),
        pet_age: "2".to_string(),
        appointment_date: "2025-06-01T10:00".to_string(),
        ..Default::default()
    };

    let api = client_for(&server)?;
    let catalog = load_booking_catalog(&api).await;
    let err = BookingWorkflow::new(&api, &catalog, DoctorId(1))
        .submit(form.into_form()?)
        .await
        .unwrap_err();

    assert_eq!(err.failed_step(), Some(WorkflowStep::CreateCustomer));
    assert_eq!(err.field_messages(), vec!["The email has already been taken."]);
    create_pet.assert_hits(0);
    create_appointment.assert_hits(0);
    Ok(())
}

/// 建立寵物失敗：客戶已建立且不回滾，預約沒有送出
#[tokio::test]
async fn test_pet_failure_leaves_created_customer() -> Result<()> {
    let server = MockServer::start();
    mock_csrf(&server);
    mock_catalog(&server);

    let create_customer = server.mock(|when, then| {
        when.method(POST).path("/api/customers");
        then.status(201).json_body(json!({"id": 101}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/api/pets");
        then.status(500).body("Server Error");
    });
    let delete_customer = server.mock(|when, then| {
        when.method(DELETE).path("/api/customers/101");
        then.status(204);
    });
    let create_appointment = server.mock(|when, then| {
        when.method(POST).path("/api/grooming-appointments");
        then.status(201).json_body(json!({"id": 900}));
    });

    let form = BookingFormInput {
        service_id: "3".to_string(),
        customer_name: "Ana".to_string(),
        customer_email: "a@x.com".to_string(),
        customer_phone: "555".to_string(),
        pet_name: "Luna".to_string(),
        pet_species: "Gato".to_string(),
        pet_age: "2".to_string(),
        appointment_date: "2025-06-01T10:00".to_string(),
        ..Default::default()
    };

    let api = client_for(&server)?;
    let catalog = load_booking_catalog(&api).await;
    let err = BookingWorkflow::new(&api, &catalog, DoctorId(1))
        .submit(form.into_form()?)
        .await
        .unwrap_err();

    assert_eq!(err.failed_step(), Some(WorkflowStep::CreatePet));
    create_customer.assert_hits(1);
    delete_customer.assert_hits(0);
    create_appointment.assert_hits(0);
    Ok(())
}

/// 服務清單載入失敗時表單仍可送出，價格使用 0
#[tokio::test]
async fn test_missing_service_catalog_books_with_zero_price() -> Result<()> {
    let server = MockServer::start();
    mock_csrf(&server);
    server.mock(|when, then| {
        when.method(GET).path("/api/services");
        then.status(500).body("Server Error");
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/customers");
        then.status(200).json_body(json!([]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/pets");
        then.status(200).json_body(json!([]));
    });
    let create_appointment = server.mock(|when, then| {
        when.method(POST)
            .path("/api/grooming-appointments")
            .json_body_partial(r#"{"service_id": 3, "total_price": "0"}"#);
        then.status(201).json_body(json!({"id": 902}));
    });

    let form = BookingFormInput {
        service_id: "3".to_string(),
        is_new_customer: false,
        customer_id: "7".to_string(),
        is_new_pet: false,
        pet_id: "9".to_string(),
        appointment_date: "2025-06-01T10:00".to_string(),
        ..Default::default()
    };

    let api = client_for(&server)?;
    let catalog = load_booking_catalog(&api).await;
    assert!(!catalog.is_complete());
    assert!(catalog.services.is_empty());

    let receipt = BookingWorkflow::new(&api, &catalog, DoctorId(1))
        .submit(form.into_form()?)
        .await?;

    create_appointment.assert();
    assert_eq!(receipt.total_price, Price::zero());
    Ok(())
}
