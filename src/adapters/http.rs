use crate::config::toml_config::ApiConfig;
use crate::domain::auth::{AuthResponse, LoginCredentials, RegisterData, Session, User};
use crate::domain::model::{
    Appointment, AppointmentStatus, CreatedRecord, CustomService, CustomServiceId,
    CustomServiceStatus, Customer, CustomerId, NewAppointment, NewCustomService, NewCustomer,
    Pet, PetId, PetRegistration, Service, ServiceId,
};
use crate::domain::ports::{AuthApi, BookingApi};
use crate::utils::error::{BookingError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

/// PeluPet REST API 的 HTTP 實作
///
/// 登入狀態 (`Session`) 由呼叫端在建立時傳入；cookie 由 client 自己的
/// cookie store 保存。狀態變更的請求 (POST/PUT/PATCH/DELETE) 之前會先做一次
/// CSRF 握手；之後每個請求都從 cookie jar 讀取當下的 `XSRF-TOKEN`，
/// 以 `X-XSRF-TOKEN` 標頭送出。
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
    session: Session,
    cookies: Arc<Jar>,
    csrf_ready: Mutex<bool>,
}

/// Laravel 風格的錯誤主體
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ApiClient {
    pub fn new(config: ApiConfig, session: Session) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let cookies = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(cookies.clone())
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            config,
            session,
            cookies,
            csrf_ready: Mutex::new(false),
        })
    }

    pub fn anonymous(config: ApiConfig) -> Result<Self> {
        Self::new(config, Session::anonymous())
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.config.endpoint(path);
        tracing::debug!("📡 {} {}", method, url);

        let request = self.client.request(method, url);
        match self.session.bearer_token() {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    /// 每個 client 只做一次 CSRF 握手
    async fn ensure_csrf_handshake(&self) -> Result<Url> {
        let url = self.config.csrf_url()?;
        let mut done = self.csrf_ready.lock().await;
        if *done {
            return Ok(url);
        }

        tracing::debug!("🔐 Fetching CSRF cookie from {}", url);
        let response = self.client.get(url.clone()).send().await?;
        Self::check_status(response).await?;

        if self.xsrf_token(&url).is_none() {
            tracing::warn!(
                "CSRF handshake returned no '{}' cookie",
                self.config.xsrf_cookie_name
            );
        }

        *done = true;
        Ok(url)
    }

    /// 從 cookie jar 讀取目前的 `XSRF-TOKEN`；伺服器可能在任何回應中更新它
    fn xsrf_token(&self, url: &Url) -> Option<String> {
        let header = self.cookies.cookies(url)?;
        let header = header.to_str().ok()?;
        find_cookie(header, &self.config.xsrf_cookie_name).map(decode_cookie_value)
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        tracing::debug!("📡 API response status: {}", status);

        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();

        Err(BookingError::ApiStatusError {
            status: status.as_u16(),
            message: body.message.unwrap_or_else(|| text.trim().to_string()),
            field_errors: body.errors.unwrap_or_default(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path).send().await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn send_mutation<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response> {
        let csrf_url = self.ensure_csrf_handshake().await?;

        let mut request = self.request(method, path);
        if let Some(token) = self.xsrf_token(&csrf_url) {
            request = request.header(self.config.xsrf_header_name.as_str(), token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        Self::check_status(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.send_mutation(Method::POST, path, Some(body)).await?;
        Ok(response.json().await?)
    }

    /// 只關心成功與否，不解析回應主體
    async fn post_ignoring_body<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        self.send_mutation(Method::POST, path, Some(body)).await?;
        Ok(())
    }

    async fn patch_empty(&self, path: &str) -> Result<()> {
        self.send_mutation::<()>(Method::PATCH, path, None).await?;
        Ok(())
    }

    pub async fn get_service(&self, id: ServiceId) -> Result<Service> {
        self.get(&format!("/services/{}", id)).await
    }

    pub async fn appointments_on(&self, date: NaiveDate) -> Result<Vec<Appointment>> {
        self.get(&format!(
            "/grooming-appointments/date/search?date={}",
            date.format("%Y-%m-%d")
        ))
        .await
    }

    pub async fn appointments_with_status(
        &self,
        status: AppointmentStatus,
    ) -> Result<Vec<Appointment>> {
        self.get(&format!("/grooming-appointments/status/{}", status.as_str()))
            .await
    }

    pub async fn custom_services_with_status(
        &self,
        status: CustomServiceStatus,
    ) -> Result<Vec<CustomService>> {
        self.get(&format!("/custom-services/status/{}", status.as_str()))
            .await
    }

    pub async fn approve_custom_service(&self, id: CustomServiceId) -> Result<()> {
        self.patch_empty(&format!("/custom-services/{}/approve", id)).await
    }

    pub async fn reject_custom_service(&self, id: CustomServiceId) -> Result<()> {
        self.patch_empty(&format!("/custom-services/{}/reject", id)).await
    }
}

/// 在 `Cookie` 標頭 (`a=1; b=2`) 中找出指定名稱的值
fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

/// PHP 會對 cookie 值做 urlencode（`=` 變成 `%3D`），送回標頭前要解碼
fn decode_cookie_value(raw: &str) -> String {
    url::form_urlencoded::parse(raw.as_bytes())
        .next()
        .map(|(decoded, _)| decoded.into_owned())
        .unwrap_or_default()
}

#[async_trait]
impl BookingApi for ApiClient {
    async fn list_services(&self) -> Result<Vec<Service>> {
        self.get("/services").await
    }

    async fn list_customers(&self) -> Result<Vec<Customer>> {
        self.get("/customers").await
    }

    async fn list_pets(&self) -> Result<Vec<Pet>> {
        self.get("/pets").await
    }

    async fn create_customer(&self, customer: &NewCustomer) -> Result<CustomerId> {
        let created: CreatedRecord = self.post("/customers", customer).await?;
        Ok(CustomerId(created.id))
    }

    async fn create_pet(&self, pet: &PetRegistration) -> Result<PetId> {
        let created: CreatedRecord = self.post("/pets", pet).await?;
        Ok(PetId(created.id))
    }

    async fn create_appointment(&self, appointment: &NewAppointment) -> Result<()> {
        self.post_ignoring_body("/grooming-appointments", appointment)
            .await
    }

    async fn create_custom_service(&self, request: &NewCustomService) -> Result<()> {
        self.post_ignoring_body("/custom-services", request).await
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse> {
        self.post("/login", credentials).await
    }

    async fn register(&self, data: &RegisterData) -> Result<AuthResponse> {
        self.post("/register", data).await
    }

    async fn logout(&self) -> Result<()> {
        if !self.session.is_authenticated() {
            return Err(BookingError::NotAuthenticated);
        }
        self.send_mutation::<()>(Method::POST, "/logout", None).await?;
        Ok(())
    }

    async fn me(&self) -> Result<User> {
        if !self.session.is_authenticated() {
            return Err(BookingError::NotAuthenticated);
        }
        self.get("/me").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use crate::domain::model::DoctorId;

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::anonymous(ApiConfig::with_base_url(server.url("/api"))).unwrap()
    }

    #[test]
    fn test_decode_cookie_value() {
        assert_eq!(decode_cookie_value("abc%3D%3D"), "abc==");
        assert_eq!(decode_cookie_value("plain"), "plain");
        assert_eq!(decode_cookie_value(""), "");
    }

    #[test]
    fn test_find_cookie() {
        let header = "laravel_session=s1; XSRF-TOKEN=abc%3D; other=x";
        assert_eq!(find_cookie(header, "XSRF-TOKEN"), Some("abc%3D"));
        assert_eq!(find_cookie(header, "missing"), None);
    }

    #[tokio::test]
    async fn test_xsrf_header_follows_rotated_cookie() {
        let server = MockServer::start();
        let handshake = server.mock(|when, then| {
            when.method(GET).path("/sanctum/csrf-cookie");
            then.status(204).header("Set-Cookie", "XSRF-TOKEN=first; Path=/");
        });
        let create_customer = server.mock(|when, then| {
            when.method(POST)
                .path("/api/customers")
                .header("X-XSRF-TOKEN", "first");
            then.status(201)
                .header("Set-Cookie", "XSRF-TOKEN=second; Path=/")
                .json_body(serde_json::json!({"id": 101}));
        });
        let create_pet = server.mock(|when, then| {
            when.method(POST)
                .path("/api/pets")
                .header("X-XSRF-TOKEN", "second");
            then.status(201).json_body(serde_json::json!({"id": 202}));
        });

        let client = client_for(&server);
        let customer_id = client
            .create_customer(&NewCustomer {
                name: "Ana".to_string(),
                email: "a@x.com".to_string(),
                phone: "555".to_string(),
                address: String::new(),
            })
            .await
            .unwrap();
        let pet_id = client
            .create_pet(&PetRegistration {
                name: "Luna".to_string(),
                species: "Gato".to_string(),
                breed: String::new(),
                age: 2,
                customer_id,
                doctor_id: DoctorId(1),
            })
            .await
            .unwrap();

        handshake.assert_hits(1);
        create_customer.assert();
        create_pet.assert();
        assert_eq!(pet_id, PetId(202));
    }

    #[tokio::test]
    async fn test_list_services() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/services")
                .header("Accept", "application/json");
            then.status(200).json_body(serde_json::json!([
                {"id": 3, "name": "Baño", "price": "45.00", "duration_minutes": 60, "category": "grooming"}
            ]));
        });

        let services = client_for(&server).list_services().await.unwrap();

        mock.assert();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].id, ServiceId(3));
    }

    #[tokio::test]
    async fn test_validation_error_body_is_decoded() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/sanctum/csrf-cookie");
            then.status(204);
        });
        server.mock(|when, then| {
            when.method(POST).path("/api/customers");
            then.status(422).json_body(serde_json::json!({
                "message": "The email has already been taken.",
                "errors": {"email": ["The email has already been taken."]}
            }));
        });

        let err = client_for(&server)
            .create_customer(&NewCustomer {
                name: "Ana".to_string(),
                email: "a@x.com".to_string(),
                phone: "555".to_string(),
                address: String::new(),
            })
            .await
            .unwrap_err();

        match err {
            BookingError::ApiStatusError {
                status,
                message,
                field_errors,
            } => {
                assert_eq!(status, 422);
                assert_eq!(message, "The email has already been taken.");
                assert_eq!(field_errors["email"].len(), 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_plain_text_error_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/pets");
            then.status(500).body("Server Error");
        });

        let err = client_for(&server).list_pets().await.unwrap_err();

        assert!(matches!(
            err,
            BookingError::ApiStatusError { status: 500, ref message, .. } if message == "Server Error"
        ));
    }

    #[tokio::test]
    async fn test_me_requires_session() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/me");
            then.status(200);
        });

        let err = client_for(&server).me().await.unwrap_err();

        assert!(matches!(err, BookingError::NotAuthenticated));
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn test_appointments_on_date() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/grooming-appointments/date/search")
                .query_param("date", "2025-06-01");
            then.status(200).json_body(serde_json::json!([{
                "id": 1,
                "pet_id": 202,
                "customer_id": 101,
                "service_id": 3,
                "appointment_date": "2025-06-01 10:00:00",
                "status": "scheduled",
                "notes": null,
                "total_price": "45.00"
            }]));
        });

        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let appointments = client_for(&server).appointments_on(date).await.unwrap();

        mock.assert();
        assert_eq!(appointments[0].status, AppointmentStatus::Scheduled);
        assert_eq!(appointments[0].appointment_date.to_string(), "2025-06-01T10:00");
    }
}
