//! 測試用的記錄型 API，依序記下每一次呼叫

use crate::domain::auth::{
    AuthResponse, LoginCredentials, RegisterData, Role, Session, User,
};
use crate::domain::model::{
    Customer, CustomerId, NewAppointment, NewCustomService, NewCustomer, Pet, PetId,
    PetRegistration, Service, UserId,
};
use crate::domain::ports::{AuthApi, BookingApi, SessionStore};
use crate::utils::error::{BookingError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    ListServices,
    ListCustomers,
    ListPets,
    CreateCustomer(NewCustomer),
    CreatePet(PetRegistration),
    CreateAppointment(NewAppointment),
    CreateCustomService(NewCustomService),
    Login(String),
    Register { email: String, customer_id: CustomerId },
    Logout,
    Me,
}

impl Call {
    fn name(&self) -> &'static str {
        match self {
            Call::ListServices => "list_services",
            Call::ListCustomers => "list_customers",
            Call::ListPets => "list_pets",
            Call::CreateCustomer(_) => "create_customer",
            Call::CreatePet(_) => "create_pet",
            Call::CreateAppointment(_) => "create_appointment",
            Call::CreateCustomService(_) => "create_custom_service",
            Call::Login(_) => "login",
            Call::Register { .. } => "register",
            Call::Logout => "logout",
            Call::Me => "me",
        }
    }
}

pub(crate) struct FakeApi {
    calls: Mutex<Vec<Call>>,
    services: Vec<Service>,
    next_customer_id: i64,
    next_pet_id: i64,
    failing: Vec<&'static str>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            services: Vec::new(),
            next_customer_id: 101,
            next_pet_id: 202,
            failing: Vec::new(),
        }
    }

    pub(crate) fn with_services(mut self, services: Vec<Service>) -> Self {
        self.services = services;
        self
    }

    /// 讓指定名稱的呼叫回傳 500
    pub(crate) fn failing_on(mut self, call: &'static str) -> Self {
        self.failing.push(call);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_names(&self) -> Vec<&'static str> {
        self.calls().iter().map(Call::name).collect()
    }

    fn record(&self, call: Call) -> Result<()> {
        let name = call.name();
        self.calls.lock().unwrap().push(call);
        if self.failing.contains(&name) {
            return Err(BookingError::ApiStatusError {
                status: 500,
                message: format!("{} exploded", name),
                field_errors: BTreeMap::new(),
            });
        }
        Ok(())
    }

    fn user(email: &str, customer_id: Option<CustomerId>) -> User {
        User {
            id: UserId(5),
            name: "Ana".to_string(),
            email: email.to_string(),
            role: Role::Owner,
            customer_id,
            doctor_id: None,
            phone: None,
            address: None,
        }
    }
}

#[async_trait]
impl BookingApi for FakeApi {
    async fn list_services(&self) -> Result<Vec<Service>> {
        self.record(Call::ListServices)?;
        Ok(self.services.clone())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>> {
        self.record(Call::ListCustomers)?;
        Ok(vec![Customer {
            id: CustomerId(7),
            name: "Luis".to_string(),
            email: "l@x.com".to_string(),
            phone: None,
            address: None,
        }])
    }

    async fn list_pets(&self) -> Result<Vec<Pet>> {
        self.record(Call::ListPets)?;
        Ok(vec![Pet {
            id: PetId(9),
            name: "Max".to_string(),
            species: "Perro".to_string(),
            breed: None,
            age: Some(4),
            customer_id: Some(CustomerId(7)),
            doctor_id: None,
        }])
    }

    async fn create_customer(&self, customer: &NewCustomer) -> Result<CustomerId> {
        self.record(Call::CreateCustomer(customer.clone()))?;
        Ok(CustomerId(self.next_customer_id))
    }

    async fn create_pet(&self, pet: &PetRegistration) -> Result<PetId> {
        self.record(Call::CreatePet(pet.clone()))?;
        Ok(PetId(self.next_pet_id))
    }

    async fn create_appointment(&self, appointment: &NewAppointment) -> Result<()> {
        self.record(Call::CreateAppointment(appointment.clone()))
    }

    async fn create_custom_service(&self, request: &NewCustomService) -> Result<()> {
        self.record(Call::CreateCustomService(request.clone()))
    }
}

#[async_trait]
impl AuthApi for FakeApi {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse> {
        self.record(Call::Login(credentials.email.clone()))?;
        Ok(AuthResponse {
            message: "ok".to_string(),
            user: Self::user(&credentials.email, None),
            token: "1|login".to_string(),
        })
    }

    async fn register(&self, data: &RegisterData) -> Result<AuthResponse> {
        self.record(Call::Register {
            email: data.email.clone(),
            customer_id: data.customer_id,
        })?;
        Ok(AuthResponse {
            message: "ok".to_string(),
            user: Self::user(&data.email, Some(data.customer_id)),
            token: "2|register".to_string(),
        })
    }

    async fn logout(&self) -> Result<()> {
        self.record(Call::Logout)
    }

    async fn me(&self) -> Result<User> {
        self.record(Call::Me)?;
        Ok(Self::user("a@x.com", None))
    }
}

/// 記憶體中的登入狀態
#[derive(Default)]
pub(crate) struct MemorySessionStore {
    session: tokio::sync::Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub(crate) async fn stored(&self) -> Option<Session> {
        self.session.lock().await.clone()
    }
}

impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Session> {
        Ok(self.session.lock().await.clone().unwrap_or_default())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        *self.session.lock().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.session.lock().await = None;
        Ok(())
    }
}
