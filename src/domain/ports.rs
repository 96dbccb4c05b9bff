use crate::domain::auth::{AuthResponse, LoginCredentials, RegisterData, Session, User};
use crate::domain::model::{
    Customer, CustomerId, NewAppointment, NewCustomService, NewCustomer, Pet, PetId,
    PetRegistration, Service,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 預約相關的遠端資源
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn list_services(&self) -> Result<Vec<Service>>;
    async fn list_customers(&self) -> Result<Vec<Customer>>;
    async fn list_pets(&self) -> Result<Vec<Pet>>;
    async fn create_customer(&self, customer: &NewCustomer) -> Result<CustomerId>;
    async fn create_pet(&self, pet: &PetRegistration) -> Result<PetId>;
    async fn create_appointment(&self, appointment: &NewAppointment) -> Result<()>;
    async fn create_custom_service(&self, request: &NewCustomService) -> Result<()>;
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse>;
    async fn register(&self, data: &RegisterData) -> Result<AuthResponse>;
    async fn logout(&self) -> Result<()>;
    async fn me(&self) -> Result<User>;
}

/// 登入狀態的持久化
pub trait SessionStore: Send + Sync {
    fn load(&self) -> impl std::future::Future<Output = Result<Session>> + Send;
    fn save(&self, session: &Session) -> impl std::future::Future<Output = Result<()>> + Send;
    fn clear(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}
