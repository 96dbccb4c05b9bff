use crate::core::steps::{StepLedger, WorkflowKind, WorkflowStep};
use crate::domain::auth::{LoginCredentials, RegisterData, RegisterForm, Role, Session, User};
use crate::domain::model::NewCustomer;
use crate::domain::ports::{AuthApi, BookingApi, SessionStore};
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_password_pair};

/// 登入、註冊與登出；成功後的登入狀態寫入 `SessionStore`
pub struct AccountWorkflow<'a, A: ?Sized, S> {
    api: &'a A,
    store: &'a S,
}

impl<'a, A, S> AccountWorkflow<'a, A, S>
where
    A: AuthApi + BookingApi + ?Sized,
    S: SessionStore,
{
    pub fn new(api: &'a A, store: &'a S) -> Self {
        Self { api, store }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        validate_non_empty_string("email", email)?;
        validate_non_empty_string("password", password)?;

        let response = self
            .api
            .login(&LoginCredentials {
                email: email.to_string(),
                password: password.to_string(),
                role: None,
            })
            .await?;

        tracing::info!("🔑 Logged in as {} ({:?})", response.user.email, response.user.role);

        let session = Session::from_auth(response);
        self.store.save(&session).await?;
        Ok(session)
    }

    /// 先建立客戶，再以該客戶 id 建立使用者；密碼檢查在任何請求之前
    pub async fn register(&self, form: RegisterForm) -> Result<Session> {
        validate_password_pair(&form.password, &form.password_confirmation)?;

        let mut ledger = StepLedger::new(WorkflowKind::Registration);

        let customer = NewCustomer {
            name: form.name.clone(),
            email: form.email.clone(),
            phone: form.phone.clone(),
            address: form.address.clone(),
        };
        let customer_id = ledger
            .run(
                WorkflowStep::CreateCustomer,
                self.api.create_customer(&customer),
            )
            .await?;

        let data = RegisterData {
            name: form.name,
            email: form.email,
            password: form.password,
            password_confirmation: form.password_confirmation,
            phone: form.phone,
            address: form.address,
            role: Role::Owner,
            customer_id,
        };
        let response = ledger
            .run(WorkflowStep::RegisterUser, self.api.register(&data))
            .await?;

        let session = Session::from_auth(response);
        self.store.save(&session).await?;
        Ok(session)
    }

    /// 伺服器端登出失敗只記錄警告，本機狀態一律清除
    pub async fn logout(&self) -> Result<()> {
        if let Err(e) = self.api.logout().await {
            tracing::warn!("Server-side logout failed: {}", e);
        }
        self.store.clear().await
    }

    pub async fn current_user(&self) -> Result<User> {
        self.api.me().await
    }
}
