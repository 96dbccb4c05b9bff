use crate::domain::model::{CustomerId, DoctorId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Doctor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<DoctorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl User {
    /// 登入後的導向頁面
    pub fn landing_path(&self) -> &'static str {
        match self.role {
            Role::Admin => "/admin",
            Role::Owner | Role::Doctor => "/dashboard",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// 註冊表單欄位（不含 customer_id，由註冊流程補上）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub password: String,
    pub password_confirmation: String,
}

/// POST /register 的請求主體
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterData {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub phone: String,
    pub address: String,
    pub role: Role,
    pub customer_id: CustomerId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: String,
    pub user: User,
    pub token: String,
}

/// 目前的登入狀態，明確地傳給 API client，而不是放在全域變數
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: User, token: String) -> Self {
        Self {
            user: Some(user),
            token: Some(token),
        }
    }

    pub fn from_auth(response: AuthResponse) -> Self {
        Self::authenticated(response.user, response.token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: UserId(1),
            name: "Ana".to_string(),
            email: "a@x.com".to_string(),
            role,
            customer_id: Some(CustomerId(101)),
            doctor_id: None,
            phone: None,
            address: None,
        }
    }

    #[test]
    fn test_landing_path_by_role() {
        assert_eq!(user(Role::Admin).landing_path(), "/admin");
        assert_eq!(user(Role::Owner).landing_path(), "/dashboard");
        assert_eq!(user(Role::Doctor).landing_path(), "/dashboard");
    }

    #[test]
    fn test_session_states() {
        assert!(!Session::anonymous().is_authenticated());

        let session = Session::authenticated(user(Role::Owner), "tok".to_string());
        assert!(session.is_authenticated());
        assert_eq!(session.bearer_token(), Some("tok"));
    }

    #[test]
    fn test_auth_response_ignores_extra_user_fields() {
        let response: AuthResponse = serde_json::from_value(serde_json::json!({
            "message": "Login successful",
            "user": {
                "id": 5,
                "name": "Ana",
                "email": "a@x.com",
                "role": "owner",
                "customer_id": 101,
                "created_at": "2025-01-01T00:00:00Z",
                "updated_at": "2025-01-01T00:00:00Z"
            },
            "token": "1|abc"
        }))
        .unwrap();

        assert_eq!(response.user.customer_id, Some(CustomerId(101)));
        assert_eq!(response.token, "1|abc");
    }
}
