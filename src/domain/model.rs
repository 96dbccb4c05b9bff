use chrono::{DateTime, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn value(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(CustomerId);
define_id!(PetId);
define_id!(ServiceId);
define_id!(DoctorId);
define_id!(AppointmentId);
define_id!(CustomServiceId);
define_id!(UserId);

/// API 以十進位字串傳遞金額（例如 `"45.00"`），這裡保留原字串
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPrice", into = "String")]
pub struct Price(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawPrice> for Price {
    fn from(raw: RawPrice) -> Self {
        match raw {
            RawPrice::Text(s) => Price(s),
            RawPrice::Number(n) => Price(n.to_string()),
        }
    }
}

impl From<Price> for String {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Price {
    pub fn new(amount: impl Into<String>) -> Self {
        Price(amount.into())
    }

    /// 服務不在目錄中時使用的預設價格
    pub fn zero() -> Self {
        Price("0".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Price {
    fn default() -> Self {
        Price::zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 預約時間，線上格式與 `datetime-local` 輸入一致（`2025-06-01T10:00`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AppointmentDate(pub NaiveDateTime);

impl AppointmentDate {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        const FORMATS: [&str; 4] = [
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M",
            "%Y-%m-%d %H:%M:%S",
        ];

        FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            // 帶時區的輸入保留原本的牆上時間，不換算成 UTC
            .or_else(|| {
                DateTime::parse_from_rfc3339(value)
                    .ok()
                    .map(|dt| dt.naive_local())
            })
            .map(AppointmentDate)
    }

    pub fn naive(&self) -> &NaiveDateTime {
        &self.0
    }
}

impl fmt::Display for AppointmentDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.second() == 0 {
            write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M"))
        } else {
            write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S"))
        }
    }
}

impl FromStr for AppointmentDate {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        AppointmentDate::parse(s).ok_or_else(|| format!("invalid appointment date '{}'", s))
    }
}

impl Serialize for AppointmentDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AppointmentDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Grooming,
    Veterinary,
    Training,
    Other,
}

impl ServiceCategory {
    pub const ALL: [ServiceCategory; 4] = [
        ServiceCategory::Grooming,
        ServiceCategory::Veterinary,
        ServiceCategory::Training,
        ServiceCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Grooming => "grooming",
            ServiceCategory::Veterinary => "veterinary",
            ServiceCategory::Training => "training",
            ServiceCategory::Other => "other",
        }
    }
}

impl FromStr for ServiceCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ServiceCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown service category '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::InProgress => "in_progress",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Agendada",
            AppointmentStatus::InProgress => "En Progreso",
            AppointmentStatus::Completed => "Completada",
            AppointmentStatus::Cancelled => "Cancelada",
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        [
            AppointmentStatus::Scheduled,
            AppointmentStatus::InProgress,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
        ]
        .into_iter()
        .find(|status| status.as_str() == s.trim())
        .ok_or_else(|| format!("unknown appointment status '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomServiceStatus {
    Pending,
    Approved,
    Rejected,
}

impl CustomServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomServiceStatus::Pending => "pending",
            CustomServiceStatus::Approved => "approved",
            CustomServiceStatus::Rejected => "rejected",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CustomServiceStatus::Pending => "Pendiente",
            CustomServiceStatus::Approved => "Aprobada",
            CustomServiceStatus::Rejected => "Rechazada",
        }
    }
}

impl FromStr for CustomServiceStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        [
            CustomServiceStatus::Pending,
            CustomServiceStatus::Approved,
            CustomServiceStatus::Rejected,
        ]
        .into_iter()
        .find(|status| status.as_str() == s.trim())
        .ok_or_else(|| format!("unknown custom service status '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    pub species: String,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub doctor_id: Option<DoctorId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub price: Price,
    pub duration_minutes: i64,
    pub category: ServiceCategory,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub pet_id: PetId,
    pub customer_id: CustomerId,
    pub service_id: ServiceId,
    pub appointment_date: AppointmentDate,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub total_price: Price,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomService {
    pub id: CustomServiceId,
    pub customer_id: CustomerId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    pub status: CustomServiceStatus,
}

/// 建立資源後伺服器回傳的主體，只取用 `id`
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedRecord {
    pub id: i64,
}

/// create-customer 的請求主體
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// 表單中的新寵物欄位；主人與醫師要等到客戶解析完成後才補上
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPet {
    pub name: String,
    pub species: String,
    pub breed: String,
    pub age: i64,
}

impl NewPet {
    pub fn owned_by(self, customer_id: CustomerId, doctor_id: DoctorId) -> PetRegistration {
        PetRegistration {
            name: self.name,
            species: self.species,
            breed: self.breed,
            age: self.age,
            customer_id,
            doctor_id,
        }
    }
}

/// create-pet 的請求主體
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetRegistration {
    pub name: String,
    pub species: String,
    pub breed: String,
    pub age: i64,
    pub customer_id: CustomerId,
    pub doctor_id: DoctorId,
}

/// create-appointment 的請求主體
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub pet_id: PetId,
    pub customer_id: CustomerId,
    pub service_id: ServiceId,
    pub appointment_date: AppointmentDate,
    pub total_price: Price,
    pub notes: String,
    pub status: AppointmentStatus,
}

/// create-custom-service 的請求主體
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomService {
    pub customer_id: CustomerId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// 預估時長是選填欄位，空白時送出 `null`
    pub duration_minutes: Option<i64>,
    pub status: CustomServiceStatus,
}
