use crate::domain::model::DoctorId;
use crate::utils::error::{BookingError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const API_URL_ENV: &str = "PELUPET_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub booking: BookingConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub csrf_cookie_path: String,
    pub xsrf_cookie_name: String,
    pub xsrf_header_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    /// 新寵物預設指派的醫師
    pub default_doctor_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            timeout_seconds: 30,
            csrf_cookie_path: "/sanctum/csrf-cookie".to_string(),
            xsrf_cookie_name: "XSRF-TOKEN".to_string(),
            xsrf_header_name: "X-XSRF-TOKEN".to_string(),
        }
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            default_doctor_id: 1,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".pelupet/session.json"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ApiConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// 資源端點，例如 `/services` -> `http://host/api/services`
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// CSRF cookie 端點位於站台根目錄，不在 API 前綴底下
    pub fn csrf_url(&self) -> Result<Url> {
        let base = Url::parse(&self.base_url)?;
        let origin = base.origin().ascii_serialization();
        Ok(Url::parse(&origin)?.join(&self.csrf_cookie_path)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl BookingConfig {
    pub fn default_doctor(&self) -> DoctorId {
        DoctorId(self.default_doctor_id)
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BookingError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 檔案不存在時使用預設值
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(
                "Config file {} not found, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| BookingError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PELUPET_API_URL})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| BookingError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api.base_url)?;
        validation::validate_positive_number("api.timeout_seconds", self.api.timeout_seconds, 1)?;
        validation::validate_path("api.csrf_cookie_path", &self.api.csrf_cookie_path)?;
        validation::validate_header_name("api.xsrf_cookie_name", &self.api.xsrf_cookie_name)?;
        validation::validate_header_name("api.xsrf_header_name", &self.api.xsrf_header_name)?;

        if self.booking.default_doctor_id < 1 {
            return Err(BookingError::InvalidConfigValueError {
                field: "booking.default_doctor_id".to_string(),
                value: self.booking.default_doctor_id.to_string(),
                reason: "Doctor id must be positive".to_string(),
            });
        }

        validation::validate_path(
            "session.path",
            &self.session.path.to_string_lossy(),
        )?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(BookingError::InvalidConfigValueError {
                field: "logging.level".to_string(),
                value: self.logging.level.clone(),
                reason: format!("Valid levels: {}", valid_levels.join(", ")),
            });
        }

        Ok(())
    }
}
