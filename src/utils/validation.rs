use crate::utils::error::{BookingError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(BookingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(BookingError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(BookingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(BookingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(BookingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(BookingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_header_name(field_name: &str, value: &str) -> Result<()> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(BookingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Header and cookie names may only contain letters, digits, '-' and '_'"
                .to_string(),
        });
    }
    Ok(())
}

/// 表單必填欄位（對應瀏覽器的 `required` 檢查）
pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BookingError::validation(
            field_name,
            format!("{} es obligatorio", field_name),
        ));
    }
    Ok(())
}

/// 把表單的字串轉成整數，對應前端的 parseInt
pub fn parse_int_field(field_name: &str, value: &str) -> Result<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BookingError::validation(
            field_name,
            format!("{} es obligatorio", field_name),
        ));
    }

    trimmed.parse::<i64>().map_err(|_| {
        BookingError::validation(
            field_name,
            format!("{} debe ser un número entero (recibido '{}')", field_name, value),
        )
    })
}

pub fn validate_password_pair(password: &str, confirmation: &str) -> Result<()> {
    if password != confirmation {
        return Err(BookingError::validation(
            "password_confirmation",
            "Las contraseñas no coinciden",
        ));
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(BookingError::validation(
            "password",
            "La contraseña debe tener al menos 6 caracteres",
        ));
    }

    Ok(())
}
