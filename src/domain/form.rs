use crate::domain::model::{
    AppointmentDate, CustomerId, NewCustomer, NewPet, PetId, Price, ServiceId,
};
use crate::utils::error::{BookingError, Result};
use crate::utils::validation::{parse_int_field, validate_non_empty_string};
use serde::{Deserialize, Serialize};

/// 客戶來源：新建或沿用既有客戶
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerChoice {
    New(NewCustomer),
    Existing(CustomerId),
}

/// 寵物來源：新建或沿用既有寵物
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetChoice {
    New(NewPet),
    Existing(PetId),
}

/// 已轉型完成的預約表單
#[derive(Debug, Clone, PartialEq)]
pub struct BookingForm {
    pub service_id: ServiceId,
    pub customer: CustomerChoice,
    pub pet: PetChoice,
    pub appointment_date: AppointmentDate,
    pub notes: String,
}

/// 已轉型完成的客製服務申請表單
#[derive(Debug, Clone, PartialEq)]
pub struct CustomServiceForm {
    pub customer: CustomerChoice,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub duration_minutes: Option<i64>,
}

/// 預約頁面的原始表單狀態，所有欄位都是字串，與前端送出的 JSON 相同
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingFormInput {
    pub service_id: String,
    pub is_new_customer: bool,
    pub customer_id: String,
    pub is_new_pet: bool,
    pub pet_id: String,
    pub appointment_date: String,
    pub notes: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub pet_name: String,
    pub pet_species: String,
    pub pet_breed: String,
    pub pet_age: String,
}

impl Default for BookingFormInput {
    // 頁面預設是新客戶、新寵物
    fn default() -> Self {
        Self {
            service_id: String::new(),
            is_new_customer: true,
            customer_id: String::new(),
            is_new_pet: true,
            pet_id: String::new(),
            appointment_date: String::new(),
            notes: String::new(),
            customer_name: String::new(),
            customer_email: String::new(),
            customer_phone: String::new(),
            customer_address: String::new(),
            pet_name: String::new(),
            pet_species: String::new(),
            pet_breed: String::new(),
            pet_age: String::new(),
        }
    }
}

impl BookingFormInput {
    /// 只讀取所選模式的欄位，其他模式殘留的值一律忽略
    pub fn into_form(self) -> Result<BookingForm> {
        let service_id = ServiceId(parse_int_field("serviceId", &self.service_id)?);

        let customer = customer_choice(
            self.is_new_customer,
            &self.customer_id,
            CustomerFields {
                name: self.customer_name,
                email: self.customer_email,
                phone: self.customer_phone,
                address: self.customer_address,
            },
        )?;

        let pet = if self.is_new_pet {
            validate_non_empty_string("petName", &self.pet_name)?;
            validate_non_empty_string("petSpecies", &self.pet_species)?;
            PetChoice::New(NewPet {
                age: parse_int_field("petAge", &self.pet_age)?,
                name: self.pet_name,
                species: self.pet_species,
                breed: self.pet_breed,
            })
        } else {
            PetChoice::Existing(PetId(parse_int_field("petId", &self.pet_id)?))
        };

        validate_non_empty_string("appointmentDate", &self.appointment_date)?;
        let appointment_date = AppointmentDate::parse(&self.appointment_date).ok_or_else(|| {
            BookingError::validation(
                "appointmentDate",
                format!("Fecha inválida: '{}'", self.appointment_date),
            )
        })?;

        Ok(BookingForm {
            service_id,
            customer,
            pet,
            appointment_date,
            notes: self.notes,
        })
    }
}

/// 客製服務頁面的原始表單狀態
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomServiceFormInput {
    pub is_new_customer: bool,
    pub customer_id: String,
    pub service_name: String,
    pub service_description: String,
    pub estimated_price: String,
    pub estimated_duration: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
}

impl Default for CustomServiceFormInput {
    fn default() -> Self {
        Self {
            is_new_customer: true,
            customer_id: String::new(),
            service_name: String::new(),
            service_description: String::new(),
            estimated_price: String::new(),
            estimated_duration: String::new(),
            customer_name: String::new(),
            customer_email: String::new(),
            customer_phone: String::new(),
            customer_address: String::new(),
        }
    }
}

impl CustomServiceFormInput {
    pub fn into_form(self) -> Result<CustomServiceForm> {
        let customer = customer_choice(
            self.is_new_customer,
            &self.customer_id,
            CustomerFields {
                name: self.customer_name,
                email: self.customer_email,
                phone: self.customer_phone,
                address: self.customer_address,
            },
        )?;

        validate_non_empty_string("serviceName", &self.service_name)?;
        validate_non_empty_string("serviceDescription", &self.service_description)?;
        validate_non_empty_string("estimatedPrice", &self.estimated_price)?;

        Ok(CustomServiceForm {
            customer,
            duration_minutes: optional_int_field("estimatedDuration", &self.estimated_duration)?,
            name: self.service_name,
            description: self.service_description,
            price: Price::new(self.estimated_price.trim()),
        })
    }
}

/// 選填的整數欄位：空白代表沒有值
fn optional_int_field(field_name: &str, value: &str) -> Result<Option<i64>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse_int_field(field_name, value).map(Some)
}

struct CustomerFields {
    name: String,
    email: String,
    phone: String,
    address: String,
}

fn customer_choice(
    is_new: bool,
    existing_id: &str,
    fields: CustomerFields,
) -> Result<CustomerChoice> {
    if !is_new {
        return Ok(CustomerChoice::Existing(CustomerId(parse_int_field(
            "customerId",
            existing_id,
        )?)));
    }

    validate_non_empty_string("customerName", &fields.name)?;
    validate_non_empty_string("customerEmail", &fields.email)?;
    validate_non_empty_string("customerPhone", &fields.phone)?;

    Ok(CustomerChoice::New(NewCustomer {
        name: fields.name,
        email: fields.email,
        phone: fields.phone,
        address: fields.address,
    }))
}
