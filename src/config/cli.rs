use crate::config::toml_config::AppConfig;
use crate::core::catalog::CategoryFilter;
use crate::domain::auth::RegisterForm;
use crate::domain::form::{BookingFormInput, CustomServiceFormInput};
use crate::domain::model::{AppointmentStatus, CustomServiceStatus};
use crate::utils::error::{BookingError, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "pelupet")]
#[command(about = "PeluPet appointment booking client")]
pub struct Cli {
    #[arg(short, long, default_value = "pelupet.toml", help = "TOML configuration file")]
    pub config: PathBuf,

    #[arg(long, help = "Override api.base_url")]
    pub api_url: Option<String>,

    #[arg(long, help = "Override session.path")]
    pub session_file: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON logs")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 列出服務，可依分類篩選
    Services {
        #[arg(long, default_value = "all")]
        category: CategoryFilter,
        #[arg(long, help = "Show a single service")]
        id: Option<i64>,
    },
    /// 送出預約
    Book(BookArgs),
    /// 申請客製服務
    RequestService(RequestServiceArgs),
    /// 查詢預約
    Appointments {
        #[arg(long, conflicts_with = "status")]
        date: Option<NaiveDate>,
        #[arg(long)]
        status: Option<AppointmentStatus>,
    },
    /// 查詢或審核客製服務申請
    Requests {
        #[arg(long, default_value = "pending")]
        status: CustomServiceStatus,
        #[arg(long, conflicts_with = "reject")]
        approve: Option<i64>,
        #[arg(long)]
        reject: Option<i64>,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Register(RegisterArgs),
    Logout,
    Whoami,
}

#[derive(Debug, Args)]
pub struct BookArgs {
    #[arg(long, help = "JSON file with the raw form state")]
    pub form: Option<PathBuf>,

    #[arg(long, required_unless_present = "form")]
    pub service: Option<String>,
    #[arg(long, required_unless_present = "form")]
    pub date: Option<String>,
    #[arg(long, default_value = "")]
    pub notes: String,

    #[arg(long, help = "Use an existing customer instead of creating one")]
    pub customer_id: Option<String>,
    #[arg(long, default_value = "")]
    pub customer_name: String,
    #[arg(long, default_value = "")]
    pub customer_email: String,
    #[arg(long, default_value = "")]
    pub customer_phone: String,
    #[arg(long, default_value = "")]
    pub customer_address: String,

    #[arg(long, help = "Use an existing pet instead of creating one")]
    pub pet_id: Option<String>,
    #[arg(long, default_value = "")]
    pub pet_name: String,
    #[arg(long, default_value = "")]
    pub pet_species: String,
    #[arg(long, default_value = "")]
    pub pet_breed: String,
    #[arg(long, default_value = "")]
    pub pet_age: String,
}

impl BookArgs {
    pub fn into_input(self) -> Result<BookingFormInput> {
        if let Some(path) = &self.form {
            return read_json(path);
        }

        Ok(BookingFormInput {
            service_id: self.service.unwrap_or_default(),
            is_new_customer: self.customer_id.is_none(),
            customer_id: self.customer_id.unwrap_or_default(),
            is_new_pet: self.pet_id.is_none(),
            pet_id: self.pet_id.unwrap_or_default(),
            appointment_date: self.date.unwrap_or_default(),
            notes: self.notes,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            customer_phone: self.customer_phone,
            customer_address: self.customer_address,
            pet_name: self.pet_name,
            pet_species: self.pet_species,
            pet_breed: self.pet_breed,
            pet_age: self.pet_age,
        })
    }
}

#[derive(Debug, Args)]
pub struct RequestServiceArgs {
    #[arg(long, help = "JSON file with the raw form state")]
    pub form: Option<PathBuf>,

    #[arg(long, required_unless_present = "form")]
    pub name: Option<String>,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, default_value = "")]
    pub price: String,
    #[arg(long, default_value = "")]
    pub duration: String,

    #[arg(long)]
    pub customer_id: Option<String>,
    #[arg(long, default_value = "")]
    pub customer_name: String,
    #[arg(long, default_value = "")]
    pub customer_email: String,
    #[arg(long, default_value = "")]
    pub customer_phone: String,
    #[arg(long, default_value = "")]
    pub customer_address: String,
}

impl RequestServiceArgs {
    pub fn into_input(self) -> Result<CustomServiceFormInput> {
        if let Some(path) = &self.form {
            return read_json(path);
        }

        Ok(CustomServiceFormInput {
            is_new_customer: self.customer_id.is_none(),
            customer_id: self.customer_id.unwrap_or_default(),
            service_name: self.name.unwrap_or_default(),
            service_description: self.description,
            estimated_price: self.price,
            estimated_duration: self.duration,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            customer_phone: self.customer_phone,
            customer_address: self.customer_address,
        })
    }
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long, default_value = "")]
    pub address: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub password_confirmation: String,
}

impl From<RegisterArgs> for RegisterForm {
    fn from(args: RegisterArgs) -> Self {
        RegisterForm {
            name: args.name,
            email: args.email,
            phone: args.phone,
            address: args.address,
            password: args.password,
            password_confirmation: args.password_confirmation,
        }
    }
}

impl Cli {
    /// 命令列參數優先於設定檔
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(url) = &self.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(path) = &self.session_file {
            config.session.path = path.clone();
        }
        if self.json_logs {
            config.logging.json = true;
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(BookingError::IoError)?;
    Ok(serde_json::from_str(&content)?)
}
