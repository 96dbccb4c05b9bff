use clap::Parser;
use pelupet_booking::config::Command;
use pelupet_booking::core::catalog::{self, CategoryFilter};
use pelupet_booking::core::steps::WorkflowKind;
use pelupet_booking::domain::form::CustomerChoice;
use pelupet_booking::domain::model::{CustomServiceId, ServiceId};
use pelupet_booking::domain::ports::SessionStore;
use pelupet_booking::utils::error::ErrorSeverity;
use pelupet_booking::utils::format::{format_currency, format_date};
use pelupet_booking::utils::{logger, validation::Validate};
use pelupet_booking::{
    AccountWorkflow, ApiClient, AppConfig, BookingError, BookingWorkflow, Cli,
    CustomServiceWorkflow, FileSessionStore, Result,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match AppConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(3);
        }
    };
    cli.apply_overrides(&mut config);

    // 初始化日誌
    if config.logging.json {
        logger::init_json_logger(Some(&config.logging.level));
    } else {
        logger::init_cli_logger(cli.verbose, Some(&config.logging.level));
    }

    tracing::info!("Starting pelupet CLI");
    if cli.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let kind = workflow_kind(&cli.command);

    if let Err(e) = run(cli.command, &config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?}, Step: {:?})",
            e,
            e.category(),
            e.severity(),
            e.failed_step()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        match kind {
            Some(kind) => {
                for line in kind.failure_report(&e) {
                    eprintln!("❌ {}", line);
                }
            }
            None => {
                eprintln!("❌ {}", e.user_friendly_message());
                for message in e.field_messages() {
                    eprintln!("   - {}", message);
                }
                eprintln!("💡 建議: {}", e.recovery_suggestion());
            }
        }

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 4,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }
}

fn workflow_kind(command: &Command) -> Option<WorkflowKind> {
    match command {
        Command::Book(_) => Some(WorkflowKind::Booking),
        Command::RequestService(_) => Some(WorkflowKind::CustomService),
        Command::Register(_) => Some(WorkflowKind::Registration),
        _ => None,
    }
}

async fn run(command: Command, config: &AppConfig) -> Result<()> {
    let store = FileSessionStore::new(&config.session.path);
    let session = store.load().await?;
    let api = ApiClient::new(config.api.clone(), session)?;

    match command {
        Command::Services { category, id } => show_services(&api, category, id).await,
        Command::Book(args) => {
            let form = args.into_input()?.into_form()?;
            let catalog = catalog::load_booking_catalog(&api).await;
            let receipt = BookingWorkflow::new(&api, &catalog, config.booking.default_doctor())
                .submit(form)
                .await?;

            println!("✅ {}", WorkflowKind::Booking.success_message());
            println!(
                "📅 {} · {} · mascota #{}",
                format_date(receipt.appointment_date.naive()),
                format_currency(receipt.total_price.as_str()),
                receipt.pet_id
            );
            Ok(())
        }
        Command::RequestService(args) => {
            let form = args.into_input()?.into_form()?;
            if let CustomerChoice::Existing(id) = &form.customer {
                let catalog = catalog::load_customer_catalog(&api).await;
                match catalog.customers.iter().find(|c| c.id == *id) {
                    Some(customer) => {
                        tracing::info!("👤 Requesting for {} <{}>", customer.name, customer.email)
                    }
                    None => tracing::warn!("Customer {} not found in loaded list", id),
                }
            }
            CustomServiceWorkflow::new(&api).submit(form).await?;
            println!("✅ {}", WorkflowKind::CustomService.success_message());
            Ok(())
        }
        Command::Appointments { date, status } => {
            let appointments = match (date, status) {
                (Some(date), _) => api.appointments_on(date).await?,
                (None, Some(status)) => api.appointments_with_status(status).await?,
                (None, None) => {
                    return Err(BookingError::validation(
                        "appointments",
                        "Indique --date o --status",
                    ))
                }
            };
            for appointment in appointments {
                println!(
                    "#{} {} · servicio {} · mascota {} · {} · {}",
                    appointment.id,
                    format_date(appointment.appointment_date.naive()),
                    appointment.service_id,
                    appointment.pet_id,
                    format_currency(appointment.total_price.as_str()),
                    appointment.status.label()
                );
            }
            Ok(())
        }
        Command::Requests {
            status,
            approve,
            reject,
        } => {
            if let Some(id) = approve {
                api.approve_custom_service(CustomServiceId(id)).await?;
                println!("✅ Solicitud #{} aprobada", id);
                return Ok(());
            }
            if let Some(id) = reject {
                api.reject_custom_service(CustomServiceId(id)).await?;
                println!("✅ Solicitud #{} rechazada", id);
                return Ok(());
            }
            for request in api.custom_services_with_status(status).await? {
                let duration = request
                    .duration_minutes
                    .map(|minutes| format!("{} min", minutes))
                    .unwrap_or_else(|| "sin duración".to_string());
                println!(
                    "#{} {} · {} · {} · {}",
                    request.id,
                    request.name,
                    format_currency(request.price.as_str()),
                    duration,
                    request.status.label()
                );
            }
            Ok(())
        }
        Command::Login { email, password } => {
            let session = AccountWorkflow::new(&api, &store)
                .login(&email, &password)
                .await?;
            if let Some(user) = &session.user {
                println!("✅ Bienvenido, {} ({})", user.name, user.landing_path());
            }
            Ok(())
        }
        Command::Register(args) => {
            let session = AccountWorkflow::new(&api, &store)
                .register(args.into())
                .await?;
            println!("✅ {}", WorkflowKind::Registration.success_message());
            if let Some(user) = &session.user {
                println!("➡️  {}", user.landing_path());
            }
            Ok(())
        }
        Command::Logout => {
            AccountWorkflow::new(&api, &store).logout().await?;
            println!("👋 Sesión cerrada");
            Ok(())
        }
        Command::Whoami => {
            let user = AccountWorkflow::new(&api, &store).current_user().await?;
            println!("{} <{}> · {:?}", user.name, user.email, user.role);
            Ok(())
        }
    }
}

async fn show_services(api: &ApiClient, category: CategoryFilter, id: Option<i64>) -> Result<()> {
    if let Some(id) = id {
        let service = api.get_service(ServiceId(id)).await?;
        println!(
            "#{} {} · {} · {} min",
            service.id,
            service.name,
            format_currency(service.price.as_str()),
            service.duration_minutes
        );
        if let Some(description) = &service.description {
            println!("   {}", description);
        }
        return Ok(());
    }

    let catalog = catalog::load_service_catalog(api).await;
    if !catalog.is_complete() {
        eprintln!("⚠️  No se pudieron cargar los servicios");
    }
    for service in catalog.services_in_category(category) {
        println!(
            "#{} [{}] {} · {} · {} min",
            service.id,
            service.category.as_str(),
            service.name,
            format_currency(service.price.as_str()),
            service.duration_minutes
        );
    }
    Ok(())
}
