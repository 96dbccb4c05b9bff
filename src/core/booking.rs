use crate::core::catalog::Catalog;
use crate::core::steps::{StepLedger, StepOutcome, WorkflowKind, WorkflowStep};
use crate::domain::form::{BookingForm, CustomerChoice, PetChoice};
use crate::domain::model::{
    AppointmentDate, AppointmentStatus, CustomerId, DoctorId, NewAppointment, PetId, Price,
    ServiceId,
};
use crate::domain::ports::BookingApi;
use crate::utils::error::Result;

/// 建立或沿用客戶；預約與客製服務流程共用
pub(crate) async fn resolve_customer<A: BookingApi + ?Sized>(
    api: &A,
    choice: CustomerChoice,
    ledger: &mut StepLedger,
) -> Result<CustomerId> {
    match choice {
        CustomerChoice::New(customer) => {
            ledger
                .run(WorkflowStep::CreateCustomer, api.create_customer(&customer))
                .await
        }
        CustomerChoice::Existing(id) => {
            ledger.reuse(WorkflowStep::CreateCustomer, id.0);
            Ok(id)
        }
    }
}

/// 新寵物需要已解析的客戶 id 作為主人
async fn resolve_pet<A: BookingApi + ?Sized>(
    api: &A,
    owner: CustomerId,
    doctor: DoctorId,
    choice: PetChoice,
    ledger: &mut StepLedger,
) -> Result<PetId> {
    match choice {
        PetChoice::New(pet) => {
            let registration = pet.owned_by(owner, doctor);
            ledger
                .run(WorkflowStep::CreatePet, api.create_pet(&registration))
                .await
        }
        PetChoice::Existing(id) => {
            ledger.reuse(WorkflowStep::CreatePet, id.0);
            Ok(id)
        }
    }
}

/// 客戶、寵物與價格都已確定的預約；只能由本模組的流程建立
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBooking {
    customer_id: CustomerId,
    pet_id: PetId,
    service_id: ServiceId,
    total_price: Price,
    appointment_date: AppointmentDate,
    notes: String,
}

impl ResolvedBooking {
    fn into_request(self) -> NewAppointment {
        NewAppointment {
            pet_id: self.pet_id,
            customer_id: self.customer_id,
            service_id: self.service_id,
            appointment_date: self.appointment_date,
            total_price: self.total_price,
            notes: self.notes,
            status: AppointmentStatus::Scheduled,
        }
    }
}

/// 預約成功後回給呼叫端的結果
#[derive(Debug, Clone)]
pub struct BookingReceipt {
    pub customer_id: CustomerId,
    pub pet_id: PetId,
    pub service_id: ServiceId,
    pub total_price: Price,
    pub appointment_date: AppointmentDate,
    pub execution_id: String,
    pub steps: Vec<StepOutcome>,
}

/// 預約送出流程：客戶 -> 寵物 -> 價格快照 -> 預約
///
/// 每一步都等前一步完成才開始。任何一步失敗就中止，已建立的客戶或寵物
/// 不會被回滾。
pub struct BookingWorkflow<'a, A: BookingApi + ?Sized> {
    api: &'a A,
    catalog: &'a Catalog,
    default_doctor: DoctorId,
}

impl<'a, A: BookingApi + ?Sized> BookingWorkflow<'a, A> {
    pub fn new(api: &'a A, catalog: &'a Catalog, default_doctor: DoctorId) -> Self {
        Self {
            api,
            catalog,
            default_doctor,
        }
    }

    pub async fn submit(&self, form: BookingForm) -> Result<BookingReceipt> {
        let mut ledger = StepLedger::new(WorkflowKind::Booking);
        tracing::info!(
            "📝 {}: submitting appointment for service {}",
            ledger.execution_id(),
            form.service_id
        );

        let customer_id = resolve_customer(self.api, form.customer, &mut ledger).await?;
        let pet_id = resolve_pet(
            self.api,
            customer_id,
            self.default_doctor,
            form.pet,
            &mut ledger,
        )
        .await?;

        let booking = ResolvedBooking {
            customer_id,
            pet_id,
            service_id: form.service_id,
            total_price: self.catalog.snapshot_price(form.service_id),
            appointment_date: form.appointment_date,
            notes: form.notes,
        };

        self.create_appointment(booking.clone(), &mut ledger).await?;

        tracing::info!(
            "🎉 {}: appointment scheduled (summary: {})",
            ledger.execution_id(),
            serde_json::Value::Object(ledger.execution_summary())
        );

        Ok(BookingReceipt {
            customer_id: booking.customer_id,
            pet_id: booking.pet_id,
            service_id: booking.service_id,
            total_price: booking.total_price,
            appointment_date: booking.appointment_date,
            execution_id: ledger.execution_id().to_string(),
            steps: ledger.outcomes().to_vec(),
        })
    }

    async fn create_appointment(&self, booking: ResolvedBooking, ledger: &mut StepLedger) -> Result<()> {
        let request = booking.into_request();
        ledger
            .run(
                WorkflowStep::CreateAppointment,
                self.api.create_appointment(&request),
            )
            .await
    }
}
