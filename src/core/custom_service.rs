use crate::core::booking::resolve_customer;
use crate::core::steps::{StepLedger, StepOutcome, WorkflowKind, WorkflowStep};
use crate::domain::form::CustomServiceForm;
use crate::domain::model::{CustomServiceStatus, CustomerId, NewCustomService};
use crate::domain::ports::BookingApi;
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct CustomServiceReceipt {
    pub customer_id: CustomerId,
    pub execution_id: String,
    pub steps: Vec<StepOutcome>,
}

/// 客製服務申請：解析客戶後建立狀態為 pending 的申請
pub struct CustomServiceWorkflow<'a, A: BookingApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: BookingApi + ?Sized> CustomServiceWorkflow<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    pub async fn submit(&self, form: CustomServiceForm) -> Result<CustomServiceReceipt> {
        let mut ledger = StepLedger::new(WorkflowKind::CustomService);
        tracing::info!(
            "📝 {}: submitting custom service '{}'",
            ledger.execution_id(),
            form.name
        );

        let customer_id = resolve_customer(self.api, form.customer, &mut ledger).await?;

        let request = NewCustomService {
            customer_id,
            name: form.name,
            description: form.description,
            price: form.price,
            duration_minutes: form.duration_minutes,
            status: CustomServiceStatus::Pending,
        };

        ledger
            .run(
                WorkflowStep::CreateCustomService,
                self.api.create_custom_service(&request),
            )
            .await?;

        Ok(CustomServiceReceipt {
            customer_id,
            execution_id: ledger.execution_id().to_string(),
            steps: ledger.outcomes().to_vec(),
        })
    }
}
