use crate::domain::auth::AuthResponse;
use crate::domain::model::{CustomerId, PetId};
use crate::utils::error::{BookingError, Result};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

/// 工作流程中會呼叫遠端的步驟
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowStep {
    CreateCustomer,
    CreatePet,
    CreateAppointment,
    CreateCustomService,
    RegisterUser,
}

impl WorkflowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStep::CreateCustomer => "create_customer",
            WorkflowStep::CreatePet => "create_pet",
            WorkflowStep::CreateAppointment => "create_appointment",
            WorkflowStep::CreateCustomService => "create_custom_service",
            WorkflowStep::RegisterUser => "register_user",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 哪一種表單送出
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowKind {
    Booking,
    CustomService,
    Registration,
}

impl WorkflowKind {
    fn prefix(&self) -> &'static str {
        match self {
            WorkflowKind::Booking => "booking",
            WorkflowKind::CustomService => "custom_service",
            WorkflowKind::Registration => "registration",
        }
    }

    /// 任何步驟失敗時顯示給使用者的固定訊息
    pub fn failure_message(&self) -> &'static str {
        match self {
            WorkflowKind::Booking => "Error al crear la cita. Por favor intente nuevamente.",
            WorkflowKind::CustomService => {
                "Error al solicitar el servicio. Por favor intente nuevamente."
            }
            WorkflowKind::Registration => "Error al registrar usuario",
        }
    }

    /// 送出失敗時顯示給使用者的內容
    ///
    /// 預約與客製服務在遠端步驟失敗時只顯示固定訊息；註冊沿用伺服器的訊息與
    /// 欄位錯誤，沒有訊息時才退回固定文字。
    pub fn failure_report(&self, error: &BookingError) -> Vec<String> {
        match self {
            WorkflowKind::Booking | WorkflowKind::CustomService => {
                if error.failed_step().is_some() {
                    vec![self.failure_message().to_string()]
                } else {
                    vec![error.user_friendly_message()]
                }
            }
            WorkflowKind::Registration => {
                let headline = match error.root() {
                    BookingError::ApiStatusError { message, .. } if !message.is_empty() => {
                        message.clone()
                    }
                    BookingError::ValidationError { message, .. } => message.clone(),
                    _ => self.failure_message().to_string(),
                };
                std::iter::once(headline)
                    .chain(error.field_messages())
                    .collect()
            }
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            WorkflowKind::Booking => "¡Cita Agendada! Tu cita ha sido agendada exitosamente",
            WorkflowKind::CustomService => {
                "¡Solicitud Enviada! Revisaremos tu solicitud y te contactaremos pronto"
            }
            WorkflowKind::Registration => "¡Registro exitoso!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// 這一步在遠端建立了新資源
    Created(i64),
    /// 沿用表單選擇的既有資源，沒有發出請求
    Reused(i64),
    /// 請求成功，但沒有使用回傳的 id
    Completed,
}

/// 單一步驟的執行紀錄
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub step: WorkflowStep,
    pub resolution: Resolution,
    pub duration: Duration,
}

/// 步驟回傳值中可記錄的資源 id
pub trait CreatedId {
    fn created_id(&self) -> Option<i64> {
        None
    }
}

impl CreatedId for () {}

impl CreatedId for CustomerId {
    fn created_id(&self) -> Option<i64> {
        Some(self.0)
    }
}

impl CreatedId for PetId {
    fn created_id(&self) -> Option<i64> {
        Some(self.0)
    }
}

impl CreatedId for AuthResponse {
    fn created_id(&self) -> Option<i64> {
        Some(self.user.id.0)
    }
}

/// 一次送出的步驟帳本：依序執行、計時並標記失敗的步驟
#[derive(Debug, Clone)]
pub struct StepLedger {
    kind: WorkflowKind,
    execution_id: String,
    outcomes: Vec<StepOutcome>,
}

impl StepLedger {
    pub fn new(kind: WorkflowKind) -> Self {
        let execution_id = format!(
            "{}_{}",
            kind.prefix(),
            chrono::Utc::now().format("%Y%m%d_%H%M%S%3f")
        );
        Self::with_execution_id(kind, execution_id)
    }

    pub fn with_execution_id(kind: WorkflowKind, execution_id: String) -> Self {
        Self {
            kind,
            execution_id,
            outcomes: Vec::new(),
        }
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    pub fn outcomes(&self) -> &[StepOutcome] {
        &self.outcomes
    }

    /// 執行一個遠端步驟；失敗時錯誤會帶上步驟標記，後續步驟由呼叫端以 `?` 中止
    pub async fn run<T, Fut>(&mut self, step: WorkflowStep, action: Fut) -> Result<T>
    where
        T: CreatedId,
        Fut: Future<Output = Result<T>>,
    {
        let start_time = Instant::now();
        tracing::debug!("▶️ {}: {}", self.execution_id, step);

        match action.await {
            Ok(value) => {
                let duration = start_time.elapsed();
                let resolution = value
                    .created_id()
                    .map(Resolution::Created)
                    .unwrap_or(Resolution::Completed);

                tracing::info!(
                    "✅ {}: {} done ({:?}, duration: {:?})",
                    self.execution_id,
                    step,
                    resolution,
                    duration
                );

                self.outcomes.push(StepOutcome {
                    step,
                    resolution,
                    duration,
                });
                Ok(value)
            }
            Err(e) => {
                tracing::error!(
                    "❌ {}: {} failed after {} completed step(s): {}",
                    self.execution_id,
                    step,
                    self.outcomes.len(),
                    e
                );
                Err(e.at_step(step))
            }
        }
    }

    /// 記錄沿用既有資源的步驟
    pub fn reuse(&mut self, step: WorkflowStep, id: i64) {
        tracing::info!("↪️ {}: {} reused existing id {}", self.execution_id, step, id);
        self.outcomes.push(StepOutcome {
            step,
            resolution: Resolution::Reused(id),
            duration: Duration::ZERO,
        });
    }

    /// 真正送出的請求數
    pub fn remote_calls(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| !matches!(o.resolution, Resolution::Reused(_)))
            .count()
    }

    pub fn execution_summary(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut summary = serde_json::Map::new();

        let total_duration: Duration = self.outcomes.iter().map(|o| o.duration).sum();
        let executed: Vec<serde_json::Value> = self
            .outcomes
            .iter()
            .filter(|o| !matches!(o.resolution, Resolution::Reused(_)))
            .map(|o| serde_json::Value::String(o.step.to_string()))
            .collect();
        let created: serde_json::Map<String, serde_json::Value> = self
            .outcomes
            .iter()
            .filter_map(|o| match o.resolution {
                Resolution::Created(id) => {
                    Some((o.step.to_string(), serde_json::Value::from(id)))
                }
                _ => None,
            })
            .collect();

        summary.insert("workflow".to_string(), self.kind.prefix().into());
        summary.insert(
            "execution_id".to_string(),
            self.execution_id.clone().into(),
        );
        summary.insert("remote_calls".to_string(), self.remote_calls().into());
        summary.insert(
            "total_duration_ms".to_string(),
            (total_duration.as_millis() as u64).into(),
        );
        summary.insert("executed_steps".to_string(), executed.into());
        summary.insert("created_ids".to_string(), created.into());

        summary
    }
}
