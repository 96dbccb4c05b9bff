use crate::domain::model::{Customer, Pet, Price, Service, ServiceCategory, ServiceId};
use crate::domain::ports::BookingApi;
use crate::utils::error::Result;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Services,
    Customers,
    Pets,
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatalogSource::Services => "services",
            CatalogSource::Customers => "customers",
            CatalogSource::Pets => "pets",
        };
        f.write_str(name)
    }
}

/// 表單顯示前載入的資料；載入失敗的清單保持空白
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub services: Vec<Service>,
    pub customers: Vec<Customer>,
    pub pets: Vec<Pet>,
    pub failed_sources: Vec<CatalogSource>,
}

/// 服務頁面的分類篩選，`all` 表示不篩選
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(ServiceCategory),
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

impl Catalog {
    pub fn with_services(services: Vec<Service>) -> Self {
        Self {
            services,
            ..Self::default()
        }
    }

    pub fn find_service(&self, id: ServiceId) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    /// 送出時的價格快照；服務不在目錄中時回傳 `0`，不視為錯誤
    pub fn snapshot_price(&self, id: ServiceId) -> Price {
        match self.find_service(id) {
            Some(service) => service.price.clone(),
            None => {
                tracing::warn!(
                    "Service {} not found in loaded catalog ({} services), using price {}",
                    id,
                    self.services.len(),
                    Price::zero()
                );
                Price::zero()
            }
        }
    }

    pub fn services_in_category(&self, filter: CategoryFilter) -> Vec<&Service> {
        self.services
            .iter()
            .filter(|s| match filter {
                CategoryFilter::All => true,
                CategoryFilter::Only(category) => s.category == category,
            })
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.failed_sources.is_empty()
    }
}

fn keep_or_log<T>(source: CatalogSource, result: Result<Vec<T>>, failed: &mut Vec<CatalogSource>) -> Vec<T> {
    match result {
        Ok(items) => {
            tracing::debug!("📥 Loaded {} {}", items.len(), source);
            items
        }
        Err(e) => {
            tracing::error!("Error loading {}: {}", source, e);
            failed.push(source);
            Vec::new()
        }
    }
}

/// 預約表單：同時載入服務、客戶與寵物，等全部完成後回傳
pub async fn load_booking_catalog<A: BookingApi + ?Sized>(api: &A) -> Catalog {
    let (services, customers, pets) =
        tokio::join!(api.list_services(), api.list_customers(), api.list_pets());

    let mut failed_sources = Vec::new();
    let catalog = Catalog {
        services: keep_or_log(CatalogSource::Services, services, &mut failed_sources),
        customers: keep_or_log(CatalogSource::Customers, customers, &mut failed_sources),
        pets: keep_or_log(CatalogSource::Pets, pets, &mut failed_sources),
        failed_sources,
    };

    if !catalog.is_complete() {
        tracing::warn!(
            "⚠️ Booking form continues with partial data (failed: {:?})",
            catalog.failed_sources
        );
    }

    catalog
}

/// 客製服務表單只需要客戶清單
pub async fn load_customer_catalog<A: BookingApi + ?Sized>(api: &A) -> Catalog {
    let mut failed_sources = Vec::new();
    let customers = keep_or_log(
        CatalogSource::Customers,
        api.list_customers().await,
        &mut failed_sources,
    );

    Catalog {
        customers,
        failed_sources,
        ..Catalog::default()
    }
}

/// 服務頁面只需要服務清單
pub async fn load_service_catalog<A: BookingApi + ?Sized>(api: &A) -> Catalog {
    let mut failed_sources = Vec::new();
    let services = keep_or_log(
        CatalogSource::Services,
        api.list_services().await,
        &mut failed_sources,
    );

    Catalog {
        services,
        failed_sources,
        ..Catalog::default()
    }
}
