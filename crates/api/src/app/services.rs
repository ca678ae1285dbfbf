use std::sync::Arc;

use thiserror::Error;
use tokio::sync::OnceCell;

use lessonbook_infra::{
    config::AppConfig,
    seed::{self, SeedError},
    store::{
        postgres, with_timeout, CatalogStore, InMemoryCatalogStore, InMemoryOrderStore, OrderStore,
        PostgresCatalogStore, PostgresOrderStore, StoreError,
    },
    CatalogQueries, InventoryMutator, OrderIntake,
};

/// Application services shared by every handler.
pub struct AppServices {
    pub queries: CatalogQueries,
    pub inventory: InventoryMutator,
    pub intake: OrderIntake,
}

impl AppServices {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        orders: Arc<dyn OrderStore>,
        config: &AppConfig,
    ) -> Self {
        Self {
            queries: CatalogQueries::new(catalog.clone(), config.store_timeout()),
            inventory: InventoryMutator::new(catalog, config.mutator_settings()),
            intake: OrderIntake::new(orders, config.store_timeout()),
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("store connection failed: {0}")]
    Store(#[from] StoreError),

    #[error("seeding failed: {0}")]
    Seed(#[from] SeedError),
}

/// Connect to the configured store, seed it if needed and wire the services.
///
/// No `database_url` means in-memory stores (dev/test).
pub async fn build_services(config: &AppConfig) -> Result<AppServices, StartupError> {
    let catalog: Arc<dyn CatalogStore>;
    let orders: Arc<dyn OrderStore>;
    match &config.database_url {
        Some(url) => {
            let pool = postgres::connect_lazy(url, config.database_max_connections)?;
            let lessons = PostgresCatalogStore::new(pool.clone());
            // The pool is lazy; make sure the database actually answers.
            let existing = with_timeout("count", config.store_timeout(), lessons.count()).await?;
            tracing::info!(lessons = existing, "connected to postgres");
            catalog = Arc::new(lessons);
            orders = Arc::new(PostgresOrderStore::new(pool));
        }
        None => {
            tracing::warn!("no database_url configured; using in-memory stores");
            catalog = Arc::new(InMemoryCatalogStore::new());
            orders = Arc::new(InMemoryOrderStore::new());
        }
    }

    if let Some(path) = &config.seed_file {
        let lessons = seed::read_seed_file(path).await?;
        seed::seed_if_empty(catalog.as_ref(), lessons).await?;
    }

    Ok(AppServices::new(catalog, orders, config))
}

/// Late-bound handle to the application services.
///
/// Empty until the store connection is established; request handling checks
/// it before any core operation runs.
#[derive(Clone, Default)]
pub struct StoreHandle {
    inner: Arc<OnceCell<Arc<AppServices>>>,
}

impl StoreHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that is ready from the start.
    pub fn ready(services: AppServices) -> Self {
        let handle = Self::new();
        handle.set(Arc::new(services));
        handle
    }

    /// Publish the services. Returns `false` if they were already set.
    pub fn set(&self, services: Arc<AppServices>) -> bool {
        self.inner.set(services).is_ok()
    }

    pub fn get(&self) -> Option<Arc<AppServices>> {
        self.inner.get().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_services_are_built_without_database() {
        let services = build_services(&AppConfig::default()).await.unwrap();
        assert!(services.queries.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn handle_is_set_once() {
        let handle = StoreHandle::new();
        assert!(handle.get().is_none());

        let config = AppConfig::default();
        assert!(handle.set(Arc::new(build_services(&config).await.unwrap())));
        assert!(!handle.set(Arc::new(build_services(&config).await.unwrap())));
        assert!(handle.get().is_some());
    }
}
