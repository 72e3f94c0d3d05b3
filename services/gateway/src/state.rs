use std::sync::Arc;

use feed::{CacheHandle, ClientRegistry, FeedHub, RegistryConfig};
use ledger::{
    CounterAllocator, IdAllocator, JournalStore, Ledger, MatchStore, MemoryStore, StoreError,
};
use tokio::sync::Mutex;
use tracing::info;

use crate::config::GatewayConfig;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub hub: Arc<FeedHub>,
    pub cache: CacheHandle,
    pub registry: Arc<Mutex<ClientRegistry>>,
}

impl AppState {
    /// Wire the ledger to its listeners: cache first, then the live feed.
    pub fn new(
        store: Arc<dyn MatchStore>,
        allocator: Arc<dyn IdAllocator>,
        cache: CacheHandle,
        feed_capacity: usize,
        registry: RegistryConfig,
    ) -> Self {
        let hub = Arc::new(FeedHub::new(feed_capacity));
        let ledger = Ledger::new(store, allocator)
            .with_listener(Arc::new(cache.clone()))
            .with_listener(hub.clone());

        Self {
            ledger: Arc::new(ledger),
            hub,
            cache,
            registry: Arc::new(Mutex::new(ClientRegistry::new(registry))),
        }
    }

    /// Volatile state with default settings.
    pub fn in_memory() -> Self {
        let config = GatewayConfig::default();
        Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(CounterAllocator::new()),
            CacheHandle::in_memory(),
            config.feed_capacity,
            RegistryConfig {
                max_rooms_per_client: config.max_rooms_per_client,
            },
        )
    }

    /// Open the configured store and build the state around it.
    pub async fn from_config(config: &GatewayConfig) -> Result<Self, StoreError> {
        let (store, allocator): (Arc<dyn MatchStore>, Arc<dyn IdAllocator>) =
            match &config.journal_path {
                Some(path) => {
                    let journal = JournalStore::open(path)?;
                    let highest = journal.highest_match_sequence().await;
                    (
                        Arc::new(journal),
                        Arc::new(CounterAllocator::starting_after(highest)),
                    )
                }
                None => {
                    info!("No journal configured, matches are kept in memory only");
                    (Arc::new(MemoryStore::new()), Arc::new(CounterAllocator::new()))
                }
            };

        let cache = if config.recent_cache {
            CacheHandle::in_memory()
        } else {
            info!("Recent-event cache disabled");
            CacheHandle::Unavailable
        };

        Ok(Self::new(
            store,
            allocator,
            cache,
            config.feed_capacity,
            RegistryConfig {
                max_rooms_per_client: config.max_rooms_per_client,
            },
        ))
    }
}
