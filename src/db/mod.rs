pub mod memory;
pub mod metered;
pub mod postgres;
pub mod redis;
pub mod store;

pub use memory::MemoryStore;
pub use metered::MeteredStore;
pub use postgres::{create_pool, PgStore};
pub use self::redis::create_redis_client;
pub use self::redis::Cache;
pub use self::redis::CacheKey;
pub use self::redis::CacheWriterHandle;
pub use store::{ArticleStore, InteractionStore, Stores, UserStore};
