pub mod cache;
pub mod client;
pub mod config;
pub mod database;
pub mod events;
pub mod mutations;
pub mod queries;
pub mod remote;
pub mod sync;

pub use cache::TaskListCache;
pub use client::TaskListClient;
pub use config::ClientConfig;
pub use database::TaskStore;
pub use events::EventDispatcher;
pub use mutations::{MutationOutcome, MutationPipeline};
pub use remote::{HttpRemoteSource, RemoteSource, StaticRemoteSource};
pub use sync::SyncCoordinator;
