//! Client side: login, the background credential refresher, and the laptop client.

pub mod auth;
pub mod laptop;
pub mod metrics;
pub mod refresher;

pub use auth::AuthClient;
pub use laptop::LaptopClient;
pub use metrics::RefreshMetrics;
pub use refresher::CredentialRefresher;
