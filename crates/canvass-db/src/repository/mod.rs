//! SurrealDB repository implementations.

mod audit;
mod device;
mod identity;

pub use audit::SurrealAuditLogRepository;
pub use device::SurrealDeviceStateRepository;
pub use identity::SurrealIdentityRepository;
