pub mod fallback_poller;
pub mod lease_renewal;

pub use fallback_poller::{FallbackPoller, SweepReport};
pub use lease_renewal::{renew_expiring_leases, spawn_lease_renewal_task, RenewalReport};
