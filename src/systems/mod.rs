mod claims;
mod economy;
mod harvest;
mod production;

pub use claims::ClaimSystem;
pub use economy::{EconomyReport, EconomyResolver};
pub use harvest::HarvestSystem;
pub use production::ProductionSystem;
