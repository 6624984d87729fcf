pub mod documents;
pub mod initialize;
pub mod intervals;
pub mod log;
pub mod memberships;
pub mod migrate;
pub mod pool;
pub mod profiles;
pub mod workplaces;
