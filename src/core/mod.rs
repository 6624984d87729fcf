pub mod aggregator;
pub mod backup;
pub mod changes;
pub mod daily;
pub mod documents;
pub mod entries;
pub mod log;
pub mod overtime;
pub mod report;
pub mod timesheet;
pub mod workers;
