pub mod change;
pub mod document;
pub mod interval;
pub mod profile;
pub mod week;
pub mod workplace;
