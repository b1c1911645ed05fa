pub mod anime;
pub mod tracking;
