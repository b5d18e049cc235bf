pub mod campaign;
pub mod session;
