pub mod historical;
pub mod reference;
