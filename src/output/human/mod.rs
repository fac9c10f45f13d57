pub mod header;
pub mod refusal;
pub mod selection;
