pub mod add;
pub mod agenda;
pub mod complete;
pub mod delete;
pub mod edit;
pub mod preview;
