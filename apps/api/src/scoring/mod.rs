pub mod engine;
pub mod experience;
pub mod keyword;
pub mod semantic;
