pub mod mapping;
pub mod reader;

pub use mapping::{FieldMapping, FieldRole};
pub use reader::{load_roster, read_roster, Roster, StudentRecord};
