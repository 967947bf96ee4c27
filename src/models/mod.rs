pub mod data_type;
pub mod payload;
pub mod records;

pub use data_type::{DataType, UnknownDataType};
pub use payload::*;
pub use records::*;
