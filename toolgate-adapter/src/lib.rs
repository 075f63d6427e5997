pub mod adapter;
pub mod parser;
pub mod shape;

pub use adapter::{OutputAdapter, ToolRequest, normalize_model_output};
pub use parser::{JsonRepairParser, StrictJsonParser};
pub use shape::ModelOutputShape;
