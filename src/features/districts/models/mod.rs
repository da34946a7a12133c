mod division_node;
mod division_record;

pub use division_node::{Depth, DivisionCode, DivisionNode};
pub use division_record::DivisionRecord;
