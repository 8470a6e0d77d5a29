//! Archive sequencing and record assembly.

mod builder;
mod sequence;

pub use builder::assemble_record;
pub use sequence::{format_reference, next_reference, next_sequence};
