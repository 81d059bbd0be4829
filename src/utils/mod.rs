pub mod bits;
pub mod number;
pub mod range;
pub mod sets;
pub mod time;
