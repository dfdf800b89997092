pub mod command;
pub mod matrix;
pub mod script;
pub mod toolchain;
pub mod trial;
