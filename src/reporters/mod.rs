pub mod results_log;
pub mod table;
pub mod writer;
