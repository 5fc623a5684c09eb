pub mod structures;
pub mod waterfall;
