pub mod chunk;
pub mod frame;
pub mod grid_partitioner;
pub mod intensity_search;
pub mod overlay;
pub mod pixel;
pub mod utils;
