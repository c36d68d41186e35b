pub mod catalog;
pub mod color;
pub mod curve;
pub mod frame;
pub mod params;
pub mod pipeline;
pub mod resolve;
pub mod session;
