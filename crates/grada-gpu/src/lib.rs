pub mod context;
pub mod curve_lut;
pub mod program;
pub mod shader;
pub mod texture;
