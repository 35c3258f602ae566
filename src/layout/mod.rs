/// Canvas plan and its resolver.
pub mod canvas;
