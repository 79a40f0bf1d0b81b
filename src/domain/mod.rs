pub mod entity;
pub mod level;
pub mod rules;
pub mod tile;
