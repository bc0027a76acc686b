pub mod collision;
pub mod entity;
pub mod geometry;
pub mod map;
pub mod tile;
