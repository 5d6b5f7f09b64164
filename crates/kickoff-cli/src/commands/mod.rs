pub mod common;
pub mod events;
pub mod favourite;
pub mod ids;
pub mod list;
pub mod refresh;
