//! Text menu over a product store.

pub mod menu;

pub use menu::Menu;
