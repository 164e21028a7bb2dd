pub mod assist;
pub mod events;
pub mod navigation;
pub mod pages;
pub mod state;
pub mod steps;
