pub mod late_policies;
pub mod menu;
pub mod questions;
