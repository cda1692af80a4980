#![allow(non_snake_case)]

pub mod render;
pub mod views;
pub mod vm;

pub use render::render_page;
pub use vm::{PageVm, map_flow_step, page_url, unavailable_page};
