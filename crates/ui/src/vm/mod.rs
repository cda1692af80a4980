mod page_vm;

pub use page_vm::{ImageVm, PAGE_TITLE, PageBody, PageVm, map_flow_step, page_url, unavailable_page};
