mod intro;
mod page;
mod question;
mod terminal;

#[cfg(test)]
mod view_smoke;

pub use intro::IntroView;
pub use page::{Page, PageProps};
pub use question::QuestionView;
pub use terminal::TerminalView;
