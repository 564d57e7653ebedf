pub mod bot;
pub mod reply;
pub mod timeline;
pub mod token;
