//! Mail delivery implementations.

mod http;
mod log;
mod memory;

pub use http::{HttpMailer, MailConfig};
pub use log::LogMailer;
pub use memory::InMemoryMailer;
