//! User query handlers: WHO, WHOIS, USERHOST
//!
//! RFC 2812 §3.6 - User based queries

mod userhost;
mod who;
mod whois;

pub use userhost::UserhostHandler;
pub use who::WhoHandler;
pub use whois::WhoisHandler;
