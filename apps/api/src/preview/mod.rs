// Live preview sessions: per-session layout engine, update triggers, scaled view.

pub mod handlers;
pub mod session;

pub use session::SessionStore;
