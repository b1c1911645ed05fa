pub mod alias;
pub mod catalog;
pub mod list;
pub mod progress;
pub mod recommendation;
pub mod user;
pub mod watch_map;
