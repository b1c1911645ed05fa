pub mod prelude;

pub mod anime;
pub mod anime_uid_aliases;
pub mod user_anime_lists;
pub mod user_recommendations;
pub mod user_watch_progress;
pub mod users;
pub mod watch_title_map;
