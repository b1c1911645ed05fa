pub use super::anime::Entity as Anime;
pub use super::anime_uid_aliases::Entity as AnimeUidAliases;
pub use super::user_anime_lists::Entity as UserAnimeLists;
pub use super::user_recommendations::Entity as UserRecommendations;
pub use super::user_watch_progress::Entity as UserWatchProgress;
pub use super::users::Entity as Users;
pub use super::watch_title_map::Entity as WatchTitleMap;
