//! One service per API area, each a thin typed layer over [`ApiClient`].

mod auth;
mod content;
mod favorites;
mod forum;
mod friends;
mod news;
mod users;

pub use auth::AuthService;
pub use content::ContentService;
pub use favorites::{FavoriteOutcome, FavoriteSet, FavoritesService};
pub use forum::ForumService;
pub use friends::FriendsService;
pub use news::{NewsQuery, NewsService, FEATURED_COUNT, NEWS_PER_PAGE};
pub use users::UsersService;

use crate::client::ApiClient;

impl ApiClient {
    pub fn auth(&self) -> AuthService {
        AuthService::new(self.clone())
    }

    pub fn content(&self) -> ContentService {
        ContentService::new(self.clone())
    }

    pub fn favorites(&self) -> FavoritesService {
        FavoritesService::new(self.clone())
    }

    pub fn forum(&self) -> ForumService {
        ForumService::new(self.clone())
    }

    pub fn friends(&self) -> FriendsService {
        FriendsService::new(self.clone())
    }

    pub fn news(&self) -> NewsService {
        NewsService::new(self.clone())
    }

    pub fn users(&self) -> UsersService {
        UsersService::new(self.clone())
    }
}
