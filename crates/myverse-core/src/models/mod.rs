mod content;
mod forum;
mod news;
mod social;
mod user;

pub use content::{
    favorite_key, ContentItem, Favorite, MediaType, NewFavorite, SearchKind, SearchResponse,
    TimeWindow,
};
pub use forum::{
    ForumCategory, ForumComment, ForumPost, ForumStats, ForumTotals, NewComment, NewPost,
    Pagination, PostDetail, PostPage, PostSort, PostUpdate,
};
pub use news::{NewNews, NewsArticle, NewsCategory, NewsPage};
pub use social::{
    Friend, FriendRequest, FriendSuggestion, RecentFavorite, RequestStatus, UserProfile,
    UserSearchResult, UserStats,
};
pub use user::{
    AuthResponse, LoginData, PasswordChange, PreferencesInput, RegisterData, User,
    UserPreferences, UserSummary, UserUpdate,
};
