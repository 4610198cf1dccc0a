use myverse_core::models::{
    ContentItem, Favorite, ForumPost, ForumTotals, NewsArticle, User, UserProfile, UserStats,
};
use myverse_core::toast::{Toast, ToastKind};

pub fn content_line(item: &ContentItem) -> String {
    let year = item
        .year()
        .map(|y| format!(" ({y})"))
        .unwrap_or_default();
    let rating = if item.vote_average > 0.0 {
        format!("  ★ {:.1}", item.vote_average)
    } else {
        String::new()
    };
    format!(
        "[{}] {}{}{}  #{}",
        item.media_type, item.title, year, rating, item.id
    )
}

pub fn favorite_line(fav: &Favorite) -> String {
    format!(
        "{:>4}  [{}] {}  ({})",
        fav.id, fav.content_type, fav.content_title, fav.content_id
    )
}

pub fn post_line(post: &ForumPost) -> String {
    let author = post
        .author
        .as_ref()
        .map(|a| a.username.as_str())
        .unwrap_or("unknown");
    let pin = if post.is_pinned { "📌 " } else { "" };
    format!(
        "{:>4}  {pin}{}  by {author}  ({} views, {} comments)",
        post.id, post.title, post.views_count, post.comments_count
    )
}

pub fn news_line(article: &NewsArticle) -> String {
    let star = if article.is_featured { "★ " } else { "" };
    format!(
        "{:>4}  {star}[{}] {}",
        article.id,
        article.category.label(),
        article.title
    )
}

pub fn user_block(user: &User) -> String {
    let mut out = format!("{} <{}>  (id {})", user.username, user.email, user.id);
    if let Some(bio) = user.bio.as_deref().filter(|b| !b.is_empty()) {
        out.push_str(&format!("\n  {bio}"));
    }
    if let Some(since) = &user.created_at {
        out.push_str(&format!("\n  member since {}", short_date(since)));
    }
    out
}

pub fn profile_block(profile: &UserProfile) -> String {
    let mut out = format!(
        "{}  (id {})\n  {} favorites, {} posts",
        profile.username, profile.id, profile.total_favorites, profile.total_posts
    );
    if !profile.favorite_genres.is_empty() {
        out.push_str(&format!("\n  genres: {}", profile.favorite_genres.join(", ")));
    }
    if profile.mutual_friends > 0 {
        out.push_str(&format!("\n  {} mutual friends", profile.mutual_friends));
    }
    for fav in &profile.recent_favorites {
        out.push_str(&format!("\n  - [{}] {}", fav.media_type, fav.title));
    }
    out
}

pub fn stats_block(stats: &UserStats) -> String {
    format!(
        "favorites: {} ({} movies, {} series, {} games)\nforum: {} posts, {} comments\nfriends: {}",
        stats.total_favorites(),
        stats.favorite_movies,
        stats.favorite_series,
        stats.favorite_games,
        stats.forum_posts,
        stats.forum_comments,
        stats.friends
    )
}

pub fn forum_totals(totals: &ForumTotals) -> String {
    format!(
        "{} posts, {} comments, {} members",
        totals.total_posts, totals.total_comments, totals.total_users
    )
}

pub fn toast_line(toast: &Toast) -> String {
    let mark = match toast.kind {
        ToastKind::Success => "✓",
        ToastKind::Error => "✗",
        ToastKind::Info => "•",
    };
    format!("{mark} {}", toast.message)
}

/// `2024-03-01T12:00:00` -> `2024-03-01`.
pub fn short_date(s: &str) -> &str {
    s.get(..10).unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use myverse_core::models::MediaType;

    #[test]
    fn test_content_line() {
        let item = ContentItem {
            id: "603".into(),
            title: "The Matrix".into(),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            release_date: Some("1999-03-31".into()),
            vote_average: 8.2,
            vote_count: 100,
            media_type: MediaType::Movie,
            genres: vec![],
            platforms: vec![],
        };
        assert_eq!(content_line(&item), "[movie] The Matrix (1999)  ★ 8.2  #603");
    }

    #[test]
    fn test_forum_totals() {
        let totals = ForumTotals {
            total_posts: 3,
            total_comments: 8,
            total_users: 2,
        };
        assert_eq!(forum_totals(&totals), "3 posts, 8 comments, 2 members");
    }

    #[test]
    fn test_short_date() {
        assert_eq!(short_date("2024-03-01T12:00:00"), "2024-03-01");
        assert_eq!(short_date("2024"), "2024");
    }
}
