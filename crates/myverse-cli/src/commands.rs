use std::sync::Arc;

use myverse_api::dashboard::Dashboard;
use myverse_api::scope::ViewScope;
use myverse_api::search::{Search, SearchOutcome};
use myverse_api::services::{FavoriteSet, NewsQuery};
use myverse_api::{ApiClient, ApiError, SessionManager};
use myverse_core::config::AppConfig;
use myverse_core::models::{
    ContentItem, ForumComment, LoginData, NewComment, NewFavorite, NewNews, NewPost,
    PasswordChange, PreferencesInput, RegisterData, UserUpdate,
};
use myverse_core::relationship::RelationshipBook;
use myverse_core::routes::{Navigator, Route};
use myverse_core::session::SessionStore;
use myverse_core::storage::SqliteStore;
use myverse_core::toast::{shared_toasts, SharedToasts};
use myverse_core::MyverseError;
use thiserror::Error;

use crate::cli::{
    Command, ConfigCommand, FavoritesCommand, ForumCommand, FriendsCommand, NewsCommand,
    PreferencesCommand, ProfileCommand, UsersCommand,
};
use crate::format;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Core(#[from] MyverseError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("not signed in; run `myverse login` first")]
    SignedOut,

    #[error("{0}")]
    Usage(String),
}

impl CliError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

pub async fn run(command: Command, config: AppConfig) -> Result<(), CliError> {
    if let Command::Config(cmd) = command {
        return show_config(cmd, &config);
    }
    let app = App::start(&config).await?;
    let result = app.dispatch(command).await;
    app.flush_toasts();
    result
}

fn show_config(cmd: ConfigCommand, config: &AppConfig) -> Result<(), CliError> {
    match cmd {
        ConfigCommand::Show => {
            let text = toml::to_string_pretty(config)
                .map_err(|e| MyverseError::Config(e.to_string()))?;
            print!("{text}");
        }
        ConfigCommand::Path => {
            println!("config:  {}", AppConfig::config_path().display());
            println!("session: {}", AppConfig::db_path().display());
        }
        ConfigCommand::Init => {
            config.save()?;
            println!("Wrote {}", AppConfig::config_path().display());
        }
    }
    Ok(())
}

struct App {
    manager: SessionManager,
    toasts: SharedToasts,
}

impl App {
    async fn start(config: &AppConfig) -> Result<Self, CliError> {
        let db_path = AppConfig::ensure_db_path()?;
        let storage = Arc::new(SqliteStore::open(&db_path)?);
        let session = Arc::new(SessionStore::new(storage));
        let client = ApiClient::from_config(&config.api, session, Navigator::default())?;
        let manager = SessionManager::new(client);
        let snap = manager.initialize().await;
        tracing::debug!(
            authenticated = snap.is_authenticated(),
            base_url = %manager.client().base_url(),
            "session ready"
        );
        Ok(Self {
            manager,
            toasts: shared_toasts(),
        })
    }

    fn client(&self) -> &ApiClient {
        self.manager.client()
    }

    /// Fail unless the session may visit `route`.
    fn require(&self, route: Route) -> Result<(), CliError> {
        if self.manager.visit(route.clone()) == route {
            Ok(())
        } else {
            Err(CliError::SignedOut)
        }
    }

    fn flush_toasts(&self) {
        let toasts = self
            .toasts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain();
        for toast in toasts {
            println!("{}", format::toast_line(&toast));
        }
    }

    async fn dispatch(&self, command: Command) -> Result<(), CliError> {
        match command {
            Command::Login { email, password } => {
                let user = self.manager.login(&LoginData { email, password }).await?;
                println!("Signed in as {}", user.username);
            }
            Command::Register {
                username,
                email,
                password,
            } => {
                let user = self
                    .manager
                    .register(&RegisterData {
                        username,
                        email,
                        password,
                    })
                    .await?;
                println!(
                    "Welcome, {}! Set your preferences with `myverse preferences set`.",
                    user.username
                );
            }
            Command::Logout => {
                self.manager.logout();
                println!("Signed out");
            }
            Command::Whoami { refresh } => match self.manager.snapshot().user {
                Some(_) if refresh => {
                    let user = self.manager.refresh_user().await?;
                    println!("{}", format::user_block(&user));
                }
                Some(user) => println!("{}", format::user_block(&user)),
                None => println!("Not signed in"),
            },
            Command::Profile(ProfileCommand::Update {
                username,
                email,
                bio,
                avatar_url,
            }) => {
                self.require(Route::Profile)?;
                let update = UserUpdate {
                    username,
                    email,
                    bio,
                    avatar_url,
                };
                if update.is_empty() {
                    return Err(CliError::Usage("nothing to update".into()));
                }
                let user = self.manager.update_user(&update).await?;
                println!("{}", format::user_block(&user));
            }
            Command::Password {
                current,
                new_password,
            } => {
                self.require(Route::Profile)?;
                let msg = self
                    .manager
                    .change_password(&PasswordChange {
                        current_password: current,
                        new_password,
                    })
                    .await?;
                if msg.is_empty() {
                    println!("Password changed");
                } else {
                    println!("{msg}");
                }
            }
            Command::Preferences(cmd) => self.preferences(cmd).await?,
            Command::Search { query, kind, page } => {
                self.require(Route::Search)?;
                let search = Search::new(self.client().clone());
                match search.submit(&query, kind, page).await? {
                    SearchOutcome::Updated { .. } => {
                        let results = search.results();
                        println!("{} results for \"{}\"", results.total, results.query);
                        for item in &results.items {
                            println!("{}", format::content_line(item));
                        }
                    }
                    SearchOutcome::Skipped | SearchOutcome::Superseded => {
                        println!("Nothing to search for")
                    }
                }
            }
            Command::Trending { kind, window } => {
                for item in self.client().content().trending(kind, window).await? {
                    println!("{}", format::content_line(&item));
                }
            }
            Command::Recommendations => {
                self.require(Route::Dashboard)?;
                for item in self.client().content().recommendations().await? {
                    println!("{}", format::content_line(&item));
                }
            }
            Command::Favorites(cmd) => self.favorites(cmd).await?,
            Command::Forum(cmd) => self.forum(cmd).await?,
            Command::Friends(cmd) => self.friends(cmd).await?,
            Command::Users(cmd) => self.users(cmd).await?,
            Command::News(cmd) => self.news(cmd).await?,
            Command::Dashboard => self.dashboard().await?,
            Command::Config(_) => unreachable!("config commands are handled before startup"),
        }
        Ok(())
    }

    async fn preferences(&self, cmd: PreferencesCommand) -> Result<(), CliError> {
        self.require(Route::Onboarding)?;
        match cmd {
            PreferencesCommand::Show => match self.manager.preferences().await? {
                Some(p) => {
                    println!("categories: {}", p.categories.join(", "));
                    println!("genres:     {}", p.genres.join(", "));
                }
                None => println!("No preferences saved"),
            },
            PreferencesCommand::Set { categories, genres } => {
                self.manager
                    .save_preferences(&PreferencesInput { categories, genres })
                    .await?;
                println!("Preferences saved");
            }
        }
        Ok(())
    }

    async fn favorites(&self, cmd: FavoritesCommand) -> Result<(), CliError> {
        self.require(Route::Favorites)?;
        let favorites = self.client().favorites();
        match cmd {
            FavoritesCommand::List => {
                let list = favorites.list().await?;
                if list.is_empty() {
                    println!("No favorites yet");
                }
                for fav in &list {
                    println!("{}", format::favorite_line(fav));
                }
            }
            FavoritesCommand::Add(args) => {
                let mut set = FavoriteSet::from_favorites(&favorites.list().await?);
                let favorite = NewFavorite {
                    content_type: args.media_type,
                    content_id: args.id,
                    content_title: args.title,
                    content_poster: args.poster,
                    content_data: None,
                };
                favorites.favorite(&mut set, favorite, &self.toasts).await?;
            }
            FavoritesCommand::Remove { id } => {
                let mut set = FavoriteSet::from_favorites(&favorites.list().await?);
                favorites.unfavorite(&mut set, id, &self.toasts).await?;
            }
        }
        Ok(())
    }

    async fn forum(&self, cmd: ForumCommand) -> Result<(), CliError> {
        self.require(Route::Forum)?;
        let forum = self.client().forum();
        match cmd {
            ForumCommand::Categories => {
                for c in forum.categories().await? {
                    println!(
                        "{:>4}  {}  ({} posts)  {}",
                        c.id, c.name, c.post_count, c.description
                    );
                }
            }
            ForumCommand::Posts {
                category,
                page,
                sort,
            } => {
                let page = forum.posts(category, page, sort).await?;
                for post in &page.posts {
                    println!("{}", format::post_line(post));
                }
                if let Some(p) = page.pagination {
                    println!("page {}/{} ({} posts)", p.page, p.pages.max(1), p.total);
                }
            }
            ForumCommand::Show { id } => {
                let detail = forum.post(id).await?;
                println!("{}", format::post_line(&detail.post));
                println!("\n{}\n", detail.post.content);
                for comment in detail.comments.iter().filter(|c| c.parent_id.is_none()) {
                    print_comment(comment, 1);
                    for reply in detail
                        .comments
                        .iter()
                        .filter(|c| c.parent_id == Some(comment.id))
                    {
                        print_comment(reply, 2);
                    }
                }
            }
            ForumCommand::Create {
                title,
                content,
                category,
            } => {
                self.require(Route::ForumCreate)?;
                let post = forum
                    .create_post(&NewPost {
                        title,
                        content,
                        category_id: category,
                    })
                    .await?;
                println!("Created topic #{}", post.id);
            }
            ForumCommand::Comment {
                post_id,
                content,
                reply_to,
            } => {
                let comment = forum
                    .create_comment(
                        post_id,
                        &NewComment {
                            content,
                            parent_id: reply_to,
                        },
                    )
                    .await?;
                println!("Comment #{} added", comment.id);
            }
            ForumCommand::Delete { id } => {
                forum.delete_post(id).await?;
                println!("Deleted topic #{id}");
            }
            ForumCommand::Stats => {
                let stats = forum.stats().await?;
                println!(
                    "{} topics, {} comments, {} members",
                    stats.stats.total_posts, stats.stats.total_comments, stats.stats.total_users
                );
                for post in &stats.popular_posts {
                    println!("{}", format::post_line(post));
                }
            }
        }
        Ok(())
    }

    async fn friends(&self, cmd: FriendsCommand) -> Result<(), CliError> {
        self.require(Route::Friends)?;
        let friends = self.client().friends();
        let mut book = RelationshipBook::new();
        match cmd {
            FriendsCommand::List => {
                for f in friends.list().await? {
                    println!("{:>4}  {}", f.id, f.username);
                }
            }
            FriendsCommand::Requests => {
                for r in friends.requests().await? {
                    println!("{:>4}  from {} (user {})", r.id, r.sender_username, r.sender_id);
                }
            }
            FriendsCommand::Accept { request_id } => {
                friends.sync(&mut book).await?;
                friends.accept(&mut book, request_id).await?;
                println!("Friend request accepted");
            }
            FriendsCommand::Reject { request_id } => {
                friends.sync(&mut book).await?;
                friends.reject(&mut book, request_id).await?;
                println!("Friend request rejected");
            }
            FriendsCommand::Add { user_id } => {
                friends.sync(&mut book).await?;
                let status = friends.send_request(&mut book, user_id).await?;
                println!("{status}");
            }
            FriendsCommand::Remove { user_id } => {
                friends.sync(&mut book).await?;
                friends.remove(&mut book, user_id).await?;
                println!("Friend removed");
            }
            FriendsCommand::Search { term } => {
                self.require(Route::AddFriends)?;
                let found = friends.search(&term).await?;
                if !found.is_empty() {
                    friends.sync(&mut book).await?;
                }
                for u in &found {
                    let status = book.status_with_hint(u.id, u.friendship_status.as_deref());
                    println!("{:>4}  {}  ({status})", u.id, u.username);
                }
            }
            FriendsCommand::Suggestions => {
                for s in friends.suggestions().await? {
                    println!(
                        "{:>4}  {}  {} mutual, {}% match",
                        s.id,
                        s.username,
                        s.mutual_friends,
                        (s.compatibility_score * 100.0).round()
                    );
                }
            }
            FriendsCommand::Status { user_id } => {
                friends.sync(&mut book).await?;
                let profile = self.client().users().profile(user_id).await?;
                let status = book.status_with_hint(user_id, profile.friendship_status.as_deref());
                println!("{}: {status}", profile.username);
            }
        }
        Ok(())
    }

    async fn users(&self, cmd: UsersCommand) -> Result<(), CliError> {
        match cmd {
            UsersCommand::Profile { id } => {
                self.require(Route::UserProfile(id))?;
                let profile = self.client().users().profile(id).await?;
                println!("{}", format::profile_block(&profile));
            }
            UsersCommand::Stats => {
                self.require(Route::Profile)?;
                let stats = self.client().users().stats().await?;
                println!("{}", format::stats_block(&stats));
            }
        }
        Ok(())
    }

    async fn news(&self, cmd: NewsCommand) -> Result<(), CliError> {
        let news = self.client().news();
        match cmd {
            NewsCommand::List { category, page } => {
                self.require(Route::News)?;
                let result = news
                    .list(NewsQuery {
                        page,
                        category,
                        ..Default::default()
                    })
                    .await?;
                for article in &result.news {
                    println!("{}", format::news_line(article));
                }
                if let Some(p) = result.pagination {
                    println!("page {}/{}", p.page, p.pages.max(1));
                }
            }
            NewsCommand::Featured => {
                for article in news.featured().await? {
                    println!("{}", format::news_line(&article));
                    if let Some(summary) = &article.summary {
                        println!("      {summary}");
                    }
                }
            }
            NewsCommand::Create {
                title,
                content,
                summary,
                image_url,
                source_url,
                category,
                featured,
            } => {
                self.require(Route::CreateNews)?;
                let mut draft = NewNews {
                    title,
                    content,
                    summary,
                    image_url,
                    source_url,
                    category,
                    is_featured: featured,
                }
                .normalized();
                if draft.summary.is_none() {
                    draft.summary = draft.generated_summary();
                }
                let article = news.create(draft).await?;
                println!("Published news #{}", article.id);
            }
        }
        Ok(())
    }

    async fn dashboard(&self) -> Result<(), CliError> {
        self.require(Route::Dashboard)?;
        let scope = ViewScope::new("dashboard");
        let client = self.client().clone();
        let dash = scope
            .spawn(async move { Dashboard::load(&client).await })
            .await?;
        if let Some(name) = self.manager.snapshot().username() {
            println!("Welcome back, {name}\n");
        }

        println!("== Your activity");
        match &dash.stats {
            Ok(stats) => println!("{}", format::stats_block(stats)),
            Err(e) => println!("unavailable: {}", e.user_message()),
        }
        print_items("Recommended for you", &dash.recommendations);
        print_items("Trending this week", &dash.trending);

        println!("\n== Featured news");
        match &dash.featured_news {
            Ok(news) => {
                for n in news {
                    println!("{}", format::news_line(n));
                }
            }
            Err(e) => println!("unavailable: {}", e.user_message()),
        }

        println!("\n== Forum");
        match &dash.forum {
            Ok(forum) => {
                println!("{}", format::forum_totals(&forum.stats));
                for post in forum.recent_posts.iter().take(3) {
                    println!("{}", format::post_line(post));
                }
            }
            Err(e) => println!("unavailable: {}", e.user_message()),
        }
        Ok(())
    }
}

fn print_items(heading: &str, items: &Result<Vec<ContentItem>, ApiError>) {
    println!("\n== {heading}");
    match items {
        Ok(items) => {
            for item in items.iter().take(5) {
                println!("{}", format::content_line(item));
            }
        }
        Err(e) => println!("unavailable: {}", e.user_message()),
    }
}

fn print_comment(comment: &ForumComment, depth: usize) {
    let author = comment
        .author
        .as_ref()
        .map(|a| a.username.as_str())
        .unwrap_or("unknown");
    println!("{}{author}: {}", "  ".repeat(depth), comment.content);
}
