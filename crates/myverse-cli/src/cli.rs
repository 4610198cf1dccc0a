use clap::{Args, Parser, Subcommand};
use myverse_core::models::{MediaType, NewsCategory, PostSort, SearchKind, TimeWindow};

#[derive(Parser)]
#[command(author, version, about = "MyVerse media discovery from the terminal")]
pub struct Cli {
    /// Override the API base URL for this invocation.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami {
        /// Re-fetch the account from the server
        #[arg(long)]
        refresh: bool,
    },
    /// Edit your profile
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Change your password
    Password {
        #[arg(long)]
        current: String,
        #[arg(long = "new")]
        new_password: String,
    },
    /// Show or set content preferences
    #[command(subcommand)]
    Preferences(PreferencesCommand),
    /// Search movies, series and games
    Search {
        query: String,
        #[arg(long = "type", default_value = "all", value_parser = parse_kind)]
        kind: SearchKind,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// What is popular right now
    Trending {
        #[arg(long = "type", default_value = "all", value_parser = parse_kind)]
        kind: SearchKind,
        #[arg(long, default_value = "week", value_parser = parse_window)]
        window: TimeWindow,
    },
    /// Suggestions based on your favorites
    Recommendations,
    #[command(subcommand)]
    Favorites(FavoritesCommand),
    #[command(subcommand)]
    Forum(ForumCommand),
    #[command(subcommand)]
    Friends(FriendsCommand),
    #[command(subcommand)]
    Users(UsersCommand),
    #[command(subcommand)]
    News(NewsCommand),
    /// Stats, recommendations, trending and featured news at once
    Dashboard,
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
pub enum ProfileCommand {
    Update {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        avatar_url: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PreferencesCommand {
    Show,
    Set {
        /// Comma-separated content categories (movies, series, games)
        #[arg(long, value_delimiter = ',')]
        categories: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        genres: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum FavoritesCommand {
    List,
    Add(FavoriteArgs),
    /// Remove by favorite id (see `favorites list`)
    Remove { id: i64 },
}

#[derive(Args)]
pub struct FavoriteArgs {
    #[arg(long = "type", value_parser = parse_media)]
    pub media_type: MediaType,
    #[arg(long)]
    pub id: String,
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub poster: Option<String>,
}

#[derive(Subcommand)]
pub enum ForumCommand {
    Categories,
    Posts {
        #[arg(long)]
        category: Option<i64>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value = "newest", value_parser = parse_sort)]
        sort: PostSort,
    },
    Show { id: i64 },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        category: i64,
    },
    Comment {
        post_id: i64,
        content: String,
        #[arg(long)]
        reply_to: Option<i64>,
    },
    Delete { id: i64 },
    Stats,
}

#[derive(Subcommand)]
pub enum FriendsCommand {
    List,
    /// Incoming friend requests
    Requests,
    Accept { request_id: i64 },
    Reject { request_id: i64 },
    /// Send a friend request
    Add { user_id: i64 },
    Remove { user_id: i64 },
    Search { term: String },
    Suggestions,
    /// Relationship with a user
    Status { user_id: i64 },
}

#[derive(Subcommand)]
pub enum UsersCommand {
    Profile { id: i64 },
    /// Your own activity counters
    Stats,
}

#[derive(Subcommand)]
pub enum NewsCommand {
    List {
        #[arg(long, value_parser = parse_category)]
        category: Option<NewsCategory>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Featured,
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        summary: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        source_url: Option<String>,
        #[arg(long, default_value = "geral", value_parser = parse_category)]
        category: NewsCategory,
        #[arg(long)]
        featured: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Print config and session database locations
    Path,
    /// Write the effective configuration to the user config file
    Init,
}

fn parse_kind(s: &str) -> Result<SearchKind, String> {
    s.parse()
}

fn parse_window(s: &str) -> Result<TimeWindow, String> {
    s.parse()
}

fn parse_sort(s: &str) -> Result<PostSort, String> {
    s.parse()
}

fn parse_category(s: &str) -> Result<NewsCategory, String> {
    s.parse()
}

fn parse_media(s: &str) -> Result<MediaType, String> {
    MediaType::from_str_loose(s).ok_or_else(|| format!("unknown content type: {s}"))
}
