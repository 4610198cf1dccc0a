//! Client-side route table, access guards and the navigator.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    About,
    Login,
    Register,
    Dashboard,
    Onboarding,
    Profile,
    Search,
    Favorites,
    Forum,
    ForumTopic(i64),
    ForumCreate,
    Friends,
    AddFriends,
    UserProfile(i64),
    News,
    CreateNews,
    NotFound,
}

/// Who may visit a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Open,
    /// Only while signed out; signed-in visitors go to the dashboard.
    PublicOnly,
    Protected,
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Self::Landing,
            ["about"] => Self::About,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["dashboard"] => Self::Dashboard,
            ["onboarding"] => Self::Onboarding,
            ["profile"] => Self::Profile,
            ["search"] => Self::Search,
            ["favorites"] => Self::Favorites,
            ["forum"] => Self::Forum,
            ["forum", "create"] => Self::ForumCreate,
            ["forum", "topic", id] => id.parse().map(Self::ForumTopic).unwrap_or(Self::NotFound),
            ["friends"] => Self::Friends,
            ["friends", "add"] => Self::AddFriends,
            ["users", id] => id.parse().map(Self::UserProfile).unwrap_or(Self::NotFound),
            ["news"] => Self::News,
            ["news", "create"] => Self::CreateNews,
            _ => Self::NotFound,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Landing => "/".into(),
            Self::About => "/about".into(),
            Self::Login => "/login".into(),
            Self::Register => "/register".into(),
            Self::Dashboard => "/dashboard".into(),
            Self::Onboarding => "/onboarding".into(),
            Self::Profile => "/profile".into(),
            Self::Search => "/search".into(),
            Self::Favorites => "/favorites".into(),
            Self::Forum => "/forum".into(),
            Self::ForumTopic(id) => format!("/forum/topic/{id}"),
            Self::ForumCreate => "/forum/create".into(),
            Self::Friends => "/friends".into(),
            Self::AddFriends => "/friends/add".into(),
            Self::UserProfile(id) => format!("/users/{id}"),
            Self::News => "/news".into(),
            Self::CreateNews => "/news/create".into(),
            Self::NotFound => "/404".into(),
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Self::Landing | Self::About | Self::Search | Self::Forum | Self::ForumTopic(_)
            | Self::News | Self::NotFound => Access::Open,
            Self::Login | Self::Register => Access::PublicOnly,
            Self::Dashboard
            | Self::Onboarding
            | Self::Profile
            | Self::Favorites
            | Self::ForumCreate
            | Self::Friends
            | Self::AddFriends
            | Self::UserProfile(_)
            | Self::CreateNews => Access::Protected,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Outcome of checking a route against the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    Allow,
    /// Session still initializing; render a loading screen.
    Wait,
    Redirect(Route),
}

/// Decide whether `route` may be shown for the given session flags.
pub fn guard(route: &Route, authenticated: bool, loading: bool) -> Guard {
    match route.access() {
        Access::Open => Guard::Allow,
        _ if loading => Guard::Wait,
        Access::PublicOnly if authenticated => Guard::Redirect(Route::Dashboard),
        Access::Protected if !authenticated => Guard::Redirect(Route::Login),
        _ => Guard::Allow,
    }
}

/// Current location, observable by any number of views.
#[derive(Clone)]
pub struct Navigator {
    tx: Arc<watch::Sender<Route>>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Landing)
    }
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn navigate(&self, route: Route) {
        tracing::debug!(to = %route, "navigate");
        self.tx.send_replace(route);
    }

    pub fn current(&self) -> Route {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.tx.subscribe()
    }
}
