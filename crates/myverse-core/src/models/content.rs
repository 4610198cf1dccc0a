use serde::{Deserialize, Deserializer, Serialize};

/// Kind of media a content item or favorite refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    #[serde(alias = "tv")]
    Series,
    Game,
    #[serde(other)]
    Other,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
            Self::Game => "game",
            Self::Other => "other",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "movie" | "movies" | "film" => Some(Self::Movie),
            "series" | "tv" | "show" => Some(Self::Series),
            "game" | "games" => Some(Self::Game),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter for search and trending queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchKind {
    #[default]
    All,
    Movie,
    Series,
    Game,
}

impl SearchKind {
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Movie => "movie",
            Self::Series => "series",
            Self::Game => "game",
        }
    }
}

impl std::str::FromStr for SearchKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        match MediaType::from_str_loose(s) {
            Some(MediaType::Movie) => Ok(Self::Movie),
            Some(MediaType::Series) => Ok(Self::Series),
            Some(MediaType::Game) => Ok(Self::Game),
            _ => Err(format!("unknown content type: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeWindow {
    Day,
    #[default]
    Week,
}

impl TimeWindow {
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
        }
    }
}

impl std::str::FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            other => Err(format!("unknown time window: {other}")),
        }
    }
}

/// A movie, series or game as returned by the content endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
}

impl ContentItem {
    /// Release year, if the date starts with one.
    pub fn year(&self) -> Option<u32> {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<ContentItem>,
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub query: String,
}

/// A favorite as stored server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,
    pub content_type: MediaType,
    #[serde(deserialize_with = "string_or_number")]
    pub content_id: String,
    pub content_title: String,
    pub content_poster: Option<String>,
    pub created_at: Option<String>,
}

impl Favorite {
    pub fn key(&self) -> String {
        favorite_key(self.content_type, &self.content_id)
    }
}

/// Request body for `POST /content/favorites`.
#[derive(Debug, Clone, Serialize)]
pub struct NewFavorite {
    pub content_type: MediaType,
    pub content_id: String,
    pub content_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_poster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_data: Option<serde_json::Value>,
}

impl NewFavorite {
    pub fn from_item(item: &ContentItem) -> Self {
        Self {
            content_type: item.media_type,
            content_id: item.id.clone(),
            content_title: item.title.clone(),
            content_poster: item.poster_path.clone(),
            content_data: serde_json::to_value(item).ok(),
        }
    }

    pub fn key(&self) -> String {
        favorite_key(self.content_type, &self.content_id)
    }
}

/// Client-side key identifying a favorited item across media types.
pub fn favorite_key(media_type: MediaType, content_id: &str) -> String {
    format!("{}:{}", media_type.as_str(), content_id)
}

/// Ids arrive as strings for external catalogs and as integers for local ones.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
    })
}
