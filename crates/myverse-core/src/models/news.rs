use serde::{Deserialize, Serialize};

use super::forum::Pagination;
use super::user::UserSummary;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsCategory {
    #[default]
    Geral,
    Movies,
    Tv,
    Games,
}

impl NewsCategory {
    pub const ALL: &[NewsCategory] = &[Self::Geral, Self::Movies, Self::Tv, Self::Games];

    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Geral => "geral",
            Self::Movies => "movies",
            Self::Tv => "tv",
            Self::Games => "games",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Geral => "General",
            Self::Movies => "Movies",
            Self::Tv => "Series",
            Self::Games => "Games",
        }
    }
}

impl std::str::FromStr for NewsCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_param() == s)
            .ok_or_else(|| format!("unknown news category: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    #[serde(default)]
    pub category: NewsCategory,
    #[serde(default)]
    pub is_featured: bool,
    pub author: Option<UserSummary>,
    pub created_at: Option<String>,
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsPage {
    #[serde(default)]
    pub news: Vec<NewsArticle>,
    pub pagination: Option<Pagination>,
}

/// Request body for `POST /news`. Blank optional fields are omitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewNews {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub category: NewsCategory,
    pub is_featured: bool,
}

impl NewNews {
    /// Trim every text field and drop optional ones left empty.
    pub fn normalized(mut self) -> Self {
        fn clean(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        self.title = self.title.trim().to_string();
        self.content = self.content.trim().to_string();
        self.summary = clean(self.summary);
        self.image_url = clean(self.image_url);
        self.source_url = clean(self.source_url);
        self
    }

    /// First two sentences of the content, used when no summary is given.
    pub fn generated_summary(&self) -> Option<String> {
        let sentences: Vec<&str> = self
            .content
            .split('.')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .take(2)
            .collect();
        if sentences.is_empty() {
            None
        } else {
            Some(format!("{}.", sentences.join(". ")))
        }
    }
}
