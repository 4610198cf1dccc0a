//! Form checks run before any request leaves the client.

use thiserror::Error;

use crate::models::{LoginData, NewComment, NewNews, NewPost, PasswordChange, RegisterData};

pub const TOPIC_TITLE_MIN: usize = 5;
pub const TOPIC_TITLE_MAX: usize = 200;
pub const TOPIC_CONTENT_MIN: usize = 10;
pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 6;
pub const NEWS_TITLE_MAX: usize = 255;
pub const NEWS_SUMMARY_MAX: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// One or more field-level errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", summary(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == name)
            .map(|e| e.message.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Default)]
struct Checker(Vec<FieldError>);

impl Checker {
    fn fail(&mut self, field: &'static str, message: impl Into<String>) {
        // First error per field wins.
        if !self.0.iter().any(|e| e.field == field) {
            self.0.push(FieldError {
                field,
                message: message.into(),
            });
        }
    }

    fn required(&mut self, field: &'static str, value: &str, label: &str) {
        if value.trim().is_empty() {
            self.fail(field, format!("{label} is required"));
        }
    }

    fn min_len(&mut self, field: &'static str, value: &str, min: usize, label: &str) {
        if value.trim().chars().count() < min {
            self.fail(field, format!("{label} must be at least {min} characters"));
        }
    }

    fn max_len(&mut self, field: &'static str, value: &str, max: usize, label: &str) {
        if value.trim().chars().count() > max {
            self.fail(field, format!("{label} must be at most {max} characters"));
        }
    }

    fn email(&mut self, field: &'static str, value: &str) {
        self.required(field, value, "Email");
        if !value.trim().is_empty() && !is_email(value.trim()) {
            self.fail(field, "Invalid email");
        }
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.0))
        }
    }
}

pub fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !s.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, _)| !host.is_empty())
        && !domain.ends_with('.')
}

pub fn login(data: &LoginData) -> Result<(), ValidationErrors> {
    let mut c = Checker::default();
    c.email("email", &data.email);
    c.required("password", &data.password, "Password");
    c.finish()
}

pub fn register(data: &RegisterData) -> Result<(), ValidationErrors> {
    let mut c = Checker::default();
    c.required("username", &data.username, "Username");
    c.min_len("username", &data.username, USERNAME_MIN, "Username");
    c.max_len("username", &data.username, USERNAME_MAX, "Username");
    c.email("email", &data.email);
    c.required("password", &data.password, "Password");
    if data.password.chars().count() < PASSWORD_MIN {
        c.fail(
            "password",
            format!("Password must be at least {PASSWORD_MIN} characters"),
        );
    }
    c.finish()
}

pub fn password_change(data: &PasswordChange) -> Result<(), ValidationErrors> {
    let mut c = Checker::default();
    c.required("current_password", &data.current_password, "Current password");
    if data.new_password.chars().count() < PASSWORD_MIN {
        c.fail(
            "new_password",
            format!("Password must be at least {PASSWORD_MIN} characters"),
        );
    }
    if data.new_password == data.current_password {
        c.fail("new_password", "New password must differ from the current one");
    }
    c.finish()
}

pub fn topic(post: &NewPost) -> Result<(), ValidationErrors> {
    let mut c = Checker::default();
    c.min_len("title", &post.title, TOPIC_TITLE_MIN, "Title");
    c.max_len("title", &post.title, TOPIC_TITLE_MAX, "Title");
    c.min_len("content", &post.content, TOPIC_CONTENT_MIN, "Content");
    if post.category_id <= 0 {
        c.fail("category_id", "Choose a category");
    }
    c.finish()
}

pub fn comment(comment: &NewComment) -> Result<(), ValidationErrors> {
    let mut c = Checker::default();
    c.required("content", &comment.content, "Comment");
    c.finish()
}

pub fn news(news: &NewNews) -> Result<(), ValidationErrors> {
    let mut c = Checker::default();
    c.required("title", &news.title, "Title");
    c.max_len("title", &news.title, NEWS_TITLE_MAX, "Title");
    c.required("content", &news.content, "Content");
    if let Some(summary) = &news.summary {
        c.max_len("summary", summary, NEWS_SUMMARY_MAX, "Summary");
    }
    c.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_topic_title_rejected() {
        let post = NewPost {
            title: "abc".into(),
            content: "Long enough body text".into(),
            category_id: 1,
        };
        let err = topic(&post).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(
            err.field("title"),
            Some("Title must be at least 5 characters")
        );
    }

    #[test]
    fn test_valid_topic_passes() {
        let post = NewPost {
            title: "Favourite trilogies".into(),
            content: "Which trilogy holds up best?".into(),
            category_id: 2,
        };
        assert!(topic(&post).is_ok());
    }

    #[test]
    fn test_login_requires_fields() {
        let err = login(&LoginData {
            email: "".into(),
            password: "".into(),
        })
        .unwrap_err();
        assert_eq!(err.field("email"), Some("Email is required"));
        assert_eq!(err.field("password"), Some("Password is required"));

        let err = login(&LoginData {
            email: "not-an-email".into(),
            password: "x".into(),
        })
        .unwrap_err();
        assert_eq!(err.field("email"), Some("Invalid email"));

        assert!(login(&LoginData {
            email: "demo@myverse.com".into(),
            password: "Demo123!".into(),
        })
        .is_ok());
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_email("a@b.co"));
        assert!(!is_email("a@b"));
        assert!(!is_email("@b.co"));
        assert!(!is_email("a@.co"));
        assert!(!is_email("a b@c.co"));
        assert!(!is_email("a@b.co."));
    }

    #[test]
    fn test_register_rules() {
        let err = register(&RegisterData {
            username: "ab".into(),
            email: "demo@myverse.com".into(),
            password: "123".into(),
        })
        .unwrap_err();
        assert!(err.field("username").is_some());
        assert!(err.field("password").is_some());
        assert!(err.field("email").is_none());
    }

    #[test]
    fn test_news_limits() {
        let news_item = NewNews {
            title: "t".repeat(256),
            content: "body".into(),
            summary: Some("s".repeat(501)),
            ..Default::default()
        };
        let err = news(&news_item).unwrap_err();
        assert!(err.field("title").is_some());
        assert!(err.field("summary").is_some());
        assert!(err.to_string().contains("title:"));
    }
}
