use serde::Serialize;

/// A (title, url) pair pulled from a listing page, not yet deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub url: String,
}

impl Candidate {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// One ingested article. `url` is the identity; records are never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub source: String,
    pub title: String,
    pub url: String,
    pub published: String,
    pub summary: String,
}

impl Article {
    pub fn from_candidate(
        source: impl Into<String>,
        candidate: Candidate,
        published: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            title: candidate.title,
            url: candidate.url,
            published: published.into(),
            summary: summary.into(),
        }
    }
}

/// An article as read back from the store, with its row id
#[derive(Debug, Clone, Serialize)]
pub struct StoredArticle {
    pub id: i64,
    #[serde(flatten)]
    pub article: Article,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_article_serializes_flat() {
        let stored = StoredArticle {
            id: 7,
            article: Article::from_candidate(
                "google",
                Candidate::new("A", "https://x/1"),
                "2026-02-01",
                "Summary of A.",
            ),
        };

        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 7,
                "source": "google",
                "title": "A",
                "url": "https://x/1",
                "published": "2026-02-01",
                "summary": "Summary of A.",
            })
        );
    }
}
