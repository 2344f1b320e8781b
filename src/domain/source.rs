use serde::{Deserialize, Serialize};

/// A publisher as listed by the `/sources` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsSource {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
}

impl NewsSource {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_source() {
        let json = r#"{
            "id": "ars-technica",
            "name": "Ars Technica",
            "description": "Tech news",
            "url": "https://arstechnica.com",
            "category": "technology",
            "language": "en",
            "country": "us"
        }"#;
        let source: NewsSource = serde_json::from_str(json).unwrap();
        assert_eq!(source.id, "ars-technica");
        assert_eq!(source.display_name(), "Ars Technica");
        assert_eq!(source.category.as_deref(), Some("technology"));
    }
}
