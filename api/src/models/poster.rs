use super::Category;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poster {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub target_audience: Vec<String>,
    pub image_key: String,
    #[serde(default)]
    pub image_url: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Fields supplied when a poster is first created.
#[derive(Debug, Clone)]
pub struct NewPoster {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub target_audience: Vec<String>,
    pub image_key: String,
    pub image_url: String,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct PosterChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub target_audience: Option<Vec<String>>,
    pub image_key: Option<String>,
    pub image_url: Option<String>,
}

impl Poster {
    /// `poster_{millis}_{7 random chars}`
    pub fn generate_id(now_millis: i64) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("poster_{}_{}", now_millis, &suffix[..7])
    }

    pub fn from_new(id: String, input: NewPoster, now_millis: i64) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            category: input.category,
            target_audience: input.target_audience,
            image_key: input.image_key,
            image_url: input.image_url,
            created_at: now_millis,
            updated_at: now_millis,
        }
    }

    pub fn apply(&mut self, changes: PosterChanges, now_millis: i64) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(target_audience) = changes.target_audience {
            self.target_audience = target_audience;
        }
        if let Some(image_key) = changes.image_key {
            self.image_key = image_key;
        }
        if let Some(image_url) = changes.image_url {
            self.image_url = image_url;
        }
        self.updated_at = now_millis;
    }

    /// Most recently updated first; ids break ties so the order is total.
    pub fn newest_first(a: &Poster, b: &Poster) -> Ordering {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.id.cmp(&b.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Poster {
        Poster::from_new(
            "poster_1_abcdefg".into(),
            NewPoster {
                title: "Bridges".into(),
                description: String::new(),
                category: Category::Engineering,
                target_audience: vec!["civil".into()],
                image_key: "posters/1-bridges.png".into(),
                image_url: String::new(),
            },
            1_000,
        )
    }

    #[test]
    fn generated_ids_have_expected_shape() {
        let id = Poster::generate_id(1_700_000_000_000);
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "poster");
        assert_eq!(parts[1], "1700000000000");
        assert_eq!(parts[2].len(), 7);
        assert_ne!(id, Poster::generate_id(1_700_000_000_000));
    }

    #[test]
    fn apply_only_touches_given_fields() {
        let mut poster = sample();
        poster.apply(
            PosterChanges {
                description: Some("Steel and stone".into()),
                ..Default::default()
            },
            2_000,
        );

        assert_eq!(poster.title, "Bridges");
        assert_eq!(poster.description, "Steel and stone");
        assert_eq!(poster.created_at, 1_000);
        assert_eq!(poster.updated_at, 2_000);
    }

    #[test]
    fn wire_format_is_camel_case_with_defaults() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["imageKey"], "posters/1-bridges.png");
        assert_eq!(json["targetAudience"][0], "civil");
        assert_eq!(json["category"], "工科");

        let minimal: Poster = serde_json::from_str(
            r#"{"id":"poster_2_x","title":"t","category":"理科","imageKey":"k","createdAt":1,"updatedAt":1}"#,
        )
        .unwrap();
        assert!(minimal.description.is_empty());
        assert!(minimal.target_audience.is_empty());
    }
}
