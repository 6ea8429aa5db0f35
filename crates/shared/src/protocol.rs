use serde::{Deserialize, Serialize};

use crate::domain::{CategoryId, SortDirection};

/// Query string for `GET /contacts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactFilter {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "orderBy", default)]
    pub order_by: SortDirection,
}

impl ContactFilter {
    pub fn new(name: impl Into<String>, order_by: SortDirection) -> Self {
        Self {
            name: name.into(),
            order_by,
        }
    }
}

/// Query string for `GET /categories`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFilter {
    #[serde(rename = "orderBy", default)]
    pub order_by: SortDirection,
}

/// Body of `POST /contacts` and `PUT /contacts/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
}

impl ContactFields {
    /// Maps a blank category selection to "no category" so the field is left
    /// out of the outbound payload.
    pub fn normalized(&self) -> Self {
        let category_id = self
            .category_id
            .as_ref()
            .filter(|id| !id.as_str().trim().is_empty())
            .cloned();
        Self {
            category_id,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_is_left_out_of_contact_filter() {
        let filter = ContactFilter::new("", SortDirection::Descending);
        let encoded = serde_json::to_value(&filter).expect("encode filter");
        assert_eq!(encoded, serde_json::json!({ "orderBy": "DESC" }));
    }

    #[test]
    fn blank_category_is_omitted_from_payload() {
        let fields = ContactFields {
            name: "Ana".into(),
            email: String::new(),
            phone: "555-0101".into(),
            category_id: Some(CategoryId::from("  ")),
        };
        let encoded = serde_json::to_value(fields.normalized()).expect("encode fields");
        assert_eq!(
            encoded,
            serde_json::json!({ "name": "Ana", "email": "", "phone": "555-0101" })
        );
    }

    #[test]
    fn selected_category_is_kept() {
        let fields = ContactFields {
            name: "Beto".into(),
            email: "beto@example.com".into(),
            phone: "555-0102".into(),
            category_id: Some(CategoryId::from("c-1")),
        };
        assert_eq!(
            fields.normalized().category_id,
            Some(CategoryId::from("c-1"))
        );
    }
}
