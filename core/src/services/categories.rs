//! Categories. The backend calls the display name `title`; clients see
//! `name`.

use super::{decode_list, decode_one, encode};
use crate::client::{ApiClient, Payload, RequestOptions, ResourceApi};
use crate::error::{ApiError, ResultExt};
use crate::mapping::EntityKind;
use crate::transport::Transport;
use crate::types::{Category, CategoryDraft, Id, Quiz};
use crate::validation::ensure_valid;

const CATEGORIES: &str = "categories";

pub struct CategoryService<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> CategoryService<'a, T> {
    pub fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    fn categories(&self) -> ResourceApi<'a, T> {
        self.client.resource(CATEGORIES)
    }

    pub fn list(&self) -> Result<Vec<Category>, ApiError> {
        self.categories()
            .get_all()
            .and_then(|data| decode_list(data, EntityKind::Category, &[]))
            .context(|| "Failed to fetch categories")
    }

    pub fn get(&self, id: Id) -> Result<Category, ApiError> {
        self.categories()
            .get_by_id(id)
            .and_then(|data| decode_one(data, EntityKind::Category, &[]))
            .context(|| format!("Failed to fetch category with ID {id}"))
    }

    pub fn create(&self, draft: &CategoryDraft) -> Result<Category, ApiError> {
        ensure_valid(draft)?;
        let payload = Payload::Json(encode(draft, EntityKind::Category)?);
        self.categories()
            .create(payload)
            .and_then(|data| decode_one(data, EntityKind::Category, &[]))
            .context(|| "Failed to create category")
    }

    pub fn update(&self, id: Id, draft: &CategoryDraft) -> Result<Category, ApiError> {
        ensure_valid(draft)?;
        let payload = Payload::Json(encode(draft, EntityKind::Category)?);
        self.categories()
            .update(id, payload)
            .and_then(|data| decode_one(data, EntityKind::Category, &[]))
            .context(|| format!("Failed to update category with ID {id}"))
    }

    pub fn delete(&self, id: Id) -> Result<(), ApiError> {
        self.categories()
            .delete(id)
            .context(|| format!("Failed to delete category with ID {id}"))
    }

    /// Published quizzes filed under the category.
    pub fn quizzes(&self, id: Id) -> Result<Vec<Quiz>, ApiError> {
        self.client
            .get(&format!("{CATEGORIES}/{id}/quizzes"), &RequestOptions::new())
            .and_then(|data| {
                decode_list(data, EntityKind::Quiz, &[("category", EntityKind::Category)])
            })
            .context(|| format!("Failed to fetch quizzes for category with ID {id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::http::HttpMethod;
    use crate::services::test_support::{json_body, offline, scripted, Exchange};

    #[test]
    fn title_comes_back_as_name() {
        let client = scripted(vec![Exchange::new(
            HttpMethod::Get,
            "categories",
            200,
            r#"[{"id":1,"title":"Ownership","description":"Moves and borrows"}]"#,
        )]);
        let categories = CategoryService::new(&client).list().unwrap();
        assert_eq!(categories[0].name, "Ownership");
        assert_eq!(categories[0].description.as_deref(), Some("Moves and borrows"));
    }

    #[test]
    fn create_sends_title() {
        let client = scripted(vec![Exchange::new(
            HttpMethod::Post,
            "categories",
            201,
            r#"{"id":2,"title":"Concurrency"}"#,
        )
        .check(|req| assert_eq!(json_body(req)["title"], "Concurrency"))]);
        let draft = CategoryDraft {
            name: "Concurrency".to_string(),
            description: None,
        };
        let category = CategoryService::new(&client).create(&draft).unwrap();
        assert_eq!(category.id, 2);
        assert_eq!(category.name, "Concurrency");
    }

    #[test]
    fn short_name_is_rejected_offline() {
        let draft = CategoryDraft {
            name: "IO".to_string(),
            description: None,
        };
        let err = CategoryService::new(&offline()).create(&draft).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn category_quizzes_map_nested_titles() {
        let client = scripted(vec![Exchange::new(
            HttpMethod::Get,
            "categories/4/quizzes",
            200,
            r#"[{"id":7,"title":"Async","published":true,"category":{"id":4,"title":"Runtime"}}]"#,
        )]);
        let quizzes = CategoryService::new(&client).quizzes(4).unwrap();
        assert_eq!(quizzes[0].category.as_ref().unwrap().name, "Runtime");
    }

    #[test]
    fn delete_reports_forbidden() {
        let client = scripted(vec![Exchange::new(HttpMethod::Delete, "categories/4", 403, "")]);
        let err = CategoryService::new(&client).delete(4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(
            err.user_message(),
            "You do not have permission to perform this action"
        );
    }
}
