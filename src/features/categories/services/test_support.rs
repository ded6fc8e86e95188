use chrono::Utc;
use fake::faker::lorem::en::{Sentence, Word};
use fake::Fake;

use crate::features::categories::dtos::CreateCategoryDto;
use crate::features::categories::models::Category;
use crate::features::categories::stores::InMemoryCategoryStore;

/// Stored category with generated descriptive fields
pub fn category(id: i64, parent_id: Option<i64>) -> Category {
    let now = Utc::now();
    Category {
        id,
        parent_id,
        name: Word().fake(),
        description: Some(Sentence(3..8).fake()),
        slug: format!("category-{}", id),
        image_url: None,
        meta_title: None,
        meta_description: None,
        display_order: 0,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

/// `1` root, `2` under `1`, `3` under `2`, `4` under `1`
pub fn sample_store() -> InMemoryCategoryStore {
    InMemoryCategoryStore::with_rows(vec![
        category(1, None),
        category(2, Some(1)),
        category(3, Some(2)),
        category(4, Some(1)),
    ])
}

pub fn create_dto(slug: &str, parent_id: Option<i64>) -> CreateCategoryDto {
    CreateCategoryDto {
        parent_id,
        name: Word().fake(),
        description: Some(Sentence(3..8).fake()),
        slug: slug.to_string(),
        image_url: None,
        meta_title: None,
        meta_description: None,
        display_order: 0,
        is_active: true,
    }
}
