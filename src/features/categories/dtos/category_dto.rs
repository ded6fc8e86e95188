use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::features::categories::models::{Category, NewCategory};
use crate::shared::constants::DEFAULT_DISPLAY_ORDER;

fn default_display_order() -> i32 {
    DEFAULT_DISPLAY_ORDER
}

fn default_is_active() -> bool {
    true
}

/// Request DTO for creating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryDto {
    #[serde(default)]
    pub parent_id: Option<i64>,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[validate(
        length(min = 1, max = 255, message = "Slug must be 1-255 characters"),
        regex(
            path = "*crate::shared::validation::SLUG_REGEX",
            message = "Slug must be lowercase alphanumeric words separated by single hyphens"
        )
    )]
    pub slug: String,

    #[validate(url(message = "Image URL must be a valid URL"))]
    #[serde(default)]
    pub image_url: Option<String>,

    #[validate(length(max = 255, message = "Meta title must not exceed 255 characters"))]
    #[serde(default)]
    pub meta_title: Option<String>,

    #[validate(length(max = 500, message = "Meta description must not exceed 500 characters"))]
    #[serde(default)]
    pub meta_description: Option<String>,

    #[serde(default = "default_display_order")]
    pub display_order: i32,

    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

impl From<CreateCategoryDto> for NewCategory {
    fn from(dto: CreateCategoryDto) -> Self {
        Self {
            parent_id: dto.parent_id,
            name: dto.name,
            description: dto.description,
            slug: dto.slug,
            image_url: dto.image_url,
            meta_title: dto.meta_title,
            meta_description: dto.meta_description,
            display_order: dto.display_order,
            is_active: dto.is_active,
        }
    }
}

/// Request DTO for updating descriptive fields.
///
/// Hierarchy placement and activation have dedicated operations and are
/// deliberately absent here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[validate(
        length(min = 1, max = 255, message = "Slug must be 1-255 characters"),
        regex(
            path = "*crate::shared::validation::SLUG_REGEX",
            message = "Slug must be lowercase alphanumeric words separated by single hyphens"
        )
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[validate(url(message = "Image URL must be a valid URL"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[validate(length(max = 255, message = "Meta title must not exceed 255 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,

    #[validate(length(max = 500, message = "Meta description must not exceed 500 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
}

impl UpdateCategoryDto {
    pub fn apply_to(self, category: &mut Category) {
        if let Some(name) = self.name {
            category.name = name;
        }
        if let Some(description) = self.description {
            category.description = Some(description);
        }
        if let Some(slug) = self.slug {
            category.slug = slug;
        }
        if let Some(image_url) = self.image_url {
            category.image_url = Some(image_url);
        }
        if let Some(meta_title) = self.meta_title {
            category.meta_title = Some(meta_title);
        }
        if let Some(meta_description) = self.meta_description {
            category.meta_description = Some(meta_description);
        }
        if let Some(display_order) = self.display_order {
            category.display_order = display_order;
        }
    }
}

/// One node of an assembled category tree.
///
/// `children` only exists for the read that produced it; editing it has no
/// effect on stored data.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> i64 {
        self.category.id
    }

    /// Number of nodes in this subtree, including self
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Number of levels in this subtree; a leaf has depth 1
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, level)) = stack.pop() {
            max_depth = max_depth.max(level);
            stack.extend(node.children.iter().map(|c| (c, level + 1)));
        }
        max_depth
    }

    pub fn find(&self, id: i64) -> Option<&CategoryNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.id() == id {
                return Some(node);
            }
            stack.extend(node.children.iter());
        }
        None
    }
}

/// Result of a full hierarchy consistency audit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub total: usize,
    pub roots: usize,
    pub max_depth: usize,
}
