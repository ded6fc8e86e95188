mod category_dto;

pub use category_dto::{AuditReport, CategoryNode, CreateCategoryDto, UpdateCategoryDto};
