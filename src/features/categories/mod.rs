//! Category hierarchy feature.
//!
//! Categories form a self-referencing forest stored as flat rows. Trees are
//! assembled per read by [`services::TreeAssembler`]; every mutation goes
//! through [`services::HierarchyService`].
//!
//! ## Operations
//!
//! | Operation | Writes | Description |
//! |-----------|--------|-------------|
//! | `create` | yes | Create a category, optionally under a parent |
//! | `update_details` | yes | Change descriptive fields |
//! | `move_category` | yes | Re-parent after a cycle check |
//! | `delete` | yes | Remove a childless, product-free category |
//! | `set_active` | yes | Toggle one category |
//! | `cascade_set_active` | yes | Toggle a category and its whole subtree atomically |
//! | `get_category_tree` | no | Assemble the forest |
//! | `get_path` / `get_descendants` | no | Ancestry queries |
//! | `audit` | no | Verify stored data assembles into a forest |

pub mod dtos;
pub mod models;
pub mod services;
pub mod stores;

pub use services::{AncestryOracle, HierarchyService, TreeAssembler};
pub use stores::{CategoryStore, InMemoryCategoryStore, PgCategoryStore};
