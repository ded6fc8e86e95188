mod ancestry_oracle;
mod hierarchy_service;
mod tree_assembler;

#[cfg(test)]
pub(crate) mod test_support;

pub use ancestry_oracle::AncestryOracle;
pub use hierarchy_service::HierarchyService;
pub use tree_assembler::TreeAssembler;
