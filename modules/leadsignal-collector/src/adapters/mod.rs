pub mod github;
pub mod product_hunt;
