//! Catalog Handlers

pub(crate) mod create_category;
pub(crate) mod create_product;
pub(crate) mod get_category;
pub(crate) mod get_product;
pub(crate) mod list_categories;
pub(crate) mod list_products;
