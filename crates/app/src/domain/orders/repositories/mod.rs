//! Orders Repositories

pub(crate) mod items;
pub(crate) mod orders;
