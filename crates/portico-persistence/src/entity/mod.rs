//! `SeaORM` entities for the routing configuration tables

pub mod prelude;

pub mod method_info;
pub mod namespace_info;
pub mod resource_info;
