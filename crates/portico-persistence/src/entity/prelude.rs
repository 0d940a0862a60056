pub use super::method_info::Entity as MethodInfo;
pub use super::namespace_info::Entity as NamespaceInfo;
pub use super::resource_info::Entity as ResourceInfo;
