//! Variable set module

mod api;
mod models;

pub use models::{disambiguate_artifact_names, VariableSet, VarsetItem};
