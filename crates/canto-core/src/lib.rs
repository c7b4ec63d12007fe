pub mod dict;
pub mod schema;
pub mod settings;
pub mod spell;
pub mod unicode;
