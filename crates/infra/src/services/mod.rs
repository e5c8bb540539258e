pub mod notifiers;
pub mod recipients;
