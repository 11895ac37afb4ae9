mod bindings;

pub use bindings::{PyAnalyzer, PyResources};
