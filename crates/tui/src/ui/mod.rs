pub(crate) mod components;
pub(crate) mod main;
pub(crate) mod runtime;
