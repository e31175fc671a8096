pub(crate) mod component;
pub(crate) mod param_form;
pub(crate) mod run_table;
pub(crate) mod scope_bar;
pub(crate) mod status_line;
pub(crate) mod text_input;
