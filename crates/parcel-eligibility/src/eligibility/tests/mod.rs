mod common;
mod screening;
mod validation;
