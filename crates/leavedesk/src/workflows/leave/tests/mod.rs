mod common;

mod delegation;
