pub mod cstr_examples;
