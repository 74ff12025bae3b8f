// This file is the module declaration file for the `core` module.
//
// `config` module:
// Defines `CheckConfiguration`, the value every command works with, and
// the operations to read it from a mapping, a file or a project directory,
// write it back out, and resolve it into concrete files.
pub mod config;

// `error` module:
// The configuration error and warning taxonomy together with the `ensure`
// and `warn` helpers used across the crate.
pub mod error;
