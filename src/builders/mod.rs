// This file is the module declaration file for the `builders` module.
// It declares and makes public all the sub-modules within the `src/builders`
// directory. These modules hold the pieces `CheckConfiguration` is assembled from.

// `merger` module:
// Layers command-line flags on top of a file-sourced configuration and
// produces the raw mapping that is fed back through `from_dict`.
pub mod merger;

// `resolver` module:
// Defines the `PathResolver` trait and the `FileSystemResolver` used by
// `check_and_resolve` to canonicalize paths and expand directories into
// the files below them.
pub mod resolver;

// `validator` module:
// Defines the `ConfigValidator` trait and the `StandardValidator`, which
// checks the version range and the existence of configured paths before
// anything is resolved.
pub mod validator;

// `writer` module:
// Chooses the output format from a file name and writes a serialized
// configuration as JSON, TOML, or an appended `pyproject.toml` section.
pub mod writer;
