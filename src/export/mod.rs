pub(crate) mod artifact;
pub(crate) mod driver;
pub(crate) mod options;
