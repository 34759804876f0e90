pub(crate) mod animation;
pub(crate) mod frame;
pub(crate) mod segment;
