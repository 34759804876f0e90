pub(crate) mod edit;
pub(crate) mod index;
pub(crate) mod ingest;
pub(crate) mod model;
