pub(crate) mod import;
pub(crate) mod stats;
pub(crate) mod user;
