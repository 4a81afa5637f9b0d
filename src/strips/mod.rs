pub(crate) mod model;
pub(crate) mod orientation;
pub(crate) mod registry;
pub(crate) mod shredded;
