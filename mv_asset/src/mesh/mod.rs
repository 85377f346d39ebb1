pub(crate) mod mtl;
pub(crate) mod obj;
