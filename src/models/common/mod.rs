pub mod datetime;
pub mod pagination;
pub mod response;
