//! Application services and the persistence seams they depend on.

pub mod books;
pub mod error;
pub mod repos;
