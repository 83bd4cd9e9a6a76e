use error::AddonsError;

pub mod constants;
pub mod error;
pub mod git;
pub mod mirror;
pub mod repository;
pub mod store;

pub type AddonsResult<T> = std::result::Result<T, AddonsError>;
