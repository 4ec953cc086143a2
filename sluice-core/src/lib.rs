mod as_value;
mod condition;
mod conversion;
mod cursor;
mod error;
mod expression;
#[cfg(test)]
mod fixtures;
mod mapper;
mod record;
mod row_result;
mod scanner;
mod schema;
mod util;
mod value;
pub mod writer;

pub use ::anyhow::Context;
pub use as_value::*;
pub use condition::*;
pub use conversion::*;
pub use cursor::*;
pub use error::*;
pub use expression::*;
pub use mapper::*;
pub use record::*;
pub use row_result::*;
pub use scanner::*;
pub use schema::*;
pub use util::*;
pub use value::*;
pub use writer::{GenericSqlWriter, SqlWriter};

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
