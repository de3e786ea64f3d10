mod bson;
mod collection;
mod counter;
mod errors;

pub use bson::{u32_id_filter, Id};
pub use collection::{ensure_indexes_exist, Coll, MongoCollection};
pub use counter::{Counter, ASSIGNMENT_ID_COUNTER_ID};
pub use errors::is_duplicate_key;
