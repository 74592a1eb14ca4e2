pub mod collection;
pub mod config;
pub mod stats;
pub mod timer;

use std::rc::Rc;
use std::sync::Arc;

use pawmodoro_core::{Catalog, Collection, Database};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub type DbCollection = Collection<Rc<Database>>;

/// The collection backed by the on-disk database.
pub fn open_collection(
    catalog: Arc<Catalog>,
) -> Result<(Rc<Database>, DbCollection), Box<dyn std::error::Error>> {
    let db = Rc::new(Database::open()?);
    let collection = Collection::load(Rc::clone(&db), catalog);
    Ok((db, collection))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
