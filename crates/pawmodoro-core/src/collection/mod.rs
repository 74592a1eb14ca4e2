mod catalog;
mod notify;
mod progress;
mod store;

pub use catalog::{
    Catalog, CollectibleDefinition, CumulativeStats, Rarity, UnlockCondition, UnlockKind,
};
pub use notify::UnlockQueue;
pub use progress::{session_xp, CompanionProgress, BASE_XP_TO_NEXT_LEVEL};
pub use store::{Collection, CollectionEntry, CollectionStore, UnlockSubscriber, COLLECTION_KEY};
