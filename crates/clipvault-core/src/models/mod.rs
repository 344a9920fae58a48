pub mod orientation;
pub mod storage;
pub mod video;

pub use orientation::OrientationClass;
pub use storage::{DurableReference, StorageReference};
pub use video::VideoRecord;
