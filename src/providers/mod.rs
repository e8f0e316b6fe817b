pub mod s3_client;
pub mod sdk;
pub mod store;

pub use sdk::SdkStore;
pub use store::{ObjectInfo, ObjectStore, ObjectStream, PresignParams, SEPARATOR};
