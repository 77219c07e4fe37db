mod from_google;
mod to_google;

pub use from_google::{FromGoogle, is_cancelled};
pub use to_google::ToGoogle;
