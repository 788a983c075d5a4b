mod instagram;
mod request;

pub use instagram::{request_body, InstagramFetcher};
pub use request::RequestFetcher;
