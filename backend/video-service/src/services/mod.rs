pub mod history;
pub mod toggle;
pub mod videos;

pub use history::HistoryService;
pub use toggle::ToggleService;
pub use videos::{PublishVideo, UpdateVideo, VideoService};
