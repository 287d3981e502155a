pub mod content;
pub mod playback;
pub mod post;

pub use content::{Comment, ExtractedContent, MAX_COMMENTS};
pub use playback::PlaybackState;
pub use post::{is_plausible_post_id, ContentRequest, PostReference};
