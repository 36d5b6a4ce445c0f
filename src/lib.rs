//! Chat message segmentation: prose and fenced code blocks, language guessing for
//! untagged blocks, and per-block copy acknowledgement state.
//!
//! ```
//! use chat_fence::core::segment::{Segment, segment};
//!
//! let segments = segment("Try this:\n```\nprint('hi')\n```");
//! assert_eq!(segments[0], Segment::Text { content: "Try this:\n" });
//! assert_eq!(segments[1].as_code().map(|c| c.language), Some("python"));
//! ```

pub mod core;
pub mod render;
