mod classify;
mod heartbleed;

pub use classify::{classify, is_server_hello_done};
pub use heartbleed::{HeartbleedProbe, Transcript};
