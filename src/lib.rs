pub mod chips;
pub mod clock;
pub mod error;
pub mod pcm;
pub mod player;
pub mod source;
pub mod vgm;

pub use chips::ChipSink;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use player::{PlaybackState, Player};
pub use source::{DataSource, Input, VgmSource};
pub use vgm::VgmHeader;
