mod clock;
mod fetcher_port;
mod transcoder_port;

pub use clock::{Clock, SystemClock};
pub use fetcher_port::{FetcherPort, RequestHeaders};
pub use transcoder_port::TranscoderPort;
