mod record;
mod round;
mod score;

pub(crate) use record::Side;
pub use record::{MatchRecord, MatchStatus, BYE, HEADERS, NOT_AVAILABLE, TBC, UNKNOWN};
pub use round::*;
pub use score::*;
