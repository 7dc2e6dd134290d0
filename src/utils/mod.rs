pub(crate) mod date;
pub(crate) mod debug;
pub(crate) mod timezone;

pub(crate) use date::{Clock, FixedClock, SystemClock, epoch_string, parse_epoch};
pub(crate) use debug::{last_api_success_label, record_api_success};
pub(crate) use timezone::NamedZone;
