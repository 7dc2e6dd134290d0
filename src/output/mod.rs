mod json;
mod status;

pub(crate) use json::{envelope, output_batch_json};
pub(crate) use status::output_status_json;
