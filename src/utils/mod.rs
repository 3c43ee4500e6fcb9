pub mod constants;
pub mod coordinates;
pub mod logging;
pub mod numeric;
pub mod progress;

pub use constants::*;
pub use coordinates::{parse_coordinate, validate_geographic};
pub use logging::init_logging;
pub use numeric::round_to;
pub use progress::ProgressReporter;
