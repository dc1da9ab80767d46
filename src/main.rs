//! waypoint-adjuster main entrypoint.

use waypoint_adjuster::run;
use waypoint_adjuster::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(format!("Error: {}", e));
        std::process::exit(1);
    }
}
