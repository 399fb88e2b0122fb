//! dutytracker main entrypoint.

use dutytracker::run;
use dutytracker::ui::messages;

fn main() {
    if let Err(e) = run() {
        messages::error(format!("Error: {}", e));
        std::process::exit(1);
    }
}
