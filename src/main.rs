//! sitehours entrypoint.

use sitehours::run;
use sitehours::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(format!("Error: {e}"));
        std::process::exit(1);
    }
}
