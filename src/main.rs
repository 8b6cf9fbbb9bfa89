//! `relation_manager` (relman) - export and re-import layer relations.
//!
//! Relations are written to a portable JSON document and re-created in
//! another project by matching layers on name or data source.

use relation_manager::run;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
