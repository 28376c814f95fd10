//! Nested error demo
//!
//! Builds a small file, then provokes failures with auto-print off and
//! prints each error chain, native stack included, with `print_nested`.
//!
//! # Environment Variables
//!
//! - `H5W_AUTO_PRINT=1` - keep native printing on (errors then carry no stack)
//! - `H5W_LOG_LEVEL=trace` - show handle open/close tracing
//! - `H5W_FLUSH_EPRINT=1` - flush diagnostics immediately

use h5wrap::prelude::*;
use h5wrap::{kinfo, kprintln};

// H5W_LOG_LEVEL=debug cargo run -p h5wrap-stack-trace
fn main() {
    if let Err(e) = run() {
        kprintln!("stack-trace failed:\n{}", print_nested(&e, 1));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let lib = Library::open_default()?;
    let config = WrapConfig::from_env().auto_print(h5wrap::env_get_bool("H5W_AUTO_PRINT", false));
    config.apply(&lib)?;
    kinfo!("backend {}, auto-print {}", lib.name(), lib.errors().auto_print());

    let file = File::create(&lib, "stack-trace.h5")?;
    let root = file.root()?;
    let data = Group::create(&root, "data")?;

    let space = Dataspace::simple(&lib, &[10], Some(&[Dataspace::UNLIMITED]))?;
    let dtype = Datatype::native::<f64>(&lib)?;
    let events = Dataset::create(&data, "events", &dtype, &space, Some(&[16]))?;

    println!("=== local failure: shrinking {} below zero ===", events.path());
    report(events.extent(0, -15));

    println!("=== native failure: creating {} twice ===", data.path());
    report(Group::create(&root, "data").map(|_| ()));

    println!("=== native failure wrapped in context ===");
    report(
        root.open("calibration/run7")
            .context("loading calibration constants")
            .map(|_| ()),
    );

    events.extent(0, 5)?;
    println!(
        "=== {} now has extent {:?} ===",
        events.path(),
        events.dataspace()?.current_dimensions()?
    );
    Ok(())
}

fn report(result: Result<()>) {
    match result {
        Ok(()) => println!("(no error)"),
        Err(e) => print!("{}", print_nested(&e, 0)),
    }
}
