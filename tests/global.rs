//! The process-wide slot can only be filled once, so this lives in its own
//! test binary.

use loggr::Error;
use loggr::log::{self, LoggerFactory, MemorySink};

#[test]
fn install_once_then_reject() {
    assert!(log::global().is_none());

    let sink = MemorySink::new();
    let installed = log::install(LoggerFactory::builder().sink(sink.clone()).build()).unwrap();
    assert!(std::ptr::eq(installed, log::global().unwrap()));

    let second = log::install(LoggerFactory::builder().sink(MemorySink::new()).build());
    assert!(matches!(second, Err(Error::AlreadyInstalled)));

    log::global().unwrap().create_logger("Orders").unwrap().info("still the first factory");
    assert_eq!(sink.messages(), ["still the first factory"]);

    installed.shutdown();
}
