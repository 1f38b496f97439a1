//! WebDriver-backed driver for sightline, over fantoccini.
//!
//! Connects to any W3C WebDriver endpoint (chromedriver, geckodriver, a
//! Selenium grid), injects the capture payload on demand, and funnels the
//! engine's driver primitives through the in-page scanner.

mod driver;

pub use driver::WebDriverSession;
