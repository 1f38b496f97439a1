//! Fills a registration form by its visible labels.
//!
//! Start a chromedriver on port 9515 and serve a form page, then:
//!
//!     cargo run -p sightline-wd --example form_fill -- http://localhost:8000/registration.html

use sightline_engine::Automator;
use sightline_wd::WebDriverSession;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:8000/registration.html".into());

    let session = WebDriverSession::connect("http://localhost:9515").await?;
    session.goto(&url).await?;

    let automator = Automator::new(session).with_timeout(Duration::from_secs(10));

    automator.set("First Name").to("Joyce").await?;
    automator.set("Last Name").to("Byers").await?;
    automator.set("Gender").to("Female").await?;

    let child = automator.after("Child Information");
    child.set("First Name").to("Will").await?;
    child.set("Last Name").to("Byers").await?;
    child.set("Date of Birth").to("3/22/1971").await?;

    automator.set("Shipping Information").to("2-Day").await?;
    automator
        .click("I confirm that these details are accurate.")
        .await?;

    println!("{}", automator.diagnostics().await?);
    Ok(())
}
