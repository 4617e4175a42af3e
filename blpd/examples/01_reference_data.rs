use std::sync::Arc;

use blpd::Blp;
use blpd_mock::MockSession;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=info,blpd=debug,blpd_core=debug (with --features tracing)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init();

    // 1. Build the facade over the fixture-backed session.
    let blp = Blp::builder()
        .with_session(Arc::new(MockSession::new()))
        .build()?;

    // 2. Two good equities, one unknown ticker, and one misspelled field.
    let tables = blp
        .reference_data(
            ["UCG IM Equity", "ISP IM Equity", "UCT IM Equity"],
            ["NAME", "COUNTRY_FULL_NAME", "NAMT"],
        )
        .run()
        .await?;

    println!("{}", tables.data);
    println!("{}", tables.exceptions);

    // 3. Same security addressed by ISIN, with an override.
    let beta = blp
        .reference_data("IT0005239360", "BETA_ADJ_OVERRIDABLE")
        .prefix("isin")
        .override_field("BETA_OVERRIDE_REL_INDEX", "ITSMBANC")
        .run()
        .await?;
    println!("{}", beta.data);

    blp.close().await?;
    Ok(())
}
