use std::sync::Arc;

use blpd::Blp;
use blpd_mock::MockSession;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .try_init();

    let blp = Blp::builder()
        .with_session(Arc::new(MockSession::new()))
        .build()?;

    // Daily closes and market caps, converted to dollars.
    let daily = blp
        .historical_data(
            ["UCG IM Equity", "ISP IM Equity"],
            ["PX_LAST", "CUR_MKT_CAP"],
            "20180410",
        )
        .end("20180413")
        .currency("USD")
        .calendar("IT")
        .run()
        .await?;
    println!("{}", daily.data);

    // Fiscal-year fundamentals with (security, field) pairs as rows.
    let yearly = blp
        .historical_data("UCG IM Equity", ["NET_REV", "NET_INCOME"], "FY2016")
        .end("FY2017")
        .periodicity("FY")
        .swap(true)
        .run()
        .await?;
    println!("{}", yearly.data);

    // An unknown currency is rejected by the provider for the whole request.
    match blp
        .historical_data("UCG IM Equity", "PX_LAST", "20180410")
        .currency("USP")
        .run()
        .await
    {
        Ok(_) => println!("unexpectedly accepted"),
        Err(e) => println!("rejected: {e}"),
    }

    Ok(())
}
