mod helpers;

use blpd::{BlpError, Label, Value};
use chrono::NaiveDate;
use helpers::*;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[tokio::test]
async fn fiscal_year_fundamentals() {
    let blp = mock_blp();
    let t = blp
        .historical_data(UCG, ["NET_REV", "NET_INCOME"], "FY2016")
        .end("FY2017")
        .periodicity("FY")
        .run()
        .await
        .unwrap();

    assert_eq!(
        t.data.index(),
        [Label::Date(d(2016, 12, 31)), Label::Date(d(2017, 12, 31))]
    );
    assert_eq!(
        t.data.columns(),
        [Label::pair(UCG, "NET_REV"), Label::pair(UCG, "NET_INCOME")]
    );
    assert_eq!(
        t.data.get(d(2016, 12, 31), (UCG, "NET_REV")),
        Some(&Value::Float(19484.224))
    );
    assert_eq!(
        t.data.get(d(2017, 12, 31), (UCG, "NET_REV")),
        Some(&Value::Float(20130.646))
    );
    assert!(t.exceptions.is_empty());
}

#[tokio::test]
async fn daily_prices_for_several_securities() {
    let blp = mock_blp();
    let t = blp
        .historical_data([UCG, ISP], ["PX_LAST", "CUR_MKT_CAP"], "20180410")
        .end("2018-04-12")
        .run()
        .await
        .unwrap();

    assert_eq!(t.data.shape(), (3, 4));
    assert_eq!(
        t.data.columns(),
        [
            Label::pair(UCG, "PX_LAST"),
            Label::pair(UCG, "CUR_MKT_CAP"),
            Label::pair(ISP, "PX_LAST"),
            Label::pair(ISP, "CUR_MKT_CAP"),
        ]
    );
    assert_eq!(
        t.data.get(d(2018, 4, 11), (ISP, "PX_LAST")),
        Some(&Value::Float(3.097))
    );
}

#[tokio::test]
async fn bad_security_and_bad_field_in_series() {
    let blp = mock_blp();
    let t = blp
        .historical_data([UCG, BAD_SEC], ["PX_LAST", "PX_LAPT"], "20180410")
        .run()
        .await
        .unwrap();

    assert_eq!(t.data.columns(), [Label::pair(UCG, "PX_LAST")]);
    assert!(t.exceptions.get(BAD_SEC, None).is_some());
    let bad_field = t.exceptions.get(UCG, Some("PX_LAPT")).unwrap();
    assert_eq!(bad_field.subcategory, "INVALID_FIELD");
}

#[tokio::test]
async fn swap_is_a_pure_transpose() {
    let blp = mock_blp();
    let run = |swap| {
        blp.historical_data([UCG, ISP], ["PX_LAST", "CUR_MKT_CAP"], "20180410")
            .swap(swap)
            .run()
    };
    let plain = run(false).await.unwrap();
    let swapped = run(true).await.unwrap();

    assert_eq!(swapped.data, plain.data.clone().transpose());
    assert_eq!(swapped.exceptions, plain.exceptions);
    for r in plain.data.index() {
        for c in plain.data.columns() {
            assert_eq!(
                swapped.data.get(c.clone(), r.clone()),
                plain.data.get(r.clone(), c.clone())
            );
        }
    }
}

#[tokio::test]
async fn invalid_codes_name_their_group_before_sending() {
    let (builder, controller, _session) = scripted();
    let blp = builder.build().unwrap();

    let cases = [
        ("periodicity", "XD", "periodicity adjustment", "X"),
        ("periodicity", "CX", "periodicity selection", "X"),
        ("periodicity", "D", "periodicity", "D"),
        ("fill_days", "Z", "non-trading day fill", "Z"),
        ("fill_method", "Q", "fill method", "Q"),
        ("pricing", "Q", "pricing option", "Q"),
        ("override_option", "Q", "override option", "Q"),
    ];
    for (setter, code, group, rejected) in cases {
        let b = blp.historical_data("AAA", "PX_LAST", "20180410");
        let b = match setter {
            "periodicity" => b.periodicity(code),
            "fill_days" => b.fill_days(code),
            "fill_method" => b.fill_method(code),
            "pricing" => b.pricing(code),
            _ => b.override_option(code),
        };
        let err = b.run().await.unwrap_err();
        assert!(err.is_validation(), "{setter}={code}");
        assert_eq!(err, BlpError::invalid_option(group, rejected), "{setter}={code}");
    }
    assert!(controller.sent_requests().await.is_empty());
}

#[tokio::test]
async fn invalid_dates_are_rejected() {
    let blp = mock_blp();
    for (start, end) in [("2018/04/10", None), ("20180412", Some("20180410")), ("FY18", None)] {
        let mut b = blp.historical_data(UCG, "PX_LAST", start);
        if let Some(end) = end {
            b = b.end(end);
        }
        let err = b.run().await.unwrap_err();
        assert!(matches!(err, BlpError::InvalidDate(_)), "{start}..{end:?}");
        assert!(err.is_validation());
    }
}

#[tokio::test]
async fn provider_rejection_of_the_request_is_fatal() {
    let blp = mock_blp();
    let err = blp
        .historical_data(UCG, "PX_LAST", "20180410")
        .currency("USP")
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, BlpError::RequestFailed(_)));
    assert!(!err.is_validation());

    let err = blp
        .historical_data(UCG, "PX_LAST", "20180410")
        .calendar("IW")
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, BlpError::RequestFailed(_)));

    let ok = blp
        .historical_data(UCG, "PX_LAST", "20180410")
        .calendar("IT")
        .currency("USD")
        .run()
        .await
        .unwrap();
    assert_eq!(ok.data.shape(), (4, 1));
}
