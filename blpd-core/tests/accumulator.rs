use blpd_core::{
    Accumulator, CorrelationId, ErrorInfo, Event, Label, Message, Request, SecurityData,
    SeriesRow, Value,
};
use chrono::NaiveDate;
use proptest::prelude::*;

const CID: CorrelationId = CorrelationId::new(1);

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn name_msg(sec: &str, name: &str) -> Message {
    Message::reference(CID, vec![SecurityData::point(sec, [("NAME", Value::from(name))])])
}

#[test]
fn security_error_routes_to_exceptions_only() {
    let req = Request::reference(["AAA", "BBB"], "NAME").build().unwrap();
    let mut acc = Accumulator::new(&req, CID);
    acc.absorb_event(&Event::response(vec![Message::reference(
        CID,
        vec![
            SecurityData::point("AAA", [("NAME", Value::from("ACME"))]),
            SecurityData::point("BBB", Vec::<(String, Value)>::new()).with_security_error(
                ErrorInfo::new("BAD_SEC", "INVALID_SECURITY", "Unknown/Invalid security"),
            ),
        ],
    )]))
    .unwrap();
    let t = acc.finish();

    assert!(!t.data.has_row("BBB"));
    assert_eq!(t.exceptions.len(), 1);
    let row = &t.exceptions.rows()[0];
    assert_eq!(row.security, "BBB");
    assert_eq!(row.field, None);
    assert_eq!(row.category, "BAD_SEC");
    assert_eq!(row.subcategory, "INVALID_SECURITY");
    assert_eq!(row.message, "Unknown/Invalid security");
}

#[test]
fn security_error_and_data_for_same_security_coexist() {
    let req = Request::reference("AAA", "NAME").build().unwrap();
    let mut acc = Accumulator::new(&req, CID);
    acc.absorb(&Message::reference(
        CID,
        vec![
            SecurityData::point("AAA", [("NAME", Value::from("ACME"))])
                .with_security_error(ErrorInfo::new("BAD_SEC", "X", "y")),
        ],
    ))
    .unwrap();
    let t = acc.finish();
    assert_eq!(t.data.get("AAA", "NAME"), Some(&Value::from("ACME")));
    assert!(t.exceptions.get("AAA", None).is_some());
}

#[test]
fn field_error_keeps_valid_fields_of_the_security() {
    let req = Request::reference(["AAA", "BBB"], ["NAME", "CPN"]).build().unwrap();
    let mut acc = Accumulator::new(&req, CID);
    acc.absorb_event(&Event::response(vec![Message::reference(
        CID,
        vec![
            SecurityData::point(
                "AAA",
                [("NAME", Value::from("ACME")), ("CPN", Value::Float(6.125))],
            ),
            SecurityData::point("BBB", [("NAME", Value::from("BETA"))]).with_field_exception(
                "CPN",
                ErrorInfo::new(
                    "BAD_FLD",
                    "NOT_APPLICABLE_TO_REF_DATA",
                    "Field not applicable to security",
                ),
            ),
        ],
    )]))
    .unwrap();
    let t = acc.finish();

    assert_eq!(t.data.get("BBB", "NAME"), Some(&Value::from("BETA")));
    assert_eq!(t.data.get("BBB", "CPN"), None);
    assert!(t.data.has_row("BBB"));
    let row = t.exceptions.get("BBB", Some("CPN")).unwrap();
    assert_eq!(row.subcategory, "NOT_APPLICABLE_TO_REF_DATA");
    assert_eq!(t.exceptions.len(), 1);
}

#[test]
fn events_may_carry_many_matching_messages() {
    let req = Request::reference(["AAA", "BBB"], "NAME").build().unwrap();
    let mut acc = Accumulator::new(&req, CID);
    assert!(!acc.absorb_event(&Event::partial(Vec::new())).unwrap());
    assert!(
        !acc.absorb_event(&Event::partial(vec![name_msg("AAA", "ACME")]))
            .unwrap()
    );
    assert!(
        acc.absorb_event(&Event::response(vec![
            name_msg("BBB", "BETA"),
            name_msg("AAA", "ACME2"),
        ]))
        .unwrap()
    );
    let t = acc.finish();
    assert_eq!(t.data.get("AAA", "NAME"), Some(&Value::from("ACME2")));
    assert_eq!(t.data.get("BBB", "NAME"), Some(&Value::from("BETA")));
}

#[test]
fn historical_table_has_dates_by_security_field_pairs() {
    let req = Request::historical(["UCG IM Equity", "ISP IM Equity"], ["NET_REV", "NET_INCOME"], "FY2016")
        .end("FY2017")
        .build()
        .unwrap();
    let mut acc = Accumulator::new(&req, CID);
    acc.absorb(&Message::historical(
        CID,
        vec![SecurityData::series(
            "ISP IM Equity",
            vec![SeriesRow::new(d(2017, 12, 31), [("NET_REV", Value::Float(17000.0))])],
        )],
    ))
    .unwrap();
    acc.absorb(&Message::historical(
        CID,
        vec![SecurityData::series(
            "UCG IM Equity",
            vec![
                SeriesRow::new(
                    d(2016, 12, 31),
                    [
                        ("NET_REV", Value::Float(19484.224)),
                        ("NET_INCOME", Value::Float(-11790.0)),
                    ],
                ),
                SeriesRow::new(d(2017, 12, 31), [("NET_REV", Value::Float(20130.646))]),
            ],
        )],
    ))
    .unwrap();
    let t = acc.finish();

    assert_eq!(
        t.data.index(),
        [Label::Date(d(2016, 12, 31)), Label::Date(d(2017, 12, 31))]
    );
    assert_eq!(
        t.data.columns(),
        [
            Label::pair("UCG IM Equity", "NET_REV"),
            Label::pair("UCG IM Equity", "NET_INCOME"),
            Label::pair("ISP IM Equity", "NET_REV"),
        ]
    );
    assert_eq!(
        t.data.get(d(2017, 12, 31), ("UCG IM Equity", "NET_REV")),
        Some(&Value::Float(20130.646))
    );
    assert_eq!(t.data.get(d(2016, 12, 31), ("ISP IM Equity", "NET_REV")), None);
    assert_eq!(t.data.get(d(2017, 12, 31), ("UCG IM Equity", "NET_INCOME")), None);
}

#[test]
fn swap_is_a_pure_transpose() {
    let req = Request::reference(["AAA", "BBB"], ["NAME", "PX"]).build().unwrap();
    let mut acc = Accumulator::new(&req, CID);
    acc.absorb(&Message::reference(
        CID,
        vec![
            SecurityData::point("AAA", [("NAME", Value::from("ACME")), ("PX", Value::Int(3))]),
            SecurityData::point("BBB", [("PX", Value::Int(4))]),
        ],
    ))
    .unwrap();
    let t = acc.finish();
    let swapped = t.clone().swapped();
    assert_eq!(swapped.data.index(), t.data.columns());
    assert_eq!(swapped.data.columns(), t.data.index());
    for r in t.data.index() {
        for c in t.data.columns() {
            assert_eq!(swapped.data.get(c.clone(), r.clone()), t.data.get(r.clone(), c.clone()));
        }
    }
    assert_eq!(swapped.exceptions, t.exceptions);
}

fn arb_entry() -> impl Strategy<Value = SecurityData> {
    let sec = proptest::sample::select(vec!["AAA", "BBB", "CCC"]);
    let field = proptest::sample::select(vec!["NAME", "PX", "CPN"]);
    (sec, proptest::collection::vec((field, 0i64..100), 0..3), any::<bool>(), proptest::option::of(proptest::sample::select(vec!["NAME", "PX", "CPN"])))
        .prop_map(|(sec, values, sec_err, field_err)| {
            let mut data = SecurityData::point(
                sec,
                values.into_iter().map(|(f, v)| (f, Value::Int(v))).collect::<Vec<_>>(),
            );
            if sec_err {
                data = data.with_security_error(ErrorInfo::new("BAD_SEC", "INVALID_SECURITY", sec));
            }
            if let Some(f) = field_err {
                data = data.with_field_exception(f, ErrorInfo::new("BAD_FLD", "INVALID_FIELD", f));
            }
            data
        })
}

proptest! {
    #[test]
    fn independent_messages_fold_in_any_order(a in arb_entry(), b in arb_entry()) {
        // Entries touching the same security are not independent.
        prop_assume!(a.security != b.security);
        let req = Request::reference(["AAA", "BBB", "CCC"], ["NAME", "PX", "CPN"]).build().unwrap();
        let m1 = Message::reference(CID, vec![a]);
        let m2 = Message::reference(CID, vec![b]);

        let mut forward = Accumulator::new(&req, CID);
        forward.absorb(&m1).unwrap();
        forward.absorb(&m2).unwrap();
        let mut backward = Accumulator::new(&req, CID);
        backward.absorb(&m2).unwrap();
        backward.absorb(&m1).unwrap();

        prop_assert_eq!(forward.finish(), backward.finish());
    }

    #[test]
    fn a_pair_is_never_in_both_tables(entries in proptest::collection::vec(arb_entry(), 0..6)) {
        let req = Request::reference(["AAA", "BBB", "CCC"], ["NAME", "PX", "CPN"]).build().unwrap();
        let mut acc = Accumulator::new(&req, CID);
        for e in entries {
            acc.absorb(&Message::reference(CID, vec![e])).unwrap();
        }
        let t = acc.finish();
        for row in t.exceptions.rows() {
            if let Some(field) = &row.field {
                prop_assert!(t.data.get(row.security.as_str(), field.as_str()).is_none());
            }
        }
    }
}
