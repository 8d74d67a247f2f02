// tests/cashflow_paging.rs
//
// Backward pagination of the transaction feed: cursor propagation, the three
// stop conditions, and the descending-order shortcut that excludes anything
// after the first out-of-window item.

use chrono::DateTime;

use sc_sidekick::clients::cashflow::{collect_window, CashflowPage, CashflowTx, DayWindow};
use sc_sidekick::net::NetError;

const DAY_MS: i64 = 86_400_000;

fn window() -> DayWindow {
    DayWindow {
        today_start_ms: 10 * DAY_MS,
        yesterday_start_ms: 9 * DAY_MS,
    }
}

fn tx(id: i64, cat: &str, money: f64, ms: i64) -> CashflowTx {
    let datetime = DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default();
    CashflowTx {
        id: Some(id),
        category: cat.to_string(),
        money,
        description: String::new(),
        datetime,
    }
}

fn pager(
    pages: Vec<CashflowPage>,
) -> impl FnMut(Option<i64>) -> Result<CashflowPage, NetError> {
    let mut iter = pages.into_iter();
    move |_cursor| iter.next().ok_or(NetError::Status(404))
}

#[test]
fn pages_until_first_older_item() {
    let w = window();
    let pages = vec![
        CashflowPage {
            data: vec![
                tx(30, "s", 100.0, 10 * DAY_MS + 500),
                tx(29, "b", -20.0, 10 * DAY_MS + 400),
            ],
            oldest_pulled: false,
        },
        CashflowPage {
            data: vec![
                tx(28, "s", 50.0, 9 * DAY_MS + 100),
                // older than yesterday: stop, and the trailing in-window
                // entry after it must not be picked up
                tx(27, "s", 999.0, 8 * DAY_MS),
                tx(26, "s", 777.0, 10 * DAY_MS + 300),
            ],
            oldest_pulled: false,
        },
    ];

    let snap = collect_window(&w, pager(pages)).unwrap();
    assert_eq!(snap.today.items.len(), 2);
    assert_eq!(snap.today.summary.sales_count, 1);
    assert_eq!(snap.today.summary.sales_money, 100.0);
    assert_eq!(snap.yesterday.items.len(), 1);
    assert_eq!(snap.yesterday.summary.sales_money, 50.0);
}

#[test]
fn cursor_is_last_item_id() {
    let w = window();
    let seen = std::sync::Mutex::new(Vec::new());
    let mut pages = vec![
        CashflowPage {
            data: vec![tx(30, "s", 1.0, 10 * DAY_MS + 500), tx(29, "s", 1.0, 10 * DAY_MS + 400)],
            oldest_pulled: false,
        },
        CashflowPage {
            data: vec![tx(28, "s", 1.0, 10 * DAY_MS + 300)],
            oldest_pulled: true,
        },
    ]
    .into_iter();

    let snap = collect_window(&w, |cursor| {
        seen.lock().unwrap().push(cursor);
        pages.next().ok_or(NetError::Status(404))
    })
    .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![None, Some(29)]);
    assert_eq!(snap.today.summary.sales_count, 3);
}

#[test]
fn stops_on_oldest_pulled() {
    let w = window();
    let pages = vec![CashflowPage {
        data: vec![tx(5, "s", 10.0, 10 * DAY_MS + 100)],
        oldest_pulled: true,
    }];
    // a second fetch would hit the 404 in the pager
    let snap = collect_window(&w, pager(pages)).unwrap();
    assert_eq!(snap.today.summary.sales_count, 1);
}

#[test]
fn stops_at_page_cap() {
    let w = window();
    let calls = std::sync::Mutex::new(0usize);
    let snap = collect_window(&w, |_| {
        let mut c = calls.lock().unwrap();
        *c += 1;
        let id = 1000 - *c as i64;
        Ok(CashflowPage {
            data: vec![tx(id, "s", 1.0, 10 * DAY_MS + 100)],
            oldest_pulled: false,
        })
    })
    .unwrap();
    assert_eq!(*calls.lock().unwrap(), 30);
    assert_eq!(snap.today.summary.sales_count, 30);
}

#[test]
fn stops_when_last_item_has_no_id() {
    let w = window();
    let mut no_id = tx(0, "s", 1.0, 10 * DAY_MS + 100);
    no_id.id = None;
    let pages = vec![CashflowPage { data: vec![no_id], oldest_pulled: false }];
    let snap = collect_window(&w, pager(pages)).unwrap();
    assert_eq!(snap.today.summary.sales_count, 1);
}

#[test]
fn unparseable_datetime_stops_the_scan() {
    let w = window();
    let mut bad = tx(9, "s", 5.0, 0);
    bad.datetime = "not a timestamp".to_string();
    let pages = vec![CashflowPage {
        data: vec![tx(10, "s", 1.0, 10 * DAY_MS + 100), bad, tx(8, "s", 3.0, 10 * DAY_MS)],
        oldest_pulled: false,
    }];
    let snap = collect_window(&w, pager(pages)).unwrap();
    assert_eq!(snap.today.summary.sales_count, 1);
}

#[test]
fn transport_errors_propagate() {
    let w = window();
    let err = collect_window(&w, |_| Err::<CashflowPage, _>(NetError::Status(500)));
    assert!(err.is_err());
}
