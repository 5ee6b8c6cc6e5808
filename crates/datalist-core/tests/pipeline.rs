use std::cell::Cell;
use std::rc::Rc;

use datalist_core::{
    Datalist, DatalistError, Direction, ListConfig, MemorySession, MemorySource, ParamMap,
    ParamValue, SessionSection, Source,
};
use proptest::prelude::*;

type Rows = MemorySource<ParamMap>;

fn row(id: i64, name: &str, status: &str) -> ParamMap {
    ParamMap::from([
        ("id".to_string(), ParamValue::Int(id)),
        ("name".to_string(), ParamValue::from(name)),
        ("status".to_string(), ParamValue::from(status)),
    ])
}

fn products(count: i64) -> Rows {
    let statuses = ["active", "archived", "draft"];
    MemorySource::new(
        (1..=count)
            .map(|id| row(id, &format!("product-{id:03}"), statuses[(id % 3) as usize]))
            .collect(),
    )
}

fn params(entries: &[(&str, ParamValue)]) -> ParamMap {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

fn ids(items: &[ParamMap]) -> Vec<i64> {
    items.iter().filter_map(|r| r["id"].as_int()).collect()
}

fn list(count: i64, config: ListConfig) -> Datalist<Rows> {
    let mut list = Datalist::builder(products(count))
        .config(config)
        .allowed_order_columns([
            ("name".to_string(), "name".to_string()),
            ("id".to_string(), "id".to_string()),
        ]
        .into())
        .build();
    list.add_filter_expression(
        "status",
        |source: &mut Rows, value| {
            let value = value.clone();
            source.where_fn(move |row| row["status"].loose_eq(&value));
        },
        Some(ParamValue::from("any")),
    );
    list
}

#[test]
fn page_past_the_end_is_empty_not_an_error() {
    let mut list = list(25, ListConfig::default().with_default_on_page(Some(10)));

    list.set_page(3);
    assert_eq!(list.items_on_page().unwrap().len(), 5);

    list.set_page(4);
    assert!(list.items_on_page().unwrap().is_empty());
    let paginator = list.paginator(false).unwrap();
    assert_eq!(paginator.page(), 4);
    assert_eq!(paginator.page_count(), 3);
}

#[test]
fn request_drives_filtering_ordering_and_paging() {
    let mut list = list(30, ListConfig::default().with_default_on_page(Some(4)));
    list.load_state(&mut params(&[
        ("status", ParamValue::from("active")),
        ("order", ParamValue::from("id-DESC")),
        ("page", ParamValue::from("2")),
    ]));

    // active ids: 3, 6, ..., 30
    assert_eq!(ids(list.items_on_page().unwrap()), vec![18, 15, 12, 9]);
    assert_eq!(list.paginator(false).unwrap().item_count(), 10);
}

#[test]
fn default_filter_value_never_runs_transform() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let mut list = Datalist::new(products(5), ListConfig::default());
    list.add_filter_expression(
        "status",
        move |_: &mut Rows, _| counter.set(counter.get() + 1),
        Some(ParamValue::from("any")),
    );

    list.set_filter("status", Some(ParamValue::from("any")));
    list.items_on_page().unwrap();
    list.paginator(true).unwrap();
    list.filtered_source(true);
    assert_eq!(calls.get(), 0);
}

#[test]
fn save_then_load_reproduces_state() {
    let config = ListConfig::default().with_default_on_page(Some(10));
    let mut first = list(30, config.clone());
    first.load_state(&mut params(&[
        ("status", ParamValue::from("draft")),
        ("page", ParamValue::Int(2)),
        ("onpage", ParamValue::Int(5)),
        ("order", ParamValue::from("name-desc")),
    ]));

    let mut outbound = ParamMap::new();
    first.save_state(&mut outbound);

    let mut second = list(30, config);
    second.load_state(&mut outbound.clone());

    assert_eq!(second.page(), first.page());
    assert_eq!(second.on_page(), first.on_page());
    assert_eq!(second.order_parameter(), Some("name-DESC".to_string()));
    assert_eq!(second.filters(), first.filters());
    assert!(second.is_filter_stateful("status"));
    assert_eq!(
        ids(second.items_on_page().unwrap()),
        ids(first.items_on_page().unwrap())
    );
}

#[test]
fn outbound_parameters_snapshot() {
    let config = ListConfig::default()
        .with_default_on_page(Some(10))
        .with_default_order("name", Direction::Asc)
        .with_auto_canonicalize(true);
    let mut list = list(30, config);
    list.load_state(&mut params(&[
        ("page", ParamValue::from("2")),
        ("onpage", ParamValue::from("10")),
        ("order", ParamValue::from("name-DESC")),
        ("status", ParamValue::from("active")),
    ]));

    let mut outbound = ParamMap::new();
    list.save_state(&mut outbound);

    insta::assert_json_snapshot!(outbound, @r#"
    {
      "page": 2,
      "order": "name-DESC",
      "status": "active"
    }
    "#);
}

#[test]
fn submitted_filter_form_clears_omitted_filters() {
    let mut list = list(9, ListConfig::default());
    list.load_state(&mut params(&[("status", ParamValue::from("active"))]));
    assert_eq!(list.filters()["status"], ParamValue::from("active"));

    list.load_state(&mut params(&[("filter", ParamValue::from("1"))]));
    assert!(!list.filters().contains_key("status"));
    assert_eq!(list.items_on_page().unwrap().len(), 9);
}

#[test]
fn session_restores_page_and_order() {
    let mut section = MemorySession::new();
    section.set("page", ParamValue::Int(3));
    section.set("order", ParamValue::from("name-DESC"));

    let mut list = list(50, ListConfig::default().with_default_on_page(Some(10)));
    let mut request = ParamMap::new();
    list.load_session(&mut request, &section);
    list.load_state(&mut request);

    assert_eq!(list.page(), 3);
    assert_eq!(list.order_parameter().as_deref(), Some("name-DESC"));
    assert!(!request.contains_key("page"));
    assert!(!request.contains_key("order"));
    assert_eq!(ids(list.items_on_page().unwrap())[0], 30);
}

#[test]
fn session_round_trip_through_json() {
    let mut list = list(20, ListConfig::default());
    list.load_state(&mut params(&[
        ("status", ParamValue::from("archived")),
        ("order", ParamValue::from("id-ASC")),
    ]));
    let mut outbound = ParamMap::new();
    list.save_state(&mut outbound);

    let mut section = MemorySession::new();
    list.save_session(&outbound, &mut section);
    let json = serde_json::to_string(&section).unwrap();
    let restored: MemorySession = serde_json::from_str(&json).unwrap();

    let mut fresh = self::list(20, ListConfig::default());
    fresh.load_session(&mut ParamMap::new(), &restored);
    assert_eq!(fresh.filters(), list.filters());
    assert_eq!(fresh.order_parameter().as_deref(), Some("id-ASC"));
}

#[test]
fn distinct_root_count_requires_identity() {
    let mut list = list(5, ListConfig::default());
    let error = list.use_distinct_root_count().unwrap_err();
    assert!(matches!(error, DatalistError::MissingIdColumn));
    assert!(error.suggestion().is_some());

    list.set_source_id_name("status");
    list.use_distinct_root_count().unwrap();
    assert_eq!(list.paginator(true).unwrap().item_count(), 3);
}

#[test]
fn nested_items_follow_their_parents() {
    let rows = vec![
        ParamMap::from([("id".to_string(), ParamValue::from("B"))]),
        ParamMap::from([
            ("id".to_string(), ParamValue::from("A2")),
            ("parent".to_string(), ParamValue::from("A")),
        ]),
        ParamMap::from([("id".to_string(), ParamValue::from("A"))]),
        ParamMap::from([
            ("id".to_string(), ParamValue::from("A1")),
            ("parent".to_string(), ParamValue::from("A")),
        ]),
    ];
    let mut list = Datalist::builder(MemorySource::new(rows))
        .config(ListConfig::default().with_default_order("id", Direction::Asc))
        .allowed_order_columns([("id".to_string(), "id".to_string())].into())
        .nesting_callback(|source: &mut Rows, parent: Option<&ParamMap>| {
            let parent = parent.map(|p| p["id"].clone());
            source.where_fn(move |row| row.get("parent") == parent.as_ref());
        })
        .build();

    let names: Vec<String> = list
        .items_on_page()
        .unwrap()
        .iter()
        .map(|r| r["id"].to_string())
        .collect();
    assert_eq!(names, vec!["A", "A1", "A2", "B"]);
}

proptest! {
    #[test]
    fn fresh_compositions_are_independent(
        status in prop::sample::select(vec!["active", "archived", "draft", "any"]),
        descending in any::<bool>(),
        page in 1u32..5,
    ) {
        let mut list = list(20, ListConfig::default().with_default_on_page(Some(3)));
        let direction = if descending { Direction::Desc } else { Direction::Asc };
        list.set_filter("status", Some(ParamValue::from(status)));
        list.set_order("name", direction);

        let mut first = list.filtered_source(true);
        let second = list.filtered_source(true);
        let before = second.fetch().unwrap();

        first.set_page(page, 3);
        first.where_fn(|_| false);

        prop_assert_eq!(second.fetch().unwrap(), before.clone());
        prop_assert_eq!(list.filtered_source(true).fetch().unwrap(), before);
        prop_assert!(first.fetch().unwrap().is_empty());
    }
}
