use std::io::Write;

use datalist_core::{Datalist, Direction, ListConfig, ParamMap, ParamValue};
use datalist_frame::{FrameSource, read_csv_source};
use polars::prelude::*;
use tempfile::NamedTempFile;

const PRODUCTS: &str = "\
id,name,category,price
1,Kettle,kitchen,25
2,Toaster,kitchen,40
3,Lamp,living,15
4,Sofa,living,900
5,Pan,kitchen,30
6,Rug,living,120
7,Mixer,kitchen,80
";

fn products_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{PRODUCTS}").unwrap();
    file
}

fn names(list: &mut Datalist<FrameSource>) -> Vec<String> {
    list.items_on_page()
        .unwrap()
        .iter()
        .map(|row| row["name"].to_string())
        .collect()
}

#[test]
fn csv_list_filters_orders_and_pages() {
    let file = products_csv();
    let source = read_csv_source(file.path()).unwrap();
    let mut list = Datalist::builder(source)
        .config(
            ListConfig::default()
                .with_default_on_page(Some(2))
                .with_default_order("price", Direction::Desc),
        )
        .allowed_repository_filters(["category"])
        .build();

    let mut params = ParamMap::from([
        ("category".to_string(), ParamValue::from("kitchen")),
        ("page".to_string(), ParamValue::from("2")),
    ]);
    list.load_state(&mut params);
    // Repository filters are not request-stateful; set it explicitly.
    list.set_filter("category", params.get("category").cloned());

    assert_eq!(names(&mut list), vec!["Pan", "Kettle"]);
    let paginator = list.paginator(false).unwrap();
    assert_eq!(paginator.item_count(), 4);
    assert!(paginator.is_last());
}

#[test]
fn filter_expression_with_polars_predicate() {
    let file = products_csv();
    let mut list = Datalist::new(read_csv_source(file.path()).unwrap(), ListConfig::default());
    list.add_filter_expression(
        "max_price",
        |source: &mut FrameSource, value| {
            if let Some(max) = value.as_int() {
                source.where_expr(col("price").lt_eq(lit(max)));
            }
        },
        None,
    );
    list.set_order("name", Direction::Asc);
    list.load_state(&mut ParamMap::from([(
        "max_price".to_string(),
        ParamValue::from("30"),
    )]));

    assert_eq!(names(&mut list), vec!["Kettle", "Lamp", "Pan"]);
}

#[test]
fn distinct_root_count_uses_id_column() {
    let df = df! {
        "id" => [1i64, 1, 2, 3, 3, 3],
        "tag" => ["a", "b", "a", "a", "b", "c"],
    }
    .unwrap();
    let source = FrameSource::from_frame(df)
        .unwrap()
        .with_id_column("id")
        .unwrap();
    let mut list = Datalist::new(source, ListConfig::default());

    assert_eq!(list.paginator(false).unwrap().item_count(), 6);
    list.use_distinct_root_count().unwrap();
    assert_eq!(list.paginator(false).unwrap().item_count(), 3);
}
