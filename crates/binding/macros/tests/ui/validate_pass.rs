use nebula_binding::engine::Inspect;
use nebula_binding::shape::{Describe, Shape};
use nebula_binding::{Binder, Validate};
use serde::Deserialize;

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Search {
    #[serde(rename = "q")]
    #[validate(required, max = 120)]
    query: String,

    #[serde(default)]
    #[validate(form = "tag", dive, oneof("new", "used"))]
    tags: Vec<String>,

    #[serde(default)]
    #[validate(omitempty, gte = 1, lte = 100)]
    page_size: Option<u32>,

    #[validate(required)]
    r#type: String,

    filters: Option<Box<Filter>>,

    #[serde(skip)]
    #[validate(skip)]
    _cursor: std::collections::HashMap<String, String>,
}

#[derive(Deserialize, Validate)]
pub struct Filter {
    #[validate(min = 0.5)]
    radius_km: f64,

    #[validate(eq = true)]
    in_stock: bool,
}

fn main() {
    let Shape::Struct(shape) = <Search as Describe>::shape() else {
        panic!("derived shape is a struct");
    };
    assert_eq!(shape.name, "Search");
    assert_eq!(shape.field("query").map(|f| f.external_name()), Some("q"));
    assert_eq!(shape.field("tags").map(|f| f.external_name()), Some("tag"));
    assert_eq!(shape.field("page_size").map(|f| f.primary), Some("pageSize"));
    assert_eq!(shape.field("type").map(|f| f.primary), Some("type"));

    let search = Search {
        query: "bike".into(),
        tags: vec!["used".into()],
        page_size: None,
        r#type: "listing".into(),
        filters: Some(Box::new(Filter {
            radius_km: 2.0,
            in_stock: true,
        })),
        _cursor: Default::default(),
    };
    assert_eq!(search.type_name(), "Search");
    assert!(!search.inspect().is_zero());
    assert!(Binder::new().validate(&search).is_ok());
}
