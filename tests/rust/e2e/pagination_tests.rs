use std::cell::RefCell;

use anyhow::Result;
use querypager::pagination::BoxError;
use querypager::{
    MemoryCatalog, Page, PaginateError, Paginator, PaginatorConfig, PaginatorOptions, Params,
    QueryEngine,
};
use serde_json::json;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn catalog() -> MemoryCatalog {
    MemoryCatalog::from_yaml_str(
        r#"
entities:
  - name: User
    identifiers: [id]
    fields:
      id: integer
      name: string
      active: boolean
"#,
    )
    .unwrap()
}

/// Row store standing in for the host query engine. Records every call so
/// tests can assert the query text, bindings and limit/offset it received.
struct StubEngine {
    rows: Vec<u32>,
    executed: RefCell<Vec<String>>,
    paged_calls: RefCell<Vec<(Option<u32>, u64)>>,
    last_params: RefCell<Params>,
    fail: bool,
}

impl StubEngine {
    fn with_rows(n: u32) -> Self {
        Self {
            rows: (1..=n).collect(),
            executed: RefCell::new(Vec::new()),
            paged_calls: RefCell::new(Vec::new()),
            last_params: RefCell::new(Params::new()),
            fail: false,
        }
    }

    fn failing() -> Self {
        let mut engine = Self::with_rows(0);
        engine.fail = true;
        engine
    }
}

impl QueryEngine for StubEngine {
    type Row = u32;

    fn execute(&self, query: &str, params: &Params) -> Result<Vec<u32>, BoxError> {
        if self.fail {
            return Err("connection refused".into());
        }
        self.executed.borrow_mut().push(query.to_string());
        *self.last_params.borrow_mut() = params.clone();
        Ok(self.rows.clone())
    }

    fn execute_paged(
        &self,
        query: &str,
        params: &Params,
        limit: Option<u32>,
        offset: u64,
    ) -> Result<Vec<u32>, BoxError> {
        if self.fail {
            return Err("connection refused".into());
        }
        self.executed.borrow_mut().push(query.to_string());
        *self.last_params.borrow_mut() = params.clone();
        self.paged_calls.borrow_mut().push((limit, offset));
        Ok(self
            .rows
            .iter()
            .copied()
            .skip(offset as usize)
            .take(limit.map(|l| l as usize).unwrap_or(usize::MAX))
            .collect())
    }
}

#[test]
fn test_paginated_envelope_math() -> Result<()> {
    init_logging();
    let engine = StubEngine::with_rows(25);
    let paginator = Paginator::new(PaginatorConfig::default());
    let options = PaginatorOptions::new().with_per_page(10).with_page(2);

    let page = paginator.paginate(
        &engine,
        &catalog(),
        "SELECT u FROM User u",
        Params::new(),
        &options,
    )?;

    assert_eq!(page.count, 25);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.current_page, 2);
    assert_eq!(page.per_page, Some(10));
    // Offset is (page * per_page) - per_page = 10; rows 11..=20 come back.
    assert_eq!(page.data, (11..=20).collect::<Vec<u32>>());
    assert_eq!(engine.paged_calls.borrow().as_slice(), &[(Some(10), 10)]);
    Ok(())
}

#[test]
fn test_unpaginated_call_returns_everything() -> Result<()> {
    let engine = StubEngine::with_rows(7);
    let paginator = Paginator::new(PaginatorConfig::default());

    let page = paginator.paginate(
        &engine,
        &catalog(),
        "SELECT u FROM User u",
        Params::new(),
        &PaginatorOptions::new(),
    )?;

    assert_eq!(page.total_pages, 1);
    assert_eq!(page.count, 7);
    assert_eq!(page.data.len(), 7);
    assert_eq!(engine.paged_calls.borrow().as_slice(), &[(None, 0)]);
    Ok(())
}

#[test]
fn test_first_page_has_zero_offset() -> Result<()> {
    let engine = StubEngine::with_rows(12);
    let paginator = Paginator::new(PaginatorConfig::default());
    let options = PaginatorOptions::new().with_per_page(5);

    let page = paginator.paginate(
        &engine,
        &catalog(),
        "SELECT u FROM User u",
        Params::new(),
        &options,
    )?;

    assert_eq!(page.total_pages, 3);
    assert_eq!(page.data, vec![1, 2, 3, 4, 5]);
    assert_eq!(engine.paged_calls.borrow().as_slice(), &[(Some(5), 0)]);
    Ok(())
}

#[test]
fn test_empty_result_set() -> Result<()> {
    let engine = StubEngine::with_rows(0);
    let paginator = Paginator::new(PaginatorConfig::default());
    let options = PaginatorOptions::new().with_per_page(10);

    let page = paginator.paginate(
        &engine,
        &catalog(),
        "SELECT u FROM User u",
        Params::new(),
        &options,
    )?;

    assert_eq!(page.count, 0);
    assert_eq!(page.total_pages, 0);
    assert!(page.data.is_empty());
    Ok(())
}

#[test]
fn test_caller_params_merged_with_generated_bindings() -> Result<()> {
    let engine = StubEngine::with_rows(3);
    let paginator = Paginator::new(PaginatorConfig::default());
    let mut params = Params::new();
    params.insert("min_id".to_string(), json!(5));
    let options = PaginatorOptions::new().filter("active", "true");

    paginator.paginate(
        &engine,
        &catalog(),
        "SELECT u FROM User u WHERE u.id > :min_id",
        params,
        &options,
    )?;

    let bound = engine.last_params.borrow();
    assert_eq!(bound["min_id"], 5);
    assert_eq!(bound["prm_ref1"], "1");

    // Count and page executions run the same augmented text.
    let executed = engine.executed.borrow();
    assert_eq!(executed.len(), 2);
    assert_eq!(executed[0], executed[1]);
    assert!(executed[0].contains("WHERE (u.id > :min_id) AND (u.active = :prm_ref1)"));
    Ok(())
}

#[test]
fn test_invalid_page_rejected_before_execution() {
    let engine = StubEngine::with_rows(3);
    let paginator = Paginator::new(PaginatorConfig::default());
    let options = PaginatorOptions::new().with_page(0);

    let err = paginator
        .paginate(
            &engine,
            &catalog(),
            "SELECT u FROM User u",
            Params::new(),
            &options,
        )
        .unwrap_err();
    assert!(matches!(err, PaginateError::InvalidOptions(_)));
    assert!(engine.executed.borrow().is_empty());
}

#[test]
fn test_engine_failure_is_propagated() {
    let engine = StubEngine::failing();
    let paginator = Paginator::new(PaginatorConfig::default());

    let err = paginator
        .paginate(
            &engine,
            &catalog(),
            "SELECT u FROM User u",
            Params::new(),
            &PaginatorOptions::new(),
        )
        .unwrap_err();
    assert!(matches!(err, PaginateError::Engine(_)));
}

#[test]
fn test_envelope_serialization() -> Result<()> {
    let page = Page {
        total_pages: 3,
        current_page: 2,
        per_page: Some(10),
        count: 25,
        data: vec![11u32, 12],
    };
    let value = serde_json::to_value(&page)?;
    assert_eq!(
        value,
        json!({
            "total_pages": 3,
            "current_page": 2,
            "per_page": 10,
            "count": 25,
            "data": [11, 12]
        })
    );
    Ok(())
}

#[test]
fn test_custom_boolean_tokens() -> Result<()> {
    let engine = StubEngine::with_rows(1);
    let config = PaginatorConfig {
        boolean_true_values: vec!["si".to_string()],
        boolean_false_values: vec!["no".to_string()],
    };
    let paginator = Paginator::new(config);
    let options = PaginatorOptions::new().filter("active", "no");

    paginator.paginate(
        &engine,
        &catalog(),
        "SELECT u FROM User u",
        Params::new(),
        &options,
    )?;

    assert_eq!(engine.last_params.borrow()["prm_ref1"], "0");
    Ok(())
}
