//! Unit tests for the public augmentation API: predicate shape, alias
//! allocation and join deduplication as observed through `augment`.

use querypager::{MemoryCatalog, PaginatorConfig, PaginatorOptions, QueryAugmenter, QueryAugmenterError};

fn catalog() -> MemoryCatalog {
    MemoryCatalog::from_yaml_str(
        r#"
entities:
  - name: User
    identifiers: [id]
    fields:
      id: integer
      name: string
      email: string
      active: boolean
    associations:
      profile:
        target: Profile
        cardinality: to_one
      manager:
        target: Profile
        cardinality: to_one
      roles:
        target: Role
        cardinality: to_many
  - name: Profile
    identifiers: [id]
    fields:
      id: integer
      name: string
  - name: Role
    identifiers: [id]
    fields:
      id: integer
      label: string
"#,
    )
    .unwrap()
}

fn augment(query: &str, options: &PaginatorOptions) -> querypager::AugmentedQuery {
    let catalog = catalog();
    let config = PaginatorConfig::default();
    QueryAugmenter::new(&catalog, &config)
        .augment(query, options)
        .unwrap()
}

#[test]
fn test_filter_map_of_size_n_yields_n_parameterized_comparisons() {
    let options = PaginatorOptions::new()
        .filter("name", "ann")
        .filter("email", "example.org")
        .filter("id", "7");
    let augmented = augment("SELECT u FROM User u", &options);

    assert_eq!(augmented.text.matches(" LIKE :").count(), 3);
    assert_eq!(augmented.text.matches(" AND ").count(), 2);
    // Each comparison is bound to a distinct parameter alias.
    let aliases: Vec<&str> = augmented.params.keys().map(String::as_str).collect();
    assert_eq!(aliases, ["prm_ref1", "prm_ref2", "prm_ref3"]);
}

#[test]
fn test_search_map_is_or_joined() {
    let options = PaginatorOptions::new()
        .search("name", "ann")
        .search("email", "ann");
    let augmented = augment("SELECT u FROM User u", &options);

    assert_eq!(augmented.text.matches(" OR ").count(), 1);
    assert!(augmented.text.contains("WHERE (u.name LIKE :prm_ref1 OR u.email LIKE :prm_ref2)"));
}

#[test]
fn test_same_to_many_path_twice_joins_once() {
    let options = PaginatorOptions::new()
        .filter("roles.label", "admin")
        .search("roles.label", "ops");
    let augmented = augment("SELECT u FROM User u", &options);

    assert_eq!(augmented.text.matches("LEFT JOIN u.roles").count(), 1);
    // Both resolutions reference the same join alias.
    assert!(augmented.text.contains("(cls_ref1.label LIKE :prm_ref1)"));
    assert!(augmented.text.contains("(cls_ref1.label LIKE :prm_ref2)"));
}

#[test]
fn test_to_one_paths_to_same_target_get_independent_subqueries() {
    let options = PaginatorOptions::new()
        .filter("profile.name", "ann")
        .filter("manager.name", "bob");
    let augmented = augment("SELECT u FROM User u", &options);

    assert!(augmented
        .text
        .contains("u.profile IN (SELECT cls_ref1 FROM Profile cls_ref1"));
    assert!(augmented
        .text
        .contains("u.manager IN (SELECT cls_ref2 FROM Profile cls_ref2"));
    assert_eq!(augmented.text.matches("LEFT JOIN").count(), 0);
}

#[test]
fn test_order_by_to_many_association_fails() {
    let catalog = catalog();
    let config = PaginatorConfig::default();
    let options = PaginatorOptions::new().with_order_by("roles.label");
    let err = QueryAugmenter::new(&catalog, &config)
        .augment("SELECT u FROM User u", &options)
        .unwrap_err();
    assert_eq!(
        err,
        QueryAugmenterError::InvalidOrderByAssociation {
            association: "roles".to_string()
        }
    );
}

#[test]
fn test_unknown_filter_field() {
    let catalog = catalog();
    let config = PaginatorConfig::default();
    let options = PaginatorOptions::new().filter("ghost", "x");
    let err = QueryAugmenter::new(&catalog, &config)
        .augment("SELECT u FROM User u", &options)
        .unwrap_err();
    assert!(matches!(err, QueryAugmenterError::UnknownField { entity, field }
        if entity == "User" && field == "ghost"));
}

#[test]
fn test_boolean_tokens_map_to_literals() {
    let augmented = augment(
        "SELECT u FROM User u",
        &PaginatorOptions::new().filter("active", "true"),
    );
    assert!(augmented.text.contains("(u.active = :prm_ref1)"));
    assert_eq!(augmented.params["prm_ref1"], "1");

    let augmented = augment(
        "SELECT u FROM User u",
        &PaginatorOptions::new().filter("active", "false"),
    );
    assert_eq!(augmented.params["prm_ref1"], "0");
}

#[test]
fn test_unrecognized_boolean_token_binds_sentinel() {
    let augmented = augment(
        "SELECT u FROM User u",
        &PaginatorOptions::new().filter("active", "maybe"),
    );
    assert_eq!(augmented.params["prm_ref1"], "-1");
}

#[test]
fn test_augmentation_calls_are_independent() {
    // Alias counters restart for every call; nothing leaks across calls.
    let options = PaginatorOptions::new().filter("roles.label", "admin");
    let first = augment("SELECT u FROM User u", &options);
    let second = augment("SELECT u FROM User u", &options);
    assert_eq!(first, second);
}

#[test]
fn test_default_order_is_root_identifier_ascending() {
    let augmented = augment("SELECT u FROM User u", &PaginatorOptions::new());
    assert!(augmented.text.ends_with("ORDER BY u.id ASC"));
}

#[test]
fn test_descending_token_applies() {
    let augmented = augment(
        "SELECT u FROM User u",
        &PaginatorOptions::new().with_order("descending"),
    );
    assert!(augmented.text.ends_with("ORDER BY u.id DESC"));
}
