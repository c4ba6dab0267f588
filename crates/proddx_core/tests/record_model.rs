use proddx_core::{Company, CompanyDraft, Product, ProductDraft};
use uuid::Uuid;

#[test]
fn records_serialize_with_snake_case_fields() {
    let company_id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let mut product = Product::new(company_id, "Widget");
    product.rating = 3;
    product.created_at = 1_700_000_000_000;

    let json = serde_json::to_value(&product).unwrap();
    assert_eq!(json["id"], product.id.to_string());
    assert_eq!(json["company_id"], "11111111-2222-4333-8444-555555555555");
    assert_eq!(json["feedback_url"], product.feedback_url);
    assert_eq!(json["rating"], 3);
    assert_eq!(json["created_at"], 1_700_000_000_000_i64);

    let decoded: Product = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, product);
}

#[test]
fn partial_json_decodes_into_draft_with_unset_fields() {
    let id = Uuid::new_v4();
    let draft: CompanyDraft = serde_json::from_value(serde_json::json!({
        "id": id.to_string(),
        "logo": "http://x/logo.png",
    }))
    .unwrap();

    assert_eq!(
        draft,
        CompanyDraft {
            id,
            logo: Some("http://x/logo.png".to_string()),
            ..CompanyDraft::default()
        }
    );
}

#[test]
fn full_record_converts_into_fully_supplied_draft() {
    let company = Company::new(Uuid::new_v4(), "Acme", "a@acme.com");
    let draft = CompanyDraft::from(company.clone());
    assert_eq!(draft.name.as_deref(), Some("Acme"));
    assert_eq!(draft.logo.as_deref(), Some(""));
    assert_eq!(draft.created_at, Some(company.created_at));

    let product = Product::new(Uuid::new_v4(), "Widget");
    let draft = ProductDraft::from(product);
    assert_eq!(draft.rating, Some(0));
}
