use std::io::Write;
use std::path::PathBuf;

use prodmatch::config::load_config;
use prodmatch_core::models::{BatchItem, CatalogProduct, MatchMethod};
use prodmatch_core::search::HybridMatcher;

fn repo_file(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join(relative)
}

#[test]
fn test_example_config_loads() {
    let config = load_config(&repo_file("config/pmx.example.toml")).unwrap();
    assert_eq!(config.ai.provider, "auto");
    assert_eq!(config.matching.limit, 5);
    assert!((config.ai.weight_prefilter + config.ai.weight_ai - 1.0).abs() < 1e-9);
}

#[test]
fn test_config_rejects_bad_weights() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[api]
base_url = "https://rest.example.com/api"
tenant_id = "t"
username = "u"

[ai]
weight_prefilter = 0.9
weight_ai = 0.9
"#
    )
    .unwrap();
    assert!(load_config(file.path()).is_err());
}

#[test]
fn test_batch_items_file_shape() {
    let content = r#"[
        {"descricao": "CERA ACRILICA RENKO 5L", "codigo_fornecedor": "FORN-001"},
        {"descricao": "CIMENTO CP II 50KG"}
    ]"#;
    let items: Vec<BatchItem> = serde_json::from_str(content).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].supplier_code.as_deref(), Some("FORN-001"));
    assert!(items[1].supplier_code.is_none());
}

#[test]
fn test_catalog_payload_deserializes() {
    // The shape the products endpoint returns.
    let content = r#"[
        {"codigo": "001", "descricao": "CERA ACRILICA RENKO 5L", "id": 1},
        {"codigo": "002", "descricao": "TINTA ACRILICA 18L"}
    ]"#;
    let products: Vec<CatalogProduct> = serde_json::from_str(content).unwrap();
    assert_eq!(products[0].internal_id, Some(1));
    assert!(products[1].internal_id.is_none());
}

#[tokio::test]
async fn test_search_result_wire_shape() {
    let products = vec![CatalogProduct {
        code: "001".to_string(),
        description: "CERA ACRILICA RENKO 5L".to_string(),
        internal_id: Some(1),
        group_id: None,
    }];
    let matcher = HybridMatcher::new(products);

    let result = matcher.search(None, "001", 5, false, None).await;
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["query"], "001");
    assert_eq!(value["resultados"][0]["codigo"], "001");
    assert_eq!(value["resultados"][0]["metodo"], "codigo");
    assert_eq!(value["resultados"][0]["score"], 100);
    assert_eq!(value["melhor_match"]["score_final"], 100);
    assert_eq!(value["sugestao_cadastro"], false);
    assert_eq!(value["metricas"]["ia_utilizada"], false);

    let first = result.results.first().unwrap();
    assert_eq!(first.method, MatchMethod::ExactCode);
}
