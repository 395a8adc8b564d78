//! Query pipeline integration tests

mod common;

use std::sync::Arc;

use assets::{AssetError, MimeFilter, QueryRequest, RawQuery};
use common::{CountingStore, StaticCaller, StubProvider, photo, service};
use serde_json::json;

fn request(provider: Option<&str>, query: serde_json::Value) -> QueryRequest {
    QueryRequest {
        provider: provider.map(str::to_string),
        parent: None,
        query: serde_json::from_value::<RawQuery>(query).unwrap(),
    }
}

#[tokio::test]
async fn reconciles_items_with_local_records() {
    let store = Arc::new(CountingStore::default());
    let existing = store.seed("a2").await;
    let provider = Arc::new(StubProvider::new(
        "dam",
        vec![photo("a1"), photo("a2"), photo("a3")],
    ));
    let service = service(vec![provider], store.clone());

    let collection = service
        .request_items(&StaticCaller::uploader(), request(None, json!({})))
        .await
        .unwrap();

    let ids: Vec<&str> = collection.iter().map(|item| item.id.as_str()).collect();
    let local = existing.id.to_string();
    assert_eq!(ids, ["a1", local.as_str(), "a3"]);

    let matched = &collection.items()[1];
    assert!(matched.exists_locally);
    assert_eq!(matched.local_id, Some(existing.id));
    assert!(!collection.items()[0].exists_locally);
    assert!(collection.iter().all(|item| item.provider_id == "dam"));

    assert_eq!(store.batch_lookups(), 1);
}

#[tokio::test]
async fn page_size_overflow_fails_without_lookup() {
    let store = Arc::new(CountingStore::default());
    let mut provider = StubProvider::new("dam", vec![photo("a"), photo("b"), photo("c")]);
    provider.overflow = true;
    let service = service(vec![Arc::new(provider)], store.clone());

    let err = service
        .request_items(
            &StaticCaller::uploader(),
            request(None, json!({"posts_per_page": 2})),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        AssetError::ProviderContractViolation {
            page_size: 2,
            returned: 3
        }
    );
    assert_eq!(store.batch_lookups(), 0);
}

#[tokio::test]
async fn non_positive_page_size_means_no_cap() {
    let store = Arc::new(CountingStore::default());
    let mut provider = StubProvider::new("dam", vec![photo("a"), photo("b"), photo("c")]);
    provider.overflow = true;
    let service = service(vec![Arc::new(provider)], store);

    for size in [json!(0), json!(-1)] {
        let collection = service
            .request_items(
                &StaticCaller::uploader(),
                request(None, json!({"page_size": size})),
            )
            .await
            .unwrap();
        assert_eq!(collection.len(), 3);
    }
}

#[tokio::test]
async fn empty_results_skip_reconciliation() {
    let store = Arc::new(CountingStore::default());
    let service = service(vec![Arc::new(StubProvider::new("dam", vec![]))], store.clone());

    let collection = service
        .request_items(&StaticCaller::uploader(), request(None, json!({"s": "none"})))
        .await
        .unwrap();

    assert!(collection.is_empty());
    assert_eq!(store.batch_lookups(), 0);
}

#[tokio::test]
async fn resolves_default_and_explicit_providers() {
    let store = Arc::new(CountingStore::default());
    let first = Arc::new(StubProvider::new("first", vec![photo("f")]));
    let second = Arc::new(StubProvider::new("second", vec![photo("s")]));
    let service = service(vec![first.clone(), second.clone()], store);
    let caller = StaticCaller::uploader();

    let default = service
        .request_items(&caller, request(None, json!({})))
        .await
        .unwrap();
    assert_eq!(default.items()[0].provider_id, "first");

    let explicit = service
        .request_items(&caller, request(Some("second"), json!({})))
        .await
        .unwrap();
    assert_eq!(explicit.items()[0].provider_id, "second");

    let err = service
        .request_items(&caller, request(Some("missing"), json!({})))
        .await
        .unwrap_err();
    assert_eq!(err, AssetError::ProviderNotFound("missing".to_string()));
}

#[tokio::test]
async fn empty_registry_has_no_default() {
    let service = service(vec![], Arc::new(CountingStore::default()));

    let err = service
        .request_items(&StaticCaller::uploader(), request(None, json!({})))
        .await
        .unwrap_err();
    assert_eq!(err, AssetError::NoProviderConfigured);
}

#[tokio::test]
async fn authorization_runs_before_the_provider() {
    let provider = Arc::new(StubProvider::new("dam", vec![photo("a")]));
    let service = service(vec![provider.clone()], Arc::new(CountingStore::default()));

    let err = service
        .request_items(&StaticCaller::reader(), request(None, json!({})))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "authorization_error");

    let parent = assets::LocalId::new();
    let mut with_parent = request(None, json!({}));
    with_parent.parent = Some(parent);
    let err = service
        .request_items(&StaticCaller::uploader(), with_parent.clone())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "authorization_error");

    let editor = StaticCaller {
        editable: vec![parent],
        ..StaticCaller::uploader()
    };
    assert!(service.request_items(&editor, with_parent).await.is_ok());
    assert_eq!(provider.query_count(), 1);
}

#[tokio::test]
async fn normalizes_arguments_before_delegating() {
    let provider = Arc::new(StubProvider::new("dam", vec![photo("a")]));
    let service = service(vec![provider.clone()], Arc::new(CountingStore::default()));
    let caller = StaticCaller::uploader();

    let mut filters = Vec::new();
    for mime in [json!("image,video"), json!(["image", "video"])] {
        service
            .request_items(
                &caller,
                request(None, json!({"paged": "3", "post_mime_type": mime, "order": "asc"})),
            )
            .await
            .unwrap();
        let query = provider.last_query().unwrap();
        assert_eq!(query.page, 3);
        filters.push(query.mime_type_filter);
    }
    assert_eq!(filters[0], filters[1]);
    assert_eq!(filters[0], Some(MimeFilter::new(["image", "video"])));

    let err = service
        .request_items(&caller, request(None, json!({"paged": 0})))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "validation_error");

    let err = service
        .request_items(&caller, request(None, json!({"monthnum": 13})))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "validation_error");
    assert_eq!(provider.query_count(), 2);
}

#[tokio::test]
async fn single_item_requests_are_reconciled() {
    let store = Arc::new(CountingStore::default());
    let existing = store.seed("a2").await;
    let mut provider = StubProvider::new("dam", vec![photo("a1"), photo("a2")]);
    provider.single = true;
    let service = service(vec![Arc::new(provider)], store);
    let caller = StaticCaller::uploader();

    let fresh = service.request_item(&caller, None, "a1").await.unwrap();
    assert_eq!(fresh.id, "a1");
    assert!(!fresh.exists_locally);
    assert_eq!(fresh.provider_id, "dam");

    let known = service.request_item(&caller, Some("dam"), "a2").await.unwrap();
    assert!(known.exists_locally);
    assert_eq!(known.local_id, Some(existing.id));

    let err = service.request_item(&caller, None, "zzz").await.unwrap_err();
    assert!(matches!(
        err,
        AssetError::ProviderRequest {
            status: Some(404),
            ..
        }
    ));
}

#[tokio::test]
async fn single_item_requests_need_the_contract() {
    let service = service(
        vec![Arc::new(StubProvider::new("dam", vec![photo("a")]))],
        Arc::new(CountingStore::default()),
    );

    let err = service
        .request_item(&StaticCaller::uploader(), None, "a")
        .await
        .unwrap_err();
    assert_eq!(err.code(), "unsupported");
}
