use listing_service::{
    InMemoryListingStore, ListingError, ListingId, ListingQuery, ListingQueryParams,
    ListingService, ListingUpdate, NewListing, SortOrder,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

fn new_service() -> ListingService {
    ListingService::new(Arc::new(InMemoryListingStore::new()))
}

fn listing(project: &str, unit_name: &str, unit_number: i64) -> NewListing {
    NewListing {
        user_id: None,
        project_name: project.to_string(),
        unit_name: unit_name.to_string(),
        unit_number,
        description: format!("{} in {}", unit_name, project),
        address: "7 Marina Boulevard".to_string(),
        sell: true,
        rent: false,
        parking_spot: true,
        furnished: false,
        offer: false,
        beds: 2,
        baths: 2,
        regular_price: 325_000.0,
    }
}

async fn seed(service: &ListingService, count: i64) -> Vec<ListingId> {
    let mut ids = Vec::new();
    for i in 1..=count {
        let id = service
            .create(listing("Marina Heights", &format!("MH-{:02}", i), 1000 + i))
            .await
            .unwrap();
        ids.push(id);
    }
    ids
}

async fn all(service: &ListingService, order: SortOrder) -> Vec<listing_service::Listing> {
    service
        .query(&ListingQuery::default().with_order(order).page(0, 100))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_created_listings_have_unique_names_and_numbers() {
    let service = new_service();
    seed(&service, 12).await;
    // Collisions on either field must be rejected.
    assert_err!(service.create(listing("Other", "MH-03", 5000)).await);
    assert_err!(service.create(listing("Other", "Fresh", 1003)).await);

    let listings = all(&service, SortOrder::Desc).await;
    let names: HashSet<_> = listings.iter().map(|l| l.unit_name.clone()).collect();
    let numbers: HashSet<_> = listings.iter().map(|l| l.unit_number).collect();
    assert_eq!(listings.len(), 12);
    assert_eq!(names.len(), listings.len());
    assert_eq!(numbers.len(), listings.len());
}

#[tokio::test]
async fn test_duplicate_unit_name_persists_nothing() {
    let service = new_service();
    service.create(listing("Sunrise", "SR-1", 1)).await.unwrap();

    let err = service.create(listing("Elsewhere", "SR-1", 2)).await.unwrap_err();
    assert!(matches!(err, ListingError::DuplicateUnitName { ref unit_name } if unit_name == "SR-1"));
    assert_eq!(all(&service, SortOrder::Desc).await.len(), 1);
}

#[tokio::test]
async fn test_duplicate_unit_name_wins_over_duplicate_number() {
    let service = new_service();
    service.create(listing("Sunrise", "SR-1", 1)).await.unwrap();

    let err = service.create(listing("Sunrise", "SR-1", 1)).await.unwrap_err();
    assert!(matches!(err, ListingError::DuplicateUnitName { .. }));
}

#[tokio::test]
async fn test_duplicate_unit_number_with_unique_name() {
    let service = new_service();
    service.create(listing("Sunrise", "SR-1", 1)).await.unwrap();

    let err = service.create(listing("Sunrise", "SR-2", 1)).await.unwrap_err();
    assert!(matches!(err, ListingError::DuplicateUnitNumber { unit_number: 1 }));
    assert_eq!(all(&service, SortOrder::Desc).await.len(), 1);
}

#[tokio::test]
async fn test_numeric_search_matches_unit_number_exactly() {
    let service = new_service();
    let target = service.create(listing("Harbour", "H-A", 101)).await.unwrap();
    service.create(listing("Tower 101", "T-1", 5)).await.unwrap();
    service.create(listing("Harbour", "Unit 101", 6)).await.unwrap();
    service.create(listing("Harbour", "H-B", 1010)).await.unwrap();

    let params = ListingQueryParams {
        search_term: Some(" 101 ".to_string()),
        ..Default::default()
    };
    let result = service.search(&params).await.unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, target);
    assert_eq!(result[0].unit_number, 101);
}

#[tokio::test]
async fn test_text_search_is_case_insensitive_over_project_and_unit_name() {
    let service = new_service();
    service.create(listing("SUNRISE Residences", "A-1", 1)).await.unwrap();
    service.create(listing("Lakeside", "Sunrise Loft", 2)).await.unwrap();
    service.create(listing("Lakeside", "Sunset Loft", 3)).await.unwrap();
    service.create(listing("Harbour", "H-1", 4)).await.unwrap();

    let params = ListingQueryParams {
        search_term: Some("sunrise".to_string()),
        ..Default::default()
    };
    let result = service.search(&params).await.unwrap();

    let mut names: Vec<_> = result.iter().map(|l| l.unit_name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["A-1", "Sunrise Loft"]);
}

#[tokio::test]
async fn test_blank_search_term_applies_no_filter() {
    let service = new_service();
    seed(&service, 4).await;

    let params = ListingQueryParams {
        search_term: Some("   ".to_string()),
        ..Default::default()
    };
    assert_eq!(service.search(&params).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_second_page_is_records_ten_to_eighteen() {
    let service = new_service();
    seed(&service, 20).await;
    let everything = all(&service, SortOrder::Desc).await;

    let params = ListingQueryParams {
        start_index: Some("9".to_string()),
        limit: Some("9".to_string()),
        ..Default::default()
    };
    let page = service.search(&params).await.unwrap();

    assert_eq!(page.len(), 9);
    assert_eq!(page, everything[9..18].to_vec());

    let last = service
        .query(&ListingQuery::default().page(18, 9))
        .await
        .unwrap();
    assert_eq!(last.len(), 2, "a short page signals the end of the data");
}

#[tokio::test]
async fn test_typed_query_zero_limit_uses_default_page() {
    let service = new_service();
    seed(&service, 12).await;

    let page = service
        .query(&ListingQuery::default().page(0, 0))
        .await
        .unwrap();
    assert_eq!(page.len(), 9);

    let capped = new_service().with_max_page_size(5);
    seed(&capped, 12).await;
    let page = capped
        .query(&ListingQuery::default().page(0, 1000))
        .await
        .unwrap();
    assert_eq!(page.len(), 5);
}

#[tokio::test]
async fn test_default_page_size_is_nine() {
    let service = new_service();
    seed(&service, 12).await;
    let page = service.search(&ListingQueryParams::default()).await.unwrap();
    assert_eq!(page.len(), 9);
}

#[tokio::test]
async fn test_ordering_by_updated_at() {
    let service = new_service();
    let ids = seed(&service, 6).await;

    let asc = all(&service, SortOrder::Asc).await;
    assert!(asc.windows(2).all(|w| w[0].updated_at <= w[1].updated_at));
    assert_eq!(asc.first().unwrap().id, ids[0]);

    let desc = service.search(&ListingQueryParams::default()).await.unwrap();
    assert!(desc.windows(2).all(|w| w[0].updated_at >= w[1].updated_at));
    assert_eq!(desc.first().unwrap().id, ids[5]);

    let explicit_desc = ListingQueryParams {
        order: Some("desc".to_string()),
        ..Default::default()
    };
    assert_eq!(service.search(&explicit_desc).await.unwrap(), desc);
}

#[tokio::test]
async fn test_update_refreshes_updated_at_and_reorders() {
    let service = new_service();
    let ids = seed(&service, 3).await;
    let before = service.get(&ids[0]).await.unwrap();

    let update = ListingUpdate {
        regular_price: Some(299_000.0),
        offer: Some(true),
        ..Default::default()
    };
    assert_eq!(service.update(&ids[0], update).await.unwrap(), ids[0]);

    let after = service.get(&ids[0]).await.unwrap();
    assert!(after.updated_at > before.updated_at);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(after.regular_price, 299_000.0);
    assert!(after.offer);
    assert_eq!(after.unit_name, before.unit_name);

    let newest = service.search(&ListingQueryParams::default()).await.unwrap();
    assert_eq!(newest[0].id, ids[0]);
}

#[tokio::test]
async fn test_update_missing_listing_leaves_store_unchanged() {
    let service = new_service();
    seed(&service, 3).await;
    let snapshot = all(&service, SortOrder::Asc).await;

    let update = ListingUpdate {
        beds: Some(9),
        ..Default::default()
    };
    let err = service
        .update(&ListingId::from("000000000000000000000000"), update)
        .await
        .unwrap_err();

    assert!(matches!(err, ListingError::NotFound { .. }));
    assert_eq!(all(&service, SortOrder::Asc).await, snapshot);
}

#[tokio::test]
async fn test_update_cannot_introduce_duplicate_unit_name() {
    let service = new_service();
    let ids = seed(&service, 2).await;

    let update = ListingUpdate {
        unit_name: Some("MH-01".to_string()),
        ..Default::default()
    };
    let err = service.update(&ids[1], update).await.unwrap_err();
    assert!(matches!(err, ListingError::DuplicateUnitName { .. }));
    assert_eq!(service.get(&ids[1]).await.unwrap().unit_name, "MH-02");
}

#[tokio::test]
async fn test_delete_then_find_returns_nothing() {
    let service = new_service();
    let ids = seed(&service, 2).await;

    assert_ok!(service.delete(&ids[0]).await);
    assert!(service.find_by_id(&ids[0]).await.unwrap().is_none());
    assert!(service.find_by_id(&ids[1]).await.unwrap().is_some());

    // Retrying the delete degrades to NotFound.
    let err = service.delete(&ids[0]).await.unwrap_err();
    assert!(matches!(err, ListingError::NotFound { .. }));
}

#[tokio::test]
async fn test_delete_unknown_id_is_not_found() {
    let service = new_service();
    let err = service.delete(&ListingId::from("ffffffffffffffffffffffff")).await.unwrap_err();
    assert!(matches!(err, ListingError::NotFound { .. }));
}

#[tokio::test]
async fn test_create_then_find_round_trip() {
    let service = new_service();
    let mut candidate = listing("Sunrise", "SR-9", 909);
    candidate.user_id = Some("agent-42".to_string());
    candidate.furnished = true;

    let id = service.create(candidate.clone()).await.unwrap();
    let stored = service.find_by_id(&id).await.unwrap().unwrap();

    assert_eq!(stored.id, id);
    assert_eq!(stored.user_id, candidate.user_id);
    assert_eq!(stored.project_name, candidate.project_name);
    assert_eq!(stored.unit_name, candidate.unit_name);
    assert_eq!(stored.unit_number, candidate.unit_number);
    assert_eq!(stored.description, candidate.description);
    assert_eq!(stored.address, candidate.address);
    assert_eq!(stored.sell, candidate.sell);
    assert_eq!(stored.rent, candidate.rent);
    assert_eq!(stored.parking_spot, candidate.parking_spot);
    assert_eq!(stored.furnished, candidate.furnished);
    assert_eq!(stored.offer, candidate.offer);
    assert_eq!(stored.beds, candidate.beds);
    assert_eq!(stored.baths, candidate.baths);
    assert_eq!(stored.regular_price, candidate.regular_price);
    assert_eq!(stored.created_at, stored.updated_at);
}

#[tokio::test]
async fn test_user_and_listing_filters_combine_with_search() {
    let service = new_service();
    let mut mine = listing("Sunrise", "SR-1", 1);
    mine.user_id = Some("agent-1".to_string());
    let mine_id = service.create(mine).await.unwrap();

    let mut theirs = listing("Sunrise", "SR-2", 2);
    theirs.user_id = Some("agent-2".to_string());
    service.create(theirs).await.unwrap();
    service.create(listing("Sunrise", "SR-3", 3)).await.unwrap();

    let by_user = ListingQueryParams {
        user_id: Some("agent-1".to_string()),
        search_term: Some("sun".to_string()),
        ..Default::default()
    };
    let result = service.search(&by_user).await.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, mine_id);

    let by_id = ListingQueryParams {
        listing_id: Some(mine_id.to_string()),
        search_term: Some("no-such-project".to_string()),
        ..Default::default()
    };
    assert!(service.search(&by_id).await.unwrap().is_empty());

    let by_id_only = ListingQueryParams {
        listing_id: Some(mine_id.to_string()),
        ..Default::default()
    };
    assert_eq!(service.search(&by_id_only).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_flag_filters() {
    let service = new_service();
    let mut offered = listing("Harbour", "H-1", 1);
    offered.offer = true;
    offered.rent = true;
    service.create(offered).await.unwrap();
    service.create(listing("Harbour", "H-2", 2)).await.unwrap();

    let params = ListingQueryParams {
        offer: Some("true".to_string()),
        ..Default::default()
    };
    let result = service.search(&params).await.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].unit_name, "H-1");

    let params = ListingQueryParams {
        rent: Some("false".to_string()),
        parking_spot: Some("true".to_string()),
        ..Default::default()
    };
    let result = service.search(&params).await.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].unit_name, "H-2");
}
