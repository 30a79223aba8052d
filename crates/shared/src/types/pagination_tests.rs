use rstest::rstest;

use super::*;

#[test]
fn test_page_request_defaults() {
    let request = PageRequest::from_query(None, None, PageRequest::DEFAULT_LIMIT);
    assert_eq!(request, PageRequest::default());

    let users = PageRequest::from_query(None, None, 10);
    assert_eq!(users.limit, 10);
}

#[rstest]
#[case(Some(0), Some(20), 1, 20)]
#[case(Some(3), Some(0), 3, 1)]
#[case(Some(2), Some(500), 2, PageRequest::MAX_LIMIT)]
fn test_page_request_is_clamped(
    #[case] page: Option<u64>,
    #[case] limit: Option<u64>,
    #[case] expected_page: u64,
    #[case] expected_limit: u64,
) {
    let request = PageRequest::from_query(page, limit, 20);
    assert_eq!(request.page, expected_page);
    assert_eq!(request.limit, expected_limit);
}

#[rstest]
#[case(1, 20, 0)]
#[case(2, 20, 20)]
#[case(5, 10, 40)]
fn test_page_request_offset(#[case] page: u64, #[case] limit: u64, #[case] offset: u64) {
    assert_eq!(PageRequest { page, limit }.offset(), offset);
}

#[rstest]
#[case(0, 20, 0)]
#[case(20, 20, 1)]
#[case(21, 20, 2)]
#[case(25, 10, 3)]
fn test_page_count_rounds_up(#[case] total: u64, #[case] limit: u64, #[case] pages: u64) {
    let response: PageResponse<i32> = PageResponse::new(vec![], PageRequest { page: 1, limit }, total);
    assert_eq!(response.pagination.pages, pages);
}

#[test]
fn test_page_response_serializes_items_and_pagination() {
    let response = PageResponse::new(vec![1, 2, 3], PageRequest { page: 1, limit: 10 }, 3);
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["items"], serde_json::json!([1, 2, 3]));
    assert_eq!(
        json["pagination"],
        serde_json::json!({ "page": 1, "limit": 10, "total": 3, "pages": 1 })
    );
}

#[test]
fn test_page_response_map_keeps_meta() {
    let response = PageResponse::new(vec![1, 2], PageRequest { page: 2, limit: 2 }, 4);
    let mapped = response.map(|n| n * 10);
    assert_eq!(mapped.items, vec![10, 20]);
    assert_eq!(mapped.pagination.page, 2);
    assert_eq!(mapped.pagination.pages, 2);
}
