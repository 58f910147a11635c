use super::*;

fn config() -> QueryConfig {
    QueryConfig::new("https://x/api/people").with_search_param("search")
}

/// Drives the initial fetch for page 1 to a successful response.
fn ready_state(total_count: u64, items: Vec<u32>) -> QueryState<u32> {
    let config = config();
    let mut state = QueryState::new();
    let key = state.next_fetch(&config).expect("initial fetch");
    reduce(&mut state, &config, Action::RequestSent(key.clone()));
    reduce(
        &mut state,
        &config,
        Action::ResponseOk {
            key,
            items,
            total_count,
        },
    );
    state
}

fn respond(state: &mut QueryState<u32>, key: QueryKey, items: Vec<u32>, total_count: u64) {
    reduce(
        state,
        &config(),
        Action::ResponseOk {
            key,
            items,
            total_count,
        },
    );
}

#[test]
fn initial_state_is_loading_on_page_one() {
    let state: QueryState<u32> = QueryState::new();
    assert_eq!(state.status, QueryStatus::Loading);
    assert_eq!(state.page, 1);
    assert_eq!(state.search_term, "");
    assert_eq!(state.next_fetch(&config()), Some(QueryKey::new(1, "")));
}

#[test]
fn single_full_page_has_one_page_and_next_is_a_no_op() {
    let mut state = ready_state(10, (0..10).collect());
    assert_eq!(state.status, QueryStatus::Ready);
    assert_eq!(state.items.len(), 10);
    assert_eq!(state.total_pages, 1);

    let fetch = reduce(&mut state, &config(), Action::SetPage(2));
    assert_eq!(fetch, None);
    assert_eq!(state.page, 1);
    assert!(!state.snapshot().has_next_page());
}

#[test]
fn empty_result_is_ready_with_zero_pages() {
    let state = ready_state(0, Vec::new());
    let snapshot = state.snapshot();
    assert_eq!(snapshot.status, QueryStatus::Ready);
    assert!(snapshot.items.is_empty());
    assert_eq!(snapshot.total_pages, 0);
    assert!(snapshot.is_empty());
}

#[test]
fn loading_and_error_are_not_reported_as_empty() {
    let mut state: QueryState<u32> = QueryState::new();
    assert!(!state.snapshot().is_empty());

    let key = state.next_fetch(&config()).expect("fetch");
    reduce(&mut state, &config(), Action::RequestSent(key.clone()));
    reduce(
        &mut state,
        &config(),
        Action::ResponseErr {
            key,
            error: FetchError::Page {
                url: "https://x/api/people?page=1".into(),
            },
        },
    );
    assert_eq!(state.status, QueryStatus::Error);
    assert!(!state.snapshot().is_empty());
}

#[test]
fn set_page_clamps_low_values_to_one() {
    let mut state = ready_state(30, vec![1]);
    reduce(&mut state, &config(), Action::SetPage(0));
    assert_eq!(state.page, 1);
    reduce(&mut state, &config(), Action::SetPage(-5));
    assert_eq!(state.page, 1);
}

#[test]
fn set_page_clamps_high_values_to_total_pages() {
    let mut state = ready_state(30, vec![1]);
    assert_eq!(state.total_pages, 3);

    let fetch = reduce(&mut state, &config(), Action::SetPage(10_000));
    assert_eq!(state.page, 3);
    assert_eq!(fetch, Some(QueryKey::new(3, "")));
}

#[test]
fn set_page_is_ignored_without_known_pages() {
    let mut state: QueryState<u32> = QueryState::new();
    assert_eq!(reduce(&mut state, &config(), Action::SetPage(4)), None);
    assert_eq!(state.page, 1);
}

#[test]
fn total_pages_rounds_up() {
    assert_eq!(total_pages(0, 10), 0);
    assert_eq!(total_pages(1, 10), 1);
    assert_eq!(total_pages(10, 10), 1);
    assert_eq!(total_pages(82, 10), 9);
    assert_eq!(total_pages(5, 0), 5);
}

#[test]
fn search_input_resets_page_and_waits_for_settle() {
    let mut state = ready_state(30, vec![1]);
    let key = reduce(&mut state, &config(), Action::SetPage(3)).expect("page fetch");
    reduce(&mut state, &config(), Action::RequestSent(key.clone()));
    respond(&mut state, key, vec![3], 30);

    assert_eq!(
        reduce(&mut state, &config(), Action::SetSearchTerm("lu".into())),
        None
    );
    assert_eq!(state.page, 1);
    assert_eq!(state.search_term, "lu");
    assert_eq!(state.settled_term, "");

    assert_eq!(
        reduce(&mut state, &config(), Action::SetSearchTerm("luke".into())),
        None
    );
    assert_eq!(
        reduce(&mut state, &config(), Action::SearchSettled("luke".into())),
        Some(QueryKey::new(1, "luke"))
    );
}

#[test]
fn superseded_settle_is_ignored() {
    let mut state = ready_state(30, vec![1]);
    reduce(&mut state, &config(), Action::SetSearchTerm("l".into()));
    reduce(&mut state, &config(), Action::SetSearchTerm("le".into()));

    assert_eq!(
        reduce(&mut state, &config(), Action::SearchSettled("l".into())),
        None
    );
    assert_eq!(state.settled_term, "");
}

#[test]
fn search_edit_reverted_before_settle_only_refetches_page_one() {
    let mut state = ready_state(30, vec![1]);
    let key = reduce(&mut state, &config(), Action::SetPage(2)).expect("page fetch");
    reduce(&mut state, &config(), Action::RequestSent(key));

    reduce(&mut state, &config(), Action::SetSearchTerm("x".into()));
    let fetch = reduce(&mut state, &config(), Action::SetSearchTerm(String::new()));
    assert_eq!(fetch, Some(QueryKey::new(1, "")));
}

#[test]
fn search_term_is_ignored_without_search_param() {
    let config = QueryConfig::new("https://x/api/planets");
    let mut state: QueryState<u32> = QueryState::new();
    let key = state.next_fetch(&config).expect("fetch");
    reduce(&mut state, &config, Action::RequestSent(key));

    reduce(&mut state, &config, Action::SetSearchTerm("hoth".into()));
    assert_eq!(
        reduce(&mut state, &config, Action::SearchSettled("hoth".into())),
        None
    );
}

#[test]
fn stale_response_is_discarded() {
    let mut state = ready_state(30, vec![1]);
    let page_two = reduce(&mut state, &config(), Action::SetPage(2)).expect("fetch");
    reduce(&mut state, &config(), Action::RequestSent(page_two.clone()));
    let page_three = reduce(&mut state, &config(), Action::SetPage(3)).expect("fetch");
    reduce(&mut state, &config(), Action::RequestSent(page_three.clone()));

    respond(&mut state, page_three, vec![3], 30);
    respond(&mut state, page_two.clone(), vec![2], 30);
    assert_eq!(state.items, vec![3]);

    reduce(
        &mut state,
        &config(),
        Action::ResponseErr {
            key: page_two,
            error: FetchError::Page { url: "late".into() },
        },
    );
    assert_eq!(state.status, QueryStatus::Ready);
    assert_eq!(state.items, vec![3]);
}

#[test]
fn refetch_keeps_previous_items_visible() {
    let mut state = ready_state(30, vec![1, 2]);
    let key = reduce(&mut state, &config(), Action::SetPage(2)).expect("fetch");
    reduce(&mut state, &config(), Action::RequestSent(key));

    let snapshot = state.snapshot();
    assert_eq!(snapshot.status, QueryStatus::Ready);
    assert!(snapshot.refreshing);
    assert_eq!(snapshot.items, vec![1, 2]);
    assert_eq!(snapshot.total_pages, 3);
}

#[test]
fn error_clears_items_and_next_fetch_shows_loading() {
    let mut state = ready_state(30, vec![1, 2]);
    let key = reduce(&mut state, &config(), Action::SetPage(2)).expect("fetch");
    reduce(&mut state, &config(), Action::RequestSent(key.clone()));
    let error = FetchError::Page {
        url: "https://x/api/people?page=2".into(),
    };
    reduce(
        &mut state,
        &config(),
        Action::ResponseErr {
            key,
            error: error.clone(),
        },
    );

    assert_eq!(state.status, QueryStatus::Error);
    assert!(state.items.is_empty());
    assert_eq!(state.error, Some(error));
    assert_eq!(state.total_pages, 3);

    let retry = reduce(&mut state, &config(), Action::SetPage(3)).expect("fetch");
    reduce(&mut state, &config(), Action::RequestSent(retry));
    assert_eq!(state.status, QueryStatus::Loading);
    assert!(!state.snapshot().refreshing);
}

#[test]
fn request_url_appends_search_before_page() {
    let url = request_url(&config(), &QueryKey::new(2, "luke")).expect("url");
    assert_eq!(url, "https://x/api/people?search=luke&page=2");

    let url = request_url(&config(), &QueryKey::new(1, "")).expect("url");
    assert_eq!(url, "https://x/api/people?page=1");
}

#[test]
fn request_url_preserves_existing_parameters() {
    let config = QueryConfig::new("https://x/api/people?format=json").with_search_param("search");
    let url = request_url(&config, &QueryKey::new(1, "r2")).expect("url");
    assert_eq!(url, "https://x/api/people?format=json&search=r2&page=1");
}

#[test]
fn request_url_rejects_invalid_source() {
    let config = QueryConfig::new("not a url");
    let err = request_url(&config, &QueryKey::new(1, "")).expect_err("must fail");
    assert_eq!(
        err,
        FetchError::Page {
            url: "not a url".into()
        }
    );
}

#[test]
fn snapshot_is_settled_only_without_pending_work() {
    let mut state = ready_state(30, vec![1]);
    assert!(state.snapshot().is_settled());

    reduce(&mut state, &config(), Action::SetSearchTerm("han".into()));
    let pending = state.snapshot();
    assert!(pending.search_pending);
    assert!(!pending.is_settled());

    let key = reduce(&mut state, &config(), Action::SearchSettled("han".into())).expect("fetch");
    reduce(&mut state, &config(), Action::RequestSent(key.clone()));
    assert!(!state.snapshot().search_pending);
    assert!(!state.snapshot().is_settled());

    respond(&mut state, key, vec![7], 1);
    assert!(state.snapshot().is_settled());
}

#[test]
fn next_and_previous_step_from_the_applied_page() {
    let mut state = ready_state(30, vec![1]);

    assert_eq!(
        reduce(&mut state, &config(), Action::NextPage),
        Some(QueryKey::new(2, ""))
    );
    assert_eq!(
        reduce(&mut state, &config(), Action::NextPage),
        Some(QueryKey::new(3, ""))
    );
    assert_eq!(reduce(&mut state, &config(), Action::NextPage), None);
    assert_eq!(state.page, 3);

    assert_eq!(
        reduce(&mut state, &config(), Action::PreviousPage),
        Some(QueryKey::new(2, ""))
    );
    assert_eq!(state.page, 2);
}

#[test]
fn previous_page_stops_at_one_and_ignores_unknown_totals() {
    let mut state = ready_state(30, vec![1]);
    assert_eq!(reduce(&mut state, &config(), Action::PreviousPage), None);
    assert_eq!(state.page, 1);

    let mut fresh: QueryState<u32> = QueryState::new();
    assert_eq!(reduce(&mut fresh, &config(), Action::NextPage), None);
    assert_eq!(fresh.page, 1);
}
