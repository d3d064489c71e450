#[cfg(test)]
mod test {

    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;

    use crate::fetch::policy::LinkKind;
    use crate::tests::common::{build_agent, json, PASSWORD};
    use crate::utils::constants::{LOGIN_PATH, POLICY_PATH};

    async fn mock_login(server: &MockServer) {
        server
            .mock_async(|when, then| {
                when.method(POST).path(LOGIN_PATH);
                then.status(200).json_body(json!({"sessionkey": "sess-1"}));
            })
            .await;
    }

    #[tokio::test]
    async fn href_details_are_memoized_until_cleared() {
        let server = MockServer::start_async().await;
        mock_login(&server).await;
        let object_path = format!("{}/objects/realm-0a1", POLICY_PATH);
        let detail = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(object_path.as_str())
                    .header("authorization", "Bearer sess-1")
                    .header("accept", "application/json");
                then.status(200).json_body(json!({"data": {"id": "realm-0a1", "Name": "realm-a"}}));
            })
            .await;

        let agent = build_agent(&server.base_url(), Some(PASSWORD), 900);
        let absolute = server.url(&object_path);

        let first = agent.policy.fetch_by_href(&object_path, None).await;
        let second = agent.policy.fetch_by_href(&absolute, None).await;

        assert_eq!(first["data"]["Name"], "realm-a");
        assert_eq!(first, second);
        assert_eq!(detail.hits_async().await, 1);
        assert_eq!(agent.policy.list_cached_keys().await, vec![absolute.clone()]);

        agent.policy.clear_cache().await;
        assert!(agent.policy.list_cached_keys().await.is_empty());

        agent.policy.fetch_by_href(&absolute, None).await;
        assert_eq!(detail.hits_async().await, 2);
    }

    #[tokio::test]
    async fn failed_detail_is_not_cached() {
        let server = MockServer::start_async().await;
        mock_login(&server).await;
        let missing_path = format!("{}/objects/missing", POLICY_PATH);
        let missing = server
            .mock_async(|when, then| {
                when.method(GET).path(missing_path.as_str());
                then.status(404).json_body(json!({"error": "not found"}));
            })
            .await;

        let agent = build_agent(&server.base_url(), Some(PASSWORD), 900);

        assert_eq!(agent.policy.fetch_by_href(&missing_path, None).await, json!({}));
        assert_eq!(agent.policy.fetch_by_href(&missing_path, None).await, json!({}));
        assert_eq!(missing.hits_async().await, 2);
        assert!(agent.policy.list_cached_keys().await.is_empty());
    }

    #[tokio::test]
    async fn fetch_by_id_bypasses_the_cache() {
        let server = MockServer::start_async().await;
        mock_login(&server).await;
        let by_id = server
            .mock_async(|when, then| {
                when.method(GET).path(format!("{}/objects/42", POLICY_PATH));
                then.status(200).json_body(json!({"data": {"id": "42"}}));
            })
            .await;

        let agent = build_agent(&server.base_url(), Some(PASSWORD), 900);

        assert_eq!(
            agent.policy.build_object_id_url("42"),
            server.url(format!("{}/objects/42", POLICY_PATH))
        );
        assert_eq!(agent.policy.fetch_by_id("42", None).await["data"]["id"], "42");
        assert_eq!(agent.policy.fetch_by_id("42", None).await["data"]["id"], "42");
        assert_eq!(by_id.hits_async().await, 2);
        assert!(agent.policy.list_cached_keys().await.is_empty());
    }

    #[tokio::test]
    async fn search_sends_filter_expression() {
        let server = MockServer::start_async().await;
        mock_login(&server).await;
        let search = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(format!("{}/SmRealm", POLICY_PATH))
                    .query_param("filter", "Name = 'realm a'");
                then.status(200).json_body(json!({"data": [{"Name": "realm a"}]}));
            })
            .await;

        let agent = build_agent(&server.base_url(), Some(PASSWORD), 900);

        let found = agent.policy.search_filtered("SmRealm", "Name = 'realm a'", None).await;

        assert_eq!(found, vec![json!({"Name": "realm a"})]);
        assert_eq!(search.hits_async().await, 1);
    }

    #[tokio::test]
    async fn listing_without_data_field_is_empty() {
        let server = MockServer::start_async().await;
        mock_login(&server).await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("{}/SmDomain", POLICY_PATH));
                then.status(200).json_body(json!({"count": 0}));
            })
            .await;

        let agent = build_agent(&server.base_url(), Some(PASSWORD), 900);

        assert!(agent.policy.fetch_list("SmDomain", None).await.is_empty());
    }

    #[tokio::test]
    async fn non_json_body_counts_as_failure() {
        let server = MockServer::start_async().await;
        mock_login(&server).await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("{}/SmAgent", POLICY_PATH));
                then.status(200).body("not json");
            })
            .await;

        let agent = build_agent(&server.base_url(), Some(PASSWORD), 900);
        let url = agent.policy.class_url("SmAgent");

        assert!(matches!(
            agent.policy.fetcher().try_get(&url, None, 1).await,
            Err(crate::FetchError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn query_link_is_memoized_for_id_and_url() {
        let server = MockServer::start_async().await;
        mock_login(&server).await;
        let object_path = format!("{}/objects/realm-0a1", POLICY_PATH);
        let expanded = server
            .mock_async(|when, then| {
                when.method(GET).path(object_path.as_str()).query_param("op", "expanded");
                then.status(200).json_body(json!({"data": {"id": "realm-0a1", "expanded": true}}));
            })
            .await;

        let agent = build_agent(&server.base_url(), Some(PASSWORD), 900);
        let object_url = agent.policy.build_object_id_url("realm-0a1");
        let link_url = format!("{}?op=expanded", object_url);
        assert_eq!(agent.policy.link_url("realm-0a1", LinkKind::Expanded), link_url);

        let by_id = agent.policy.fetch_link("realm-0a1", LinkKind::Expanded, None).await;
        let by_url = agent.policy.fetch_link(&object_url, LinkKind::Expanded, None).await;

        assert_eq!(by_id["data"]["expanded"], true);
        assert_eq!(by_id, by_url);
        assert_eq!(expanded.hits_async().await, 1);
        assert_eq!(agent.policy.list_cached_keys().await, vec![link_url]);
    }

    #[tokio::test]
    async fn path_link_is_memoized_for_id_and_url() {
        let server = MockServer::start_async().await;
        mock_login(&server).await;
        let children_path = format!("{}/objects/domain-07/children", POLICY_PATH);
        let children = server
            .mock_async(|when, then| {
                when.method(GET).path(children_path.as_str());
                then.status(200).json_body(json!({"data": [{"id": "realm-1"}, {"id": "realm-2"}]}));
            })
            .await;

        let agent = build_agent(&server.base_url(), Some(PASSWORD), 900);
        let object_url = agent.policy.build_object_id_url("domain-07");

        let by_url = agent.policy.fetch_link(&object_url, LinkKind::Children, None).await;
        let by_id = agent.policy.fetch_link("domain-07", LinkKind::Children, None).await;

        assert_eq!(by_url["data"].as_array().map(Vec::len), Some(2));
        assert_eq!(by_id, by_url);
        assert_eq!(children.hits_async().await, 1);
        assert_eq!(agent.policy.list_cached_keys().await, vec![server.url(&children_path)]);
    }

    #[tokio::test]
    async fn search_with_details_prefetches_first_hits() {
        let server = MockServer::start_async().await;
        mock_login(&server).await;
        let hits: Vec<_> = (1..=4)
            .map(|n| json!({"Name": format!("realm {}", n), "href": format!("{}/objects/realm-{}", POLICY_PATH, n)}))
            .collect();
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(format!("{}/SmRealm", POLICY_PATH))
                    .query_param("filter", "Name = 'realm*'");
                then.status(200).json_body(json!({"data": hits}));
            })
            .await;
        let mut details = Vec::new();
        for n in 1..=4 {
            let path = format!("{}/objects/realm-{}", POLICY_PATH, n);
            details.push(
                server
                    .mock_async(|when, then| {
                        when.method(GET).path(path.as_str());
                        then.status(200).json_body(json!({"data": {"id": format!("realm-{}", n)}}));
                    })
                    .await,
            );
        }

        let agent = build_agent(&server.base_url(), Some(PASSWORD), 900);

        let found = agent.policy.search_with_details("SmRealm", "Name = 'realm*'", None).await;

        assert_eq!(found.items.len(), 4);
        assert_eq!(found.details.len(), 3);
        assert_eq!(found.details[0]["data"]["id"], "realm-1");
        assert_eq!(agent.policy.list_cached_keys().await.len(), 3);
        assert_eq!(details[3].hits_async().await, 0);

        // prefetched hrefs are served from the cache afterwards
        agent.policy.fetch_by_href(&format!("{}/objects/realm-2", POLICY_PATH), None).await;
        assert_eq!(details[1].hits_async().await, 1);
    }

    #[tokio::test]
    async fn session_field_in_object_body_is_plain_data() {
        let server = MockServer::start_async().await;
        mock_login(&server).await;
        let object_path = format!("{}/objects/agent-9", POLICY_PATH);
        server
            .mock_async(|when, then| {
                when.method(GET).path(object_path.as_str());
                then.status(200).json_body(json!({"session": false, "data": {"id": "agent-9"}}));
            })
            .await;

        let agent = build_agent(&server.base_url(), Some(PASSWORD), 900);

        let body = agent.policy.fetch_by_href(&object_path, None).await;
        assert_eq!(body["session"], false);
        assert_eq!(body["data"]["id"], "agent-9");
        assert_eq!(agent.session_status().await.unwrap()["session"], true);
    }
}
