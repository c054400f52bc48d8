use agora_server::{app, config::AppConfig, in_memory_state};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app() -> Router {
    let state = in_memory_state(AppConfig::default()).unwrap();
    app(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", user));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: &Router, uri: &str, user: Option<&str>) -> (StatusCode, Value) {
    send(app, Method::GET, uri, user, None).await
}

async fn ensure_community(app: &Router, name: &str) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/communities",
        Some("founder"),
        Some(json!({ "name": name, "title": format!("All about {}", name) })),
    )
    .await;
    assert!(
        status == StatusCode::CREATED || status == StatusCode::CONFLICT,
        "{}",
        body
    );
}

async fn create_post_in(
    app: &Router,
    community: &str,
    user: &str,
    title: &str,
    content: &str,
) -> Value {
    ensure_community(app, community).await;
    let (status, body) = send(
        app,
        Method::POST,
        "/api/nodes",
        Some(user),
        Some(json!({
            "kind": "post",
            "community": community,
            "title": title,
            "content": content,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

async fn create_post(app: &Router, user: &str, title: &str, content: &str) -> Value {
    create_post_in(app, "general", user, title, content).await
}

async fn reply(app: &Router, user: &str, parent: &str, content: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/nodes",
        Some(user),
        Some(json!({ "parent_id": parent, "content": content })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn writes_require_a_user() {
    let app = test_app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/nodes",
        None,
        Some(json!({ "kind": "post", "title": "Hello", "content": "world" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn severe_content_is_rejected_and_not_stored() {
    let app = test_app();
    let post = create_post(&app, "alice", "Budget", "Where should the money go?").await;
    let tree = post["tree_id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/nodes",
        Some("bob"),
        Some(json!({ "parent_id": id_of(&post), "content": "just kill yourself" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, thread) = get(&app, &format!("/api/threads/{}", tree), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(thread.as_array().unwrap().len(), 1);
    assert!(thread[0]["children"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn caution_content_is_stored_and_censored_on_read() {
    let app = test_app();
    let post = create_post(&app, "alice", "Weather", "Rain again").await;
    let tree = post["tree_id"].as_str().unwrap().to_string();

    let comment = reply(&app, "bob", &id_of(&post), "this is shit").await;
    assert_eq!(comment["caution"], true);

    let (_, thread) = get(&app, &format!("/api/threads/{}", tree), None).await;
    let child = &thread[0]["children"][0];
    assert_eq!(child["content"], "this is ****");
    assert_eq!(child["depth"], 1);
}

#[tokio::test]
async fn reply_to_missing_parent_is_a_validation_error() {
    let app = test_app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/nodes",
        Some("bob"),
        Some(json!({ "parent_id": uuid::Uuid::new_v4(), "content": "hello?" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn vote_toggle_overwrite_and_clear() {
    let app = test_app();
    let post = create_post(&app, "alice", "Votes", "Try voting").await;
    let uri = format!("/api/nodes/{}/vote", id_of(&post));

    let vote = |value: i64| {
        send(&app, Method::POST, &uri, Some("bob"), Some(json!({ "value": value })))
    };

    let (status, body) = vote(1).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metrics"]["score"], 1);
    assert_eq!(body["user_vote"], 1);

    let (_, body) = vote(1).await;
    assert_eq!(body["metrics"]["score"], 0);
    assert_eq!(body["user_vote"], Value::Null);

    let (_, body) = vote(-1).await;
    assert_eq!(body["metrics"]["score"], -1);

    let (_, body) = vote(0).await;
    assert_eq!(body["metrics"]["score"], 0);

    let (status, _) = vote(2).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn thread_sorts_by_best_and_shows_viewer_vote() {
    let app = test_app();
    let post = create_post(&app, "alice", "Sorting", "Which reply wins?").await;
    let tree = post["tree_id"].as_str().unwrap().to_string();
    let post_id = id_of(&post);

    let first = reply(&app, "bob", &post_id, "first").await;
    let second = reply(&app, "carol", &post_id, "second").await;
    for voter in ["u1", "u2"] {
        send(
            &app,
            Method::POST,
            &format!("/api/nodes/{}/vote", id_of(&second)),
            Some(voter),
            Some(json!({ "value": 1 })),
        )
        .await;
    }

    // Root-level sort leaves replies in chronological order
    let (_, thread) = get(&app, &format!("/api/threads/{}?sort=best", tree), Some("u1")).await;
    assert_eq!(thread[0]["children"][0]["id"], id_of(&first));

    let (_, thread) = send(
        &app,
        Method::GET,
        &format!("/api/threads/{}?sort=best&recursive=true", tree),
        Some("u1"),
        None,
    )
    .await;
    let children = thread[0]["children"].as_array().unwrap();
    assert_eq!(children[0]["id"], id_of(&second));
    assert_eq!(children[0]["user_vote"], 1);
    assert_eq!(children[1]["user_vote"], Value::Null);

    // Unknown strategies fall back to chronological order
    let (status, thread) = send(
        &app,
        Method::GET,
        &format!("/api/threads/{}?sort=bogus&recursive=true", tree),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(thread[0]["children"][0]["id"], id_of(&first));
}

#[tokio::test]
async fn only_the_author_may_edit_or_delete() {
    let app = test_app();
    let post = create_post(&app, "alice", "Mine", "original").await;
    let uri = format!("/api/nodes/{}", id_of(&post));

    let edit = |user: &'static str, content: &'static str| {
        send(&app, Method::PATCH, &uri, Some(user), Some(json!({ "content": content })))
    };

    let (status, _) = edit("mallory", "hijacked").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = edit("alice", "edited").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "edited");

    let (status, _) = send(&app, Method::DELETE, &uri, Some("mallory"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn delete_tombstones_nodes_with_replies() {
    let app = test_app();
    let post = create_post(&app, "alice", "Gone soon", "delete me").await;
    let tree = post["tree_id"].as_str().unwrap().to_string();
    let comment = reply(&app, "bob", &id_of(&post), "a reply").await;

    let post_uri = format!("/api/nodes/{}", id_of(&post));
    let comment_uri = format!("/api/nodes/{}", id_of(&comment));

    let (status, body) = send(&app, Method::DELETE, &post_uri, Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "tombstone");

    let (_, body) = send(&app, Method::DELETE, &comment_uri, Some("bob"), None).await;
    assert_eq!(body["outcome"], "hard_delete");

    let (_, thread) = get(&app, &format!("/api/threads/{}", tree), None).await;
    assert_eq!(thread[0]["content"], "[deleted]");
    assert!(thread[0]["children"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn view_counter_increments() {
    let app = test_app();
    let post = create_post(&app, "alice", "Popular", "look at me").await;
    let uri = format!("/api/nodes/{}/view", id_of(&post));

    send(&app, Method::POST, &uri, None, None).await;
    let (status, body) = send(&app, Method::POST, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view_count"], 2);
}

#[tokio::test]
async fn topics_listing_and_hot_topics() {
    let app = test_app();
    let mut topic_ids = Vec::new();
    for title in ["Housing", "Transit", "Parks"] {
        let (status, topic) = send(
            &app,
            Method::POST,
            "/api/topics",
            Some("admin"),
            Some(json!({ "title": title })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        topic_ids.push(id_of(&topic));
    }

    // Transit gets two opinions, Housing one, Parks none
    for (topic, content) in [(1, "more buses"), (1, "more trams"), (0, "build more")] {
        let (status, opinion) = send(
            &app,
            Method::POST,
            "/api/nodes",
            Some("citizen"),
            Some(json!({
                "tree_id": topic_ids[topic],
                "kind": "opinion",
                "stance": "PRO",
                "content": content,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        send(
            &app,
            Method::POST,
            &format!("/api/nodes/{}/vote", id_of(&opinion)),
            Some("voter"),
            Some(json!({ "value": 1 })),
        )
        .await;
    }

    let (_, hot) = send(&app, Method::GET, "/api/topics/hot", None, None).await;
    let hot = hot.as_array().unwrap();
    assert_eq!(hot.len(), 2);
    assert_eq!(hot[0]["title"], "Transit");
    assert_eq!(hot[0]["count"], 2);
    assert_eq!(hot[1]["title"], "Housing");

    let (_, best) = send(&app, Method::GET, "/api/topics?sort=best", None, None).await;
    assert_eq!(best[0]["title"], "Transit");
    assert_eq!(best[0]["score"], 2);
    assert_eq!(best.as_array().unwrap().len(), 3);

    let (status, thread) = get(&app, &format!("/api/threads/{}", topic_ids[2]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(thread.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn communities_are_slugged_unique_and_alphabetical() {
    let app = test_app();
    for (name, title) in [("rust-lang", "Rust"), ("Gardening", "Allotments")] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/communities",
            Some("founder"),
            Some(json!({ "name": name, "title": title })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/communities",
        Some("founder"),
        Some(json!({ "name": "Rust-Lang", "title": "Rust again" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/communities",
        Some("founder"),
        Some(json!({ "name": "no spaces", "title": "Nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, listed) = send(&app, Method::GET, "/api/communities", None, None).await;
    let titles: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Allotments", "Rust"]);

    let (status, community) = get(&app, "/api/communities/gardening", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(community["name"], "Gardening");
}

#[tokio::test]
async fn posts_need_a_known_community() {
    let app = test_app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/nodes",
        Some("alice"),
        Some(json!({ "kind": "post", "title": "Loose", "content": "no home" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/nodes",
        Some("alice"),
        Some(json!({
            "kind": "post",
            "community": "missing",
            "title": "Lost",
            "content": "nobody here",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn claims_cannot_reply_to_posts() {
    let app = test_app();
    let post = create_post(&app, "alice", "Forum post", "talk here").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/nodes",
        Some("bob"),
        Some(json!({
            "kind": "claim",
            "parent_id": id_of(&post),
            "title": "Wrong place",
            "content": "claims start debates",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/nodes",
        Some("bob"),
        Some(json!({ "kind": "rebuttal", "content": "against what?" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn community_posts_are_listed_and_sorted() {
    let app = test_app();
    let soup = create_post_in(&app, "cooking", "alice", "Soup", "warm").await;
    let stew = create_post_in(&app, "cooking", "bob", "Stew", "warmer").await;
    create_post_in(&app, "baking", "carol", "Bread", "crusty").await;
    reply(&app, "dave", &id_of(&soup), "replies stay out of the listing").await;

    for _ in 0..2 {
        send(&app, Method::POST, &format!("/api/nodes/{}/view", id_of(&stew)), None, None).await;
    }

    let (status, posts) = get(&app, "/api/communities/cooking/posts?sort=views", None).await;
    assert_eq!(status, StatusCode::OK);
    let posts = posts.as_array().unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["id"], id_of(&stew));
    assert_eq!(posts[1]["id"], id_of(&soup));
    assert!(posts[1]["children"].as_array().unwrap().is_empty());

    let (_, posts) = get(&app, "/api/communities/cooking/posts?sort=alpha", None).await;
    assert_eq!(posts[0]["title"], "Soup");

    let (status, _) = get(&app, "/api/communities/nowhere/posts", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
