use crate::helpers::{spawn_app, spawn_app_with, ScriptedJobSearch, ScriptedReply};
use jobscoop::jobs::Posting;
use serde_json::{json, Value};

const EMAIL: &str = "ursula_le_guin@gmail.com";

fn subscribe_body(subscriptions: Value) -> Value {
    json!({ "email": EMAIL, "subscriptions": subscriptions })
}

#[tokio::test]
async fn jobs_returns_only_postings_matching_the_subscription() {
    // arrange
    let mut listed_posting = Posting::new("Acme Corp", "Backend Engineer, Platform");
    listed_posting
        .extra
        .insert("location".into(), json!("Remote"));
    let search = ScriptedJobSearch::default().reply(
        "Backend Engineer",
        "Acme",
        ScriptedReply::Postings(vec![
            listed_posting,
            Posting::new("Other Inc", "Backend Engineer"),
        ]),
    );
    let app = spawn_app_with(search).await;
    app.add_user(EMAIL);
    app.save_subscriptions(&subscribe_body(json!([
        {"companyName": "Acme", "roleNames": ["Backend Engineer"]}
    ])))
    .await;

    // act
    let response = app.jobs(EMAIL).await;

    // assert
    assert_eq!(200, response.status().as_u16());
    let feed: Value = response.json().await.unwrap();
    assert_eq!(
        feed["jobs"],
        json!([{
            "company": "Acme Corp",
            "title": "Backend Engineer, Platform",
            "location": "Remote"
        }])
    );
    assert_eq!(feed["failures"], json!([]));

    let received = app.job_search.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].phrase, "Backend Engineer AND Acme");
    assert_eq!(received[0].page, 1);
}

#[tokio::test]
async fn inactive_subscriptions_are_not_searched() {
    // arrange
    let app = spawn_app().await;
    app.add_user(EMAIL);
    app.save_subscriptions(&subscribe_body(json!([
        {"companyName": "Acme", "roleNames": ["Backend"]}
    ])))
    .await;
    app.update_subscriptions(&subscribe_body(json!([
        {"companyName": "Acme", "active": false}
    ])))
    .await;

    // act
    let response = app.jobs(EMAIL).await;

    // assert
    assert_eq!(200, response.status().as_u16());
    let feed: Value = response.json().await.unwrap();
    assert_eq!(feed["jobs"], json!([]));
    assert!(app.job_search.received().is_empty());
}

#[tokio::test]
async fn one_failing_search_is_reported_next_to_the_other_results() {
    // arrange
    let search = ScriptedJobSearch::default()
        .reply(
            "Backend",
            "Acme",
            ScriptedReply::Postings(vec![Posting::new("Acme", "Senior Backend Developer")]),
        )
        .reply("Frontend", "Acme", ScriptedReply::Status(503));
    let app = spawn_app_with(search).await;
    app.add_user(EMAIL);
    app.save_subscriptions(&subscribe_body(json!([
        {"companyName": "Acme", "roleNames": ["Backend", "Frontend"]}
    ])))
    .await;

    // act
    let response = app.jobs(EMAIL).await;

    // assert
    assert_eq!(200, response.status().as_u16());
    let feed: Value = response.json().await.unwrap();
    assert_eq!(feed["jobs"].as_array().unwrap().len(), 1);
    assert_eq!(feed["failures"][0]["companyName"], "Acme");
    assert_eq!(feed["failures"][0]["roleName"], "Frontend");
}

#[tokio::test]
async fn jobs_returns_a_502_when_every_search_fails() {
    // arrange
    let search = ScriptedJobSearch::default().reply(
        "Backend",
        "Acme",
        ScriptedReply::Status(500),
    );
    let app = spawn_app_with(search).await;
    app.add_user(EMAIL);
    app.save_subscriptions(&subscribe_body(json!([
        {"companyName": "Acme", "roleNames": ["Backend"]}
    ])))
    .await;

    // act
    let response = app.jobs(EMAIL).await;

    // assert
    assert_eq!(502, response.status().as_u16());
    let reply: Value = response.json().await.unwrap();
    assert_eq!(reply["status"], "error");
}

#[tokio::test]
async fn a_user_without_subscriptions_gets_an_empty_feed() {
    // arrange
    let app = spawn_app().await;
    app.add_user(EMAIL);

    // act
    let response = app.jobs(EMAIL).await;

    // assert
    assert_eq!(200, response.status().as_u16());
    let feed: Value = response.json().await.unwrap();
    assert_eq!(feed, json!({"jobs": [], "failures": []}));
}

#[tokio::test]
async fn jobs_returns_a_404_for_an_unknown_user() {
    // arrange
    let app = spawn_app().await;

    // act
    let response = app.jobs(EMAIL).await;

    // assert
    assert_eq!(404, response.status().as_u16());
}
