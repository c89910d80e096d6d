use crate::helpers::spawn_app;
use serde_json::{json, Value};

const EMAIL: &str = "ursula_le_guin@gmail.com";

#[tokio::test]
async fn save_returns_a_200_for_a_registered_user() {
    // arrange
    let app = spawn_app().await;
    app.add_user(EMAIL);
    let body = json!({
        "email": EMAIL,
        "subscriptions": [{
            "companyName": "Acme",
            "careerLinks": ["https://acme.com/careers"],
            "roleNames": ["Backend Engineer"]
        }]
    });

    // act
    let response = app.save_subscriptions(&body).await;

    // assert
    assert_eq!(200, response.status().as_u16());
    let reply: Value = response.json().await.unwrap();
    assert_eq!(reply["message"], "Subscription processed successfully");
    assert_eq!(reply["status"], "success");

    let listed: Value = app.fetch_user_subscriptions(EMAIL).await.json().await.unwrap();
    let subscription = &listed["subscriptions"][0];
    assert_eq!(subscription["companyName"], "Acme");
    assert_eq!(subscription["careerLinks"], json!(["https://acme.com/careers"]));
    assert_eq!(subscription["roleNames"], json!(["Backend Engineer"]));
    assert_eq!(subscription["active"], true);
}

#[tokio::test]
async fn saving_twice_merges_without_duplicates() {
    // arrange
    let app = spawn_app().await;
    app.add_user(EMAIL);
    let submission = |roles: Value| {
        json!({
            "email": EMAIL,
            "subscriptions": [{"companyName": "Acme", "roleNames": roles}]
        })
    };

    // act
    app.save_subscriptions(&submission(json!(["Backend", "Frontend"])))
        .await;
    app.save_subscriptions(&submission(json!(["Frontend", "Platform"])))
        .await;

    // assert
    let listed: Value = app.fetch_user_subscriptions(EMAIL).await.json().await.unwrap();
    assert_eq!(
        listed["subscriptions"][0]["roleNames"],
        json!(["Backend", "Frontend", "Platform"])
    );
}

#[tokio::test]
async fn save_returns_a_404_for_an_unknown_user() {
    // arrange
    let app = spawn_app().await;
    let body = json!({
        "email": EMAIL,
        "subscriptions": [{"companyName": "Acme", "roleNames": ["Engineer"]}]
    });

    // act
    let response = app.save_subscriptions(&body).await;

    // assert
    assert_eq!(404, response.status().as_u16());
    let reply: Value = response.json().await.unwrap();
    assert_eq!(reply["message"], "User not found. Please sign up.");
    assert_eq!(reply["status"], "error");
}

#[tokio::test]
async fn save_returns_a_400_when_fields_are_present_but_invalid() {
    // arrange
    let app = spawn_app().await;
    app.add_user(EMAIL);
    let test_cases = vec![
        (
            json!({"email": "", "subscriptions": []}),
            "empty email",
        ),
        (
            json!({"email": "definitely-not-an-email", "subscriptions": []}),
            "invalid email",
        ),
        (
            json!({"email": EMAIL, "subscriptions": [{"companyName": "  "}]}),
            "blank company name",
        ),
        (
            json!({"email": EMAIL, "subscriptions": [
                {"companyName": "Acme", "careerLinks": ["not a link"]}
            ]}),
            "career link with whitespace",
        ),
    ];

    for (invalid_body, description) in test_cases {
        // act
        let response = app.save_subscriptions(&invalid_body).await;

        // assert
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload had an {}.",
            description
        );
    }
}

#[tokio::test]
async fn an_empty_email_is_reported_as_missing() {
    // arrange
    let app = spawn_app().await;

    // act
    let response = app
        .save_subscriptions(&json!({"email": "", "subscriptions": []}))
        .await;

    // assert
    let reply: Value = response.json().await.unwrap();
    assert_eq!(reply["message"], "Email is required");
}

#[tokio::test]
async fn malformed_payloads_are_rejected_with_a_400() {
    // arrange
    let app = spawn_app().await;
    let test_cases = vec![
        (json!({"subscriptions": []}), "missing the email"),
        (json!({"email": EMAIL, "subscriptions": "Acme"}), "a string instead of a list"),
    ];

    for (invalid_body, description) in test_cases {
        // act
        let response = app.save_subscriptions(&invalid_body).await;

        // assert
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            description
        );
        let reply: Value = response.json().await.unwrap();
        assert_eq!(reply["message"], "Invalid request payload");
    }
}

#[tokio::test]
async fn unparseable_json_is_rejected_with_a_json_400() {
    // arrange
    let app = spawn_app().await;

    // act
    let response = app
        .api_client
        .post(&format!("{}/save-subscriptions", &app.address))
        .header("Content-Type", "application/json")
        .body("{\"email\": ")
        .send()
        .await
        .expect("Failed to execute request.");

    // assert
    assert_eq!(400, response.status().as_u16());
    let reply: Value = response.json().await.unwrap();
    assert_eq!(reply["message"], "Invalid request payload");
    assert_eq!(reply["status"], "error");
}

#[tokio::test]
async fn a_career_link_of_another_company_is_a_400() {
    // arrange
    let app = spawn_app().await;
    app.add_user(EMAIL);
    app.save_subscriptions(&json!({
        "email": EMAIL,
        "subscriptions": [{
            "companyName": "Acme",
            "careerLinks": ["https://acme.com/careers"],
            "roleNames": ["Backend"]
        }]
    }))
    .await;

    // act
    let response = app
        .save_subscriptions(&json!({
            "email": EMAIL,
            "subscriptions": [{
                "companyName": "Globex",
                "careerLinks": ["https://acme.com/careers"],
                "roleNames": ["Backend"]
            }]
        }))
        .await;

    // assert
    assert_eq!(400, response.status().as_u16());
    let reply: Value = response.json().await.unwrap();
    assert_eq!(reply["failed"][0]["companyName"], "Globex");
    assert!(reply["message"]
        .as_str()
        .unwrap()
        .contains("belongs to another company"));
}

#[tokio::test]
async fn update_replaces_present_fields_and_keeps_the_rest() {
    // arrange
    let app = spawn_app().await;
    app.add_user(EMAIL);
    app.save_subscriptions(&json!({
        "email": EMAIL,
        "subscriptions": [{
            "companyName": "Acme",
            "careerLinks": ["https://acme.com/careers"],
            "roleNames": ["Backend", "Frontend"]
        }]
    }))
    .await;

    // act
    let response = app
        .update_subscriptions(&json!({
            "email": EMAIL,
            "subscriptions": [{
                "companyName": "Acme",
                "careerLinks": [],
                "roleNames": ["Platform"],
                "active": false
            }]
        }))
        .await;

    // assert
    assert_eq!(200, response.status().as_u16());
    let reply: Value = response.json().await.unwrap();
    assert_eq!(reply["message"], "Subscriptions updated successfully");

    let listed: Value = app.fetch_user_subscriptions(EMAIL).await.json().await.unwrap();
    let subscription = &listed["subscriptions"][0];
    assert_eq!(subscription["roleNames"], json!(["Platform"]));
    assert_eq!(subscription["careerLinks"], json!(["https://acme.com/careers"]));
    assert_eq!(subscription["active"], false);
}

#[tokio::test]
async fn update_with_no_entries_is_a_400() {
    // arrange
    let app = spawn_app().await;
    app.add_user(EMAIL);

    // act
    let response = app
        .update_subscriptions(&json!({"email": EMAIL, "subscriptions": []}))
        .await;

    // assert
    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn update_of_an_unknown_company_is_a_404() {
    // arrange
    let app = spawn_app().await;
    app.add_user(EMAIL);

    // act
    let response = app
        .update_subscriptions(&json!({
            "email": EMAIL,
            "subscriptions": [{"companyName": "Globex", "active": false}]
        }))
        .await;

    // assert
    assert_eq!(404, response.status().as_u16());
    let reply: Value = response.json().await.unwrap();
    assert_eq!(reply["failed"][0]["companyName"], "Globex");
}

#[tokio::test]
async fn a_partially_failed_batch_is_a_207_listing_the_failures() {
    // arrange
    let app = spawn_app().await;
    app.add_user(EMAIL);
    app.save_subscriptions(&json!({
        "email": EMAIL,
        "subscriptions": [{"companyName": "Acme", "roleNames": ["Backend"]}]
    }))
    .await;

    // act
    let response = app
        .update_subscriptions(&json!({
            "email": EMAIL,
            "subscriptions": [
                {"companyName": "Acme", "roleNames": ["Frontend"]},
                {"companyName": "Globex", "roleNames": ["Frontend"]}
            ]
        }))
        .await;

    // assert
    assert_eq!(207, response.status().as_u16());
    let reply: Value = response.json().await.unwrap();
    assert_eq!(reply["status"], "partial");
    assert_eq!(reply["succeeded"], json!(["Acme"]));
    assert_eq!(reply["failed"][0]["companyName"], "Globex");

    let listed: Value = app.fetch_user_subscriptions(EMAIL).await.json().await.unwrap();
    assert_eq!(listed["subscriptions"][0]["roleNames"], json!(["Frontend"]));
}

#[tokio::test]
async fn delete_removes_the_subscription() {
    // arrange
    let app = spawn_app().await;
    app.add_user(EMAIL);
    app.save_subscriptions(&json!({
        "email": EMAIL,
        "subscriptions": [
            {"companyName": "Acme", "roleNames": ["Backend"]},
            {"companyName": "Globex", "roleNames": ["Backend"]}
        ]
    }))
    .await;

    // act
    let response = app
        .delete_subscriptions(&json!({"email": EMAIL, "subscriptions": ["Acme"]}))
        .await;

    // assert
    assert_eq!(200, response.status().as_u16());
    let reply: Value = response.json().await.unwrap();
    assert_eq!(reply["message"], "Deleted subscription(s) successfully");

    let listed: Value = app.fetch_user_subscriptions(EMAIL).await.json().await.unwrap();
    let companies: Vec<&str> = listed["subscriptions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["companyName"].as_str().unwrap())
        .collect();
    assert_eq!(companies, vec!["Globex"]);
}

#[tokio::test]
async fn deleting_twice_reports_the_missing_subscription() {
    // arrange
    let app = spawn_app().await;
    app.add_user(EMAIL);
    app.save_subscriptions(&json!({
        "email": EMAIL,
        "subscriptions": [{"companyName": "Acme", "roleNames": ["Backend"]}]
    }))
    .await;
    let body = json!({"email": EMAIL, "subscriptions": ["Acme"]});

    // act
    app.delete_subscriptions(&body).await;
    let response = app.delete_subscriptions(&body).await;

    // assert
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn delete_with_no_companies_is_a_400() {
    // arrange
    let app = spawn_app().await;
    app.add_user(EMAIL);

    // act
    let response = app
        .delete_subscriptions(&json!({"email": EMAIL, "subscriptions": []}))
        .await;

    // assert
    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn fetching_subscriptions_of_an_unknown_user_is_a_404() {
    // arrange
    let app = spawn_app().await;

    // act
    let response = app.fetch_user_subscriptions(EMAIL).await;

    // assert
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn the_catalog_lists_every_company_and_role_ever_submitted() {
    // arrange
    let app = spawn_app().await;
    app.add_user(EMAIL);
    app.add_user("someone_else@gmail.com");
    app.save_subscriptions(&json!({
        "email": EMAIL,
        "subscriptions": [{
            "companyName": "Acme",
            "careerLinks": ["https://acme.com/careers"],
            "roleNames": ["Backend"]
        }]
    }))
    .await;
    app.save_subscriptions(&json!({
        "email": "someone_else@gmail.com",
        "subscriptions": [{"companyName": "Globex", "roleNames": ["Designer"]}]
    }))
    .await;

    // act
    let response = app.fetch_all_subscriptions().await;

    // assert
    assert_eq!(200, response.status().as_u16());
    let catalog: Value = response.json().await.unwrap();
    assert_eq!(
        catalog["companies"],
        json!({"Acme": ["https://acme.com/careers"], "Globex": []})
    );
    assert_eq!(catalog["roles"], json!(["Backend", "Designer"]));
}
