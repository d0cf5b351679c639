use serde_json::Value;

use crate::helpers::{image_upload_form, spawn_app, EmbedderBehaviour};

#[tokio::test]
async fn create_pic_stores_exactly_one_vector_keyed_by_the_object_id() {
    // Arrange
    let app = spawn_app().await;
    app.embedder_client
        .set_behaviour(EmbedderBehaviour::Success(vec![0.5; 512]));

    // Act
    let response = reqwest::Client::new()
        .post(&format!("{}/create-pic?object_id=u1", &app.address))
        .multipart(image_upload_form())
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["response"], "successfully stored");

    let inserts = app.vector_repository.inserts();
    assert_eq!(inserts.len(), 1);
    assert_eq!(inserts[0].0, "u1");
    assert_eq!(inserts[0].1.len(), 512);
}

#[tokio::test]
async fn create_pic_returns_a_400_when_the_image_field_is_missing() {
    // Arrange
    let app = spawn_app().await;

    let form = reqwest::multipart::Form::new();

    // Act
    let response = reqwest::Client::new()
        .post(&format!("{}/create-pic?object_id=u1", &app.address))
        .multipart(form)
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(400, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "image file is required");
    assert!(app.vector_repository.inserts().is_empty());
}

#[tokio::test]
async fn create_pic_returns_a_400_when_the_object_id_is_absent() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = reqwest::Client::new()
        .post(&format!("{}/create-pic", &app.address))
        .multipart(image_upload_form())
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(400, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "object_id is not provided");

    // Neither the embedder nor the store were reached
    assert_eq!(app.embedder_client.call_count(), 0);
    assert!(app.vector_repository.inserts().is_empty());
}

#[tokio::test]
async fn create_pic_returns_a_400_when_the_object_id_is_empty() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = reqwest::Client::new()
        .post(&format!("{}/create-pic?object_id=", &app.address))
        .multipart(image_upload_form())
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(400, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "object_id is not provided");
    assert!(app.vector_repository.inserts().is_empty());
}

#[tokio::test]
async fn create_pic_surfaces_an_in_band_rejection_as_a_400_and_stores_nothing() {
    // Arrange
    let app = spawn_app().await;
    app.embedder_client
        .set_behaviour(EmbedderBehaviour::Rejection("no face detected".into()));

    // Act
    let response = reqwest::Client::new()
        .post(&format!("{}/create-pic?object_id=u1", &app.address))
        .multipart(image_upload_form())
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(400, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "no face detected");
    assert!(app.vector_repository.inserts().is_empty());
}

#[tokio::test]
async fn create_pic_returns_a_500_on_embedder_timeout_and_stores_nothing() {
    // Arrange
    let app = spawn_app().await;
    app.embedder_client.set_behaviour(EmbedderBehaviour::Timeout);

    // Act
    let response = reqwest::Client::new()
        .post(&format!("{}/create-pic?object_id=u1", &app.address))
        .multipart(image_upload_form())
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(500, response.status().as_u16());
    assert!(app.vector_repository.inserts().is_empty());
}

#[tokio::test]
async fn create_pic_returns_a_500_when_the_vector_store_fails() {
    // Arrange
    let app = spawn_app().await;
    app.vector_repository.set_failing();

    // Act
    let response = reqwest::Client::new()
        .post(&format!("{}/create-pic?object_id=u1", &app.address))
        .multipart(image_upload_form())
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    // The embedding was computed, then discarded: fail-and-discard, no retry
    assert_eq!(500, response.status().as_u16());
    assert_eq!(app.embedder_client.call_count(), 1);
    assert!(app.vector_repository.inserts().is_empty());
}
