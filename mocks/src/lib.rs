use httptest::{all_of, matchers::*, responders::*, Expectation, Server};
use serde_json::json;

/// Start an empty mock server for the catalog and upload endpoints.
pub fn catalog_server() -> Server {
    Server::run()
}

/// Three records; only the second mentions a cat, and only in its description.
pub fn pets_body() -> serde_json::Value {
    json!([
        {
            "title": "Rex",
            "description": "A very good dog",
            "url": "https://example.com/rex.png",
            "created": "Tue Feb 20 2024 10:00:00"
        },
        {
            "title": "Whiskers",
            "description": "Sleepy cat on a sofa",
            "url": "https://example.com/whiskers.png",
            "created": "Tue Feb 20 2024 11:00:00"
        },
        {
            "title": "Polly",
            "description": "Talkative parrot",
            "url": "https://example.com/polly.png",
            "created": "Tue Feb 20 2024 12:00:00"
        }
    ])
}

/// Same as [`pets_body`] but with image URLs pointing at `server`.
pub fn pets_body_on(server: &Server) -> serde_json::Value {
    let mut body = pets_body();
    if let Some(items) = body.as_array_mut() {
        for item in items {
            let title = item["title"].as_str().unwrap_or("pet").to_lowercase();
            item["url"] = json!(server.url_str(&format!("/images/{}.png", title)));
        }
    }
    body
}

/// Expect a GET request to `/pets`, answered with `body`.
pub fn expect_pets(server: &Server, body: serde_json::Value) {
    server.expect(
        Expectation::matching(request::method_path("GET", "/pets"))
            .times(1..)
            .respond_with(json_encoded(body)),
    );
}

/// Expect a GET request to `/upload` handing out `server`'s `target_path`.
pub fn expect_upload_target(server: &Server, target_path: &str) {
    let target = server.url_str(target_path);
    server.expect(
        Expectation::matching(request::method_path("GET", "/upload"))
            .times(1..)
            .respond_with(json_encoded(json!({ "url": target }))),
    );
}

/// Expect a GET request to `/upload` that fails with `status`.
pub fn expect_upload_target_failure(server: &Server, status: u16) {
    server.expect(
        Expectation::matching(request::method_path("GET", "/upload"))
            .times(1..)
            .respond_with(status_code(status)),
    );
}

/// Expect exactly `times` multipart POSTs to `target_path`, answered with `status`.
pub fn expect_upload_post(server: &Server, target_path: &str, status: u16, times: usize) {
    server.expect(
        Expectation::matching(all_of![
            request::method_path("POST", target_path.to_string()),
            request::headers(contains(key("content-type"))),
        ])
        .times(times)
        .respond_with(status_code(status)),
    );
}

/// Serve `bytes` for any GET under `/images/`.
pub fn expect_images(server: &Server, bytes: Vec<u8>) {
    server.expect(
        Expectation::matching(all_of![
            request::method("GET"),
            request::path(matches("^/images/")),
        ])
        .times(..)
        .respond_with(status_code(200).body(bytes)),
    );
}

/// Answer every GET under `/images/` with 404, once.
pub fn expect_images_missing(server: &Server) {
    server.expect(
        Expectation::matching(all_of![
            request::method("GET"),
            request::path(matches("^/images/")),
        ])
        .respond_with(status_code(404)),
    );
}
