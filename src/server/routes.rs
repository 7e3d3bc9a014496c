use crate::server::api;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    fn json(body: String) -> Self {
        Self {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            body,
        }
    }
}

pub fn route_request(method: &str, path: &str, body: &str) -> HttpResponse {
    let route = path.split('?').next().unwrap_or(path);
    match (method, route) {
        ("GET", "/api/health") => match api::health_payload() {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/missions/tiers") => payload_response(api::tiers_payload(), "Invalid request"),
        ("GET", "/api/missions/progression") => {
            payload_response(api::progression_payload(path), "Invalid request")
        }
        ("POST", "/api/missions/generate") => {
            payload_response(api::generate_payload(body), "Invalid request body")
        }
        ("POST", "/api/missions/batch") => {
            payload_response(api::batch_payload(body), "Invalid request body")
        }
        (_, "/api/health")
        | (_, "/api/missions/tiers")
        | (_, "/api/missions/progression")
        | (_, "/api/missions/generate")
        | (_, "/api/missions/batch") => {
            error_response(405, "Method Not Allowed", "Method not allowed")
        }
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

fn payload_response(
    result: Result<String, api::PayloadError>,
    parse_prefix: &str,
) -> HttpResponse {
    match result {
        Ok(payload) => HttpResponse::json(payload),
        Err(api::PayloadError::Parse(err)) => {
            error_response(400, "Bad Request", &format!("{parse_prefix}: {err}"))
        }
        Err(api::PayloadError::Validation(validation)) => {
            validation_error_response(400, "Bad Request", validation)
        }
        Err(err @ (api::PayloadError::Serialize(_) | api::PayloadError::Catalog(_))) => {
            log::error!("{err}");
            error_response(500, "Internal Server Error", &err.to_string())
        }
    }
}

fn validation_error_response(
    status_code: u16,
    status_text: &'static str,
    payload: api::ValidationErrorResponse,
) -> HttpResponse {
    let fallback =
        "{\n  \"status\": \"error\",\n  \"message\": \"Validation failed\"\n}".to_string();

    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: serde_json::to_string_pretty(&payload).unwrap_or(fallback),
    }
}

pub(crate) fn error_response(
    status_code: u16,
    status_text: &'static str,
    message: &str,
) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}
