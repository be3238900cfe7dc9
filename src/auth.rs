use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{Object, SecurityRequirement, SecurityScheme, SecuritySchemeData};
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};

/// The raw token from an `Authorization: Bearer <token>` header, if one was sent.
///
/// Extraction never fails; whether the token is acceptable is decided by
/// `AuthService::resolve_token` so that the failure carries a JSON error body.
#[derive(Debug, Clone)]
pub struct BearerToken(pub Option<String>);

pub(crate) fn parse_bearer_header(value: &str) -> Option<String> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if scheme != "Bearer" {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for BearerToken {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let token = req.headers().get_one("Authorization").and_then(parse_bearer_header);
        Outcome::Success(BearerToken(token))
    }
}

impl BearerToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<'a> OpenApiFromRequest<'a> for BearerToken {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        let security_scheme = SecurityScheme {
            description: Some("Bearer token. Log in via POST /api/auth/login to obtain one.".to_string()),
            data: SecuritySchemeData::Http {
                scheme: "bearer".to_string(),
                bearer_format: Some("JWT".to_string()),
            },
            extensions: Object::default(),
        };

        let mut security_req = SecurityRequirement::new();
        security_req.insert("bearerAuth".to_string(), Vec::new());

        Ok(RequestHeaderInput::Security("bearerAuth".to_string(), security_scheme, security_req))
    }
}
